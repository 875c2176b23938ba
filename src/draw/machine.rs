//! Draw wizard state machine.
//!
//! [`transition`] is pure: it maps the current phase and an event to the
//! next phase plus a list of [`Effect`]s. The wizard runs the effects, and
//! effects that talk to the outside world report back with a new event.

use crate::database::{CardDetails, Category, Subcategory};
use crate::engine::DrawOutcome;

/// Why a wizard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Completed,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    /// Step 0: the category keyboard is on screen.
    AwaitingCategory,
    /// Step 1: the subcategory keyboard is on screen.
    AwaitingSubcategory { category: Option<Category> },
    /// Step 2: the engine is drawing.
    Revealing {
        category: Category,
        subcategory: Subcategory,
    },
    Done(Exit),
}

impl Phase {
    /// Session step index, for phases that wait on a button press.
    pub fn step(&self) -> Option<u8> {
        match self {
            Phase::AwaitingCategory => Some(0),
            Phase::AwaitingSubcategory { .. } => Some(1),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Start,
    /// Result of sending the category keyboard: a link to it, or `None` on failure.
    CategoriesShown(Option<String>),
    /// The pressed category, `None` if it no longer exists.
    CategoryChosen(Option<Category>),
    /// Whether the subcategory keyboard replaced the message.
    SubcategoriesShown(bool),
    SubcategoryChosen {
        subcategory: Option<Subcategory>,
        /// The subcategory's own category, used when the session lost its choice.
        fallback_category: Option<Category>,
        locked: bool,
    },
    Drawn(DrawOutcome),
    Cancel,
}

/// User-facing notices. Each maps to a translation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Cancelled,
    TooFast,
    Expired,
    NotDrawing,
    NoDraws,
    NoCardsFound,
}

impl Notice {
    pub fn key(self) -> &'static str {
        match self {
            Notice::Cancelled => "draw.cancelled",
            Notice::TooFast => "draw.too_fast",
            Notice::Expired => "draw.expired",
            Notice::NotDrawing => "draw.not_drawing",
            Notice::NoDraws => "draw.no_draws",
            Notice::NoCardsFound => "draw.no_cards_found",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AcquireLock,
    PointLockTo(String),
    ReleaseLock,
    HitCooldowns,
    ShowCategories,
    ShowSubcategories(Category),
    DeductDraw,
    RefundDraw,
    Reveal {
        category: Category,
        subcategory: Subcategory,
    },
    Deliver(Box<CardDetails>),
    /// Delete the pressed message, or the session's main message.
    DeleteMessage,
    /// Alert on the pressed button, or a chat message when there is none.
    Tell(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: Phase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: Phase, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(phase: &Phase) -> Self {
        Self {
            next: phase.clone(),
            effects: Vec::new(),
        }
    }
}

/// Abort with the message removed, the lock released and a notice.
fn abort(exit: Exit, notice: Notice, refund: bool) -> Transition {
    let mut effects = vec![Effect::DeleteMessage, Effect::ReleaseLock];
    if refund {
        effects.push(Effect::RefundDraw);
    }
    effects.push(Effect::Tell(notice));
    Transition::to(Phase::Done(exit), effects)
}

pub fn transition(phase: &Phase, event: DrawEvent) -> Transition {
    use DrawEvent as E;

    match (phase, event) {
        (Phase::Idle, E::Start) => Transition::to(
            Phase::AwaitingCategory,
            vec![Effect::AcquireLock, Effect::ShowCategories],
        ),

        (Phase::AwaitingCategory, E::CategoriesShown(Some(link))) => Transition::to(
            Phase::AwaitingCategory,
            vec![Effect::PointLockTo(link), Effect::HitCooldowns],
        ),
        (Phase::AwaitingCategory, E::CategoriesShown(None)) => {
            Transition::to(Phase::Done(Exit::Cancelled), vec![Effect::ReleaseLock])
        }

        (Phase::AwaitingCategory, E::CategoryChosen(None)) => {
            abort(Exit::Cancelled, Notice::Cancelled, false)
        }
        (Phase::AwaitingCategory, E::CategoryChosen(Some(category))) => Transition::to(
            Phase::AwaitingSubcategory {
                category: Some(category.clone()),
            },
            vec![Effect::DeductDraw, Effect::ShowSubcategories(category)],
        ),

        (Phase::AwaitingSubcategory { .. }, E::SubcategoriesShown(true)) => Transition::stay(phase),
        (Phase::AwaitingSubcategory { .. }, E::SubcategoriesShown(false)) => {
            abort(Exit::Cancelled, Notice::TooFast, true)
        }

        (
            Phase::AwaitingSubcategory { category },
            E::SubcategoryChosen {
                subcategory,
                fallback_category,
                locked,
            },
        ) => {
            let category = category.clone().or(fallback_category);
            match (subcategory, category) {
                (Some(subcategory), Some(category)) => {
                    if locked {
                        Transition::to(
                            Phase::Revealing {
                                category: category.clone(),
                                subcategory: subcategory.clone(),
                            },
                            vec![Effect::Reveal {
                                category,
                                subcategory,
                            }],
                        )
                    } else {
                        Transition::to(
                            Phase::Done(Exit::Expired),
                            vec![Effect::Tell(Notice::NotDrawing)],
                        )
                    }
                }
                _ => abort(Exit::Expired, Notice::Expired, false),
            }
        }

        (Phase::Revealing { .. }, E::Drawn(DrawOutcome::Drawn(card))) => Transition::to(
            Phase::Done(Exit::Completed),
            vec![Effect::ReleaseLock, Effect::Deliver(card)],
        ),
        (Phase::Revealing { .. }, E::Drawn(DrawOutcome::NoDraws)) => Transition::to(
            Phase::Done(Exit::Cancelled),
            vec![Effect::ReleaseLock, Effect::Tell(Notice::NoDraws)],
        ),
        (Phase::Revealing { .. }, E::Drawn(DrawOutcome::NotFound)) => {
            abort(Exit::Cancelled, Notice::NoCardsFound, true)
        }

        (Phase::AwaitingCategory | Phase::AwaitingSubcategory { .. }, E::Cancel) => {
            abort(Exit::Cancelled, Notice::Cancelled, false)
        }

        (_, _) => Transition::stay(phase),
    }
}
