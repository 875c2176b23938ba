//! Card selection engine.
//!
//! Picks a card for a category/subcategory pair, applies the per-card
//! rarity modifier reroll and records the copy in the user's collection.

use std::sync::Arc;

use anyhow::{bail, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, warn};

use super::UserLedger;
use crate::database::{Card, CardDetails, Catalog, Category, DrawUser, NewCard, Rarity, Subcategory};

/// Upper bound on consecutive rerolls for a single draw.
///
/// A subcategory where every card has `rarity_modifier + chance <= 0` would
/// otherwise reroll forever.
pub const MAX_REROLLS: usize = 64;

/// Result of a draw attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// The card that ended up in the collection.
    Drawn(Box<CardDetails>),
    /// The user has no draws left.
    NoDraws,
    /// The subcategory has no cards at all.
    NotFound,
}

/// How a draw is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    /// Check for a free draw and consume it after the card is added.
    Charge,
    /// The draw was already consumed earlier in the flow; only reject users
    /// who went past their maximum in the meantime.
    Reserved,
}

impl Allowance {
    fn permits(self, user: &DrawUser) -> bool {
        match self {
            Allowance::Charge => user.used_draws < user.maximum_draws,
            Allowance::Reserved => user.used_draws <= user.maximum_draws,
        }
    }
}

#[derive(Clone)]
pub struct CardEngine {
    catalog: Arc<dyn Catalog>,
    users: UserLedger,
    rng: Arc<Mutex<StdRng>>,
}

impl CardEngine {
    pub fn new(catalog: Arc<dyn Catalog>, users: UserLedger) -> Self {
        Self::with_rng(catalog, users, StdRng::from_os_rng())
    }

    pub fn with_rng(catalog: Arc<dyn Catalog>, users: UserLedger, rng: StdRng) -> Self {
        Self {
            catalog,
            users,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    pub fn users(&self) -> &UserLedger {
        &self.users
    }

    /// Uniform value in `[0, 1)`.
    fn roll(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }

    fn pick_index(&self, len: usize) -> usize {
        self.rng.lock().random_range(0..len)
    }

    /// Join a card with its rarity, category and subcategory.
    ///
    /// Returns `None` (and logs) when any of them is missing.
    pub async fn details(&self, card: Card) -> Result<Option<CardDetails>> {
        let rarity = self.catalog.rarity(card.rarity_id).await?;
        let category = self.catalog.category(card.category_id).await?;
        let subcategory = self.catalog.subcategory(card.subcategory_id).await?;

        match (rarity, category, subcategory) {
            (Some(rarity), Some(category), Some(subcategory)) => Ok(Some(CardDetails {
                card,
                rarity,
                category,
                subcategory,
            })),
            _ => {
                warn!("Card {} references a missing rarity, category or subcategory", card.id);
                Ok(None)
            }
        }
    }

    /// Rarity tier for the next draw, weighted by `chance`.
    pub async fn rarity_for_draw(&self, user: &DrawUser) -> Result<Option<Rarity>> {
        let rarities = self.catalog.rarities().await?;
        let total: f64 = rarities.iter().map(|r| r.chance.max(0.0)).sum();
        if total <= 0.0 {
            return Ok(rarities.into_iter().next());
        }

        let mut target = self.roll() * total;
        for rarity in &rarities {
            let weight = rarity.chance.max(0.0);
            if target < weight {
                debug!("User {} rolled rarity {}", user.id, rarity.name);
                return Ok(Some(rarity.clone()));
            }
            target -= weight;
        }

        // Float rounding can leave `target` a hair above the last weight.
        Ok(rarities.into_iter().rev().find(|r| r.chance > 0.0))
    }

    /// Pick a card uniformly among the matches for the triple.
    ///
    /// `recursing` drops the rarity filter. With no match at all, falls back
    /// to any card of the subcategory; `None` means the subcategory is empty.
    pub async fn select_random_card(
        &self,
        rarity: &Rarity,
        category: &Category,
        subcategory: &Subcategory,
        recursing: bool,
    ) -> Result<Option<CardDetails>> {
        let rarity_filter = (!recursing).then_some(rarity.id);
        let mut cards = self
            .catalog
            .cards_in(category.id, subcategory.id, rarity_filter)
            .await?;

        let card = if cards.is_empty() {
            self.catalog.any_card_in_subcategory(subcategory.id).await?
        } else {
            let index = self.pick_index(cards.len());
            Some(cards.swap_remove(index))
        };

        match card {
            Some(card) => self.details(card).await,
            None => Ok(None),
        }
    }

    /// Add `card` to the user's collection, rerolling first if its modifier
    /// says so. Returns the card that was kept, or `None` if a reroll found
    /// nothing to select.
    pub async fn add_card(&self, user: &DrawUser, card: CardDetails) -> Result<Option<CardDetails>> {
        let mut candidate = card;
        let mut rerolls = 0;

        loop {
            if candidate.card.rarity_modifier != 0.0 {
                if rerolls >= MAX_REROLLS {
                    warn!(
                        "Giving up rerolling for user {} after {} attempts, keeping card {}",
                        user.id, rerolls, candidate.id()
                    );
                } else if self.roll() > candidate.keep_threshold() {
                    rerolls += 1;
                    debug!("Rerolling card {} for user {}", candidate.id(), user.id);
                    let next = self
                        .select_random_card(
                            &candidate.rarity,
                            &candidate.category,
                            &candidate.subcategory,
                            true,
                        )
                        .await?;
                    match next {
                        Some(next) => {
                            candidate = next;
                            continue;
                        }
                        None => return Ok(None),
                    }
                }
            }

            self.catalog.insert_user_card(user.id, candidate.id()).await?;
            return Ok(Some(candidate));
        }
    }

    /// Draw one card for `user` from `category`/`subcategory`.
    pub async fn draw_card(
        &self,
        user: &DrawUser,
        category: &Category,
        subcategory: &Subcategory,
        allowance: Allowance,
    ) -> Result<DrawOutcome> {
        let Some(rarity) = self.rarity_for_draw(user).await? else {
            error!("No rarities configured, cannot draw");
            return Ok(DrawOutcome::NotFound);
        };

        let Some(card) = self
            .select_random_card(&rarity, category, subcategory, false)
            .await?
        else {
            return Ok(DrawOutcome::NotFound);
        };

        if !allowance.permits(user) {
            return Ok(DrawOutcome::NoDraws);
        }

        let Some(kept) = self.add_card(user, card).await? else {
            return Ok(DrawOutcome::NotFound);
        };

        if allowance == Allowance::Charge {
            self.users.deduct_draw(user.id).await?;
        }

        Ok(DrawOutcome::Drawn(Box::new(kept)))
    }

    /// Register a card, or move an existing one to a new rarity.
    ///
    /// A card counts as existing when both its name and its subcategory's
    /// name match. Cards are not deduplicated across subcategories.
    pub async fn create_card(&self, new: NewCard) -> Result<Card> {
        let Some(sub) = self.catalog.subcategory(new.subcategory_id).await? else {
            bail!("Subcategory with ID {} does not exist.", new.subcategory_id);
        };

        if let Some(existing) = self
            .catalog
            .card_by_name_and_subcategory_name(&new.name, &sub.name)
            .await?
        {
            if existing.rarity_id != new.rarity_id {
                self.catalog.set_card_rarity(existing.id, new.rarity_id).await?;
                debug!("Card {} moved to rarity {}", existing.id, new.rarity_id);
                return Ok(Card {
                    rarity_id: new.rarity_id,
                    ..existing
                });
            }
            return Ok(existing);
        }

        self.catalog.insert_card(new).await
    }

    /// Append an alias to a subcategory. Returns the subcategory as it was
    /// before the alias was added, or `None` if it does not exist.
    pub async fn add_subcategory_alias(
        &self,
        subcategory_id: i32,
        alias: &str,
    ) -> Result<Option<Subcategory>> {
        let Some(sub) = self.catalog.subcategory(subcategory_id).await? else {
            return Ok(None);
        };
        self.catalog.push_subcategory_alias(sub.id, alias).await?;
        debug!("Alias '{}' added to subcategory {}", alias, sub.id);
        Ok(Some(sub))
    }
}
