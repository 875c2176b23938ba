//! Draw wizard.
//!
//! Feeds commands and button presses into [`transition`] and carries out
//! the resulting effects. Session state is written before any effect runs,
//! so a press that races an in-flight edit sees the new step.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, MessageId, ThreadId};
use tracing::{debug, info, warn};

use super::delivery::{Delivery, Recipient};
use super::lock::{Cooldowns, DrawLock};
use super::machine::{transition, DrawEvent, Effect, Notice, Phase, Transition};
use super::render;
use crate::database::{CardDetails, Catalog, Category, DrawUser};
use crate::engine::{Allowance, CardEngine};
use crate::i18n::get_text;
use crate::media::{ImageResolver, Media, MediaKind};
use crate::session::{Session, SessionKey, SessionQuery, SessionStore};
use crate::store::CacheLayer;
use crate::transport::{Target, Transport};

/// Scene name used in sessions and button payloads.
pub const SCENE: &str = "draw";

/// Payload of the cancel button.
pub const CANCEL_DATA: &str = "cancel";

pub const STAGE_ONE_DRAW_GIF: &str = "https://altadena.space/assets/girar-one.mp4";
pub const STAGE_TWO_DRAW_GIF: &str = "https://altadena.space/assets/girar-two.mp4?c";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawData {
    #[serde(default)]
    pub chosen_category: Option<Category>,
}

/// The user acting, and where.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub first_name: String,
    pub chat: ChatId,
    pub thread: Option<ThreadId>,
}

impl Caller {
    fn key(&self) -> SessionKey {
        SessionKey::new(
            self.user_id,
            self.chat.0,
            self.thread.map(|ThreadId(MessageId(t))| t),
        )
    }

    fn target(&self) -> Target {
        Target::new(self.chat, self.thread)
    }
}

/// A button press on one of the wizard's messages.
#[derive(Debug, Clone)]
pub struct Press {
    pub query_id: String,
    pub message: Option<MessageId>,
    pub data: String,
}

#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub locale: String,
    pub stage_one_image: String,
    pub stage_two_image: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            locale: crate::i18n::DEFAULT_LOCALE.to_string(),
            stage_one_image: STAGE_ONE_DRAW_GIF.to_string(),
            stage_two_image: STAGE_TWO_DRAW_GIF.to_string(),
        }
    }
}

/// State of one update being handled.
struct Run {
    caller: Caller,
    key: SessionKey,
    user: DrawUser,
    session: Session<DrawData>,
    press: Option<Press>,
    answered: bool,
}

impl Run {
    /// The message the wizard is working on.
    fn message(&self) -> Option<MessageId> {
        self.press
            .as_ref()
            .and_then(|p| p.message)
            .or(self.session.main_message.map(MessageId))
    }
}

fn phase_of(session: &Session<DrawData>) -> Phase {
    match session.step {
        0 => Phase::AwaitingCategory,
        1 => Phase::AwaitingSubcategory {
            category: session.data.chosen_category.clone(),
        },
        _ => Phase::Idle,
    }
}

#[derive(Clone)]
pub struct DrawWizard {
    catalog: Arc<dyn Catalog>,
    engine: CardEngine,
    sessions: SessionStore,
    lock: DrawLock,
    cooldowns: Cooldowns,
    transport: Arc<dyn Transport>,
    delivery: Delivery,
    images: ImageResolver,
    config: WizardConfig,
}

impl DrawWizard {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        engine: CardEngine,
        cache: CacheLayer,
        transport: Arc<dyn Transport>,
        delivery: Delivery,
        images: ImageResolver,
        config: WizardConfig,
    ) -> Self {
        Self {
            catalog,
            engine,
            sessions: SessionStore::new(cache.clone(), SCENE),
            lock: DrawLock::new(cache.clone()),
            cooldowns: Cooldowns::new(cache),
            transport,
            delivery,
            images,
            config,
        }
    }

    fn text(&self, key: &str) -> String {
        get_text(&self.config.locale, key)
    }

    /// Handle `/draw`.
    pub async fn start(&self, caller: &Caller, trigger: Option<MessageId>) -> Result<Phase> {
        let user = self.engine.users().ensure(caller.user_id).await?;

        if self.lock.is_held(user.id).await? {
            let text = match self.lock.link(user.id).await? {
                Some(link) => self.text("draw.already_drawing").replace("{link}", &link),
                None => self.text("draw.already_drawing_plain"),
            };
            self.say(caller.target(), &text).await;
            return Ok(Phase::Idle);
        }

        if user.is_exhausted() {
            self.say(caller.target(), &self.text(Notice::NoDraws.key()))
                .await;
            return Ok(Phase::Idle);
        }

        info!("User {} started a draw in chat {}", user.id, caller.chat.0);
        let mut run = Run {
            caller: caller.clone(),
            key: caller.key(),
            user,
            session: Session {
                step: 0,
                data: DrawData::default(),
                main_message: None,
                quoted_message: trigger.map(|m| m.0),
            },
            press: None,
            answered: false,
        };
        self.drive(&mut run, Phase::Idle, DrawEvent::Start).await
    }

    /// Handle a press on one of the wizard's buttons.
    pub async fn press(&self, caller: &Caller, press: Press) -> Result<Phase> {
        let Some(query) = SessionQuery::parse(&press.data).filter(|q| q.scene == SCENE) else {
            self.answer(&press, None).await;
            return Ok(Phase::Idle);
        };

        if query.owner != caller.user_id {
            self.answer(&press, Some(&self.text("draw.not_yours"))).await;
            return Ok(Phase::Idle);
        }

        let user = self.engine.users().ensure(caller.user_id).await?;
        let key = caller.key();
        let stored: Option<Session<DrawData>> = self.sessions.get(&key).await?;
        let session = stored.clone().unwrap_or(Session {
            step: query.step,
            data: DrawData::default(),
            main_message: press.message.map(|m| m.0),
            quoted_message: None,
        });
        let mut run = Run {
            caller: caller.clone(),
            key,
            user,
            session,
            press: Some(press),
            answered: false,
        };

        let phase = stored.as_ref().map(phase_of).unwrap_or(Phase::Idle);

        if query.data == CANCEL_DATA {
            if phase == Phase::Idle {
                self.tell(&mut run, Notice::Expired).await;
                return Ok(Phase::Idle);
            }
            return self.drive(&mut run, phase, DrawEvent::Cancel).await;
        }

        let (phase, event) = match &phase {
            Phase::AwaitingCategory | Phase::AwaitingSubcategory { .. }
                if phase.step() != Some(query.step) =>
            {
                debug!(
                    "Press for step {} but session {} is at {:?}",
                    query.step, run.key, phase
                );
                self.tell(&mut run, Notice::Expired).await;
                return Ok(phase.clone());
            }
            Phase::AwaitingCategory => {
                let category = match query.data.parse::<i32>() {
                    Ok(id) => self.catalog.category(id).await?,
                    Err(_) => None,
                };
                (phase.clone(), DrawEvent::CategoryChosen(category))
            }
            Phase::AwaitingSubcategory { category } => {
                let event = self
                    .subcategory_chosen(category.is_none(), &query.data, run.user.id)
                    .await?;
                (phase.clone(), event)
            }
            // No session in this chat: the user's lock may belong to a draw
            // elsewhere, so the press never reaches the engine.
            _ => {
                self.tell(&mut run, Notice::NotDrawing).await;
                return Ok(Phase::Idle);
            }
        };

        self.drive(&mut run, phase, event).await
    }

    /// Handle `/cancel`. Returns `true` if a draw was cancelled.
    ///
    /// Without a session this is a no-op. The lock is left alone and expires
    /// on its own.
    pub async fn cancel(&self, caller: &Caller) -> Result<bool> {
        let keys = self.sessions.find_for_user(caller.user_id).await?;
        let mut cancelled = false;

        for key in keys {
            let Some(session) = self.sessions.get::<DrawData>(&key).await? else {
                continue;
            };
            let phase = phase_of(&session);
            if phase == Phase::Idle {
                self.sessions.leave(&key).await?;
                continue;
            }

            let user = self.engine.users().ensure(caller.user_id).await?;
            let mut run = Run {
                caller: caller.clone(),
                key,
                user,
                session,
                press: None,
                answered: false,
            };
            let outcome = self.drive(&mut run, phase, DrawEvent::Cancel).await?;
            cancelled |= outcome.is_done();
        }

        Ok(cancelled)
    }

    async fn subcategory_chosen(
        &self,
        needs_category: bool,
        data: &str,
        user_id: i64,
    ) -> Result<DrawEvent> {
        let subcategory = match data.parse::<i32>() {
            Ok(id) => self.catalog.subcategory(id).await?,
            Err(_) => None,
        };
        let fallback_category = match &subcategory {
            Some(sub) if needs_category => self.catalog.category(sub.category_id).await?,
            _ => None,
        };
        let locked = self.lock.is_held(user_id).await?;

        Ok(DrawEvent::SubcategoryChosen {
            subcategory,
            fallback_category,
            locked,
        })
    }

    async fn drive(&self, run: &mut Run, mut phase: Phase, first: DrawEvent) -> Result<Phase> {
        let mut queue = VecDeque::from([first]);

        while let Some(event) = queue.pop_front() {
            let Transition { next, effects } = transition(&phase, event);
            self.persist(run, &next).await?;
            phase = next;

            for effect in effects {
                if let Some(follow_up) = self.execute(run, effect).await? {
                    queue.push_back(follow_up);
                }
            }
        }

        self.acknowledge(run).await;
        Ok(phase)
    }

    async fn persist(&self, run: &mut Run, phase: &Phase) -> Result<()> {
        match phase {
            Phase::Idle => Ok(()),
            Phase::AwaitingCategory | Phase::AwaitingSubcategory { .. } => {
                run.session.step = phase.step().unwrap_or_default();
                run.session.data.chosen_category = match phase {
                    Phase::AwaitingSubcategory { category } => category.clone(),
                    _ => None,
                };
                self.sessions.save(&run.key, &run.session).await
            }
            Phase::Revealing { .. } | Phase::Done(_) => {
                self.sessions.leave(&run.key).await?;
                Ok(())
            }
        }
    }

    async fn execute(&self, run: &mut Run, effect: Effect) -> Result<Option<DrawEvent>> {
        let user_id = run.user.id;
        match effect {
            Effect::AcquireLock => self.lock.acquire(user_id).await?,
            Effect::PointLockTo(link) => self.lock.point_to(user_id, &link).await?,
            Effect::ReleaseLock => {
                self.lock.release(user_id).await?;
            }
            Effect::HitCooldowns => {
                self.cooldowns.hit(user_id).await?;
                self.cooldowns.hit(run.caller.chat.0).await?;
            }
            Effect::ShowCategories => return self.show_categories(run).await.map(Some),
            Effect::ShowSubcategories(category) => {
                return self.show_subcategories(run, &category).await.map(Some);
            }
            Effect::DeductDraw => {
                self.engine.users().deduct_draw(user_id).await?;
                run.user.used_draws += 1;
            }
            Effect::RefundDraw => {
                self.engine.users().add_draw(user_id).await?;
                run.user.used_draws -= 1;
            }
            Effect::Reveal {
                category,
                subcategory,
            } => {
                let outcome = self
                    .engine
                    .draw_card(&run.user, &category, &subcategory, Allowance::Reserved)
                    .await?;
                return Ok(Some(DrawEvent::Drawn(outcome)));
            }
            Effect::Deliver(card) => self.deliver(run, &card).await?,
            Effect::DeleteMessage => self.delete_message(run).await,
            Effect::Tell(notice) => self.tell(run, notice).await,
        }
        Ok(None)
    }

    async fn show_categories(&self, run: &mut Run) -> Result<DrawEvent> {
        let mut categories = self.catalog.categories().await?;
        if let Some(lock) = self.catalog.group_draw_lock(run.caller.chat.0).await? {
            categories = lock.filter(categories);
        }

        let caption = render::greeting(&self.config.locale, &run.caller.first_name, &run.user);
        let keyboard = render::category_keyboard(&categories, run.user.id, &self.config.locale);
        let media = Media {
            kind: MediaKind::Animation,
            url: self.config.stage_one_image.clone(),
        };

        let sent = self
            .transport
            .send_animation(
                run.caller.target(),
                &media,
                &caption,
                keyboard,
                run.session.quoted_message.map(MessageId),
            )
            .await;

        match sent {
            Ok(sent) => {
                run.session.main_message = Some(sent.id.0);
                let link = render::message_link(sent.chat, sent.id, sent.thread);
                Ok(DrawEvent::CategoriesShown(Some(link)))
            }
            Err(e) => {
                warn!("Could not send draw menu in chat {}: {}", run.caller.chat.0, e);
                Ok(DrawEvent::CategoriesShown(None))
            }
        }
    }

    async fn show_subcategories(&self, run: &mut Run, category: &Category) -> Result<DrawEvent> {
        let subcategories = self
            .catalog
            .random_subcategories(category.id, category.subcategories_per_draw())
            .await?;

        let media = match category
            .draw_custom_image
            .as_deref()
            .and_then(|img| self.images.resolve(img, None))
        {
            Some(url) => Media::new(url),
            None => Media {
                kind: MediaKind::Animation,
                url: self.config.stage_two_image.clone(),
            },
        };
        let caption = render::subcategory_caption(&self.config.locale, &subcategories);
        let keyboard = render::subcategory_keyboard(&subcategories, run.user.id);

        let Some(message) = run.message() else {
            warn!("No draw message to edit for session {}", run.key);
            return Ok(DrawEvent::SubcategoriesShown(false));
        };

        match self
            .transport
            .edit_message_media(run.caller.chat, message, &media, &caption, keyboard)
            .await
        {
            Ok(()) => Ok(DrawEvent::SubcategoriesShown(true)),
            Err(e) => {
                warn!("Could not edit draw message: {}", e);
                Ok(DrawEvent::SubcategoriesShown(false))
            }
        }
    }

    async fn deliver(&self, run: &mut Run, card: &CardDetails) -> Result<()> {
        self.acknowledge(run).await;

        let Some(message) = run.message() else {
            warn!("No draw message to reveal card {} in", card.id());
            return Ok(());
        };
        let recipient = Recipient {
            user_id: run.user.id,
            first_name: run.caller.first_name.clone(),
            chat: run.caller.chat,
            message,
        };

        let report = self.delivery.deliver(&recipient, card).await?;
        info!(
            "User {} drew card {} ({:?})",
            run.user.id,
            card.id(),
            report
        );
        Ok(())
    }

    async fn delete_message(&self, run: &Run) {
        let (chat, message) = match &run.press {
            Some(press) => (run.caller.chat, press.message),
            None => (
                ChatId(run.key.chat),
                run.session.main_message.map(MessageId),
            ),
        };
        let Some(message) = message else {
            return;
        };
        if let Err(e) = self.transport.delete_message(chat, message).await {
            debug!("Could not delete draw message: {}", e);
        }
    }

    async fn tell(&self, run: &mut Run, notice: Notice) {
        let text = self.text(notice.key());
        if let Some(press) = &run.press
            && !run.answered
        {
            run.answered = true;
            self.answer(press, Some(&text)).await;
        } else {
            self.say(run.caller.target(), &text).await;
        }
    }

    /// Clear the button's loading state if nothing answered it yet.
    async fn acknowledge(&self, run: &mut Run) {
        if let Some(press) = &run.press
            && !run.answered
        {
            run.answered = true;
            self.answer(press, None).await;
        }
    }

    async fn answer(&self, press: &Press, alert: Option<&str>) {
        if let Err(e) = self
            .transport
            .answer_interaction(&press.query_id, alert, alert.is_some())
            .await
        {
            debug!("Could not answer callback query: {}", e);
        }
    }

    async fn say(&self, target: Target, text: &str) {
        if let Err(e) = self.transport.send_message(target, text).await {
            warn!("Could not send message to {}: {}", target.chat.0, e);
        }
    }
}
