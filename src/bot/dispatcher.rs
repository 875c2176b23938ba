//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command and callback handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::config::Config;
use crate::database::Catalog;
use crate::draw::{Delivery, DrawWizard};
use crate::engine::{CardEngine, UserLedger};
use crate::media::ImageResolver;
use crate::plugins;
use crate::store::CacheLayer;
use crate::transport::{TelegramTransport, Transport};

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database collaborator.
    pub catalog: Arc<dyn Catalog>,

    /// Card selection and draw allowances.
    pub engine: CardEngine,

    /// The `/draw` wizard.
    pub wizard: DrawWizard,

    /// Owner user IDs, allowed to edit the catalog.
    pub owner_ids: Vec<u64>,

    /// Bot username (without @) for deep link construction.
    pub bot_username: String,

    /// Locale of every reply.
    pub locale: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        bot: ThrottledBot,
        config: &Config,
        catalog: Arc<dyn Catalog>,
        cache: CacheLayer,
        bot_username: String,
    ) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot));
        let images = ImageResolver::new(config.cdn_base_url.as_deref());

        let users = UserLedger::new(catalog.clone(), config.default_maximum_draws);
        let engine = CardEngine::new(catalog.clone(), users);

        let delivery = Delivery::new(
            transport.clone(),
            catalog.clone(),
            images.clone(),
            config.delivery(),
            config.default_locale.clone(),
            bot_username.clone(),
        );
        let wizard = DrawWizard::new(
            catalog.clone(),
            engine.clone(),
            cache,
            transport,
            delivery,
            images,
            config.wizard(),
        );

        Self {
            catalog,
            engine,
            wizard,
            owner_ids: config.owner_ids.clone(),
            bot_username,
            locale: config.default_locale.clone(),
        }
    }

    /// Check if a user is a bot owner.
    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owner_ids.contains(&user_id)
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    let message_handler = Update::filter_message().branch(plugins::command_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(plugins::callback_handler())
}
