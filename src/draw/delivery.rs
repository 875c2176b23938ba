//! Revealing a drawn card.
//!
//! The wizard's message is edited into the card art. A media URL Telegram
//! cannot use is swapped for a placeholder once; other failures are retried
//! after a pause.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use teloxide::types::{ChatId, MessageId};
use tracing::{debug, error, warn};

use super::render;
use crate::database::{CardDetails, Catalog};
use crate::i18n::get_text;
use crate::media::{ImageResolver, Media, CARD_TRANSFORM};
use crate::transport::{Target, Transport, TransportError};

/// Placeholder shown when a card's own image cannot be sent.
pub const MISSING_CARD_IMAGE: &str =
    "https://placehold.co/400x624.png?text=Use+/setimage+id+para+trocar%20esta%20imagem.";

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Pause before retrying a failed edit.
    pub retry_delay: Duration,
    /// Cap on retries for failures other than bad media. `None` retries forever.
    pub max_transient_retries: Option<u32>,
    /// Copy count that earns a congratulation DM.
    pub milestone: u64,
    pub missing_image: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(5),
            max_transient_retries: None,
            milestone: 50,
            missing_image: MISSING_CARD_IMAGE.to_string(),
        }
    }
}

/// Who gets the card and which message to edit.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub user_id: i64,
    pub first_name: String,
    pub chat: ChatId,
    pub message: MessageId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryReport {
    Delivered,
    /// Shown with the placeholder image.
    Placeholder,
    GaveUp,
}

#[derive(Clone)]
pub struct Delivery {
    transport: Arc<dyn Transport>,
    catalog: Arc<dyn Catalog>,
    images: ImageResolver,
    config: DeliveryConfig,
    locale: String,
    bot_username: String,
}

impl Delivery {
    pub fn new(
        transport: Arc<dyn Transport>,
        catalog: Arc<dyn Catalog>,
        images: ImageResolver,
        config: DeliveryConfig,
        locale: String,
        bot_username: String,
    ) -> Self {
        Self {
            transport,
            catalog,
            images,
            config,
            locale,
            bot_username,
        }
    }

    pub async fn deliver(&self, to: &Recipient, card: &CardDetails) -> Result<DeliveryReport> {
        let copies = self
            .catalog
            .count_user_cards(to.user_id, card.id())
            .await?;
        let caption = render::card_caption(&self.locale, card, &to.first_name, copies);
        let keyboard = render::draw_again_keyboard(&self.bot_username, card.id());

        let url = self
            .images
            .resolve(&card.card.image, Some(CARD_TRANSFORM))
            .unwrap_or_else(|| self.config.missing_image.clone());
        let mut media = Media::new(url);
        let mut last_attempt = false;
        let mut transient_failures = 0u32;

        loop {
            let result = self
                .transport
                .edit_message_media(to.chat, to.message, &media, &caption, keyboard.clone())
                .await;

            match result {
                Ok(()) => {
                    if copies == self.config.milestone {
                        self.congratulate(to, card, copies).await;
                    }
                    return Ok(if last_attempt {
                        DeliveryReport::Placeholder
                    } else {
                        DeliveryReport::Delivered
                    });
                }
                Err(e) if last_attempt => {
                    warn!("Placeholder for card {} also failed: {}", card.id(), e);
                    return Ok(DeliveryReport::GaveUp);
                }
                Err(TransportError::InvalidMedia(e)) => {
                    error!(
                        "Could not send card {} (url {}): {}. Retrying with placeholder",
                        card.id(),
                        media.url,
                        e
                    );
                    media = Media::new(self.config.missing_image.clone());
                    last_attempt = true;
                }
                Err(e) => {
                    transient_failures += 1;
                    if let Some(max) = self.config.max_transient_retries
                        && transient_failures > max
                    {
                        warn!(
                            "Giving up on card {} for user {} after {} failures: {}",
                            card.id(),
                            to.user_id,
                            transient_failures,
                            e
                        );
                        return Ok(DeliveryReport::GaveUp);
                    }
                    warn!(
                        "Could not send card {}: {}. Retrying in {:?}",
                        card.id(),
                        e,
                        self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    async fn congratulate(&self, to: &Recipient, card: &CardDetails, copies: u64) {
        let text = get_text(&self.locale, "draw.milestone")
            .replace("{count}", &copies.to_string())
            .replace("{name}", &crate::utils::html_escape(&card.card.name));
        match self
            .transport
            .send_message(Target::private(to.user_id), &text)
            .await
        {
            Ok(()) => debug!("User {} reached {} copies of card {}", to.user_id, copies, card.id()),
            Err(e) => warn!("Could not send milestone DM to {}: {}", to.user_id, e),
        }
    }
}
