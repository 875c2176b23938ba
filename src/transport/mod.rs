//! Outbound messaging.
//!
//! The draw flow only needs a handful of Telegram calls; they sit behind
//! [`Transport`] so the wizard and delivery can run against a fake.

#[cfg(test)]
pub mod fake;
mod telegram;

use async_trait::async_trait;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId, ThreadId};
use thiserror::Error;

pub use telegram::TelegramTransport;

use crate::media::Media;

/// Where to post: a chat and, in forum groups, a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub chat: ChatId,
    pub thread: Option<ThreadId>,
}

impl Target {
    pub fn new(chat: ChatId, thread: Option<ThreadId>) -> Self {
        Self { chat, thread }
    }

    /// A user's private chat.
    pub fn private(user_id: i64) -> Self {
        Self {
            chat: ChatId(user_id),
            thread: None,
        }
    }
}

/// A message the bot just posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub id: MessageId,
    pub thread: Option<ThreadId>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Telegram could not fetch or use the media URL.
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("telegram error: {0}")]
    Api(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_animation(
        &self,
        target: Target,
        media: &Media,
        caption: &str,
        keyboard: InlineKeyboardMarkup,
        reply_to: Option<MessageId>,
    ) -> Result<SentMessage, TransportError>;

    /// Replace a message's media, caption and keyboard.
    async fn edit_message_media(
        &self,
        chat: ChatId,
        message: MessageId,
        media: &Media,
        caption: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError>;

    /// Answer a button press, optionally with a toast or an alert.
    async fn answer_interaction(
        &self,
        query_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), TransportError>;

    async fn send_message(&self, target: Target, text: &str) -> Result<(), TransportError>;
}
