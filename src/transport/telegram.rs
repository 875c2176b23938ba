//! [`Transport`] over the throttled teloxide bot.

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardMarkup, InputFile, InputMedia, InputMediaAnimation, InputMediaPhoto,
    InputMediaVideo, MessageId, ParseMode, ReplyParameters,
};
use url::Url;

use super::{SentMessage, Target, Transport, TransportError};
use crate::bot::dispatcher::ThrottledBot;
use crate::media::{Media, MediaKind};

/// Error texts Telegram uses when it cannot use a media URL.
const MEDIA_ERROR_MARKERS: &[&str] = &[
    "file identifier",
    "wrong file",
    "failed to get http url content",
    "wrong type of the web page content",
];

impl From<RequestError> for TransportError {
    fn from(e: RequestError) -> Self {
        let text = e.to_string();
        let lower = text.to_lowercase();
        if MEDIA_ERROR_MARKERS.iter().any(|m| lower.contains(m)) {
            TransportError::InvalidMedia(text)
        } else {
            TransportError::Api(text)
        }
    }
}

fn input_file(url: &str) -> Result<InputFile, TransportError> {
    Url::parse(url)
        .map(InputFile::url)
        .map_err(|e| TransportError::InvalidMedia(format!("{}: {}", url, e)))
}

fn input_media(media: &Media, caption: &str) -> Result<InputMedia, TransportError> {
    let file = input_file(&media.url)?;
    Ok(match media.kind {
        MediaKind::Photo => InputMedia::Photo(
            InputMediaPhoto::new(file)
                .caption(caption)
                .parse_mode(ParseMode::Html),
        ),
        MediaKind::Animation => InputMedia::Animation(
            InputMediaAnimation::new(file)
                .caption(caption)
                .parse_mode(ParseMode::Html),
        ),
        MediaKind::Video => InputMedia::Video(
            InputMediaVideo::new(file)
                .caption(caption)
                .parse_mode(ParseMode::Html),
        ),
    })
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: ThrottledBot,
}

impl TelegramTransport {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_animation(
        &self,
        target: Target,
        media: &Media,
        caption: &str,
        keyboard: InlineKeyboardMarkup,
        reply_to: Option<MessageId>,
    ) -> Result<SentMessage, TransportError> {
        let mut req = self
            .bot
            .send_animation(target.chat, input_file(&media.url)?)
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard);
        if let Some(thread) = target.thread {
            req = req.message_thread_id(thread);
        }
        if let Some(reply_to) = reply_to {
            req = req.reply_parameters(ReplyParameters::new(reply_to));
        }

        let msg = req.await?;
        Ok(SentMessage {
            chat: msg.chat.id,
            id: msg.id,
            thread: msg.thread_id,
        })
    }

    async fn edit_message_media(
        &self,
        chat: ChatId,
        message: MessageId,
        media: &Media,
        caption: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), TransportError> {
        self.bot
            .edit_message_media(chat, message, input_media(media, caption)?)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        self.bot.delete_message(chat, message).await?;
        Ok(())
    }

    async fn answer_interaction(
        &self,
        query_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), TransportError> {
        let mut req = self.bot.answer_callback_query(query_id);
        if let Some(text) = text {
            req = req.text(text).show_alert(alert);
        }
        req.await?;
        Ok(())
    }

    async fn send_message(&self, target: Target, text: &str) -> Result<(), TransportError> {
        let mut req = self
            .bot
            .send_message(target.chat, text)
            .parse_mode(ParseMode::Html);
        if let Some(thread) = target.thread {
            req = req.message_thread_id(thread);
        }
        req.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_url_is_invalid_media() {
        let err = input_file("not a url").unwrap_err();
        assert!(matches!(err, TransportError::InvalidMedia(_)));
    }

    #[test]
    fn test_media_framing() {
        let gif = input_media(&Media::new("https://cdn.example/a.gif"), "c").unwrap();
        assert!(matches!(gif, InputMedia::Animation(_)));
        let video = input_media(&Media::new("https://cdn.example/a.mp4"), "c").unwrap();
        assert!(matches!(video, InputMedia::Video(_)));
        let photo = input_media(&Media::new("https://cdn.example/a.png"), "c").unwrap();
        assert!(matches!(photo, InputMedia::Photo(_)));
    }
}
