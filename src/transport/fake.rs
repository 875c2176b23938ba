//! Recording [`Transport`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use teloxide::types::{
    ChatId, InlineKeyboardButtonKind, InlineKeyboardMarkup, MessageId,
};

use super::{SentMessage, Target, Transport, TransportError};
use crate::media::{Media, MediaKind};

/// `(label, callback data or url)` per button, row-major.
pub type Buttons = Vec<Vec<(String, String)>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendAnimation {
        chat: i64,
        url: String,
        caption: String,
        buttons: Buttons,
        reply_to: Option<i32>,
    },
    EditMedia {
        chat: i64,
        message: i32,
        kind: MediaKind,
        url: String,
        caption: String,
        buttons: Buttons,
    },
    Delete {
        chat: i64,
        message: i32,
    },
    Answer {
        text: Option<String>,
        alert: bool,
    },
    Send {
        chat: i64,
        text: String,
    },
}

fn buttons(keyboard: &InlineKeyboardMarkup) -> Buttons {
    keyboard
        .inline_keyboard
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| {
                    let target = match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        InlineKeyboardButtonKind::Url(url) => url.to_string(),
                        other => format!("{:?}", other),
                    };
                    (b.text.clone(), target)
                })
                .collect()
        })
        .collect()
}

pub struct FakeTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI32,
    fail_sends: AtomicBool,
    edit_results: Mutex<VecDeque<Result<(), TransportError>>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            fail_sends: AtomicBool::new(false),
            edit_results: Mutex::new(VecDeque::new()),
        }
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `send_animation` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Results for upcoming edits, in order. Edits succeed once the queue is empty.
    pub fn queue_edits(&self, results: impl IntoIterator<Item = Result<(), TransportError>>) {
        self.edit_results.lock().extend(results);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn animations(&self) -> Vec<Call> {
        self.filtered(|c| matches!(c, Call::SendAnimation { .. }))
    }

    pub fn edits(&self) -> Vec<Call> {
        self.filtered(|c| matches!(c, Call::EditMedia { .. }))
    }

    pub fn answers(&self) -> Vec<(Option<String>, bool)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Answer { text, alert } => Some((text.clone(), *alert)),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Send { chat, text } => Some((*chat, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<(i64, i32)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Delete { chat, message } => Some((*chat, *message)),
                _ => None,
            })
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls.lock().iter().filter(|c| keep(c)).cloned().collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send_animation(
        &self,
        target: Target,
        media: &Media,
        caption: &str,
        keyboard: InlineKeyboardMarkup,
        reply_to: Option<MessageId>,
    ) -> Result<SentMessage, TransportError> {
        self.record(Call::SendAnimation {
            chat: target.chat.0,
            url: media.url.clone(),
            caption: caption.to_string(),
            buttons: buttons(&keyboard),
            reply_to: reply_to.map(|m| m.0),
        });
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Api("Forbidden: bot was blocked".to_string()));
        }

        Ok(SentMessage {
            chat: target.chat,
            id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            thread: target.thread,
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
        self.record(Call::EditMedia {
            chat: chat.0,
            message: message.0,
            kind: media.kind,
            url: media.url.clone(),
            caption: caption.to_string(),
            buttons: buttons(&keyboard),
        });
        self.edit_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), TransportError> {
        self.record(Call::Delete {
            chat: chat.0,
            message: message.0,
        });
        Ok(())
    }

    async fn answer_interaction(
        &self,
        _query_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), TransportError> {
        self.record(Call::Answer {
            text: text.map(str::to_string),
            alert,
        });
        Ok(())
    }

    async fn send_message(&self, target: Target, text: &str) -> Result<(), TransportError> {
        self.record(Call::Send {
            chat: target.chat.0,
            text: text.to_string(),
        });
        Ok(())
    }
}
