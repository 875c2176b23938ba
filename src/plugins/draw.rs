//! /draw, /draws and the draw wizard's buttons.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::debug;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::draw::wizard::SCENE;
use crate::draw::{Caller, Press};
use crate::i18n::get_text;
use crate::session::SessionQuery;

/// The sender of a command, or `None` for channel posts.
pub fn caller_from_message(msg: &Message) -> Option<Caller> {
    let user = msg.from.as_ref()?;
    Some(Caller {
        user_id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        chat: msg.chat.id,
        thread: msg.thread_id.filter(|_| msg.is_topic_message),
    })
}

/// Handle /draw (and /girar).
pub async fn draw_command(
    _bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(caller) = caller_from_message(&msg) else {
        return Ok(());
    };

    let phase = state.wizard.start(&caller, Some(msg.id)).await?;
    debug!("Draw for {} ended its update at {:?}", caller.user_id, phase);
    Ok(())
}

/// Handle /draws - show the remaining allowance.
pub async fn draws_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(caller) = caller_from_message(&msg) else {
        return Ok(());
    };

    let user = state.engine.users().ensure(caller.user_id).await?;
    let text = get_text(&state.locale, "draws.remaining")
        .replace("{remaining}", &user.remaining_draws().to_string())
        .replace("{max}", &user.maximum_draws.to_string());

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Whether a callback belongs to the draw wizard.
pub fn is_draw_callback(q: &CallbackQuery) -> bool {
    q.data
        .as_deref()
        .is_some_and(|d| SessionQuery::is_for(d, SCENE))
}

/// Handle a press on a draw wizard button.
pub async fn draw_callback(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    let (Some(data), Some(message)) = (q.data.clone(), q.message.as_ref()) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let thread = message
        .regular_message()
        .and_then(|m| m.thread_id.filter(|_| m.is_topic_message));
    let caller = Caller {
        user_id: q.from.id.0 as i64,
        first_name: q.from.first_name.clone(),
        chat: message.chat().id,
        thread,
    };
    let press = Press {
        query_id: q.id.clone(),
        message: Some(message.id()),
        data,
    };

    state.wizard.press(&caller, press).await?;
    Ok(())
}
