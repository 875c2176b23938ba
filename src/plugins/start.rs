//! /start command plugin.
//!
//! Sends the welcome message, or starts a draw for `draw` deep links.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};

use super::draw;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::i18n::get_text;
use crate::utils::html_escape;

/// Deep link payloads that start a draw, e.g. `draw-10` from a card's button.
pub fn is_draw_payload(args: &str) -> bool {
    args.trim().starts_with("draw")
}

/// Handle the /start command.
pub async fn start_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if is_draw_payload(&args) {
        return draw::draw_command(bot, msg, state).await;
    }

    let name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or_default();
    let text = get_text(&state.locale, "start.welcome").replace("{name}", &html_escape(name));

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}
