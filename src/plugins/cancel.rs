//! /cancel plugin.

use teloxide::prelude::*;
use tracing::debug;

use super::draw::caller_from_message;
use crate::bot::dispatcher::{AppState, ThrottledBot};

/// Handle /cancel (and /cancelar).
///
/// Silent when nothing was running; the wizard posts the notice otherwise.
pub async fn cancel_command(
    _bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(caller) = caller_from_message(&msg) else {
        return Ok(());
    };

    if !state.wizard.cancel(&caller).await? {
        debug!("Nothing to cancel for {}", caller.user_id);
    }
    Ok(())
}
