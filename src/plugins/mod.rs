//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()`

pub mod admin;
pub mod cancel;
pub mod draw;
pub mod help;
pub mod start;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::ThrottledBot;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Comandos disponíveis:")]
pub enum Command {
    #[command(description = "Iniciar o bot")]
    Start(String),

    #[command(description = "Ajuda")]
    Help,

    // Draw commands
    #[command(description = "Girar e ganhar um card")]
    Draw,

    #[command(description = "Girar e ganhar um card")]
    Girar,

    #[command(description = "Ver giros restantes")]
    Draws,

    #[command(description = "Ver giros restantes")]
    Giros,

    #[command(description = "Cancelar o giro em andamento")]
    Cancel,

    #[command(description = "Cancelar o giro em andamento")]
    Cancelar,

    // Owner commands
    #[command(hide)]
    Addcard(String),

    #[command(hide)]
    Setapelido(String),
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(args)].endpoint(start::start_handler))
        .branch(case![Command::Help].endpoint(help::help_handler))
        // Draw
        .branch(case![Command::Draw].endpoint(draw::draw_command))
        .branch(case![Command::Girar].endpoint(draw::draw_command))
        .branch(case![Command::Draws].endpoint(draw::draws_command))
        .branch(case![Command::Giros].endpoint(draw::draws_command))
        .branch(case![Command::Cancel].endpoint(cancel::cancel_command))
        .branch(case![Command::Cancelar].endpoint(cancel::cancel_command))
        // Owner
        .branch(case![Command::Addcard(args)].endpoint(admin::addcard_command))
        .branch(case![Command::Setapelido(args)].endpoint(admin::setapelido_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query()
        .branch(dptree::filter(|q: CallbackQuery| draw::is_draw_callback(&q)).endpoint(draw::draw_callback))
        .branch(dptree::endpoint(ignore_callback))
}

/// Clear the loading state of buttons nobody handles.
async fn ignore_callback(bot: ThrottledBot, q: CallbackQuery) -> anyhow::Result<()> {
    bot.answer_callback_query(q.id).await?;
    Ok(())
}
