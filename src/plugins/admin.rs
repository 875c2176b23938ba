//! Owner-only catalog commands.
//!
//! `/addcard` registers a card (or moves an existing one to another rarity)
//! and `/setapelido` adds an alias to a subcategory.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::NewCard;
use crate::i18n::get_text;
use crate::utils::{html_escape, split_args};

/// Parsed `/addcard <subcategory> <rarity> <image> <name...>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddCardArgs {
    pub subcategory_id: i32,
    pub rarity_id: i32,
    pub image: String,
    pub name: String,
}

pub fn parse_addcard(args: &str) -> Option<AddCardArgs> {
    let parts = split_args(args);
    let [sub, rarity, image, name @ ..] = parts.as_slice() else {
        return None;
    };
    if name.is_empty() {
        return None;
    }

    Some(AddCardArgs {
        subcategory_id: sub.parse().ok()?,
        rarity_id: rarity.parse().ok()?,
        image: image.to_string(),
        name: name.join(" "),
    })
}

/// Parsed `/setapelido <subcategory> <alias>`. Aliases are stored lowercase.
pub fn parse_setapelido(args: &str) -> Option<(i32, String)> {
    let parts = split_args(args);
    let [sub, alias, ..] = parts.as_slice() else {
        return None;
    };
    Some((sub.parse().ok()?, alias.to_lowercase()))
}

async fn reply(bot: &ThrottledBot, msg: &Message, text: String) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

fn is_owner(msg: &Message, state: &AppState) -> bool {
    msg.from.as_ref().is_some_and(|u| state.is_owner(u.id.0))
}

/// Handle /addcard.
pub async fn addcard_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let locale = state.locale.as_str();
    if !is_owner(&msg, &state) {
        return reply(&bot, &msg, get_text(locale, "admin.owner_only")).await;
    }

    let Some(args) = parse_addcard(&args) else {
        return reply(&bot, &msg, get_text(locale, "admin.addcard_usage")).await;
    };

    let Some(subcategory) = state.catalog.subcategory(args.subcategory_id).await? else {
        return reply(&bot, &msg, get_text(locale, "admin.subcategory_not_found")).await;
    };
    let Some(rarity) = state.catalog.rarity(args.rarity_id).await? else {
        return reply(&bot, &msg, get_text(locale, "admin.addcard_usage")).await;
    };

    let existed = state
        .catalog
        .card_by_name_and_subcategory_name(&args.name, &subcategory.name)
        .await?
        .is_some();

    let card = state
        .engine
        .create_card(NewCard {
            name: args.name,
            subcategory_id: subcategory.id,
            category_id: subcategory.category_id,
            rarity_id: rarity.id,
            image: args.image,
            rarity_modifier: 0.0,
        })
        .await?;

    info!("Card {} ({}) registered in subcategory {}", card.id, card.name, subcategory.id);

    let key = if existed {
        "admin.addcard_updated"
    } else {
        "admin.addcard_created"
    };
    let text = get_text(locale, key)
        .replace("{id}", &card.id.to_string())
        .replace("{name}", &html_escape(&card.name))
        .replace("{rarity}", &html_escape(&rarity.name));
    reply(&bot, &msg, text).await
}

/// Handle /setapelido.
pub async fn setapelido_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let locale = state.locale.as_str();
    if !is_owner(&msg, &state) {
        return reply(&bot, &msg, get_text(locale, "admin.owner_only")).await;
    }

    let Some((subcategory_id, alias)) = parse_setapelido(&args) else {
        return reply(&bot, &msg, get_text(locale, "admin.setapelido_usage")).await;
    };

    let Some(subcategory) = state
        .engine
        .add_subcategory_alias(subcategory_id, &alias)
        .await?
    else {
        return reply(&bot, &msg, get_text(locale, "admin.subcategory_not_found")).await;
    };

    let text = get_text(locale, "admin.setapelido_done")
        .replace("{alias}", &html_escape(&alias))
        .replace("{name}", &html_escape(&subcategory.name));
    reply(&bot, &msg, text).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addcard() {
        assert_eq!(
            parse_addcard("41 1 https://img.example/k.png Hatake Kakashi"),
            Some(AddCardArgs {
                subcategory_id: 41,
                rarity_id: 1,
                image: "https://img.example/k.png".to_string(),
                name: "Hatake Kakashi".to_string(),
            })
        );
        assert_eq!(parse_addcard("41 1 https://img.example/k.png"), None);
        assert_eq!(parse_addcard("naruto 1 img Kakashi"), None);
    }

    #[test]
    fn test_parse_setapelido() {
        assert_eq!(parse_setapelido("41 NARU"), Some((41, "naru".to_string())));
        assert_eq!(parse_setapelido("41"), None);
        assert_eq!(parse_setapelido("x naru"), None);
    }
}
