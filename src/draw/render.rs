//! Captions, keyboards and links for the draw flow.

use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ThreadId};
use url::Url;

use super::wizard::{CANCEL_DATA, SCENE};
use crate::database::{CardDetails, Category, DrawUser, Subcategory};
use crate::i18n::get_text;
use crate::session::SessionQuery;
use crate::utils::{html_escape, mention_html};

pub const NUMBER_EMOJIS: [&str; 10] = [
    "0️⃣", "1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣",
];

const BUTTONS_PER_ROW: usize = 2;

/// Label for the `n`th option, counting from 1.
pub fn number_emoji(n: usize) -> String {
    NUMBER_EMOJIS
        .get(n)
        .map(|e| e.to_string())
        .unwrap_or_else(|| n.to_string())
}

pub fn medal(rarity: &str) -> &'static str {
    match rarity {
        "Comum" => "🥉",
        "Raro" => "🥈",
        "Lendário" => "🥇",
        _ => "🏅",
    }
}

fn rows(buttons: Vec<InlineKeyboardButton>) -> Vec<Vec<InlineKeyboardButton>> {
    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| row.to_vec())
        .collect()
}

pub fn category_keyboard(categories: &[Category], owner: i64, locale: &str) -> InlineKeyboardMarkup {
    let buttons = categories
        .iter()
        .map(|c| {
            InlineKeyboardButton::callback(
                c.label(),
                SessionQuery::new(SCENE, owner, 0, c.id.to_string()).encode(),
            )
        })
        .collect();

    let mut keyboard = rows(buttons);
    keyboard.push(vec![InlineKeyboardButton::callback(
        get_text(locale, "draw.cancel_button"),
        SessionQuery::new(SCENE, owner, 0, CANCEL_DATA).encode(),
    )]);
    InlineKeyboardMarkup::new(keyboard)
}

pub fn subcategory_keyboard(subcategories: &[Subcategory], owner: i64) -> InlineKeyboardMarkup {
    let buttons = subcategories
        .iter()
        .enumerate()
        .map(|(i, s)| {
            InlineKeyboardButton::callback(
                number_emoji(i + 1),
                SessionQuery::new(SCENE, owner, 1, s.id.to_string()).encode(),
            )
        })
        .collect();
    InlineKeyboardMarkup::new(rows(buttons))
}

pub fn greeting(locale: &str, first_name: &str, user: &DrawUser) -> String {
    get_text(locale, "draw.greeting")
        .replace("{mention}", &mention_html(user.id, first_name))
        .replace("{remaining}", &user.remaining_draws().to_string())
        .replace("{max}", &user.maximum_draws.to_string())
}

pub fn subcategory_caption(locale: &str, subcategories: &[Subcategory]) -> String {
    let list = subcategories
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} — <b>{}</b>", number_emoji(i + 1), html_escape(&s.name)))
        .collect::<Vec<_>>()
        .join("\n");
    get_text(locale, "draw.choose_subcategory").replace("{list}", &list)
}

pub fn card_caption(locale: &str, card: &CardDetails, owner: &str, count: u64) -> String {
    let tag = card
        .card
        .tags
        .first()
        .map(|t| format!("\n🔖 {}", html_escape(t)))
        .unwrap_or_default();

    get_text(locale, "draw.card_caption")
        .replace("{medal}", medal(&card.rarity.name))
        .replace("{id}", &card.id().to_string())
        .replace("{name}", &html_escape(&card.card.name))
        .replace("{emoji}", &card.category.emoji)
        .replace("{subcategory}", &html_escape(&card.subcategory.name))
        .replace("{tag}", &tag)
        .replace("{owner}", &html_escape(owner))
        .replace("{count}", &count.max(1).to_string())
}

/// Link to a message. Supergroups get a t.me link, other chats a client link.
pub fn message_link(chat: ChatId, message: MessageId, thread: Option<ThreadId>) -> String {
    let raw = chat.0.to_string();
    match raw.strip_prefix("-100") {
        Some(internal) => match thread {
            Some(ThreadId(MessageId(t))) => {
                format!("https://t.me/c/{}/{}/{}", internal, t, message.0)
            }
            None => format!("https://t.me/c/{}/{}", internal, message.0),
        },
        None => format!("tg://openmessage?chat_id={}&message_id={}", chat.0, message.0),
    }
}

/// Deep link that opens a private chat with `/start <payload>`.
pub fn start_url(bot_username: &str, payload: &str) -> String {
    format!("https://t.me/{}?start={}", bot_username, payload)
}

/// The single "draw again" button under a revealed card.
pub fn draw_again_keyboard(bot_username: &str, card_id: i32) -> InlineKeyboardMarkup {
    let link = start_url(bot_username, &format!("draw-{}", card_id));
    match Url::parse(&link) {
        Ok(url) => InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url("🎲", url)]]),
        Err(_) => InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Card, Rarity};

    fn subs(n: i32) -> Vec<Subcategory> {
        (0..n)
            .map(|i| Subcategory {
                id: 40 + i,
                name: format!("Sub {}", i),
                category_id: 2,
                aliases: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_keyboards_use_two_columns() {
        let kb = subcategory_keyboard(&subs(5), 1);
        let widths: Vec<usize> = kb.inline_keyboard.iter().map(|r| r.len()).collect();
        assert_eq!(widths, vec![2, 2, 1]);
        assert_eq!(kb.inline_keyboard[0][0].text, "1️⃣");

        let categories = vec![
            Category {
                id: 2,
                name: "Anime".to_string(),
                emoji: "🎌".to_string(),
                draw_custom_image: None,
                subcategories_to_show: None,
            };
            3
        ];
        let kb = category_keyboard(&categories, 1, "pt");
        let widths: Vec<usize> = kb.inline_keyboard.iter().map(|r| r.len()).collect();
        // Cancel sits on its own row.
        assert_eq!(widths, vec![2, 1, 1]);
        assert_eq!(kb.inline_keyboard[2][0].text, "❌ Cancelar");
    }

    #[test]
    fn test_number_labels() {
        assert_eq!(number_emoji(1), "1️⃣");
        assert_eq!(number_emoji(12), "12");
    }

    #[test]
    fn test_card_caption() {
        let card = CardDetails {
            card: Card {
                id: 10,
                name: "Kakashi".to_string(),
                subcategory_id: 41,
                category_id: 2,
                rarity_id: 1,
                image: String::new(),
                rarity_modifier: 0.0,
                tags: vec!["Sensei".to_string()],
            },
            rarity: Rarity {
                id: 1,
                name: "Comum".to_string(),
                chance: 0.7,
            },
            category: Category {
                id: 2,
                name: "Anime".to_string(),
                emoji: "🎌".to_string(),
                draw_custom_image: None,
                subcategories_to_show: None,
            },
            subcategory: Subcategory {
                id: 41,
                name: "Naruto".to_string(),
                category_id: 2,
                aliases: Vec::new(),
            },
        };

        let caption = card_caption("pt", &card, "Ana", 0);
        assert!(caption.contains("🥉 <code>10</code>. <b>Kakashi</b>"));
        assert!(caption.contains("🎌 <i>Naruto</i>\n🔖 Sensei"));
        assert!(caption.ends_with("👾 Ana (1x)"));
    }

    #[test]
    fn test_links() {
        assert_eq!(
            message_link(ChatId(-1001234567890), MessageId(55), None),
            "https://t.me/c/1234567890/55"
        );
        assert_eq!(
            message_link(ChatId(-1001234567890), MessageId(55), Some(ThreadId(MessageId(3)))),
            "https://t.me/c/1234567890/3/55"
        );
        assert_eq!(
            message_link(ChatId(42), MessageId(7), None),
            "tg://openmessage?chat_id=42&message_id=7"
        );
        assert_eq!(start_url("girae_bot", "draw-10"), "https://t.me/girae_bot?start=draw-10");
    }
}
