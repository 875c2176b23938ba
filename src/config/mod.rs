//! Configuration module for the girae bot.
//!
//! Loads configuration from environment variables.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::draw::delivery::{DeliveryConfig, MISSING_CARD_IMAGE};
use crate::draw::wizard::{WizardConfig, STAGE_ONE_DRAW_GIF, STAGE_TWO_DRAW_GIF};

/// Bot running mode
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Bot username (without @) for "draw again" deep links.
    /// Optional - will be fetched via getMe if not set.
    pub bot_username: Option<String>,

    /// Owner user IDs (comma-separated)
    /// These users may run the catalog admin commands.
    pub owner_ids: Vec<u64>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Redis connection string. Without it the shared store is in-process.
    pub redis_url: Option<String>,

    /// Force every expiring cache write down to a few seconds.
    pub no_caching: bool,

    /// Base URL that relative card image keys are joined onto.
    pub cdn_base_url: Option<String>,

    pub default_locale: String,
    pub default_maximum_draws: i32,

    // Draw flow media
    pub stage_one_draw_gif: String,
    pub stage_two_draw_gif: String,
    pub missing_card_image: String,

    /// Copy count that earns a congratulation DM.
    pub custom_photo_milestone: u64,
    pub delivery_retry: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = env::var("BOT_MODE")
            .unwrap_or_else(|_| "polling".to_string())
            .to_lowercase();

        let bot_mode = match bot_mode.as_str() {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = optional("WEBHOOK_URL");

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        // Parse owner IDs
        let owner_ids = parse_owner_ids(&env::var("OWNER_IDS").unwrap_or_default());

        // Parse bot username (strip @ if present)
        let bot_username = optional("BOT_USERNAME")
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());

        let default_locale = optional("DEFAULT_LOCALE")
            .filter(|l| crate::i18n::is_supported(l))
            .unwrap_or_else(|| crate::i18n::DEFAULT_LOCALE.to_string());

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port: parsed("WEBHOOK_PORT", 8080),
            webhook_secret: optional("WEBHOOK_SECRET"),
            bot_username,
            owner_ids,
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "girae".to_string()),
            redis_url: optional("REDIS_URL"),
            no_caching: parse_flag(&env::var("NO_CACHING").unwrap_or_default()),
            cdn_base_url: optional("CDN_BASE_URL"),
            default_locale,
            default_maximum_draws: parsed("DEFAULT_MAXIMUM_DRAWS", 12),
            stage_one_draw_gif: optional("STAGE_ONE_DRAW_GIF")
                .unwrap_or_else(|| STAGE_ONE_DRAW_GIF.to_string()),
            stage_two_draw_gif: optional("STAGE_TWO_DRAW_GIF")
                .unwrap_or_else(|| STAGE_TWO_DRAW_GIF.to_string()),
            missing_card_image: optional("MISSING_CARD_IMAGE")
                .unwrap_or_else(|| MISSING_CARD_IMAGE.to_string()),
            custom_photo_milestone: parsed("CUSTOM_PHOTO_MILESTONE", 50),
            delivery_retry: Duration::from_secs(parsed("DELIVERY_RETRY_SECS", 5)),
        }
    }

    pub fn wizard(&self) -> WizardConfig {
        WizardConfig {
            locale: self.default_locale.clone(),
            stage_one_image: self.stage_one_draw_gif.clone(),
            stage_two_image: self.stage_two_draw_gif.clone(),
        }
    }

    pub fn delivery(&self) -> DeliveryConfig {
        DeliveryConfig {
            retry_delay: self.delivery_retry,
            milestone: self.custom_photo_milestone,
            missing_image: self.missing_card_image.clone(),
            ..DeliveryConfig::default()
        }
    }
}

/// Unset and blank variables are both `None`.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> T {
    optional(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_owner_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_ids() {
        assert_eq!(parse_owner_ids("1, 2,abc,,3"), vec![1, 2, 3]);
        assert!(parse_owner_ids("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
