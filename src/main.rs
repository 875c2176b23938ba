//! girae - collectible-card draw bot for Telegram.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `store` - Shared key/value store (Redis or in-memory)
//! - `cache` - In-process reference data caches with Moka
//! - `database` - MongoDB collections behind the `Catalog` trait
//! - `engine` - Card selection, rerolls and draw allowances
//! - `session` - Wizard sessions and button payloads
//! - `draw` - The `/draw` wizard, lock and card delivery
//! - `transport` / `media` - Telegram calls and image URLs
//! - `bot` / `plugins` - Dispatcher, runners and command handlers

mod bot;
mod cache;
mod config;
mod database;
mod draw;
mod engine;
mod i18n;
mod media;
mod plugins;
mod session;
mod store;
mod transport;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::AppState;
use cache::CacheRegistry;
use config::Config;
use database::{Catalog, Database, MongoCatalog};
use store::{CacheLayer, KvStore, MemoryStore, RedisStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("girae=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting girae bot...");

    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    info!("Database connected");

    if config.no_caching {
        info!("NO_CACHING is on: cached entries last a few seconds");
    }

    let registry = CacheRegistry::new().no_caching(config.no_caching);
    let catalog: Arc<dyn Catalog> = Arc::new(MongoCatalog::new(&db, &registry));
    info!("Cache registry initialized with {} caches", registry.len());

    // Shared store for locks, cooldowns and sessions
    let store: Arc<dyn KvStore> = match &config.redis_url {
        Some(url) => {
            info!("Connecting to Redis...");
            Arc::new(RedisStore::connect(url).await?)
        }
        None => {
            info!("REDIS_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let cache = CacheLayer::new(store).no_caching(config.no_caching);

    // Throttle respects Telegram's per-chat and global rate limits
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    let bot_username = config
        .bot_username
        .clone()
        .unwrap_or_else(|| me.username().to_string());
    info!("Using bot username: @{}", bot_username);

    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (OWNER_IDS is empty)");
    } else {
        info!("Bot owners: {:?}", config.owner_ids);
    }

    let state = AppState::new(bot.clone(), &config, catalog, cache, bot_username);
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, dispatcher, bot).await
}
