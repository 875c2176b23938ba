//! Shared key/value store.
//!
//! Everything that coordinates across updates (draw locks, cooldown
//! counters, wizard sessions) goes through a [`KvStore`]. Production uses
//! Redis; the in-memory store serves tests and single-process deployments
//! without `REDIS_URL`.

mod layer;
mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use layer::{CacheLayer, NO_CACHING_TTL};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Errors raised by a key/value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("value at '{0}' is not an integer")]
    NotAnInteger(String),
}

/// Raw string key/value operations with optional expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value`, replacing any previous value and expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Returns `true` if a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Keys matching a glob pattern (`*` and `?`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Atomically add `delta` to an integer counter, creating it at 0.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    /// Set an expiry on an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    async fn flush_all(&self) -> Result<(), StoreError>;
}
