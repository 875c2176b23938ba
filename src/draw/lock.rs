//! Per-user draw lock and cooldown counters.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::session::SESSION_TTL;
use crate::store::CacheLayer;

const LOCK_NAMESPACE: &str = "is_drawing";
const COOLDOWN_NAMESPACE: &str = "draw_cooldowns";

/// Lifetime of a cooldown counter after its latest hit.
pub const COOLDOWN_WINDOW: Duration = Duration::from_secs(3);

/// A lock outlives its session by at most this long, so an abandoned draw
/// frees itself without `/cancel` touching it.
pub const LOCK_TTL: Duration = SESSION_TTL;

/// `is_drawing:<user>`: `true` while the first message is being sent,
/// then a link to it. Any truthy value means held.
#[derive(Clone)]
pub struct DrawLock {
    cache: CacheLayer,
}

impl DrawLock {
    pub fn new(cache: CacheLayer) -> Self {
        Self { cache }
    }

    /// Expiry is set separately so `NO_CACHING` cannot shorten it.
    pub async fn acquire(&self, user: i64) -> Result<()> {
        let key = user.to_string();
        self.cache.set(LOCK_NAMESPACE, &key, &true).await?;
        self.cache.expire(LOCK_NAMESPACE, &key, LOCK_TTL).await?;
        Ok(())
    }

    pub async fn point_to(&self, user: i64, link: &str) -> Result<()> {
        let key = user.to_string();
        self.cache.set(LOCK_NAMESPACE, &key, link).await?;
        self.cache.expire(LOCK_NAMESPACE, &key, LOCK_TTL).await?;
        Ok(())
    }

    pub async fn is_held(&self, user: i64) -> Result<bool> {
        let value: Option<Value> = self.cache.get(LOCK_NAMESPACE, &user.to_string()).await?;
        Ok(value.as_ref().is_some_and(is_truthy))
    }

    /// Link to the in-flight draw, once one was rendered.
    pub async fn link(&self, user: i64) -> Result<Option<String>> {
        let value: Option<Value> = self.cache.get(LOCK_NAMESPACE, &user.to_string()).await?;
        Ok(match value {
            Some(Value::String(link)) if !link.is_empty() => Some(link),
            _ => None,
        })
    }

    pub async fn release(&self, user: i64) -> Result<bool> {
        self.cache.delete(LOCK_NAMESPACE, &user.to_string()).await
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `draw_cooldowns:<id>` counters for users and chats.
///
/// Each hit pushes the counter's expiry [`COOLDOWN_WINDOW`] ahead, so the
/// value is the number of draws started within the last few seconds.
#[derive(Clone)]
pub struct Cooldowns {
    cache: CacheLayer,
}

impl Cooldowns {
    pub fn new(cache: CacheLayer) -> Self {
        Self { cache }
    }

    pub async fn hit(&self, id: i64) -> Result<i64> {
        let key = id.to_string();
        let count = self.cache.increment(COOLDOWN_NAMESPACE, &key).await?;
        self.cache.expire(COOLDOWN_NAMESPACE, &key, COOLDOWN_WINDOW).await?;
        debug!("Cooldown counter for {} is {}", id, count);
        Ok(count)
    }

    #[allow(dead_code)]
    pub async fn count(&self, id: i64) -> Result<i64> {
        Ok(self
            .cache
            .get::<i64>(COOLDOWN_NAMESPACE, &id.to_string())
            .await?
            .unwrap_or(0))
    }
}
