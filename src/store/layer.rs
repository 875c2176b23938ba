//! Namespaced JSON layer over a [`KvStore`].
//!
//! Keys are `<namespace>:<key>`. Values are serialized as JSON on write;
//! absent or malformed values read back as `None` instead of failing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::KvStore;

/// Expiry forced on every expiring write when caching is disabled.
pub const NO_CACHING_TTL: Duration = Duration::from_secs(5);

/// Namespaced cache used for locks, counters and sessions.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn KvStore>,
    no_caching: bool,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            no_caching: false,
        }
    }

    /// Force every `set_with_expiry` to [`NO_CACHING_TTL`]. Plain `set` is unaffected.
    #[must_use]
    pub fn no_caching(mut self, enabled: bool) -> Self {
        self.no_caching = enabled;
        self
    }

    fn key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }

    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Result<Option<T>> {
        let full = Self::key(namespace, key);
        let Some(raw) = self.store.get(&full).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("Ignoring malformed cache value at {}: {}", full, e);
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, namespace: &str, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&Self::key(namespace, key), raw, None).await?;
        Ok(())
    }

    #[allow(dead_code)]
    pub async fn set_with_expiry<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let ttl = if self.no_caching { NO_CACHING_TTL } else { ttl };
        let raw = serde_json::to_string(value)?;
        self.store.set(&Self::key(namespace, key), raw, Some(ttl)).await?;
        Ok(())
    }

    pub async fn delete(&self, namespace: &str, key: &str) -> Result<bool> {
        Ok(self.store.delete(&Self::key(namespace, key)).await?)
    }

    #[allow(dead_code)]
    pub async fn has(&self, namespace: &str, key: &str) -> Result<bool> {
        Ok(self.store.exists(&Self::key(namespace, key)).await?)
    }

    /// Keys in `namespace` matching `pattern`, with the namespace prefix stripped.
    pub async fn keys(&self, namespace: &str, pattern: &str) -> Result<Vec<String>> {
        let prefix = format!("{}:", namespace);
        let keys = self.store.keys(&Self::key(namespace, pattern)).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }

    pub async fn increment(&self, namespace: &str, key: &str) -> Result<i64> {
        Ok(self.store.incr_by(&Self::key(namespace, key), 1).await?)
    }

    #[allow(dead_code)]
    pub async fn decrement(&self, namespace: &str, key: &str) -> Result<i64> {
        Ok(self.store.incr_by(&Self::key(namespace, key), -1).await?)
    }

    /// Put an expiry on an existing key.
    pub async fn expire(&self, namespace: &str, key: &str, ttl: Duration) -> Result<bool> {
        Ok(self.store.expire(&Self::key(namespace, key), ttl).await?)
    }

    /// Clear the whole store. Operational and test use only.
    #[allow(dead_code)]
    pub async fn flush_all(&self) -> Result<()> {
        self.store.flush_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn layer() -> CacheLayer {
        CacheLayer::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_json_roundtrip_and_malformed() {
        let cache = layer();
        cache.set("ns", "a", &vec![1, 2, 3]).await.unwrap();
        let v: Option<Vec<i32>> = cache.get("ns", "a").await.unwrap();
        assert_eq!(v, Some(vec![1, 2, 3]));

        // A string where a number is expected reads as absent.
        cache.set("ns", "b", "text").await.unwrap();
        let n: Option<i64> = cache.get("ns", "b").await.unwrap();
        assert_eq!(n, None);

        let missing: Option<bool> = cache.get("ns", "missing").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_keys_strip_namespace() {
        let cache = layer();
        cache.set("session:draw", "1:2", &true).await.unwrap();
        cache.set("session:draw", "1:3:9", &true).await.unwrap();
        cache.set("session:draw", "10:2", &true).await.unwrap();

        let keys = cache.keys("session:draw", "1:*").await.unwrap();
        assert_eq!(keys, vec!["1:2".to_string(), "1:3:9".to_string()]);
    }

    #[tokio::test]
    async fn test_counters_and_flush() {
        let cache = layer();
        assert_eq!(cache.increment("draw_cooldowns", "7").await.unwrap(), 1);
        assert_eq!(cache.increment("draw_cooldowns", "7").await.unwrap(), 2);
        assert_eq!(cache.decrement("draw_cooldowns", "7").await.unwrap(), 1);
        assert_eq!(cache.get::<i64>("draw_cooldowns", "7").await.unwrap(), Some(1));

        cache.flush_all().await.unwrap();
        assert!(!cache.has("draw_cooldowns", "7").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_caching_only_shortens_expiring_writes() {
        let cache = layer().no_caching(true);
        cache
            .set_with_expiry("cards", "x", &1, Duration::from_secs(1800))
            .await
            .unwrap();
        cache.set("cards", "y", &2).await.unwrap();

        tokio::time::advance(NO_CACHING_TTL + Duration::from_secs(1)).await;
        assert!(!cache.has("cards", "x").await.unwrap());
        assert!(cache.has("cards", "y").await.unwrap());
    }
}
