//! Wizard sessions and button payloads.
//!
//! A session is keyed by `{user}:{chat}[:{thread}]` and lives in the shared
//! cache so that any worker can pick up the next button press.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::store::CacheLayer;

/// How long an untouched session survives.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Prefix of every button payload owned by a scene.
const QUERY_PREFIX: &str = "es";

/// Telegram rejects callback data longer than this.
pub const MAX_CALLBACK_DATA: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user: i64,
    pub chat: i64,
    pub thread: Option<i32>,
}

impl SessionKey {
    pub fn new(user: i64, chat: i64, thread: Option<i32>) -> Self {
        Self { user, chat, thread }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.chat)?;
        if let Some(thread) = self.thread {
            write!(f, ":{}", thread)?;
        }
        Ok(())
    }
}

impl FromStr for SessionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let bad = || format!("invalid session key '{}'", s);

        let user = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let chat = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        let thread = match parts.next() {
            Some(p) => Some(p.parse().map_err(|_| bad())?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(bad());
        }

        Ok(Self { user, chat, thread })
    }
}

/// Persisted state of one wizard run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session<T> {
    pub step: u8,
    pub data: T,

    /// The message the wizard edits in place.
    #[serde(default)]
    pub main_message: Option<i32>,

    /// The message that triggered the wizard.
    #[serde(default)]
    pub quoted_message: Option<i32>,
}

/// Session storage for one scene.
#[derive(Clone)]
pub struct SessionStore {
    cache: CacheLayer,
    namespace: String,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: CacheLayer, scene: &str) -> Self {
        Self {
            cache,
            namespace: format!("sessions:{}", scene),
            ttl: SESSION_TTL,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &SessionKey) -> Result<Option<Session<T>>> {
        self.cache.get(&self.namespace, &key.to_string()).await
    }

    /// Write the session and restart its lifetime.
    ///
    /// Uses a separate expire so the `NO_CACHING` override does not cut
    /// sessions short.
    pub async fn save<T: Serialize>(&self, key: &SessionKey, session: &Session<T>) -> Result<()> {
        let key = key.to_string();
        self.cache.set(&self.namespace, &key, session).await?;
        self.cache.expire(&self.namespace, &key, self.ttl).await?;
        Ok(())
    }

    /// Drop the session. Returns `true` if one existed.
    pub async fn leave(&self, key: &SessionKey) -> Result<bool> {
        self.cache.delete(&self.namespace, &key.to_string()).await
    }

    /// Every session key held by `user`, across chats and threads.
    pub async fn find_for_user(&self, user: i64) -> Result<Vec<SessionKey>> {
        let keys = self
            .cache
            .keys(&self.namespace, &format!("{}:*", user))
            .await?;
        Ok(keys.iter().filter_map(|k| k.parse().ok()).collect())
    }
}

/// Decoded button payload: `es:<scene>:<owner>:<step>:<data>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub scene: String,
    pub owner: i64,
    pub step: u8,
    pub data: String,
}

impl SessionQuery {
    pub fn new(scene: &str, owner: i64, step: u8, data: impl Into<String>) -> Self {
        Self {
            scene: scene.to_string(),
            owner,
            step,
            data: data.into(),
        }
    }

    pub fn encode(&self) -> String {
        let encoded = format!(
            "{}:{}:{}:{}:{}",
            QUERY_PREFIX, self.scene, self.owner, self.step, self.data
        );
        debug_assert!(
            encoded.len() <= MAX_CALLBACK_DATA,
            "callback data too long: {}",
            encoded
        );
        encoded
    }

    /// Parse callback data. `data` may itself contain `:`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(5, ':');
        if parts.next()? != QUERY_PREFIX {
            return None;
        }
        let scene = parts.next()?.to_string();
        let owner = parts.next()?.parse().ok()?;
        let step = parts.next()?.parse().ok()?;
        let data = parts.next()?.to_string();

        Some(Self {
            scene,
            owner,
            step,
            data,
        })
    }

    /// Whether `raw` is a payload for `scene`.
    pub fn is_for(raw: &str, scene: &str) -> bool {
        Self::parse(raw).is_some_and(|q| q.scene == scene)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_key_format() {
        let key = SessionKey::new(42, -1001234, None);
        assert_eq!(key.to_string(), "42:-1001234");
        assert_eq!("42:-1001234".parse::<SessionKey>(), Ok(key));

        let threaded = SessionKey::new(42, -1001234, Some(7));
        assert_eq!(threaded.to_string(), "42:-1001234:7");
        assert_eq!("42:-1001234:7".parse::<SessionKey>(), Ok(threaded));

        assert!("42".parse::<SessionKey>().is_err());
        assert!("42:x".parse::<SessionKey>().is_err());
        assert!("1:2:3:4".parse::<SessionKey>().is_err());
    }

    #[test]
    fn test_query_parse() {
        let q = SessionQuery::new("draw", 42, 1, "41");
        assert_eq!(q.encode(), "es:draw:42:1:41");
        assert_eq!(SessionQuery::parse("es:draw:42:1:41"), Some(q));

        let colon = SessionQuery::parse("es:draw:42:0:a:b").unwrap();
        assert_eq!(colon.data, "a:b");

        assert_eq!(SessionQuery::parse("warn_remove:1"), None);
        assert_eq!(SessionQuery::parse("es:draw:notanid:0:1"), None);
        assert!(SessionQuery::is_for("es:draw:1:0:cancel", "draw"));
        assert!(!SessionQuery::is_for("es:trade:1:0:cancel", "draw"));
    }

    #[test]
    fn test_query_fits_callback_limit() {
        let q = SessionQuery::new("draw", -1_000_000_000_000, 2, "cancel");
        assert!(q.encode().len() <= MAX_CALLBACK_DATA);
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = SessionStore::new(CacheLayer::new(Arc::new(MemoryStore::new())), "draw");
        let key = SessionKey::new(1, 100, None);
        let session = Session {
            step: 1,
            data: "payload".to_string(),
            main_message: Some(9),
            quoted_message: None,
        };

        store.save(&key, &session).await.unwrap();
        store
            .save(&SessionKey::new(1, 200, Some(3)), &session)
            .await
            .unwrap();
        store
            .save(&SessionKey::new(10, 100, None), &session)
            .await
            .unwrap();

        let loaded: Option<Session<String>> = store.get(&key).await.unwrap();
        assert_eq!(loaded, Some(session));

        let mut mine = store.find_for_user(1).await.unwrap();
        mine.sort_by_key(|k| k.chat);
        assert_eq!(
            mine,
            vec![SessionKey::new(1, 100, None), SessionKey::new(1, 200, Some(3))]
        );

        assert!(store.leave(&key).await.unwrap());
        assert!(!store.leave(&key).await.unwrap());
        let gone: Option<Session<String>> = store.get(&key).await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_ignore_no_caching() {
        let cache = CacheLayer::new(Arc::new(MemoryStore::new())).no_caching(true);
        let store = SessionStore::new(cache, "draw");
        let key = SessionKey::new(1, 100, None);
        let session = Session {
            step: 0,
            data: (),
            main_message: None,
            quoted_message: None,
        };
        store.save(&key, &session).await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(store.get::<()>(&key).await.unwrap().is_some());

        tokio::time::advance(SESSION_TTL).await;
        assert!(store.get::<()>(&key).await.unwrap().is_none());
    }
}
