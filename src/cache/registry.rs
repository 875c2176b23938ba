//! Cache registry - one place that owns every named cache.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{CacheConfig, TypedCache};

/// Registry of named typed caches.
///
/// Repositories ask the registry for their caches by name, so two
/// repositories built from the same registry share entries.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
    no_caching: bool,
}

/// Type-erased cache stored in the registry.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every cache created from now on a lifetime of a few seconds.
    #[must_use]
    pub fn no_caching(mut self, enabled: bool) -> Self {
        self.no_caching = enabled;
        self
    }

    /// Get an existing cache or create it with `config`.
    ///
    /// # Panics
    /// Panics if `name` is already registered with different key/value types.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(entry) = self.caches.read().get(name) {
            return Self::downcast(name, entry);
        }

        let mut caches = self.caches.write();
        // Another task may have created it between the two locks.
        if let Some(entry) = caches.get(name) {
            return Self::downcast(name, entry);
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::<K, V>::new(name, config.no_caching(self.no_caching));
        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );
        cache
    }

    fn downcast<K, V>(name: &str, entry: &CacheEntry) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match entry.cache.downcast_ref::<TypedCache<K, V>>() {
            Some(cache) => cache.clone(),
            None => panic!(
                "Cache '{}' type mismatch: expected {}, got {}",
                name,
                std::any::type_name::<TypedCache<K, V>>(),
                entry.type_name
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("no_caching", &self.no_caching)
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
