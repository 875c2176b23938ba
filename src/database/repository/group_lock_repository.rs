//! Group draw locks, cached per chat (including "no lock").

use anyhow::Result;
use mongodb::bson::doc;
use mongodb::Collection;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::GroupDrawLock;
use crate::database::Database;

pub struct GroupLockRepository {
    collection: Collection<GroupDrawLock>,
    cache: TypedCache<i64, Option<GroupDrawLock>>,
}

impl GroupLockRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("group_draw_locks"),
            cache: cache.get_or_create("group_draw_locks", CacheConfig::chat_settings()),
        }
    }

    pub async fn get(&self, group_id: i64) -> Result<Option<GroupDrawLock>> {
        if let Some(lock) = self.cache.get(&group_id) {
            return Ok(lock);
        }

        let lock = self.collection.find_one(doc! { "_id": group_id }).await?;
        self.cache.insert(group_id, lock.clone());
        Ok(lock)
    }
}
