//! Rarity tiers (immutable reference data).

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::Collection;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::Rarity;
use crate::database::Database;

pub struct RarityRepository {
    collection: Collection<Rarity>,
    cache: TypedCache<(), Vec<Rarity>>,
}

impl RarityRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("rarities"),
            cache: cache.get_or_create("rarities", CacheConfig::reference_data()),
        }
    }

    pub async fn all(&self) -> Result<Vec<Rarity>> {
        if let Some(list) = self.cache.get(&()) {
            return Ok(list);
        }

        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let list: Vec<Rarity> = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        self.cache.insert((), list.clone());
        Ok(list)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Rarity>> {
        Ok(self.all().await?.into_iter().find(|r| r.id == id))
    }
}
