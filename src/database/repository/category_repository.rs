//! Categories and subcategories, cached in-process.

use std::time::Duration;

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::models::{Category, Subcategory};
use crate::database::Database;

pub struct CategoryRepository {
    categories: Collection<Category>,
    subcategories: Collection<Subcategory>,
    /// Full category list, keyed by unit.
    all_cache: TypedCache<(), Vec<Category>>,
    category_cache: TypedCache<i32, Category>,
    subcategory_cache: TypedCache<i32, Subcategory>,
}

impl CategoryRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            categories: db.collection("categories"),
            subcategories: db.collection("subcategories"),
            all_cache: cache.get_or_create("categories_all", CacheConfig::reference_data()),
            category_cache: cache.get_or_create("categories_by_id", CacheConfig::reference_data()),
            subcategory_cache: cache.get_or_create(
                "subcategories_by_id",
                CacheConfig::with_capacity(20_000).ttl(Duration::from_secs(1800)),
            ),
        }
    }

    /// All categories ordered by id.
    pub async fn all(&self) -> Result<Vec<Category>> {
        if let Some(list) = self.all_cache.get(&()) {
            return Ok(list);
        }

        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let list: Vec<Category> = self
            .categories
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        debug!("Loaded {} categories", list.len());
        self.all_cache.insert((), list.clone());
        Ok(list)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Category>> {
        if let Some(category) = self.category_cache.get(&id) {
            return Ok(Some(category));
        }

        let result = self.categories.find_one(doc! { "_id": id }).await?;
        if let Some(category) = &result {
            self.category_cache.insert(id, category.clone());
        }
        Ok(result)
    }

    pub async fn subcategory(&self, id: i32) -> Result<Option<Subcategory>> {
        if let Some(sub) = self.subcategory_cache.get(&id) {
            return Ok(Some(sub));
        }

        let result = self.subcategories.find_one(doc! { "_id": id }).await?;
        if let Some(sub) = &result {
            self.subcategory_cache.insert(id, sub.clone());
        }
        Ok(result)
    }

    /// Random sample of a category's subcategories (never cached).
    pub async fn random_subcategories(&self, category_id: i32, count: usize) -> Result<Vec<Subcategory>> {
        let pipeline = vec![
            doc! { "$match": { "category_id": category_id } },
            doc! { "$sample": { "size": count as i64 } },
        ];

        let docs: Vec<Document> = self
            .subcategories
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        let subs = docs
            .into_iter()
            .map(bson::from_document::<Subcategory>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subs)
    }

    pub async fn push_alias(&self, id: i32, alias: &str) -> Result<()> {
        self.subcategories
            .update_one(doc! { "_id": id }, doc! { "$push": { "aliases": alias } })
            .await?;
        self.subcategory_cache.invalidate(&id);
        debug!("Added alias '{}' to subcategory {}", alias, id);
        Ok(())
    }
}
