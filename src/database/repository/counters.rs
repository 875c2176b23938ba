//! Integer id sequences.
//!
//! MongoDB has no auto-increment, so each collection that needs integer ids
//! keeps a counter document in `counters`. Seed a counter above the current
//! maximum id when importing existing data.

use anyhow::{anyhow, Result};
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::database::Database;

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    name: String,
    seq: i64,
}

#[derive(Clone)]
pub struct IdSequence {
    collection: Collection<Counter>,
}

impl IdSequence {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("counters"),
        }
    }

    /// Reserve the next id for `name`.
    pub async fn next(&self, name: &str) -> Result<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .collection
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } })
            .with_options(options)
            .await?;

        counter
            .map(|c| c.seq)
            .ok_or_else(|| anyhow!("counter '{}' was not upserted", name))
    }
}
