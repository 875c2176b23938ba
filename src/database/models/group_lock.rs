//! Per-chat restriction of drawable categories.

use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDrawLock {
    #[serde(rename = "_id")]
    pub group_id: i64,
    pub allowed_categories: Vec<i32>,
}

impl GroupDrawLock {
    /// Keep only the categories this chat may draw from.
    pub fn filter(&self, categories: Vec<Category>) -> Vec<Category> {
        categories
            .into_iter()
            .filter(|c| self.allowed_categories.contains(&c.id))
            .collect()
    }
}
