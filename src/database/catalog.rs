//! The database contract the draw core depends on.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    Card, Category, DrawUser, GroupDrawLock, NewCard, Rarity, Subcategory, UserCard,
};

/// Queries and writes over the card game's collections.
///
/// Lookups return `Ok(None)` or an empty list for "not found"; `Err` is
/// reserved for the backend being unavailable.
#[async_trait]
pub trait Catalog: Send + Sync {
    // Reference data
    async fn rarities(&self) -> Result<Vec<Rarity>>;
    async fn rarity(&self, id: i32) -> Result<Option<Rarity>>;
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn category(&self, id: i32) -> Result<Option<Category>>;
    async fn subcategory(&self, id: i32) -> Result<Option<Subcategory>>;

    /// Up to `count` random subcategories of a category.
    async fn random_subcategories(&self, category_id: i32, count: usize) -> Result<Vec<Subcategory>>;

    /// Append an alias to a subcategory.
    async fn push_subcategory_alias(&self, id: i32, alias: &str) -> Result<()>;

    async fn group_draw_lock(&self, group_id: i64) -> Result<Option<GroupDrawLock>>;

    // Cards
    async fn card(&self, id: i32) -> Result<Option<Card>>;

    /// Cards of a category + subcategory, optionally restricted to one rarity.
    async fn cards_in(
        &self,
        category_id: i32,
        subcategory_id: i32,
        rarity_id: Option<i32>,
    ) -> Result<Vec<Card>>;

    /// Any card of the subcategory, regardless of rarity and category.
    async fn any_card_in_subcategory(&self, subcategory_id: i32) -> Result<Option<Card>>;

    /// Card with exactly `name` whose subcategory is named `subcategory_name`.
    async fn card_by_name_and_subcategory_name(
        &self,
        name: &str,
        subcategory_name: &str,
    ) -> Result<Option<Card>>;

    async fn insert_card(&self, card: NewCard) -> Result<Card>;
    async fn set_card_rarity(&self, card_id: i32, rarity_id: i32) -> Result<()>;

    // Collections and allowance
    async fn insert_user_card(&self, user_id: i64, card_id: i32) -> Result<UserCard>;
    async fn count_user_cards(&self, user_id: i64, card_id: i32) -> Result<u64>;
    async fn user(&self, id: i64) -> Result<Option<DrawUser>>;
    async fn insert_user(&self, user: &DrawUser) -> Result<()>;

    /// Add `delta` to `used_draws` (negative refunds).
    async fn add_used_draws(&self, user_id: i64, delta: i32) -> Result<()>;
}
