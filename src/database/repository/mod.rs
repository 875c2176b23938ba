//! MongoDB repositories and the [`Catalog`] they implement together.

mod card_repository;
mod category_repository;
mod counters;
mod group_lock_repository;
mod rarity_repository;
mod user_repository;

use anyhow::Result;
use async_trait::async_trait;

use card_repository::CardRepository;
use category_repository::CategoryRepository;
use counters::IdSequence;
use group_lock_repository::GroupLockRepository;
use rarity_repository::RarityRepository;
use user_repository::UserRepository;

use super::catalog::Catalog;
use super::models::{
    Card, Category, DrawUser, GroupDrawLock, NewCard, Rarity, Subcategory, UserCard,
};
use super::Database;
use crate::cache::CacheRegistry;

/// All repositories behind one [`Catalog`].
pub struct MongoCatalog {
    categories: CategoryRepository,
    rarities: RarityRepository,
    locks: GroupLockRepository,
    cards: CardRepository,
    users: UserRepository,
}

impl MongoCatalog {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        let ids = IdSequence::new(db);
        Self {
            categories: CategoryRepository::new(db, cache),
            rarities: RarityRepository::new(db, cache),
            locks: GroupLockRepository::new(db, cache),
            cards: CardRepository::new(db, ids.clone()),
            users: UserRepository::new(db, ids),
        }
    }
}

#[async_trait]
impl Catalog for MongoCatalog {
    async fn rarities(&self) -> Result<Vec<Rarity>> {
        self.rarities.all().await
    }

    async fn rarity(&self, id: i32) -> Result<Option<Rarity>> {
        self.rarities.get(id).await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.categories.all().await
    }

    async fn category(&self, id: i32) -> Result<Option<Category>> {
        self.categories.get(id).await
    }

    async fn subcategory(&self, id: i32) -> Result<Option<Subcategory>> {
        self.categories.subcategory(id).await
    }

    async fn random_subcategories(&self, category_id: i32, count: usize) -> Result<Vec<Subcategory>> {
        self.categories.random_subcategories(category_id, count).await
    }

    async fn push_subcategory_alias(&self, id: i32, alias: &str) -> Result<()> {
        self.categories.push_alias(id, alias).await
    }

    async fn group_draw_lock(&self, group_id: i64) -> Result<Option<GroupDrawLock>> {
        self.locks.get(group_id).await
    }

    async fn card(&self, id: i32) -> Result<Option<Card>> {
        self.cards.get(id).await
    }

    async fn cards_in(
        &self,
        category_id: i32,
        subcategory_id: i32,
        rarity_id: Option<i32>,
    ) -> Result<Vec<Card>> {
        self.cards.find_in(category_id, subcategory_id, rarity_id).await
    }

    async fn any_card_in_subcategory(&self, subcategory_id: i32) -> Result<Option<Card>> {
        self.cards.first_in_subcategory(subcategory_id).await
    }

    async fn card_by_name_and_subcategory_name(
        &self,
        name: &str,
        subcategory_name: &str,
    ) -> Result<Option<Card>> {
        self.cards
            .by_name_and_subcategory_name(name, subcategory_name)
            .await
    }

    async fn insert_card(&self, card: NewCard) -> Result<Card> {
        self.cards.insert(card).await
    }

    async fn set_card_rarity(&self, card_id: i32, rarity_id: i32) -> Result<()> {
        self.cards.set_rarity(card_id, rarity_id).await
    }

    async fn insert_user_card(&self, user_id: i64, card_id: i32) -> Result<UserCard> {
        self.users.insert_card(user_id, card_id).await
    }

    async fn count_user_cards(&self, user_id: i64, card_id: i32) -> Result<u64> {
        self.users.count_cards(user_id, card_id).await
    }

    async fn user(&self, id: i64) -> Result<Option<DrawUser>> {
        self.users.get(id).await
    }

    async fn insert_user(&self, user: &DrawUser) -> Result<()> {
        self.users.insert(user).await
    }

    async fn add_used_draws(&self, user_id: i64, delta: i32) -> Result<()> {
        self.users.add_used_draws(user_id, delta).await
    }
}
