//! In-memory [`Catalog`] for tests.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::catalog::Catalog;
use super::models::{
    Card, Category, DrawUser, GroupDrawLock, NewCard, Rarity, Subcategory, UserCard,
};

#[derive(Default)]
struct Tables {
    rarities: Vec<Rarity>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    cards: Vec<Card>,
    user_cards: Vec<UserCard>,
    users: Vec<DrawUser>,
    locks: Vec<GroupDrawLock>,
}

/// Vec-backed catalog. `random_subcategories` returns the first `count`
/// subcategories in insertion order so tests stay deterministic.
#[derive(Default)]
pub struct MemoryCatalog {
    tables: Mutex<Tables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rarity(self, id: i32, name: &str, chance: f64) -> Self {
        self.tables.lock().rarities.push(Rarity {
            id,
            name: name.to_string(),
            chance,
        });
        self
    }

    pub fn with_category(self, id: i32, name: &str, emoji: &str) -> Self {
        self.tables.lock().categories.push(Category {
            id,
            name: name.to_string(),
            emoji: emoji.to_string(),
            draw_custom_image: None,
            subcategories_to_show: None,
        });
        self
    }

    pub fn with_subcategory(self, id: i32, name: &str, category_id: i32) -> Self {
        self.tables.lock().subcategories.push(Subcategory {
            id,
            name: name.to_string(),
            category_id,
            aliases: Vec::new(),
        });
        self
    }

    pub fn with_card(self, card: Card) -> Self {
        self.tables.lock().cards.push(card);
        self
    }

    pub fn with_user(self, id: i64, used_draws: i32, maximum_draws: i32) -> Self {
        self.tables.lock().users.push(DrawUser {
            id,
            used_draws,
            maximum_draws,
        });
        self
    }

    pub fn with_group_lock(self, group_id: i64, allowed_categories: Vec<i32>) -> Self {
        self.tables.lock().locks.push(GroupDrawLock {
            group_id,
            allowed_categories,
        });
        self
    }

    pub fn user_cards(&self) -> Vec<UserCard> {
        self.tables.lock().user_cards.clone()
    }

    pub fn used_draws(&self, user_id: i64) -> Option<i32> {
        self.tables
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.used_draws)
    }

    pub fn card_rarity(&self, card_id: i32) -> Option<i32> {
        self.tables
            .lock()
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .map(|c| c.rarity_id)
    }

    pub fn remove_category(&self, id: i32) {
        self.tables.lock().categories.retain(|c| c.id != id);
    }
}

/// A card with no modifier and no tags.
pub fn card(id: i32, name: &str, category_id: i32, subcategory_id: i32, rarity_id: i32) -> Card {
    Card {
        id,
        name: name.to_string(),
        subcategory_id,
        category_id,
        rarity_id,
        image: format!("https://img.example/{}.png", id),
        rarity_modifier: 0.0,
        tags: Vec::new(),
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn rarities(&self) -> Result<Vec<Rarity>> {
        Ok(self.tables.lock().rarities.clone())
    }

    async fn rarity(&self, id: i32) -> Result<Option<Rarity>> {
        Ok(self.tables.lock().rarities.iter().find(|r| r.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.tables.lock().categories.clone())
    }

    async fn category(&self, id: i32) -> Result<Option<Category>> {
        Ok(self.tables.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn subcategory(&self, id: i32) -> Result<Option<Subcategory>> {
        Ok(self
            .tables
            .lock()
            .subcategories
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn random_subcategories(&self, category_id: i32, count: usize) -> Result<Vec<Subcategory>> {
        Ok(self
            .tables
            .lock()
            .subcategories
            .iter()
            .filter(|s| s.category_id == category_id)
            .take(count)
            .cloned()
            .collect())
    }

    async fn push_subcategory_alias(&self, id: i32, alias: &str) -> Result<()> {
        if let Some(sub) = self.tables.lock().subcategories.iter_mut().find(|s| s.id == id) {
            sub.aliases.push(alias.to_string());
        }
        Ok(())
    }

    async fn group_draw_lock(&self, group_id: i64) -> Result<Option<GroupDrawLock>> {
        Ok(self
            .tables
            .lock()
            .locks
            .iter()
            .find(|l| l.group_id == group_id)
            .cloned())
    }

    async fn card(&self, id: i32) -> Result<Option<Card>> {
        Ok(self.tables.lock().cards.iter().find(|c| c.id == id).cloned())
    }

    async fn cards_in(
        &self,
        category_id: i32,
        subcategory_id: i32,
        rarity_id: Option<i32>,
    ) -> Result<Vec<Card>> {
        Ok(self
            .tables
            .lock()
            .cards
            .iter()
            .filter(|c| c.category_id == category_id && c.subcategory_id == subcategory_id)
            .filter(|c| rarity_id.is_none_or(|r| c.rarity_id == r))
            .cloned()
            .collect())
    }

    async fn any_card_in_subcategory(&self, subcategory_id: i32) -> Result<Option<Card>> {
        Ok(self
            .tables
            .lock()
            .cards
            .iter()
            .find(|c| c.subcategory_id == subcategory_id)
            .cloned())
    }

    async fn card_by_name_and_subcategory_name(
        &self,
        name: &str,
        subcategory_name: &str,
    ) -> Result<Option<Card>> {
        let tables = self.tables.lock();
        let sub_ids: Vec<i32> = tables
            .subcategories
            .iter()
            .filter(|s| s.name == subcategory_name)
            .map(|s| s.id)
            .collect();
        Ok(tables
            .cards
            .iter()
            .find(|c| c.name == name && sub_ids.contains(&c.subcategory_id))
            .cloned())
    }

    async fn insert_card(&self, card: NewCard) -> Result<Card> {
        let mut tables = self.tables.lock();
        let id = tables.cards.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let card = card.into_card(id);
        tables.cards.push(card.clone());
        Ok(card)
    }

    async fn set_card_rarity(&self, card_id: i32, rarity_id: i32) -> Result<()> {
        if let Some(card) = self.tables.lock().cards.iter_mut().find(|c| c.id == card_id) {
            card.rarity_id = rarity_id;
        }
        Ok(())
    }

    async fn insert_user_card(&self, user_id: i64, card_id: i32) -> Result<UserCard> {
        let mut tables = self.tables.lock();
        let user_card = UserCard {
            id: tables.user_cards.len() as i64 + 1,
            user_id,
            card_id,
            obtained_at: chrono::Utc::now(),
        };
        tables.user_cards.push(user_card.clone());
        Ok(user_card)
    }

    async fn count_user_cards(&self, user_id: i64, card_id: i32) -> Result<u64> {
        Ok(self
            .tables
            .lock()
            .user_cards
            .iter()
            .filter(|uc| uc.user_id == user_id && uc.card_id == card_id)
            .count() as u64)
    }

    async fn user(&self, id: i64) -> Result<Option<DrawUser>> {
        Ok(self.tables.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: &DrawUser) -> Result<()> {
        self.tables.lock().users.push(user.clone());
        Ok(())
    }

    async fn add_used_draws(&self, user_id: i64, delta: i32) -> Result<()> {
        if let Some(user) = self.tables.lock().users.iter_mut().find(|u| u.id == user_id) {
            user.used_draws += delta;
        }
        Ok(())
    }
}
