//! Draw allowances and owned cards.

use anyhow::Result;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::debug;

use super::counters::IdSequence;
use crate::database::models::{DrawUser, UserCard};
use crate::database::Database;

pub struct UserRepository {
    users: Collection<DrawUser>,
    user_cards: Collection<UserCard>,
    ids: IdSequence,
}

impl UserRepository {
    pub fn new(db: &Database, ids: IdSequence) -> Self {
        Self {
            users: db.collection("users"),
            user_cards: db.collection("user_cards"),
            ids,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<DrawUser>> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert(&self, user: &DrawUser) -> Result<()> {
        self.users.insert_one(user).await?;
        debug!("Registered user {}", user.id);
        Ok(())
    }

    pub async fn add_used_draws(&self, user_id: i64, delta: i32) -> Result<()> {
        self.users
            .update_one(doc! { "_id": user_id }, doc! { "$inc": { "used_draws": delta } })
            .await?;
        Ok(())
    }

    pub async fn insert_card(&self, user_id: i64, card_id: i32) -> Result<UserCard> {
        let user_card = UserCard {
            id: self.ids.next("user_cards").await?,
            user_id,
            card_id,
            obtained_at: chrono::Utc::now(),
        };
        self.user_cards.insert_one(&user_card).await?;
        Ok(user_card)
    }

    pub async fn count_cards(&self, user_id: i64, card_id: i32) -> Result<u64> {
        Ok(self
            .user_cards
            .count_documents(doc! { "user_id": user_id, "card_id": card_id })
            .await?)
    }
}
