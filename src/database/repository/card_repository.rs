//! Cards. Not cached: draws query by filters that change with every press.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use tracing::debug;

use super::counters::IdSequence;
use crate::database::models::{Card, NewCard, Subcategory};
use crate::database::Database;

pub struct CardRepository {
    cards: Collection<Card>,
    subcategories: Collection<Subcategory>,
    ids: IdSequence,
}

impl CardRepository {
    pub fn new(db: &Database, ids: IdSequence) -> Self {
        Self {
            cards: db.collection("cards"),
            subcategories: db.collection("subcategories"),
            ids,
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Card>> {
        Ok(self.cards.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_in(
        &self,
        category_id: i32,
        subcategory_id: i32,
        rarity_id: Option<i32>,
    ) -> Result<Vec<Card>> {
        let mut filter = doc! {
            "category_id": category_id,
            "subcategory_id": subcategory_id,
        };
        if let Some(rarity_id) = rarity_id {
            filter.insert("rarity_id", rarity_id);
        }

        Ok(self.cards.find(filter).await?.try_collect().await?)
    }

    pub async fn first_in_subcategory(&self, subcategory_id: i32) -> Result<Option<Card>> {
        Ok(self
            .cards
            .find_one(doc! { "subcategory_id": subcategory_id })
            .await?)
    }

    pub async fn by_name_and_subcategory_name(
        &self,
        name: &str,
        subcategory_name: &str,
    ) -> Result<Option<Card>> {
        let subs: Vec<Subcategory> = self
            .subcategories
            .find(doc! { "name": subcategory_name })
            .await?
            .try_collect()
            .await?;
        if subs.is_empty() {
            return Ok(None);
        }

        let ids: Vec<i32> = subs.iter().map(|s| s.id).collect();
        let filter: Document = doc! { "name": name, "subcategory_id": { "$in": ids } };
        Ok(self.cards.find_one(filter).await?)
    }

    pub async fn insert(&self, card: NewCard) -> Result<Card> {
        let id = self.ids.next("cards").await? as i32;
        let card = card.into_card(id);
        self.cards.insert_one(&card).await?;
        debug!("Created card {} ({})", card.id, card.name);
        Ok(card)
    }

    pub async fn set_rarity(&self, card_id: i32, rarity_id: i32) -> Result<()> {
        self.cards
            .update_one(doc! { "_id": card_id }, doc! { "$set": { "rarity_id": rarity_id } })
            .await?;
        Ok(())
    }
}
