//! Card and rarity models.

use serde::{Deserialize, Serialize};

use super::{Category, Subcategory};

/// A rarity tier. `chance` is the probability weight in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rarity {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub chance: f64,
}

/// A drawable card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub subcategory_id: i32,
    pub category_id: i32,
    pub rarity_id: i32,
    /// Stored image reference, resolved by [`crate::media::ImageResolver`].
    pub image: String,

    /// Skews the keep-probability of this specific card (0 = no reroll check).
    #[serde(default)]
    pub rarity_modifier: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Fields an admin supplies when registering a card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub subcategory_id: i32,
    pub category_id: i32,
    pub rarity_id: i32,
    pub image: String,
    pub rarity_modifier: f64,
}

impl NewCard {
    pub fn into_card(self, id: i32) -> Card {
        Card {
            id,
            name: self.name,
            subcategory_id: self.subcategory_id,
            category_id: self.category_id,
            rarity_id: self.rarity_id,
            image: self.image,
            rarity_modifier: self.rarity_modifier,
            tags: Vec::new(),
        }
    }
}

/// A card joined with its rarity, category and subcategory.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    pub card: Card,
    pub rarity: Rarity,
    pub category: Category,
    pub subcategory: Subcategory,
}

impl CardDetails {
    pub fn id(&self) -> i32 {
        self.card.id
    }

    /// Probability of keeping this card when its modifier is non-zero.
    pub fn keep_threshold(&self) -> f64 {
        self.card.rarity_modifier + self.rarity.chance
    }
}
