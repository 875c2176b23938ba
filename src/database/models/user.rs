//! Draw allowance and collection models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The draw-relevant part of a user.
///
/// `used_draws <= maximum_draws` is expected but only enforced when a draw
/// starts, not on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawUser {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub used_draws: i32,
    pub maximum_draws: i32,
}

impl DrawUser {
    pub fn new(id: i64, maximum_draws: i32) -> Self {
        Self {
            id,
            used_draws: 0,
            maximum_draws,
        }
    }

    pub fn remaining_draws(&self) -> i32 {
        (self.maximum_draws - self.used_draws).max(0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used_draws >= self.maximum_draws
    }
}

/// One owned copy of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCard {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user_id: i64,
    pub card_id: i32,
    pub obtained_at: DateTime<Utc>,
}
