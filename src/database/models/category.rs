//! Category and subcategory models.

use serde::{Deserialize, Serialize};

/// Default number of subcategories offered per draw.
pub const DEFAULT_SUBCATEGORIES_TO_SHOW: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub emoji: String,

    /// Image shown on the subcategory step instead of the default animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_custom_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories_to_show: Option<u32>,
}

impl Category {
    pub fn subcategories_per_draw(&self) -> usize {
        match self.subcategories_to_show {
            Some(n) if n > 0 => n as usize,
            _ => DEFAULT_SUBCATEGORIES_TO_SHOW,
        }
    }

    /// Button label, e.g. "🎌 Anime".
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub category_id: i32,

    /// Alternative names, append-only.
    #[serde(default)]
    pub aliases: Vec<String>,
}
