//! Database models.

pub mod card;
pub mod category;
pub mod group_lock;
pub mod user;

pub use card::{Card, CardDetails, NewCard, Rarity};
pub use category::{Category, Subcategory};
pub use group_lock::GroupDrawLock;
pub use user::{DrawUser, UserCard};
