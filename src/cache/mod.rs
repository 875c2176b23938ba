//! In-process caches for reference data, backed by Moka.
//!
//! Categories, subcategories, rarities and group draw locks change rarely,
//! so repositories keep them here instead of hitting MongoDB on every
//! button press. Shared, cross-process state (locks, sessions, cooldowns)
//! lives in [`crate::store`] instead.
//!
//! ```rust
//! let registry = CacheRegistry::new();
//! let categories: TypedCache<i32, Category> =
//!     registry.get_or_create("categories_by_id", CacheConfig::reference_data());
//! categories.insert(category.id, category);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
