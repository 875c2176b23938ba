//! Database module exports.

mod catalog;
#[cfg(test)]
pub mod memory;
mod models;
mod mongo;
mod repository;

pub use catalog::Catalog;
pub use models::*;
pub use mongo::Database;
pub use repository::MongoCatalog;
