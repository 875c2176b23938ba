//! Draw allowance bookkeeping.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::database::{Catalog, DrawUser};

/// Reads and adjusts users' draw allowances.
#[derive(Clone)]
pub struct UserLedger {
    catalog: Arc<dyn Catalog>,
    default_maximum_draws: i32,
}

impl UserLedger {
    pub fn new(catalog: Arc<dyn Catalog>, default_maximum_draws: i32) -> Self {
        Self {
            catalog,
            default_maximum_draws,
        }
    }

    /// Load a user, registering them with the default allowance on first sight.
    pub async fn ensure(&self, user_id: i64) -> Result<DrawUser> {
        if let Some(user) = self.catalog.user(user_id).await? {
            return Ok(user);
        }

        let user = DrawUser::new(user_id, self.default_maximum_draws);
        self.catalog.insert_user(&user).await?;
        debug!("Registered user {} with {} draws", user_id, user.maximum_draws);
        Ok(user)
    }

    /// Consume one draw.
    pub async fn deduct_draw(&self, user_id: i64) -> Result<()> {
        self.catalog.add_used_draws(user_id, 1).await
    }

    /// Give one draw back.
    pub async fn add_draw(&self, user_id: i64) -> Result<()> {
        self.catalog.add_used_draws(user_id, -1).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryCatalog;

    #[tokio::test]
    async fn test_ensure_registers_once() {
        let catalog = Arc::new(MemoryCatalog::new());
        let ledger = UserLedger::new(catalog.clone(), 12);

        let user = ledger.ensure(7).await.unwrap();
        assert_eq!(user.maximum_draws, 12);
        assert_eq!(user.used_draws, 0);

        ledger.deduct_draw(7).await.unwrap();
        let again = ledger.ensure(7).await.unwrap();
        assert_eq!(again.used_draws, 1);
    }

    #[tokio::test]
    async fn test_deduct_then_refund_is_neutral() {
        let catalog = Arc::new(MemoryCatalog::new().with_user(1, 3, 5));
        let ledger = UserLedger::new(catalog.clone(), 12);

        ledger.deduct_draw(1).await.unwrap();
        assert_eq!(catalog.used_draws(1), Some(4));
        ledger.add_draw(1).await.unwrap();
        assert_eq!(catalog.used_draws(1), Some(3));
    }
}
