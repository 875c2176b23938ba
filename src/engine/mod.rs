//! Card game engine: card selection, rerolls and draw allowances.

mod cards;
mod users;

pub use cards::{Allowance, CardEngine, DrawOutcome};
pub use users::UserLedger;
