//! The `/draw` flow: lock, wizard, selection and reveal.

pub mod delivery;
pub mod lock;
pub mod machine;
pub mod render;
pub mod wizard;

pub use delivery::Delivery;
pub use wizard::{Caller, DrawWizard, Press};
