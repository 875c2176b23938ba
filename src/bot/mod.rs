//! Bot module - dispatcher, state and runners.

pub mod dispatcher;
mod runtime;
mod webhook;

pub use dispatcher::{build_dispatcher, AppState, ThrottledBot};
pub use runtime::run;
