#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod games;
pub mod infra;
pub mod ledger;
pub mod persistence;
pub mod services;
pub mod sessions;
pub mod state;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use domain::{AccountId, CheckCode, ConversationId};
pub use errors::{DomainError, ErrorCode};
pub use infra::state::{build_state, StateBuilder};
pub use ledger::{Ledger, Redemption};
pub use sessions::{MoveOutcome, SessionCoordinator};
pub use state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
