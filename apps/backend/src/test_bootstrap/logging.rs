#![cfg(test)]

//! Tracing for unit tests, installed once by the `ctor` hook in `lib.rs`.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the test subscriber. Safe to call any number of times.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, and defaults to `warn`
/// so ledger and session logs stay quiet unless asked for:
///
/// ```bash
/// TEST_LOG=parlor=debug cargo test -p parlor ledger::
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // try_init: another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init();
    });
}
