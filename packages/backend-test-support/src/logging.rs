//! Tracing for integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

fn filter() -> EnvFilter {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the test subscriber once per process.
///
/// Level: `TEST_LOG`, then `RUST_LOG`, default `warn`. Setting
/// `TEST_LOG_JSON=1` switches to the JSON layout the binary uses, which
/// helps when checking structured fields such as `account_id`.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let json = std::env::var("TEST_LOG_JSON").is_ok_and(|v| v == "1");
        let builder = fmt()
            .with_env_filter(filter())
            .with_test_writer()
            .without_time();
        let _ = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    });
}
