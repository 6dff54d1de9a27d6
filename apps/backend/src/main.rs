use std::sync::Arc;

use parlor::config::AppConfig;
use parlor::infra::state::build_state;
use parlor::services::{LogReminderSink, ReminderSweeper};
use parlor::telemetry;
use parlor::transport::console;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = telemetry::init_tracing() {
        eprintln!("⚠️ Logging disabled: {e}");
    }

    // Configuration comes from PARLOR_* variables set by the runtime environment.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let interval = config.reminder_interval;

    let app_state = match build_state().with_config(config).build() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    let sweeper = Arc::new(ReminderSweeper::new(
        Arc::clone(&app_state.ledger),
        Arc::new(LogReminderSink),
    ));
    let sweep = sweeper.spawn(interval);

    eprintln!("🚀 Parlor ready: <account> <conversation> <text> per line");

    let result = console::run(
        &app_state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await;
    sweep.abort();
    result
}
