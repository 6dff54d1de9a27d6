//! Process-wide tracing for the console binary.
//!
//! Replies own stdout, so every log line goes to stderr. `RUST_LOG` picks
//! the directives and `PARLOR_LOG_FORMAT` the layout (`json`, `pretty` or
//! `compact`; JSON when unset).

use std::env;

use tracing_subscriber::fmt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "warn,parlor=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Unrecognised names fall back to JSON so a typo never silences logs.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            _ => Self::Json,
        }
    }
}

fn directives(rust_log: Option<String>) -> String {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_tracing() -> Result<LogFormat, TryInitError> {
    let format = LogFormat::parse(env::var("PARLOR_LOG_FORMAT").ok().as_deref());
    let filter = EnvFilter::try_new(directives(env::var("RUST_LOG").ok()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);
    let installed = match format {
        LogFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        LogFormat::Pretty => builder.pretty().finish().try_init(),
        LogFormat::Compact => builder.compact().finish().try_init(),
    };
    installed.map(|()| format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_forgiving() {
        assert_eq!(LogFormat::parse(None), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" Pretty ")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(Some("compact")), LogFormat::Compact);
        assert_eq!(LogFormat::parse(Some("xml")), LogFormat::Json);
    }

    #[test]
    fn blank_rust_log_uses_the_default_directives() {
        assert_eq!(directives(None), DEFAULT_DIRECTIVES);
        assert_eq!(directives(Some("  ".into())), DEFAULT_DIRECTIVES);
        assert_eq!(directives(Some("debug".into())), "debug");
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
    }
}
