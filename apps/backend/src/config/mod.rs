//! Start-up configuration read from `PARLOR_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::AccountId;
use crate::errors::{DomainError, InfraErrorKind};

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_ACCOUNTS_FILE: &str = "users_data.json";
pub const DEFAULT_CHECKS_FILE: &str = "checks_data.json";
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub accounts_file: String,
    pub checks_file: String,
    pub reminder_interval: Duration,
    pub moderators: Vec<AccountId>,
    pub rng_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            accounts_file: DEFAULT_ACCOUNTS_FILE.to_string(),
            checks_file: DEFAULT_CHECKS_FILE.to_string(),
            reminder_interval: Duration::from_secs(DEFAULT_REMINDER_INTERVAL_SECS),
            moderators: Vec::new(),
            rng_seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve against any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let reminder_secs = match var("PARLOR_REMINDER_INTERVAL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(invalid("PARLOR_REMINDER_INTERVAL_SECS", &raw)),
            },
            None => DEFAULT_REMINDER_INTERVAL_SECS,
        };

        let rng_seed = var("PARLOR_RNG_SEED")
            .map(|raw| raw.parse::<u64>().map_err(|_| invalid("PARLOR_RNG_SEED", &raw)))
            .transpose()?;

        let moderators: Vec<AccountId> = var("PARLOR_MODERATORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(AccountId::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            data_dir: var("PARLOR_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            accounts_file: var("PARLOR_ACCOUNTS_FILE").unwrap_or(defaults.accounts_file),
            checks_file: var("PARLOR_CHECKS_FILE").unwrap_or(defaults.checks_file),
            reminder_interval: Duration::from_secs(reminder_secs),
            moderators,
            rng_seed,
        })
    }
}

fn invalid(name: &str, raw: &str) -> DomainError {
    DomainError::infra(InfraErrorKind::Config, format!("{name} has invalid value {raw:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::ErrorCode;

    fn from(pairs: &[(&str, &str)]) -> Result<AppConfig, DomainError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(from(&[]).unwrap(), AppConfig::default());
        assert_eq!(from(&[("PARLOR_DATA_DIR", "   ")]).unwrap(), AppConfig::default());
    }

    #[test]
    fn values_are_parsed() {
        let cfg = from(&[
            ("PARLOR_DATA_DIR", "/var/lib/parlor"),
            ("PARLOR_REMINDER_INTERVAL_SECS", "15"),
            ("PARLOR_MODERATORS", " 1, 2 ,,3"),
            ("PARLOR_RNG_SEED", "42"),
        ])
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/parlor"));
        assert_eq!(cfg.reminder_interval, Duration::from_secs(15));
        assert_eq!(cfg.moderators, vec![AccountId::from("1"), AccountId::from("2"), AccountId::from("3")]);
        assert_eq!(cfg.rng_seed, Some(42));
    }

    #[test]
    fn bad_values_are_config_errors() {
        for pair in [
            ("PARLOR_REMINDER_INTERVAL_SECS", "0"),
            ("PARLOR_REMINDER_INTERVAL_SECS", "soon"),
            ("PARLOR_RNG_SEED", "-1"),
        ] {
            let err = from(&[pair]).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ConfigError, "{pair:?}");
        }
    }
}
