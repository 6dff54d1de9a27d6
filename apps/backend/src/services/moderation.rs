use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::rules::{BAN_DURATION, WARNINGS_BEFORE_BAN};
use crate::domain::{AccountId, Warning};
use crate::errors::DomainError;
use crate::ledger::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarnOutcome {
    pub warnings: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub banned_until: Option<OffsetDateTime>,
}

/// Warnings and bans. Every operation except `set_moderator` requires the
/// acting account to carry the moderator flag.
pub struct ModerationService {
    ledger: Arc<Ledger>,
}

impl ModerationService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    fn require_moderator(&self, moderator: &AccountId) -> Result<(), DomainError> {
        match self.ledger.account(moderator) {
            Ok(account) if account.is_moderator => Ok(()),
            _ => {
                warn!(account_id = %moderator, "moderation attempted without the flag");
                Err(DomainError::forbidden(format!("{moderator} is not a moderator")))
            }
        }
    }

    /// Add a warning; reaching the threshold bans the target.
    pub fn warn(
        &self,
        moderator: &AccountId,
        target: &AccountId,
        reason: &str,
    ) -> Result<WarnOutcome, DomainError> {
        self.require_moderator(moderator)?;
        let outcome = self.ledger.update_account(target, |account, now| {
            account.warnings.push(Warning {
                at: now,
                reason: reason.to_string(),
                moderator: moderator.to_string(),
            });
            if account.warnings.len() >= WARNINGS_BEFORE_BAN {
                account.ban_expiry = Some(now + BAN_DURATION);
            }
            Ok(WarnOutcome {
                warnings: account.warnings.len(),
                banned_until: account.ban_expiry.filter(|until| *until > now),
            })
        })?;
        info!(account_id = %target, moderator = %moderator, warnings = outcome.warnings, "warning issued");
        Ok(outcome)
    }

    pub fn ban(
        &self,
        moderator: &AccountId,
        target: &AccountId,
        reason: &str,
    ) -> Result<OffsetDateTime, DomainError> {
        self.require_moderator(moderator)?;
        let until = self.ledger.update_account(target, |account, now| {
            let until = now + BAN_DURATION;
            account.ban_expiry = Some(until);
            Ok(until)
        })?;
        info!(account_id = %target, moderator = %moderator, reason, "account banned");
        Ok(until)
    }

    /// Lift the ban and drop every warning.
    pub fn unban(&self, moderator: &AccountId, target: &AccountId) -> Result<(), DomainError> {
        self.require_moderator(moderator)?;
        self.ledger.update_account(target, |account, _| {
            account.ban_expiry = None;
            account.warnings.clear();
            Ok(())
        })?;
        info!(account_id = %target, moderator = %moderator, "account unbanned");
        Ok(())
    }

    pub fn clear_warnings(&self, moderator: &AccountId, target: &AccountId) -> Result<usize, DomainError> {
        self.require_moderator(moderator)?;
        self.ledger.update_account(target, |account, _| {
            let cleared = account.warnings.len();
            account.warnings.clear();
            Ok(cleared)
        })
    }

    /// Administrative: grant or revoke the moderator flag.
    pub fn set_moderator(&self, id: &AccountId, flag: bool) -> Result<(), DomainError> {
        self.ledger.update_account(id, |account, _| {
            account.is_moderator = flag;
            Ok(())
        })?;
        info!(account_id = %id, flag, "moderator flag set");
        Ok(())
    }
}
