//! Account records owned by the ledger store.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

use super::rules::{HISTORY_CAP, STARTING_BALANCE};
use crate::errors::{DomainError, ValidationKind};

/// Immutable ledger entry: signed delta, balance after it, reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub amount: i64,
    pub balance: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub reason: String,
    pub moderator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Ulid,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub due_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub completed: bool,
}

impl Reminder {
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        !self.completed && self.due_at <= now
    }
}

/// A ledger participant. Missing fields in older snapshots load as defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub display_name: String,
    pub messages: u64,
    pub warnings: Vec<Warning>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ban_expiry: Option<OffsetDateTime>,
    pub balance: i64,
    pub is_moderator: bool,
    pub history: Vec<LedgerEntry>,
    pub reminders: Vec<Reminder>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_daily_claim: Option<OffsetDateTime>,
}

impl Account {
    /// Account created on first contact: starting balance plus its seed entry.
    pub fn open(display_name: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            display_name: display_name.into(),
            balance: STARTING_BALANCE,
            history: vec![LedgerEntry {
                at: now,
                amount: STARTING_BALANCE,
                balance: STARTING_BALANCE,
                reason: "starting bonus".to_string(),
            }],
            ..Self::default()
        }
    }

    /// Apply a signed delta, append the entry and trim history to the cap.
    ///
    /// Callers check funds before debiting; the balance itself is not
    /// clamped here. A delta that would overflow the balance is refused
    /// and leaves the account unchanged.
    pub fn apply_delta(
        &mut self,
        amount: i64,
        reason: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<i64, DomainError> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidAmount,
                format!("{amount} would overflow balance {}", self.balance),
            )
        })?;
        self.history.push(LedgerEntry {
            at: now,
            amount,
            balance: self.balance,
            reason: reason.into(),
        });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
        Ok(self.balance)
    }

    pub fn is_banned(&self, now: OffsetDateTime) -> bool {
        self.ban_expiry.is_some_and(|until| until > now)
    }

    pub fn due_reminders(&self, now: OffsetDateTime) -> impl Iterator<Item = &Reminder> + '_ {
        self.reminders.iter().filter(move |r| r.is_due(now))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

    #[test]
    fn open_seeds_balance_and_history() {
        let account = Account::open("alice", NOW);
        assert_eq!(account.balance, STARTING_BALANCE);
        assert_eq!(account.history.len(), 1);
        assert_eq!(account.history[0].balance, STARTING_BALANCE);
    }

    #[test]
    fn history_is_capped_from_the_oldest_end() {
        let mut account = Account::open("bob", NOW);
        for i in 0..60 {
            account.apply_delta(1, format!("tick {i}"), NOW).unwrap();
        }
        assert_eq!(account.history.len(), HISTORY_CAP);
        assert_eq!(account.history.last().unwrap().reason, "tick 59");
        assert_eq!(account.history.first().unwrap().reason, "tick 10");
        assert_eq!(account.history.last().unwrap().balance, account.balance);
    }

    #[test]
    fn overflowing_delta_is_refused_untouched() {
        let mut account = Account::open("carol", NOW);
        let err = account.apply_delta(i64::MAX, "jackpot", NOW).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::InvalidAmount);
        assert_eq!(account.balance, STARTING_BALANCE);
        assert_eq!(account.history.len(), 1);
    }

    #[test]
    fn sparse_snapshot_records_load_with_defaults() {
        let account: Account = serde_json::from_str(r#"{"display_name":"x","balance":5}"#).unwrap();
        assert_eq!(account.balance, 5);
        assert!(account.reminders.is_empty());
        assert!(account.last_daily_claim.is_none());
    }
}
