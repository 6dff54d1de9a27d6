//! Reminders and the periodic sweep that delivers them.
//!
//! The sweep goes through [`Ledger::update_account`] like any foreground
//! operation, so it only ever holds one account lock at a time.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use ulid::Ulid;

use crate::domain::{AccountId, Reminder};
use crate::errors::{DomainError, ValidationKind};
use crate::ledger::Ledger;

#[derive(Debug, Error)]
#[error("reminder delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Outbound channel for due reminders, normally the chat transport.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn deliver(&self, account: &AccountId, reminder: &Reminder) -> Result<(), DeliveryError>;
}

/// Sink that only writes the reminder to the log.
#[derive(Debug, Default)]
pub struct LogReminderSink;

#[async_trait]
impl ReminderSink for LogReminderSink {
    async fn deliver(&self, account: &AccountId, reminder: &Reminder) -> Result<(), DeliveryError> {
        info!(account_id = %account, reminder_id = %reminder.id, text = %reminder.text, "reminder due");
        Ok(())
    }
}

pub struct ReminderService {
    ledger: Arc<Ledger>,
}

impl ReminderService {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn set_reminder(
        &self,
        id: &AccountId,
        text: &str,
        due_at: OffsetDateTime,
    ) -> Result<Reminder, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidInput,
                "reminder text is empty",
            ));
        }
        let reminder = self.ledger.update_account(id, |account, now| {
            let reminder = Reminder {
                id: Ulid::new(),
                text: text.to_string(),
                due_at,
                created_at: now,
                completed: false,
            };
            account.reminders.push(reminder.clone());
            Ok(reminder)
        })?;
        info!(account_id = %id, reminder_id = %reminder.id, "reminder set");
        Ok(reminder)
    }

    pub fn pending(&self, id: &AccountId) -> Result<Vec<Reminder>, DomainError> {
        let account = self.ledger.account(id)?;
        Ok(account.reminders.into_iter().filter(|r| !r.completed).collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub delivered: usize,
    pub failed: usize,
}

pub struct ReminderSweeper {
    ledger: Arc<Ledger>,
    sink: Arc<dyn ReminderSink>,
}

impl ReminderSweeper {
    pub fn new(ledger: Arc<Ledger>, sink: Arc<dyn ReminderSink>) -> Self {
        Self { ledger, sink }
    }

    /// Deliver every due reminder once. Only reminders the sink accepted
    /// are marked completed; the rest are retried next tick.
    pub async fn sweep_once(&self) -> SweepReport {
        let now = self.ledger.now();
        let mut report = SweepReport::default();

        for id in self.ledger.account_ids() {
            let Ok(account) = self.ledger.account(&id) else {
                continue;
            };
            let due: Vec<Reminder> = account.due_reminders(now).cloned().collect();
            if due.is_empty() {
                continue;
            }

            let mut delivered: Vec<Ulid> = Vec::with_capacity(due.len());
            for reminder in &due {
                match self.sink.deliver(&id, reminder).await {
                    Ok(()) => delivered.push(reminder.id),
                    Err(e) => {
                        report.failed += 1;
                        error!(account_id = %id, reminder_id = %reminder.id, error = %e, "reminder delivery failed");
                    }
                }
            }
            if delivered.is_empty() {
                continue;
            }

            let marked = self.ledger.update_account(&id, |account, _| {
                for r in account.reminders.iter_mut().filter(|r| delivered.contains(&r.id)) {
                    r.completed = true;
                }
                Ok(())
            });
            match marked {
                Ok(()) => report.delivered += delivered.len(),
                Err(e) => error!(account_id = %id, error = %e, "could not mark reminders completed"),
            }
        }

        debug!(delivered = report.delivered, failed = report.failed, "reminder sweep done");
        report
    }

    /// Run `sweep_once` every `period` until the task is aborted.
    pub fn spawn(self: Arc<Self>, period: StdDuration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}
