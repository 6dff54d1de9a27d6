//! Reminder sweep against a sink that refuses some deliveries.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::registered;
use parking_lot::Mutex;
use parlor::domain::Reminder;
use parlor::services::reminders::DeliveryError;
use parlor::services::{ReminderSink, ReminderSweeper, SweepReport};
use parlor::{build_state, AccountId, AppState, ManualClock};
use time::macros::datetime;
use time::Duration;

/// Records deliveries; refuses everything addressed to `refuse`.
struct RecordingSink {
    refuse: Mutex<Option<AccountId>>,
    delivered: Mutex<Vec<(AccountId, String)>>,
}

impl RecordingSink {
    fn refusing(id: &AccountId) -> Self {
        Self {
            refuse: Mutex::new(Some(id.clone())),
            delivered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReminderSink for RecordingSink {
    async fn deliver(&self, account: &AccountId, reminder: &Reminder) -> Result<(), DeliveryError> {
        if self.refuse.lock().as_ref() == Some(account) {
            return Err(DeliveryError(format!("{account} is unreachable")));
        }
        self.delivered
            .lock()
            .push((account.clone(), reminder.text.clone()));
        Ok(())
    }
}

fn state_at(clock: &ManualClock) -> AppState {
    build_state()
        .in_memory()
        .with_clock(Arc::new(clock.clone()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn undelivered_reminders_stay_pending_until_the_sink_accepts() {
    let clock = ManualClock::new(datetime!(2026-06-01 9:00 UTC));
    let state = state_at(&clock);
    let reachable = registered(&state, "reachable");
    let offline = registered(&state, "offline");

    let due = datetime!(2026-06-01 9:30 UTC);
    state.reminders.set_reminder(&reachable, "stand-up", due).unwrap();
    state.reminders.set_reminder(&offline, "stretch", due).unwrap();
    state
        .reminders
        .set_reminder(&reachable, "lunch", datetime!(2026-06-01 12:00 UTC))
        .unwrap();

    let sink = Arc::new(RecordingSink::refusing(&offline));
    let sweeper = ReminderSweeper::new(state.ledger.clone(), sink.clone());

    assert_eq!(sweeper.sweep_once().await, SweepReport::default());

    clock.advance(Duration::minutes(45));
    let report = sweeper.sweep_once().await;
    assert_eq!(report, SweepReport { delivered: 1, failed: 1 });
    assert_eq!(
        *sink.delivered.lock(),
        [(reachable.clone(), "stand-up".to_string())]
    );
    assert_eq!(state.reminders.pending(&reachable).unwrap().len(), 1);
    assert_eq!(state.reminders.pending(&offline).unwrap().len(), 1);

    // Delivered reminders are not sent twice; the refused one is retried.
    *sink.refuse.lock() = None;
    let report = sweeper.sweep_once().await;
    assert_eq!(report, SweepReport { delivered: 1, failed: 0 });
    assert!(state.reminders.pending(&offline).unwrap().is_empty());

    clock.advance(Duration::hours(3));
    let report = sweeper.sweep_once().await;
    assert_eq!(report.delivered, 1);
    assert!(state.reminders.pending(&reachable).unwrap().is_empty());
    assert_eq!(sink.delivered.lock().len(), 3);
}

#[test]
fn blank_reminder_text_is_rejected() {
    let clock = ManualClock::new(datetime!(2026-06-01 9:00 UTC));
    let state = state_at(&clock);
    let id = registered(&state, "r");
    let err = state
        .reminders
        .set_reminder(&id, "   ", datetime!(2026-06-01 10:00 UTC))
        .unwrap_err();
    assert_eq!(err.code(), parlor::ErrorCode::InvalidInput);
}
