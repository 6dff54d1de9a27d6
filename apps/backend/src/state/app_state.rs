use std::sync::Arc;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::ledger::Ledger;
use crate::services::{DailyRewardService, ModerationService, QuizService, ReminderService};
use crate::sessions::SessionCoordinator;

/// Shared handles for every component. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub sessions: Arc<SessionCoordinator>,
    pub rewards: Arc<DailyRewardService>,
    pub quiz: Arc<QuizService>,
    pub moderation: Arc<ModerationService>,
    pub reminders: Arc<ReminderService>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}
