use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::errors::DomainError;
use crate::ledger::{CodeSource, Ledger, RandomCodes};
use crate::persistence::{JsonFileStore, MemoryStore, SnapshotStore};
use crate::services::{DailyRewardService, Dice, ModerationService, QuizService, ReminderService};
use crate::sessions::{SessionCoordinator, SessionRegistry};
use crate::state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
#[derive(Default)]
pub struct StateBuilder {
    config: AppConfig,
    store: Option<Arc<dyn SnapshotStore>>,
    in_memory: bool,
    clock: Option<Arc<dyn Clock>>,
    seed: Option<u64>,
    codes: Option<Arc<dyn CodeSource>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Keep snapshots in memory instead of the configured data directory.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Overrides `PARLOR_RNG_SEED`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn build(self) -> Result<AppState, DomainError> {
        let config = self.config;
        let store: Arc<dyn SnapshotStore> = match self.store {
            Some(store) => store,
            None if self.in_memory => Arc::new(MemoryStore::new()),
            None => Arc::new(JsonFileStore::open(
                &config.data_dir,
                &config.accounts_file,
                &config.checks_file,
            )?),
        };
        let seed = self.seed.or(config.rng_seed);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let codes = self
            .codes
            .unwrap_or_else(|| Arc::new(RandomCodes::new(seed)) as Arc<dyn CodeSource>);

        let ledger = Arc::new(Ledger::load(store, codes, Arc::clone(&clock))?);
        // Rewards draw from their own stream so seeded code sequences stay stable.
        let dice = Arc::new(Dice::new(seed.map(|s| s.wrapping_add(1))));

        let sessions = Arc::new(SessionCoordinator::new(
            Arc::new(SessionRegistry::new()),
            Arc::clone(&ledger),
            Arc::clone(&dice),
            Arc::clone(&clock),
        ));
        let rewards = Arc::new(DailyRewardService::new(Arc::clone(&ledger), Arc::clone(&dice)));
        let quiz = Arc::new(QuizService::new(Arc::clone(&ledger), dice));
        let moderation = Arc::new(ModerationService::new(Arc::clone(&ledger)));
        let reminders = Arc::new(ReminderService::new(Arc::clone(&ledger)));

        for id in &config.moderators {
            ledger.register(id, id.as_str())?;
            moderation.set_moderator(id, true)?;
        }
        info!(moderators = config.moderators.len(), "application state built");

        Ok(AppState {
            ledger,
            sessions,
            rewards,
            quiz,
            moderation,
            reminders,
            clock,
            config: Arc::new(config),
        })
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
