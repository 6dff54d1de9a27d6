use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{LedgerSnapshot, PersistenceError, SnapshotStore};

/// In-process store. `fail_saves(true)` makes every save fail until reset.
#[derive(Debug, Default)]
pub struct MemoryStore {
    initial: LedgerSnapshot,
    last_saved: Mutex<Option<LedgerSnapshot>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose first `load` returns `snapshot`.
    pub fn seeded(snapshot: LedgerSnapshot) -> Self {
        Self {
            initial: snapshot,
            ..Self::default()
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn last_saved(&self) -> Option<LedgerSnapshot> {
        self.last_saved.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<LedgerSnapshot, PersistenceError> {
        Ok(self
            .last_saved
            .lock()
            .clone()
            .unwrap_or_else(|| self.initial.clone()))
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Injected);
        }
        *self.last_saved.lock() = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
