//! Snapshot persistence for accounts and checks.
//!
//! The ledger hands a full snapshot to the store after every mutation and
//! only applies the mutation in memory once the save has succeeded.

mod json_file;
mod memory;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::domain::{Account, AccountId, Check, CheckCode};
use crate::errors::{DomainError, InfraErrorKind};

/// Full persisted state: one document per map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: BTreeMap<AccountId, Account>,
    pub checks: BTreeMap<CheckCode, Check>,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("data directory {0} is locked by another process")]
    Locked(PathBuf),
    #[error("save rejected by store")]
    Injected,
}

impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        DomainError::infra(InfraErrorKind::Persistence, err.to_string())
    }
}

/// Load/save gateway for ledger snapshots.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<LedgerSnapshot, PersistenceError>;
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), PersistenceError>;
}
