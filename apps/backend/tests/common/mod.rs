//! Shared setup for the integration test binaries.
//!
//! Every test file does `mod common;` so logging is initialised once per
//! binary before any test runs.

#![allow(dead_code)]

pub mod proptest_prelude;

use parlor::{build_state, AccountId, AppState, ConversationId};
use parlor_test_support::unique_helpers::{unique_account, unique_conversation};

#[ctor::ctor]
fn init_logging() {
    parlor_test_support::logging::init();
}

/// In-memory state with deterministic codes and rewards.
pub fn seeded_state(seed: u64) -> AppState {
    build_state()
        .in_memory()
        .with_seed(seed)
        .build()
        .expect("build in-memory state")
}

/// A registered account with the starting balance.
pub fn registered(state: &AppState, label: &str) -> AccountId {
    let id = AccountId::from(unique_account(label).as_str());
    state
        .ledger
        .register(&id, label)
        .expect("register test account");
    id
}

pub fn conversation() -> ConversationId {
    ConversationId::from(unique_conversation().as_str())
}
