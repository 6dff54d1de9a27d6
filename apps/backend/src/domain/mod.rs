//! Domain layer: account, check and identifier types plus fixed rules.

pub mod account;
pub mod check;
pub mod ids;
pub mod rules;

pub use account::{Account, LedgerEntry, Reminder, Warning};
pub use check::Check;
pub use ids::{AccountId, CheckCode, ConversationId};
