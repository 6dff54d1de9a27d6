//! Per-conversation game sessions and their lifecycle.

mod coordinator;
mod registry;
mod session;

pub use coordinator::{format_duration, AbortSummary, MoveOutcome, Reward, SessionCoordinator};
pub use registry::SessionRegistry;
pub use session::{GameSession, Seat, SessionView};
