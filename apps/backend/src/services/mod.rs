//! Account services layered over the ledger.

mod daily;
mod dice;
mod moderation;
mod quiz;
pub mod reminders;

pub use daily::{DailyClaim, DailyRewardService};
pub use dice::Dice;
pub use moderation::{ModerationService, WarnOutcome};
pub use quiz::{QuizOutcome, QuizPrompt, QuizService};
pub use reminders::{LogReminderSink, ReminderService, ReminderSink, ReminderSweeper, SweepReport};
