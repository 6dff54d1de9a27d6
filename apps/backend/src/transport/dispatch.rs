//! Routes parsed commands to the ledger, sessions and services.

use serde::Serialize;
use time::{Duration, OffsetDateTime, Time};
use tracing::{debug, warn};

use super::command::Command;
use crate::domain::rules::DEFAULT_HISTORY_LIMIT;
use crate::domain::{AccountId, ConversationId, LedgerEntry};
use crate::errors::DomainError;
use crate::ledger::{IssuedCheck, Redemption, Registration, Statistics, TransferReceipt};
use crate::services::{DailyClaim, QuizOutcome, QuizPrompt, WarnOutcome};
use crate::sessions::{AbortSummary, MoveOutcome, SessionView};
use crate::state::AppState;

const STATISTICS_TOP_N: usize = 10;

/// Caller identity as vouched for by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub account: AccountId,
    pub display_name: String,
    pub conversation: ConversationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Registered {
        registration: Registration,
        balance: i64,
    },
    Balance {
        balance: i64,
    },
    History {
        entries: Vec<LedgerEntry>,
    },
    Transferred(TransferReceipt),
    CheckIssued(IssuedCheck),
    CheckRedeemed(Redemption),
    Daily(DailyClaim),
    Quiz(QuizPrompt),
    QuizAnswered(QuizOutcome),
    ReminderSet {
        id: String,
        #[serde(with = "time::serde::rfc3339")]
        due_at: OffsetDateTime,
    },
    Session(SessionView),
    Moved(MoveOutcome),
    Aborted(AbortSummary),
    Warned(WarnOutcome),
    Banned {
        #[serde(with = "time::serde::rfc3339")]
        until: OffsetDateTime,
    },
    Unbanned,
    WarningsCleared {
        count: usize,
    },
    Statistics(Statistics),
    Noted {
        messages: u64,
    },
}

/// Next occurrence of `at` (UTC) strictly after `now`, or at `now` exactly.
pub fn next_occurrence(now: OffsetDateTime, at: Time) -> OffsetDateTime {
    let today = now.replace_time(at);
    if today < now {
        today + Duration::days(1)
    } else {
        today
    }
}

pub fn dispatch(state: &AppState, ctx: &CommandContext, command: Command) -> Result<Reply, DomainError> {
    debug!(account_id = %ctx.account, conversation_id = %ctx.conversation, ?command, "dispatch");

    if let Ok(account) = state.ledger.account(&ctx.account) {
        if let Some(until) = account.ban_expiry.filter(|_| account.is_banned(state.clock.now())) {
            warn!(account_id = %ctx.account, "command from banned account");
            return Err(DomainError::forbidden(format!(
                "{} is banned until {until}",
                ctx.account
            )));
        }
    }

    let me = &ctx.account;
    let conv = &ctx.conversation;
    let reply = match command {
        Command::Start => {
            let registration = state.ledger.register(me, &ctx.display_name)?;
            Reply::Registered {
                registration,
                balance: state.ledger.balance(me)?,
            }
        }
        Command::Text => {
            state.ledger.register(me, &ctx.display_name)?;
            Reply::Noted {
                messages: state.ledger.record_message(me)?,
            }
        }
        Command::Balance => Reply::Balance {
            balance: state.ledger.balance(me)?,
        },
        Command::History { limit } => Reply::History {
            entries: state
                .ledger
                .history(me, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?,
        },
        Command::Transfer { to, amount } => {
            Reply::Transferred(state.ledger.transfer(me, &to, amount)?)
        }
        Command::CreateCheck { amount } => Reply::CheckIssued(state.ledger.issue_check(me, amount)?),
        Command::ActivateCheck { code } => {
            Reply::CheckRedeemed(state.ledger.redeem_check(me, &code)?)
        }
        Command::Daily => Reply::Daily(state.rewards.claim_daily(me)?),
        Command::Quiz { category } => Reply::Quiz(state.quiz.ask(me, category.as_deref())?),
        Command::Answer { choice } => Reply::QuizAnswered(state.quiz.answer(me, choice)?),
        Command::Remind { at, text } => {
            let due_at = next_occurrence(state.clock.now(), at);
            let reminder = state.reminders.set_reminder(me, &text, due_at)?;
            Reply::ReminderSet {
                id: reminder.id.to_string(),
                due_at: reminder.due_at,
            }
        }
        Command::NewGame(variant) => Reply::Session(state.sessions.start(conv, variant, me)?),
        Command::Challenge { variant, opponent } => {
            Reply::Session(state.sessions.challenge(conv, variant, me, &opponent)?)
        }
        Command::Move { args } => Reply::Moved(state.sessions.make_move(conv, me, &args)?),
        Command::EndGame => Reply::Aborted(state.sessions.abort(conv)?),
        Command::Session => Reply::Session(state.sessions.session(conv)?),
        Command::Warn { target, reason } => {
            Reply::Warned(state.moderation.warn(me, &target, &reason)?)
        }
        Command::Ban { target, reason } => Reply::Banned {
            until: state.moderation.ban(me, &target, &reason)?,
        },
        Command::Unban { target } => {
            state.moderation.unban(me, &target)?;
            Reply::Unbanned
        }
        Command::ClearWarnings { target } => Reply::WarningsCleared {
            count: state.moderation.clear_warnings(me, &target)?,
        },
        Command::Statistics => Reply::Statistics(state.ledger.statistics(STATISTICS_TOP_N)),
    };
    Ok(reply)
}
