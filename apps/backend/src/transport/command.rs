//! Chat text → [`Command`].

use time::Time;

use crate::domain::AccountId;
use crate::errors::{DomainError, ValidationKind};
use crate::games::Variant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Balance,
    History { limit: Option<usize> },
    Transfer { to: AccountId, amount: i64 },
    CreateCheck { amount: i64 },
    ActivateCheck { code: String },
    Daily,
    Quiz { category: Option<String> },
    /// 1-based option number.
    Answer { choice: usize },
    Remind { at: Time, text: String },
    NewGame(Variant),
    Challenge { variant: Variant, opponent: AccountId },
    Move { args: String },
    EndGame,
    Session,
    Warn { target: AccountId, reason: String },
    Ban { target: AccountId, reason: String },
    Unban { target: AccountId },
    ClearWarnings { target: AccountId },
    Statistics,
    /// Anything that is not a command; counted as a message.
    Text,
}

fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidInput, detail)
}

fn usage(text: &str) -> DomainError {
    invalid(format!("usage: {text}"))
}

fn parse_amount(raw: &str) -> Result<i64, DomainError> {
    raw.parse()
        .map_err(|_| invalid(format!("{raw:?} is not a whole number")))
}

fn parse_variant(raw: &str) -> Result<Variant, DomainError> {
    match raw.to_ascii_lowercase().as_str() {
        "chess" => Ok(Variant::Chess),
        "checkers" => Ok(Variant::Checkers),
        other => Err(invalid(format!("unknown game {other:?}"))),
    }
}

/// `HH:MM`, 24-hour.
fn parse_time(raw: &str) -> Result<Time, DomainError> {
    let bad = || invalid(format!("{raw:?} is not a HH:MM time"));
    let (h, m) = raw.split_once(':').ok_or_else(bad)?;
    let hour: u8 = h.parse().map_err(|_| bad())?;
    let minute: u8 = m.parse().map_err(|_| bad())?;
    Time::from_hms(hour, minute, 0).map_err(|_| bad())
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Ok(Command::Text);
        };

        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        // "/balance@parlor_bot" addresses a specific bot in group chats.
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
        let mut words = rest.split_whitespace();

        let command = match name.as_str() {
            "start" => Command::Start,
            "balance" => Command::Balance,
            "history" => Command::History {
                limit: match words.next() {
                    Some(raw) => Some(
                        raw.parse()
                            .map_err(|_| invalid(format!("{raw:?} is not a count")))?,
                    ),
                    None => None,
                },
            },
            "transfer" => {
                let (Some(to), Some(amount)) = (words.next(), words.next()) else {
                    return Err(usage("/transfer <account> <amount>"));
                };
                Command::Transfer {
                    to: AccountId::from(to),
                    amount: parse_amount(amount)?,
                }
            }
            "create_check" => {
                let amount = words.next().ok_or_else(|| usage("/create_check <amount>"))?;
                Command::CreateCheck {
                    amount: parse_amount(amount)?,
                }
            }
            "activate_check" => {
                let code = words.next().ok_or_else(|| usage("/activate_check <code>"))?;
                Command::ActivateCheck {
                    code: code.to_string(),
                }
            }
            "daily" => Command::Daily,
            "quiz" => Command::Quiz {
                category: words.next().map(str::to_string),
            },
            "answer" => {
                let raw = words.next().ok_or_else(|| usage("/answer <option number>"))?;
                let choice = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid(format!("{raw:?} is not an option number")))?;
                Command::Answer { choice }
            }
            "remind" => {
                let (at, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| usage("/remind <HH:MM> <text>"))?;
                Command::Remind {
                    at: parse_time(at)?,
                    text: text.trim().to_string(),
                }
            }
            "game_chess" => Command::NewGame(Variant::Chess),
            "game_checkers" => Command::NewGame(Variant::Checkers),
            "challenge" => {
                let (Some(variant), Some(opponent)) = (words.next(), words.next()) else {
                    return Err(usage("/challenge <chess|checkers> <account>"));
                };
                Command::Challenge {
                    variant: parse_variant(variant)?,
                    opponent: AccountId::from(opponent),
                }
            }
            "move" => {
                if rest.is_empty() {
                    return Err(usage("/move <move>"));
                }
                Command::Move {
                    args: rest.to_string(),
                }
            }
            "end_game" => Command::EndGame,
            "session" => Command::Session,
            "warn" | "ban" => {
                let target = words
                    .next()
                    .ok_or_else(|| usage(&format!("/{name} <account> [reason]")))?;
                let reason = words.collect::<Vec<_>>().join(" ");
                let target = AccountId::from(target);
                if name == "warn" {
                    Command::Warn { target, reason }
                } else {
                    Command::Ban { target, reason }
                }
            }
            "unban" => Command::Unban {
                target: AccountId::from(words.next().ok_or_else(|| usage("/unban <account>"))?),
            },
            "clearwarns" => Command::ClearWarnings {
                target: AccountId::from(
                    words.next().ok_or_else(|| usage("/clearwarns <account>"))?,
                ),
            },
            "statistics" => Command::Statistics,
            other => return Err(invalid(format!("unknown command /{other}"))),
        };
        Ok(command)
    }
}
