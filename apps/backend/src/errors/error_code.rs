//! Error codes for the parlor core.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! the transport receives in error payloads.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Amount is zero or negative
    InvalidAmount,
    /// Balance does not cover the amount
    InsufficientFunds,
    /// Sender and recipient are the same account
    SelfTransfer,
    /// Move text rejected by the game engine
    IllegalMove,
    /// Command arguments could not be parsed
    InvalidInput,
    /// Daily claim already collected in the last 24 hours
    DailyCooldown,

    // Resource Not Found
    /// Account not registered
    UnknownAccount,
    /// Check code absent or already redeemed
    UnknownCheck,
    /// No game running in the conversation
    NoActiveSession,

    // State Conflicts
    /// A game is already running in the conversation
    SessionAlreadyActive,
    /// Caller does not hold the seat on turn
    NotYourTurn,

    // Authorization
    /// Caller lacks the moderator flag
    Forbidden,

    // System Errors
    /// Internal fault (persistence, exhausted code space)
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [
        Self::InvalidAmount,
        Self::InsufficientFunds,
        Self::SelfTransfer,
        Self::IllegalMove,
        Self::InvalidInput,
        Self::DailyCooldown,
        Self::UnknownAccount,
        Self::UnknownCheck,
        Self::NoActiveSession,
        Self::SessionAlreadyActive,
        Self::NotYourTurn,
        Self::Forbidden,
        Self::Internal,
        Self::ConfigError,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Request Validation
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::SelfTransfer => "SELF_TRANSFER",
            Self::IllegalMove => "ILLEGAL_MOVE",
            Self::InvalidInput => "INVALID_INPUT",
            Self::DailyCooldown => "DAILY_COOLDOWN",

            // Resource Not Found
            Self::UnknownAccount => "UNKNOWN_ACCOUNT",
            Self::UnknownCheck => "UNKNOWN_CHECK",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",

            // State Conflicts
            Self::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            Self::NotYourTurn => "NOT_YOUR_TURN",

            Self::Forbidden => "FORBIDDEN",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }

    /// Human-readable title derived from the code ("NOT_YOUR_TURN" -> "Not Your Turn").
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
