//! Opaque identifiers handed in by the transport.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rules::{CHECK_ALPHABET, CHECK_CODE_LEN};

/// Ledger participant, the string form of the platform's numeric user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Chat in which a game session lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Bearer check code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckCode(String);

impl CheckCode {
    /// Draw a fresh code from the check alphabet.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CHECK_CODE_LEN)
            .map(|_| CHECK_ALPHABET[rng.random_range(0..CHECK_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Normalise user input: surrounding whitespace dropped, upper-cased.
    pub fn normalise(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// True when the code has the issued shape (length and alphabet).
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == CHECK_CODE_LEN && self.0.bytes().all(|b| CHECK_ALPHABET.contains(&b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
