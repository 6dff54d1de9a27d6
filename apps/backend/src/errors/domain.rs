//! Domain-level error type used across the ledger, the session
//! coordinator and the transport-facing command surface.
//!
//! Every caller-facing operation returns `Result<T, DomainError>`. The
//! transport picks a user-facing message from [`DomainError::code`] and
//! never has to inspect the detail string.

use thiserror::Error;

use super::error_code::ErrorCode;

/// Caller input that is malformed or out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidAmount,
    InsufficientFunds,
    SelfTransfer,
    IllegalMove,
    InvalidInput,
    DailyCooldown,
}

/// Operation is well-formed but not valid for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    SessionAlreadyActive,
    NotYourTurn,
    CheckAlreadyRedeemed,
}

/// Domain-level missing entities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Account,
    Check,
    Session,
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Persistence,
    CodeSpaceExhausted,
    Config,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    #[error("validation error {0:?}: {1}")]
    Validation(ValidationKind, String),
    /// Operation invalid for the current state
    #[error("conflict {0:?}: {1}")]
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
    /// Caller lacks the moderator flag
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Infrastructure/operational failures
    #[error("infra {0:?}: {1}")]
    Infra(InfraErrorKind, String),
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Stable code the transport uses to pick a reply.
    ///
    /// A check that is missing and a check that was already redeemed both
    /// surface as [`ErrorCode::UnknownCheck`]; the caller cannot tell them
    /// apart, which keeps redeemed codes from being discovered by guessing.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::InvalidAmount => ErrorCode::InvalidAmount,
                ValidationKind::InsufficientFunds => ErrorCode::InsufficientFunds,
                ValidationKind::SelfTransfer => ErrorCode::SelfTransfer,
                ValidationKind::IllegalMove => ErrorCode::IllegalMove,
                ValidationKind::InvalidInput => ErrorCode::InvalidInput,
                ValidationKind::DailyCooldown => ErrorCode::DailyCooldown,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::SessionAlreadyActive => ErrorCode::SessionAlreadyActive,
                ConflictKind::NotYourTurn => ErrorCode::NotYourTurn,
                ConflictKind::CheckAlreadyRedeemed => ErrorCode::UnknownCheck,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Account => ErrorCode::UnknownAccount,
                NotFoundKind::Check => ErrorCode::UnknownCheck,
                NotFoundKind::Session => ErrorCode::NoActiveSession,
            },
            DomainError::Forbidden(_) => ErrorCode::Forbidden,
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::Config => ErrorCode::ConfigError,
                _ => ErrorCode::Internal,
            },
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Infra(_, d) => d,
            DomainError::Forbidden(d) => d,
        }
    }

    /// True for faults the caller cannot fix by changing its input.
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Infra(..))
    }
}
