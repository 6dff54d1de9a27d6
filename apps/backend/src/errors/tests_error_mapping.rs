// Unit tests for error mapping - pure domain logic, no transport involved
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::ErrorCode;

#[test]
fn maps_validation_kinds() {
    let de = DomainError::validation(ValidationKind::InvalidAmount, "amount must be positive");
    assert_eq!(de.code(), ErrorCode::InvalidAmount);
    assert_eq!(de.detail(), "amount must be positive");

    let funds = DomainError::validation(ValidationKind::InsufficientFunds, "short");
    assert_eq!(funds.code().as_str(), "INSUFFICIENT_FUNDS");

    let illegal = DomainError::validation(ValidationKind::IllegalMove, "e5");
    assert_eq!(illegal.code().as_str(), "ILLEGAL_MOVE");
}

#[test]
fn maps_conflicts() {
    let active = DomainError::conflict(ConflictKind::SessionAlreadyActive, "running");
    assert_eq!(active.code().as_str(), "SESSION_ALREADY_ACTIVE");

    let turn = DomainError::conflict(ConflictKind::NotYourTurn, "waiting for 42");
    assert_eq!(turn.code().as_str(), "NOT_YOUR_TURN");
}

#[test]
fn redeemed_and_missing_checks_share_a_code() {
    let redeemed = DomainError::conflict(ConflictKind::CheckAlreadyRedeemed, "used");
    let missing = DomainError::not_found(NotFoundKind::Check, "nope");
    assert_eq!(redeemed.code(), ErrorCode::UnknownCheck);
    assert_eq!(missing.code(), ErrorCode::UnknownCheck);
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Account, "no account");
    assert_eq!(nf.code().as_str(), "UNKNOWN_ACCOUNT");

    let ns = DomainError::not_found(NotFoundKind::Session, "no game");
    assert_eq!(ns.code().as_str(), "NO_ACTIVE_SESSION");
}

#[test]
fn maps_infra() {
    let p = DomainError::infra(InfraErrorKind::Persistence, "disk full");
    assert_eq!(p.code(), ErrorCode::Internal);
    assert!(p.is_internal());

    let cfg = DomainError::infra(InfraErrorKind::Config, "bad interval");
    assert_eq!(cfg.code(), ErrorCode::ConfigError);

    let forbidden = DomainError::forbidden("not a moderator");
    assert_eq!(forbidden.code(), ErrorCode::Forbidden);
    assert!(!forbidden.is_internal());
}
