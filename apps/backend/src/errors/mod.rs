//! Error handling for the parlor core.

pub mod domain;
pub mod error_code;
#[cfg(test)]
mod tests_error_mapping;

pub use domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind};
pub use error_code::ErrorCode;
