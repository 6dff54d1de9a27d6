//! Transport-facing surface: command parsing, dispatch and the console
//! adapter used by the binary.

pub mod command;
pub mod console;
pub mod dispatch;

use serde::Serialize;

pub use command::Command;
pub use dispatch::{dispatch, CommandContext, Reply};

use crate::errors::{DomainError, ErrorCode};

/// Error body handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub title: String,
    pub detail: String,
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> Self {
        let code = err.code();
        // Internal details stay in the logs.
        let detail = if err.is_internal() {
            "internal error".to_string()
        } else {
            err.detail().to_string()
        };
        Self {
            code,
            title: code.title(),
            detail,
        }
    }
}
