//! # Validation Errors
//!
//! Errors raised while constructing core types from untrusted input.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations; the state machines and the API layer define their own
//! richer error types on top of these.

use thiserror::Error;

/// Error constructing a core type from external input.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A timestamp string failed to parse or violated the UTC-only rule.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A role token was not one of the four platform roles.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}
