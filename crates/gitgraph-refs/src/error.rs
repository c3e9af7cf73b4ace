//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The reference name violates git naming rules.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidName { name: String, reason: String },
}

/// Convenience alias for ref results.
pub type RefResult<T> = Result<T, RefError>;
