//! Error types for diff parsing.

use thiserror::Error;

/// Errors that can occur while parsing diff text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    /// A stanza matched no recognized status pattern. The parse loop skips
    /// these, tolerating backend format drift.
    #[error("unrecognized diff stanza: {stanza:?}")]
    UnknownStatus { stanza: String },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
