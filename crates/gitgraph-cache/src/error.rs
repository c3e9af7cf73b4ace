//! Error types for cache operations.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store was cleared for a reload and no record of the new load has
    /// arrived yet. Distinct from an empty result: readers must not treat
    /// mid-reload state as valid history.
    #[error("commit store is reloading and not ready")]
    NotReady,

    /// A lock was poisoned by a panicking writer.
    #[error("cache lock poisoned: {0}")]
    LockPoisoned(String),

    /// A reference operation failed.
    #[error(transparent)]
    Ref(#[from] gitgraph_refs::RefError),
}

/// Convenience alias for cache results.
pub type CacheResult<T> = Result<T, CacheError>;
