//! Thread-safe in-memory commit-graph cache for gitgraph.
//!
//! [`RepoCache`] is the single shared structure a repository loader writes
//! into and readers query. It stores commit records by row and id, stitches
//! parent/child links as commits arrive in any order, drives the lane
//! engine over the settled prefix of history, caches parsed revision files
//! under a shared path-intern pool, and indexes references and branch
//! distances.
//!
//! All state lives behind one mutex. Operations are lock, O(affected rows)
//! work, unlock; no I/O happens while the lock is held. Change observers
//! run after the lock is released, so they may re-enter the cache freely.
//!
//! # Key Types
//!
//! - [`RepoCache`] — the facade
//! - [`WipRevision`] — raw working-copy captures fed by the loader
//! - [`CacheOptions`] — construction-time behavior toggles
//! - [`CacheError`] — `NotReady` and lock failures

pub mod cache;
pub mod error;
pub mod store;
pub mod wip;

pub use cache::{CacheOptions, RepoCache, Subtree};
pub use error::{CacheError, CacheResult};
pub use wip::WipRevision;
