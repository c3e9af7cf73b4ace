//! Diff-text parsing for gitgraph.
//!
//! Converts the raw name-status text produced by the repository backend into
//! structured per-file change records. Path strings are interned into a
//! shared [`PathPool`] (split directory / file-name tables) so large
//! histories do not duplicate path storage per revision.
//!
//! # Key Types
//!
//! - [`PathPool`] / [`FilePath`] — shared intern tables and their handles
//! - [`RevisionFiles`] / [`FileEntry`] — one parsed revision's file changes
//! - [`ChangeStatus`] — the kind of change a file underwent
//! - [`FileChange`] — a resolved, owned view for consumers
//! - [`parse_diff`] / [`parse_combined_status`] — the parsers

pub mod error;
pub mod files;
pub mod intern;
pub mod parser;

pub use error::{DiffError, DiffResult};
pub use files::{ChangeStatus, FileChange, FileEntry, RevisionFiles};
pub use intern::{FilePath, PathPool};
pub use parser::{parse_combined_status, parse_diff};
