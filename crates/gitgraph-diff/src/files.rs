//! Structured per-file change records for one revision.

use serde::{Deserialize, Serialize};

use crate::intern::{FilePath, PathPool};

/// The kind of change a file underwent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// A file that did not exist in the old revision.
    Added,
    /// An existing file whose content (or type) changed.
    Modified,
    /// A file removed in the new revision.
    Deleted,
    /// A file moved from another path.
    Renamed,
    /// A file copied from another path.
    Copied,
}

/// One file's change within a revision, with interned path handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// The file's path in the new revision.
    pub path: FilePath,
    /// The old path, for renames and copies.
    pub old_path: Option<FilePath>,
    /// The kind of change.
    pub status: ChangeStatus,
    /// Rename/copy similarity percentage; zero for other statuses.
    pub similarity: u8,
    /// `true` if the change is staged (in the index), for working-copy
    /// captures.
    pub staged: bool,
}

impl FileEntry {
    /// Create an entry with no old path and zero similarity.
    pub fn new(path: FilePath, status: ChangeStatus, staged: bool) -> Self {
        Self {
            path,
            old_path: None,
            status,
            similarity: 0,
            staged,
        }
    }
}

/// The ordered file changes of one revision pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionFiles {
    /// The parsed entries, in stanza order.
    pub files: Vec<FileEntry>,
}

impl RevisionFiles {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file changed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns `true` if any entry's path resolves to `path`.
    pub fn touches(&self, pool: &PathPool, path: &str) -> bool {
        self.files
            .iter()
            .any(|e| pool.path_string(e.path) == path)
    }

    /// Resolve all entries into owned [`FileChange`] views.
    pub fn resolve(&self, pool: &PathPool) -> Vec<FileChange> {
        self.files
            .iter()
            .map(|e| FileChange {
                path: pool.path_string(e.path),
                old_path: e.old_path.map(|p| pool.path_string(p)),
                status: e.status,
                similarity: e.similarity,
                staged: e.staged,
            })
            .collect()
    }
}

/// A resolved file change with owned path strings, for consumers that do
/// not hold the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// The file's path in the new revision.
    pub path: String,
    /// The old path, for renames and copies.
    pub old_path: Option<String>,
    /// The kind of change.
    pub status: ChangeStatus,
    /// Rename/copy similarity percentage.
    pub similarity: u8,
    /// `true` if the change is staged.
    pub staged: bool,
}
