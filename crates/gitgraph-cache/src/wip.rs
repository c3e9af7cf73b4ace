//! Raw working-copy captures supplied by the loader.

use serde::{Deserialize, Serialize};

use gitgraph_types::CommitId;

/// The raw material for the synthetic working-copy record: the commit it
/// sits on plus the staged and unstaged status captures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipRevision {
    /// The commit the working copy is based on, if the repository has one.
    pub parent: Option<CommitId>,
    /// Raw name-status text of the index-vs-HEAD capture.
    pub staged_diff: String,
    /// Raw name-status text of the worktree-vs-index capture.
    pub unstaged_diff: String,
}

impl WipRevision {
    /// Create a capture set.
    pub fn new(
        parent: Option<CommitId>,
        staged_diff: impl Into<String>,
        unstaged_diff: impl Into<String>,
    ) -> Self {
        Self {
            parent,
            staged_diff: staged_diff.into(),
            unstaged_diff: unstaged_diff.into(),
        }
    }

    /// Returns `true` if there is anything to build a working-copy record
    /// from: a parent commit or either capture.
    pub fn is_valid(&self) -> bool {
        self.parent.is_some() || !self.staged_diff.is_empty() || !self.unstaged_diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(byte: u8) -> CommitId {
        CommitId::from_raw([byte; 20])
    }

    #[test]
    fn empty_capture_is_invalid() {
        assert!(!WipRevision::default().is_valid());
    }

    #[test]
    fn any_component_makes_it_valid() {
        assert!(WipRevision::new(Some(cid(1)), "", "").is_valid());
        assert!(WipRevision::new(None, "M\ta.txt", "").is_valid());
        assert!(WipRevision::new(None, "", "M\ta.txt").is_valid());
    }
}
