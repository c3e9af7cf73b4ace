//! Core reference types.

use serde::{Deserialize, Serialize};

/// The kind of a named reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    /// A branch in the local repository.
    LocalBranch,
    /// A remote-tracking branch (e.g. `origin/main`).
    RemoteBranch,
    /// A tag.
    Tag,
}

/// The reference names attached to one commit, grouped by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRefs {
    /// Local branch names pointing at the commit.
    pub local_branches: Vec<String>,
    /// Remote-tracking branch names pointing at the commit.
    pub remote_branches: Vec<String>,
    /// Tag names pointing at the commit.
    pub tags: Vec<String>,
}

impl CommitRefs {
    /// Create an empty association set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no name of any kind is attached.
    pub fn is_empty(&self) -> bool {
        self.local_branches.is_empty()
            && self.remote_branches.is_empty()
            && self.tags.is_empty()
    }

    /// The names of one kind.
    pub fn of_kind(&self, kind: RefKind) -> &[String] {
        match kind {
            RefKind::LocalBranch => &self.local_branches,
            RefKind::RemoteBranch => &self.remote_branches,
            RefKind::Tag => &self.tags,
        }
    }

    /// Append a name under a kind, ignoring exact duplicates.
    pub fn insert(&mut self, kind: RefKind, name: &str) {
        let names = match kind {
            RefKind::LocalBranch => &mut self.local_branches,
            RefKind::RemoteBranch => &mut self.remote_branches,
            RefKind::Tag => &mut self.tags,
        };
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Remove a name from one kind. Returns `true` if it was present.
    pub fn remove(&mut self, kind: RefKind, name: &str) -> bool {
        let names = match kind {
            RefKind::LocalBranch => &mut self.local_branches,
            RefKind::RemoteBranch => &mut self.remote_branches,
            RefKind::Tag => &mut self.tags,
        };
        let before = names.len();
        names.retain(|n| n != name);
        names.len() != before
    }
}

/// Ahead/behind commit counts of a local branch against its tracked remote.
///
/// Stored, never computed, by this crate. Absence of a `BranchDistance`
/// means the counts are unknown; `default()` means confirmed in sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDistance {
    /// Commits on the local branch the remote lacks.
    pub ahead: u32,
    /// Commits on the remote the local branch lacks.
    pub behind: u32,
}

impl BranchDistance {
    /// Create a distance record.
    pub fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }

    /// Returns `true` if local and remote are at the same commit.
    pub fn in_sync(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_groups_by_kind() {
        let mut refs = CommitRefs::new();
        refs.insert(RefKind::LocalBranch, "main");
        refs.insert(RefKind::RemoteBranch, "origin/main");
        refs.insert(RefKind::Tag, "v1.0.0");

        assert_eq!(refs.of_kind(RefKind::LocalBranch), ["main"]);
        assert_eq!(refs.of_kind(RefKind::RemoteBranch), ["origin/main"]);
        assert_eq!(refs.of_kind(RefKind::Tag), ["v1.0.0"]);
        assert!(!refs.is_empty());
    }

    #[test]
    fn duplicate_names_are_ignored() {
        let mut refs = CommitRefs::new();
        refs.insert(RefKind::Tag, "v1.0.0");
        refs.insert(RefKind::Tag, "v1.0.0");
        assert_eq!(refs.of_kind(RefKind::Tag).len(), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let mut refs = CommitRefs::new();
        refs.insert(RefKind::LocalBranch, "main");
        assert!(refs.remove(RefKind::LocalBranch, "main"));
        assert!(!refs.remove(RefKind::LocalBranch, "main"));
        assert!(refs.is_empty());
    }

    #[test]
    fn distance_in_sync_means_both_zero() {
        assert!(BranchDistance::default().in_sync());
        assert!(!BranchDistance::new(1, 0).in_sync());
        assert!(!BranchDistance::new(0, 3).in_sync());
    }
}
