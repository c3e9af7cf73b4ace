//! The in-memory reference index.
//!
//! [`RefIndex`] keys [`CommitRefs`] by commit id and additionally holds the
//! branch-distance table and the merged remote-tag map. Refresh cycles
//! clear the per-commit associations and re-insert; remote tags and
//! distances survive a clear and are replaced by their own update paths.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use gitgraph_types::CommitId;

use crate::error::RefResult;
use crate::names::validate_ref_name;
use crate::types::{BranchDistance, CommitRefs, RefKind};

/// Maps commit ids to reference names, plus distance and remote-tag tables.
#[derive(Clone, Debug, Default)]
pub struct RefIndex {
    by_commit: HashMap<CommitId, CommitRefs>,
    distances: BTreeMap<String, BranchDistance>,
    remote_tags: BTreeMap<String, CommitId>,
}

impl RefIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no commit has any reference attached.
    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }

    /// Drop all per-commit associations. Distances and remote tags are kept;
    /// they are replaced through their own update paths.
    pub fn clear(&mut self) {
        self.by_commit.clear();
    }

    // ---------------------------------------------------------------
    // Per-commit references
    // ---------------------------------------------------------------

    /// Attach a reference name to a commit.
    pub fn insert(&mut self, id: CommitId, kind: RefKind, name: &str) -> RefResult<()> {
        validate_ref_name(name)?;
        self.by_commit.entry(id).or_default().insert(kind, name);
        Ok(())
    }

    /// Returns `true` if any reference is attached to the commit.
    pub fn has_refs(&self, id: CommitId) -> bool {
        self.by_commit.get(&id).is_some_and(|refs| !refs.is_empty())
    }

    /// The names of one kind attached to a commit.
    pub fn refs_of(&self, id: CommitId, kind: RefKind) -> Vec<String> {
        self.by_commit
            .get(&id)
            .map(|refs| refs.of_kind(kind).to_vec())
            .unwrap_or_default()
    }

    /// All associations for a commit, if any.
    pub fn commit_refs(&self, id: CommitId) -> Option<&CommitRefs> {
        self.by_commit.get(&id)
    }

    /// Reshape into `(commit, names)` groups for one kind, ordered by
    /// commit id for deterministic output.
    pub fn branches(&self, kind: RefKind) -> Vec<(CommitId, Vec<String>)> {
        let mut groups: Vec<(CommitId, Vec<String>)> = self
            .by_commit
            .iter()
            .filter(|(_, refs)| !refs.of_kind(kind).is_empty())
            .map(|(&id, refs)| (id, refs.of_kind(kind).to_vec()))
            .collect();
        groups.sort_by_key(|(id, _)| *id);
        groups
    }

    /// Re-attach a local branch under a new commit, removing it from
    /// whichever commit it was previously attached to.
    pub fn reload_current_branch(&mut self, name: &str, id: CommitId) -> RefResult<()> {
        for refs in self.by_commit.values_mut() {
            refs.remove(RefKind::LocalBranch, name);
        }
        self.by_commit.retain(|_, refs| !refs.is_empty());
        debug!(branch = name, commit = %id.short_hex(), "reloaded current branch");
        self.insert(id, RefKind::LocalBranch, name)
    }

    // ---------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------

    /// Local tags as a name-to-commit map, gathered from the per-commit
    /// associations.
    pub fn local_tags(&self) -> BTreeMap<String, CommitId> {
        let mut tags = BTreeMap::new();
        for (&id, refs) in &self.by_commit {
            for name in &refs.tags {
                tags.insert(name.clone(), id);
            }
        }
        tags
    }

    /// The merged remote-tag map.
    pub fn remote_tags(&self) -> &BTreeMap<String, CommitId> {
        &self.remote_tags
    }

    /// Merge fetched remote tags. Existing local associations are kept;
    /// remote entries overwrite prior remote entries of the same name.
    pub fn update_tags(&mut self, remote: BTreeMap<String, CommitId>) {
        debug!(count = remote.len(), "merging remote tags");
        self.remote_tags.extend(remote);
    }

    // ---------------------------------------------------------------
    // Distances
    // ---------------------------------------------------------------

    /// Store the ahead/behind counts for a local branch.
    pub fn insert_distance(&mut self, branch: &str, distance: BranchDistance) {
        self.distances.insert(branch.to_string(), distance);
    }

    /// The stored distance for a branch. `None` means unknown, which is
    /// distinct from a stored zero/zero.
    pub fn distance(&self, branch: &str) -> Option<BranchDistance> {
        self.distances.get(branch).copied()
    }
}
