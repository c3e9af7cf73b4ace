//! Commit records and field-scan lookup parameters.

use serde::{Deserialize, Serialize};

use crate::id::CommitId;
use crate::lane::Lane;

/// One commit in the loaded history.
///
/// Records are created on first insertion and addressed both by id and by
/// row position (dense, 0-based, matching display order). The `lanes` field
/// is derived output, filled in by the lane engine once the record's row is
/// reachable from the top of the history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The commit's object name, or [`CommitId::WIP`] for the synthetic
    /// working-copy record.
    pub id: CommitId,
    /// Ordered parent ids. The first parent continues the commit's lane.
    pub parents: Vec<CommitId>,
    /// Author, as reported by the backend (typically `Name <email>`).
    pub author: String,
    /// Author date, seconds since the Unix epoch.
    pub author_date: i64,
    /// First line of the commit message.
    pub subject: String,
    /// Remaining commit message lines.
    pub body: String,
    /// Derived lane layout for this commit's row.
    pub lanes: Vec<Lane>,
}

impl CommitRecord {
    /// Create a record with empty body and no lane output yet.
    pub fn new(
        id: CommitId,
        parents: Vec<CommitId>,
        author: impl Into<String>,
        author_date: i64,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parents,
            author: author.into(),
            author_date,
            subject: subject.into(),
            body: String::new(),
            lanes: Vec::new(),
        }
    }

    /// Create the synthetic working-copy record.
    pub fn wip(parent: Option<CommitId>) -> Self {
        Self::new(
            CommitId::WIP,
            parent.into_iter().collect(),
            "-",
            0,
            "Uncommitted changes",
        )
    }

    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this is the synthetic working-copy record.
    pub fn is_wip(&self) -> bool {
        self.id.is_wip()
    }

    /// The first parent, if any.
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parents.first().copied()
    }

    /// Number of drawing columns in use at this commit's row.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

/// The record field a linear scan matches against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    /// The hex id (prefix match).
    Id,
    /// The author string (case-insensitive substring).
    Author,
    /// The message subject (case-insensitive substring).
    Subject,
    /// A path touched by the commit, per its cached revision files.
    Path,
}

/// Scan direction for field lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Scan from the start row toward higher rows.
    Forward,
    /// Scan from the start row toward row zero.
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(byte: u8) -> CommitId {
        CommitId::from_raw([byte; 20])
    }

    #[test]
    fn root_commit_has_no_parents() {
        let rec = CommitRecord::new(cid(1), vec![], "a <a@b>", 0, "init");
        assert!(rec.is_root());
        assert!(rec.first_parent().is_none());
    }

    #[test]
    fn first_parent_is_ordered() {
        let rec = CommitRecord::new(cid(3), vec![cid(1), cid(2)], "a <a@b>", 0, "merge");
        assert_eq!(rec.first_parent(), Some(cid(1)));
        assert!(!rec.is_root());
    }

    #[test]
    fn wip_record_uses_sentinel() {
        let rec = CommitRecord::wip(Some(cid(9)));
        assert!(rec.is_wip());
        assert_eq!(rec.parents, vec![cid(9)]);

        let orphan = CommitRecord::wip(None);
        assert!(orphan.is_wip());
        assert!(orphan.is_root());
    }

    #[test]
    fn lane_count_tracks_derived_output() {
        use crate::lane::{Lane, LaneKind};

        let mut rec = CommitRecord::new(cid(1), vec![], "a <a@b>", 0, "init");
        assert_eq!(rec.lane_count(), 0);
        rec.lanes = vec![Lane::new(0, LaneKind::Initial)];
        assert_eq!(rec.lane_count(), 1);
    }
}
