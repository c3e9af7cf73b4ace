//! The commit record store and deferred-link resolver.
//!
//! Records live in a growable arena addressed by row number, with an
//! id-to-row map alongside. Rows beyond the loaded range are holes that
//! later insertions fill; the settled state is dense. Parent/child links
//! are stored as row lists, never references, so they survive arena growth.
//!
//! A commit naming a parent that has not arrived yet is recorded in a
//! pending-children index keyed by the parent's id. When the parent
//! arrives, the waiting rows are drained and linked, tolerating any
//! insertion order from the loader.

use std::collections::HashMap;

use tracing::trace;

use gitgraph_types::{CommitId, CommitRecord, Lane};

/// Arena of commit records with id and parent/child indexes.
#[derive(Debug, Default)]
pub struct CommitStore {
    rows: Vec<Option<CommitRecord>>,
    index: HashMap<CommitId, usize>,
    /// Parent row -> rows of its linked children.
    children: HashMap<usize, Vec<usize>>,
    /// Parent id -> rows waiting for that parent to arrive.
    pending: HashMap<CommitId, Vec<usize>>,
}

impl CommitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated rows, holes included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no row is allocated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop all rows, links, and pending entries.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
        self.children.clear();
        self.pending.clear();
    }

    /// Insert a record at the given row, overwriting whatever was there.
    ///
    /// Rows beyond the current end are allocated as holes. Links to already
    /// present parents are made immediately; the rest go to the pending
    /// index. Children that were waiting for this commit are adopted.
    /// Returns the row a re-inserted id previously occupied, now a hole.
    pub fn insert(&mut self, record: CommitRecord, row: usize) -> Option<usize> {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, || None);
        }
        if let Some(old) = self.rows[row].take() {
            self.unlink(row, &old);
        }
        // A re-inserted id supersedes its previous row.
        let mut superseded = None;
        if let Some(&prev) = self.index.get(&record.id) {
            if prev != row {
                if let Some(old) = self.rows[prev].take() {
                    self.unlink(prev, &old);
                }
                superseded = Some(prev);
            }
        }
        self.index.insert(record.id, row);

        for &parent in &record.parents {
            match self.index.get(&parent) {
                Some(&parent_row) => {
                    self.children.entry(parent_row).or_default().push(row);
                }
                None => {
                    trace!(
                        child = row,
                        parent = %parent.short_hex(),
                        "deferring link until parent arrives"
                    );
                    self.pending.entry(parent).or_default().push(row);
                }
            }
        }

        // Adopt children that arrived before this commit. Rows overwritten
        // since they were parked may no longer name us; drop those.
        if let Some(waiting) = self.pending.remove(&record.id) {
            for child_row in waiting {
                let names_us = self.rows[child_row]
                    .as_ref()
                    .is_some_and(|r| r.parents.contains(&record.id));
                if names_us {
                    let kids = self.children.entry(row).or_default();
                    if !kids.contains(&child_row) {
                        kids.push(child_row);
                    }
                }
            }
        }

        self.rows[row] = Some(record);
        superseded
    }

    /// The record at a row, if the row is allocated and not a hole.
    pub fn record(&self, row: usize) -> Option<&CommitRecord> {
        self.rows.get(row).and_then(Option::as_ref)
    }

    /// The record with the given id.
    pub fn by_id(&self, id: CommitId) -> Option<&CommitRecord> {
        self.index.get(&id).and_then(|&row| self.record(row))
    }

    /// The row holding the given id.
    pub fn row_of(&self, id: CommitId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Replace the derived lane output of a row.
    pub fn set_lanes(&mut self, row: usize, lanes: Vec<Lane>) {
        if let Some(rec) = self.rows.get_mut(row).and_then(Option::as_mut) {
            rec.lanes = lanes;
        }
    }

    /// Rows of the linked children of the commit at `row`, in link order.
    pub fn children_of(&self, row: usize) -> &[usize] {
        self.children.get(&row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows still waiting for a parent id to arrive.
    pub fn pending_for(&self, parent: CommitId) -> &[usize] {
        self.pending.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove a row's links when its record is replaced.
    fn unlink(&mut self, row: usize, old: &CommitRecord) {
        if self.index.get(&old.id) == Some(&row) {
            self.index.remove(&old.id);
        }
        for &parent in &old.parents {
            if let Some(&parent_row) = self.index.get(&parent) {
                if let Some(kids) = self.children.get_mut(&parent_row) {
                    kids.retain(|&r| r != row);
                }
            }
            if let Some(waiting) = self.pending.get_mut(&parent) {
                waiting.retain(|&r| r != row);
                if waiting.is_empty() {
                    self.pending.remove(&parent);
                }
            }
        }
        // Children linked to this row lose their parent; park them again.
        if let Some(kids) = self.children.remove(&row) {
            for child in kids {
                self.pending.entry(old.id).or_default().push(child);
            }
        }
    }
}
