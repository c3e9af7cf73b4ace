//! The `RepoCache` facade.
//!
//! One mutex guards the whole mutable state. Public methods lock once and
//! delegate to inner functions that take `&mut CacheState`; those inner
//! functions never touch the mutex, which is the re-entrancy discipline:
//! the `&mut CacheState` parameter *is* the "already holding" context.
//! Observer callbacks run strictly after the guard is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use gitgraph_diff::{parse_combined_status, parse_diff, FileChange, PathPool, RevisionFiles};
use gitgraph_lanes::LaneEngine;
use gitgraph_refs::{BranchDistance, RefIndex, RefKind};
use gitgraph_types::{CommitId, CommitRecord, SearchDirection, SearchField};

use crate::error::{CacheError, CacheResult};
use crate::store::CommitStore;
use crate::wip::WipRevision;

/// Construction-time behavior toggles.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct CacheOptions {
    /// Append untracked files to the working-copy record as synthetic
    /// `Added` entries.
    pub track_untracked: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            track_untracked: true,
        }
    }
}

/// A registered subtree prefix.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Subtree {
    /// The subtree's configured name.
    pub name: String,
    /// The commit the subtree was split from or merged at.
    pub commit: CommitId,
}

type Observer = Arc<dyn Fn() + Send + Sync>;

/// Everything the mutex guards.
struct CacheState {
    configured: bool,
    generation: u64,
    store: CommitStore,
    engine: LaneEngine,
    revision_files: HashMap<(CommitId, CommitId), RevisionFiles>,
    pool: PathPool,
    refs: RefIndex,
    untracked: Vec<String>,
    subtrees: Vec<Subtree>,
    options: CacheOptions,
}

impl CacheState {
    fn new(options: CacheOptions) -> Self {
        Self {
            configured: false,
            generation: 0,
            store: CommitStore::new(),
            engine: LaneEngine::new(),
            revision_files: HashMap::new(),
            pool: PathPool::new(),
            refs: RefIndex::new(),
            untracked: Vec::new(),
            subtrees: Vec::new(),
            options,
        }
    }
}

/// Thread-safe in-memory model of a repository's commit graph.
///
/// The loader is the single writer; any number of readers share the same
/// lock. A change notification fires once per completed bulk update;
/// consumers re-query instead of assuming deltas.
pub struct RepoCache {
    state: Mutex<CacheState>,
    observers: Mutex<Vec<Observer>>,
}

impl Default for RepoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RepoCache {
    /// Create a cache with default options.
    pub fn new() -> Self {
        Self::with_options(CacheOptions::default())
    }

    /// Create a cache with explicit options.
    pub fn with_options(options: CacheOptions) -> Self {
        Self {
            state: Mutex::new(CacheState::new(options)),
            observers: Mutex::new(Vec::new()),
        }
    }

    fn locked(&self) -> CacheResult<MutexGuard<'_, CacheState>> {
        self.state
            .lock()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Change notification
    // ---------------------------------------------------------------

    /// Register an observer, called once per completed bulk update.
    pub fn subscribe(&self, observer: impl Fn() + Send + Sync + 'static) -> CacheResult<()> {
        self.observers
            .lock()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))?
            .push(Arc::new(observer));
        Ok(())
    }

    /// Fire the observers. Never called with the state lock held.
    fn notify(&self) -> CacheResult<()> {
        let observers = self
            .observers
            .lock()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))?
            .clone();
        for observer in observers {
            observer();
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------

    /// The current load generation.
    ///
    /// Sample it before starting an asynchronous backend fetch and hand it
    /// back to [`insert_revision_files`]; a reload in between makes the
    /// write stale and it is dropped.
    ///
    /// [`insert_revision_files`]: RepoCache::insert_revision_files
    pub fn generation(&self) -> CacheResult<u64> {
        Ok(self.locked()?.generation)
    }

    /// Drop all commit, lane, and revision-file state and start a new load
    /// generation. The store reports [`CacheError::NotReady`] until the
    /// first record of the new load arrives.
    pub fn begin_reload(&self) -> CacheResult<u64> {
        let mut state = self.locked()?;
        state.store.clear();
        state.engine.clear();
        state.revision_files.clear();
        state.pool.clear();
        state.configured = false;
        state.generation += 1;
        debug!(generation = state.generation, "cache reload started");
        Ok(state.generation)
    }

    /// Full rebuild: reload, insert the working-copy record (when valid)
    /// followed by the ordered history, then notify once.
    pub fn setup(&self, wip: &WipRevision, commits: Vec<CommitRecord>) -> CacheResult<()> {
        {
            let mut state = self.locked()?;
            state.store.clear();
            state.engine.clear();
            state.revision_files.clear();
            state.pool.clear();
            state.configured = false;
            state.generation += 1;
            debug!(
                generation = state.generation,
                commits = commits.len(),
                "cache setup"
            );

            let first_row = if wip.is_valid() {
                update_wip_record(&mut state, wip);
                1
            } else {
                0
            };
            for (offset, record) in commits.into_iter().enumerate() {
                insert_record(&mut state, record, first_row + offset);
            }
            refresh_lanes(&mut state, None);
        }
        self.notify()
    }

    /// Insert one commit at a row without notifying. Building block for
    /// loaders that assemble their own batches; use [`insert_batch`] to get
    /// the bulk-update notification.
    ///
    /// [`insert_batch`]: RepoCache::insert_batch
    pub fn insert_commit(&self, record: CommitRecord, row: usize) -> CacheResult<()> {
        let mut state = self.locked()?;
        let dirty = insert_record(&mut state, record, row);
        refresh_lanes(&mut state, dirty);
        Ok(())
    }

    /// Insert a batch of `(row, record)` pairs and notify once.
    pub fn insert_batch(&self, items: Vec<(usize, CommitRecord)>) -> CacheResult<()> {
        {
            let mut state = self.locked()?;
            let mut dirty: Option<(usize, usize)> = None;
            for (row, record) in items {
                if let Some((from, until)) = insert_record(&mut state, record, row) {
                    dirty = Some(match dirty {
                        Some((lo, hi)) => (lo.min(from), hi.max(until)),
                        None => (from, until),
                    });
                }
            }
            refresh_lanes(&mut state, dirty);
        }
        self.notify()
    }

    // ---------------------------------------------------------------
    // Commit queries
    // ---------------------------------------------------------------

    /// Number of allocated rows, the working-copy row included.
    pub fn count(&self) -> CacheResult<usize> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(state.store.len())
    }

    /// The record with the given id.
    pub fn commit_by_id(&self, id: CommitId) -> CacheResult<Option<CommitRecord>> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(state.store.by_id(id).cloned())
    }

    /// The record at the given row.
    pub fn commit_by_row(&self, row: usize) -> CacheResult<Option<CommitRecord>> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(state.store.record(row).cloned())
    }

    /// The row holding the given id.
    pub fn position(&self, id: CommitId) -> CacheResult<Option<usize>> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(state.store.row_of(id))
    }

    /// Linear scan over one record field from `start_row` in the given
    /// direction; returns the first match.
    ///
    /// [`SearchField::Path`] consults the cached revision files for the
    /// commit-vs-first-parent pair: commits whose diff has not been fetched
    /// cannot match, since the cache never does I/O of its own.
    pub fn find_commit(
        &self,
        field: SearchField,
        text: &str,
        start_row: usize,
        direction: SearchDirection,
    ) -> CacheResult<Option<(usize, CommitRecord)>> {
        let state = self.locked()?;
        ready(&state)?;
        let len = state.store.len();
        if len == 0 {
            return Ok(None);
        }
        let needle = text.to_lowercase();
        let rows: Vec<usize> = match direction {
            SearchDirection::Forward => (start_row.min(len)..len).collect(),
            SearchDirection::Backward => (0..=start_row.min(len - 1)).rev().collect(),
        };
        for row in rows {
            if let Some(rec) = state.store.record(row) {
                if field_matches(&state, rec, field, &needle) {
                    return Ok(Some((row, rec.clone())));
                }
            }
        }
        Ok(None)
    }

    /// Ids of the linked children of a commit, in row order.
    pub fn children_of(&self, id: CommitId) -> CacheResult<Vec<CommitId>> {
        let state = self.locked()?;
        ready(&state)?;
        let row = match state.store.row_of(id) {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };
        let mut child_rows = state.store.children_of(row).to_vec();
        child_rows.sort_unstable();
        Ok(child_rows
            .into_iter()
            .filter_map(|r| state.store.record(r).map(|rec| rec.id))
            .collect())
    }

    // ---------------------------------------------------------------
    // Working copy
    // ---------------------------------------------------------------

    /// Replace the untracked-file list used by the next working-copy
    /// rebuild.
    pub fn set_untracked_files(&self, files: Vec<String>) -> CacheResult<()> {
        self.locked()?.untracked = files;
        Ok(())
    }

    /// Rebuild the synthetic working-copy record and its revision-file
    /// entry from fresh captures, then notify.
    pub fn update_wip(&self, wip: &WipRevision) -> CacheResult<()> {
        {
            let mut state = self.locked()?;
            update_wip_record(&mut state, wip);
            refresh_lanes(&mut state, Some((0, 0)));
        }
        self.notify()
    }

    /// Returns `true` iff the working-copy record exists and has a parent
    /// or any parsed or untracked file change.
    pub fn pending_local_changes(&self) -> CacheResult<bool> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(match state.store.by_id(CommitId::WIP) {
            Some(rec) => {
                !rec.parents.is_empty()
                    || state
                        .revision_files
                        .get(&revision_key(CommitId::WIP, rec.first_parent()))
                        .is_some_and(|files| !files.is_empty())
            }
            None => false,
        })
    }

    /// The resolved file changes of the working-copy record, if present.
    pub fn wip_changes(&self) -> CacheResult<Option<Vec<FileChange>>> {
        let state = self.locked()?;
        ready(&state)?;
        Ok(state.store.by_id(CommitId::WIP).and_then(|rec| {
            state
                .revision_files
                .get(&revision_key(CommitId::WIP, rec.first_parent()))
                .map(|files| files.resolve(&state.pool))
        }))
    }

    // ---------------------------------------------------------------
    // Revision files
    // ---------------------------------------------------------------

    /// Parse raw name-status text against the shared intern pool.
    pub fn parse_diff(&self, raw: &str, staged: bool) -> CacheResult<RevisionFiles> {
        let mut state = self.locked()?;
        Ok(parse_diff(&mut state.pool, raw, staged))
    }

    /// Store parsed revision files for a `(from, to)` pair.
    ///
    /// `generation` must be the value sampled from [`generation`] before
    /// the backend fetch started; a stale write is dropped and `false` is
    /// returned.
    ///
    /// [`generation`]: RepoCache::generation
    pub fn insert_revision_files(
        &self,
        from: CommitId,
        to: CommitId,
        files: RevisionFiles,
        generation: u64,
    ) -> CacheResult<bool> {
        let mut state = self.locked()?;
        if generation != state.generation {
            debug!(
                expected = state.generation,
                got = generation,
                "dropping stale revision-file insert"
            );
            return Ok(false);
        }
        state.revision_files.insert((from, to), files);
        Ok(true)
    }

    /// Returns `true` if revision files for the pair are cached. A miss is
    /// the signal to fetch from the backend and re-insert.
    pub fn contains_revision_files(&self, from: CommitId, to: CommitId) -> CacheResult<bool> {
        Ok(self.locked()?.revision_files.contains_key(&(from, to)))
    }

    /// The cached revision files for a pair, if present.
    pub fn revision_files(
        &self,
        from: CommitId,
        to: CommitId,
    ) -> CacheResult<Option<RevisionFiles>> {
        Ok(self.locked()?.revision_files.get(&(from, to)).cloned())
    }

    /// The cached revision files for a pair, resolved to owned paths.
    pub fn revision_changes(
        &self,
        from: CommitId,
        to: CommitId,
    ) -> CacheResult<Option<Vec<FileChange>>> {
        let state = self.locked()?;
        Ok(state
            .revision_files
            .get(&(from, to))
            .map(|files| files.resolve(&state.pool)))
    }

    // ---------------------------------------------------------------
    // References and distances
    // ---------------------------------------------------------------

    /// Attach a reference name to a commit.
    pub fn insert_reference(&self, id: CommitId, kind: RefKind, name: &str) -> CacheResult<()> {
        self.locked()?.refs.insert(id, kind, name)?;
        Ok(())
    }

    /// Drop all per-commit reference associations (refresh path).
    pub fn clear_references(&self) -> CacheResult<()> {
        self.locked()?.refs.clear();
        Ok(())
    }

    /// Returns `true` if any reference is attached to the commit.
    pub fn has_references(&self, id: CommitId) -> CacheResult<bool> {
        Ok(self.locked()?.refs.has_refs(id))
    }

    /// The names of one kind attached to a commit.
    pub fn references(&self, id: CommitId, kind: RefKind) -> CacheResult<Vec<String>> {
        Ok(self.locked()?.refs.refs_of(id, kind))
    }

    /// `(commit, names)` groups for one reference kind.
    pub fn branches(&self, kind: RefKind) -> CacheResult<Vec<(CommitId, Vec<String>)>> {
        Ok(self.locked()?.refs.branches(kind))
    }

    /// Local tags as a name-to-commit map.
    pub fn local_tags(&self) -> CacheResult<BTreeMap<String, CommitId>> {
        Ok(self.locked()?.refs.local_tags())
    }

    /// The merged remote-tag map.
    pub fn remote_tags(&self) -> CacheResult<BTreeMap<String, CommitId>> {
        Ok(self.locked()?.refs.remote_tags().clone())
    }

    /// Merge fetched remote tags without discarding local associations.
    pub fn update_tags(&self, remote: BTreeMap<String, CommitId>) -> CacheResult<()> {
        self.locked()?.refs.update_tags(remote);
        Ok(())
    }

    /// Move a local branch to a new commit after a head change.
    pub fn reload_current_branch(&self, name: &str, id: CommitId) -> CacheResult<()> {
        self.locked()?.refs.reload_current_branch(name, id)?;
        Ok(())
    }

    /// Store externally computed ahead/behind counts for a branch.
    pub fn insert_branch_distance(
        &self,
        branch: &str,
        distance: BranchDistance,
    ) -> CacheResult<()> {
        self.locked()?.refs.insert_distance(branch, distance);
        Ok(())
    }

    /// The stored distance for a branch; `None` means unknown.
    pub fn branch_distance(&self, branch: &str) -> CacheResult<Option<BranchDistance>> {
        Ok(self.locked()?.refs.distance(branch))
    }

    // ---------------------------------------------------------------
    // Subtrees
    // ---------------------------------------------------------------

    /// Register subtree name/commit pairs.
    pub fn add_subtrees(&self, pairs: Vec<(String, CommitId)>) -> CacheResult<()> {
        let mut state = self.locked()?;
        for (name, commit) in pairs {
            state.subtrees.push(Subtree { name, commit });
        }
        Ok(())
    }

    /// The registered subtree names.
    pub fn subtrees(&self) -> CacheResult<Vec<String>> {
        Ok(self
            .locked()?
            .subtrees
            .iter()
            .map(|s| s.name.clone())
            .collect())
    }
}

/// Readiness gate for commit-store reads.
fn ready(state: &CacheState) -> CacheResult<()> {
    if state.configured {
        Ok(())
    } else {
        Err(CacheError::NotReady)
    }
}

/// The revision-file key convention: `(to-id, from-id)`, with the zero id
/// standing in for "no parent".
fn revision_key(id: CommitId, parent: Option<CommitId>) -> (CommitId, CommitId) {
    (id, parent.unwrap_or(CommitId::WIP))
}

/// Insert a record, returning the inclusive row range whose already-laned
/// output it dirtied, if any.
fn insert_record(
    state: &mut CacheState,
    record: CommitRecord,
    row: usize,
) -> Option<(usize, usize)> {
    let superseded = state.store.insert(record, row);
    state.configured = true;
    let processed = state.engine.rows_processed();
    let dirty: Vec<usize> = [Some(row), superseded]
        .into_iter()
        .flatten()
        .filter(|&r| r < processed)
        .collect();
    let from = dirty.iter().copied().min()?;
    let until = dirty.iter().copied().max()?;
    Some((from, until))
}

/// Rebuild the working-copy record and its revision-file entry.
fn update_wip_record(state: &mut CacheState, wip: &WipRevision) {
    let untracked: &[String] = if state.options.track_untracked {
        &state.untracked
    } else {
        &[]
    };
    let files = parse_combined_status(
        &mut state.pool,
        &wip.staged_diff,
        &wip.unstaged_diff,
        untracked,
    );
    debug!(files = files.len(), "working copy rebuilt");
    state
        .revision_files
        .insert(revision_key(CommitId::WIP, wip.parent), files);
    let _ = state.store.insert(CommitRecord::wip(wip.parent), 0);
    state.configured = true;
}

/// Field matcher for [`RepoCache::find_commit`]. `needle` is lowercased.
fn field_matches(state: &CacheState, rec: &CommitRecord, field: SearchField, needle: &str) -> bool {
    match field {
        SearchField::Id => rec.id.to_hex().starts_with(needle),
        SearchField::Author => rec.author.to_lowercase().contains(needle),
        SearchField::Subject => rec.subject.to_lowercase().contains(needle),
        SearchField::Path => state
            .revision_files
            .get(&revision_key(rec.id, rec.first_parent()))
            .is_some_and(|files| {
                files.files.iter().any(|entry| {
                    state
                        .pool
                        .path_string(entry.path)
                        .to_lowercase()
                        .contains(needle)
                })
            }),
    }
}

/// Bring lane output up to date.
///
/// `dirty` is the inclusive row range whose records changed below the
/// engine's processed frontier; `None` means only appends happened. Replay
/// stops as soon as the engine state converges with the pre-change
/// snapshot past the dirty range, then the untouched snapshot tail is
/// re-attached, keeping the cost proportional to the change.
fn refresh_lanes(state: &mut CacheState, dirty: Option<(usize, usize)>) {
    if let Some((from, until)) = dirty {
        if from < state.engine.rows_processed() {
            let stale = state.engine.rewind(from);
            let mut row = from;
            while let Some(rec) = state.store.record(row) {
                let (id, parents) = (rec.id, rec.parents.clone());
                let lanes = state.engine.process(id, &parents);
                state.store.set_lanes(row, lanes);
                let offset = row - from;
                row += 1;
                if row > until
                    && offset < stale.len()
                    && state.engine.current_state() == &stale[offset]
                {
                    state.engine.restore_tail(stale[offset + 1..].to_vec());
                    break;
                }
            }
        }
    }
    // Advance over the contiguous prefix of loaded rows.
    while let Some(rec) = state.store.record(state.engine.rows_processed()) {
        let row = state.engine.rows_processed();
        let (id, parents) = (rec.id, rec.parents.clone());
        let lanes = state.engine.process(id, &parents);
        state.store.set_lanes(row, lanes);
    }
}
