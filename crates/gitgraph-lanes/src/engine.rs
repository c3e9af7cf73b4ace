//! The incremental lane assignment algorithm.
//!
//! State is one awaited parent id per active column plus a post-row snapshot
//! for every processed row. Lane output is a pure function of (pre-row
//! state, commit id, parent list), which is what makes snapshot-based
//! replay sound: once a re-processed row's post-state equals its previous
//! snapshot, every later row would reproduce its stored lanes verbatim.
//!
//! # Invariants
//!
//! - Column allocation always picks the minimum free index.
//! - Exactly one column per processed row carries a commit dot shape.
//! - Trailing free columns are trimmed after every row.

use tracing::trace;

use gitgraph_types::{CommitId, Lane, LaneKind};

/// Per-column state between two rows: the parent id the lane awaits next,
/// or `None` for a free column.
pub type LaneState = Vec<Option<CommitId>>;

/// The streaming lane assignment engine.
#[derive(Clone, Debug, Default)]
pub struct LaneEngine {
    /// Awaited parent per active column.
    tips: LaneState,
    /// Post-row state for every processed row.
    snapshots: Vec<LaneState>,
}

impl LaneEngine {
    /// Create an engine with no processed rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows processed so far; the next call to [`process`]
    /// handles this row index.
    ///
    /// [`process`]: LaneEngine::process
    pub fn rows_processed(&self) -> usize {
        self.snapshots.len()
    }

    /// The state the next row will be processed against.
    pub fn current_state(&self) -> &LaneState {
        &self.tips
    }

    /// Drop all state and processed rows.
    pub fn clear(&mut self) {
        self.tips.clear();
        self.snapshots.clear();
    }

    /// Process the next row and return its lane descriptors.
    pub fn process(&mut self, id: CommitId, parents: &[CommitId]) -> Vec<Lane> {
        // Columns whose awaited parent is this commit: its children's lanes.
        let matches: Vec<usize> = self
            .tips
            .iter()
            .enumerate()
            .filter_map(|(col, tip)| (*tip == Some(id)).then_some(col))
            .collect();

        let (own, siblings) = match matches.split_first() {
            Some((&first, rest)) => (first, rest.to_vec()),
            None => (self.alloc(), Vec::new()),
        };

        // Sibling child lanes converge here and free their columns, before
        // extra merge parents are routed, so freed slots can be reused.
        for &col in &siblings {
            self.tips[col] = None;
        }

        // The first parent continues the commit's own lane; a parentless
        // commit frees it after this row.
        self.tips[own] = parents.first().copied();

        // Route extra merge parents: join the column already awaiting the
        // parent, or spawn a new lowest-free column.
        let mut junctions = siblings;
        for &parent in parents.iter().skip(1) {
            let col = match self.tips.iter().position(|tip| *tip == Some(parent)) {
                Some(col) => col,
                None => {
                    let col = self.alloc();
                    self.tips[col] = Some(parent);
                    trace!(col, parent = %parent.short_hex(), "spawned merge parent lane");
                    col
                }
            };
            if col != own {
                junctions.push(col);
            }
        }

        let own_kind = if parents.len() >= 2 {
            LaneKind::Merge
        } else if matches.len() >= 2 {
            LaneKind::Fork
        } else if parents.is_empty() {
            LaneKind::Initial
        } else if matches.is_empty() {
            LaneKind::Head
        } else {
            LaneKind::Node
        };

        let width = self.tips.len();
        let mut lanes = Vec::with_capacity(width);
        for col in 0..width {
            let kind = if col == own {
                own_kind
            } else if junctions.contains(&col) {
                LaneKind::Tail
            } else if self.tips[col].is_some() {
                LaneKind::Active
            } else {
                LaneKind::Empty
            };
            lanes.push(Lane::new(col as u32, kind));
        }

        while self.tips.last() == Some(&None) {
            self.tips.pop();
        }
        self.snapshots.push(self.tips.clone());

        lanes
    }

    /// Rewind so that `row` becomes the next row to process.
    ///
    /// Returns the discarded snapshot tail (post-row states for `row` and
    /// everything after it), which the caller may compare against during
    /// replay and hand back via [`restore_tail`] once replay converges.
    ///
    /// [`restore_tail`]: LaneEngine::restore_tail
    pub fn rewind(&mut self, row: usize) -> Vec<LaneState> {
        let row = row.min(self.snapshots.len());
        let tail = self.snapshots.split_off(row);
        self.tips = self.snapshots.last().cloned().unwrap_or_default();
        trace!(row, discarded = tail.len(), "lane engine rewound");
        tail
    }

    /// Re-attach snapshots discarded by [`rewind`] whose rows are known to
    /// be unchanged, making their rows count as processed again.
    ///
    /// [`rewind`]: LaneEngine::rewind
    pub fn restore_tail(&mut self, tail: Vec<LaneState>) {
        self.snapshots.extend(tail);
        self.tips = self.snapshots.last().cloned().unwrap_or_default();
    }

    /// Lowest free column, growing the state by one column if none is free.
    fn alloc(&mut self) -> usize {
        match self.tips.iter().position(Option::is_none) {
            Some(col) => col,
            None => {
                self.tips.push(None);
                self.tips.len() - 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(byte: u8) -> CommitId {
        CommitId::from_raw([byte; 20])
    }

    fn kinds(lanes: &[Lane]) -> Vec<LaneKind> {
        lanes.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn linear_chain_stays_in_one_column() {
        let mut engine = LaneEngine::new();
        // Rows top to bottom: C (child of B), B (child of A), A (root).
        let c = engine.process(cid(3), &[cid(2)]);
        let b = engine.process(cid(2), &[cid(1)]);
        let a = engine.process(cid(1), &[]);

        assert_eq!(kinds(&c), vec![LaneKind::Head]);
        assert_eq!(kinds(&b), vec![LaneKind::Node]);
        assert_eq!(kinds(&a), vec![LaneKind::Initial]);
        assert!(engine.current_state().is_empty());
    }

    #[test]
    fn fork_converges_two_children_without_gap() {
        let mut engine = LaneEngine::new();
        // C2 and C3 are both children of C1.
        let c3 = engine.process(cid(3), &[cid(1)]);
        let c2 = engine.process(cid(2), &[cid(1)]);
        let c1 = engine.process(cid(1), &[]);

        assert_eq!(kinds(&c3), vec![LaneKind::Head]);
        assert_eq!(kinds(&c2), vec![LaneKind::Active, LaneKind::Head]);
        assert_eq!(kinds(&c1), vec![LaneKind::Fork, LaneKind::Tail]);
    }

    #[test]
    fn merge_spawns_lane_for_unseen_parent() {
        let mut engine = LaneEngine::new();
        // M merges B (first parent) and C.
        let m = engine.process(cid(9), &[cid(2), cid(3)]);
        let b = engine.process(cid(2), &[cid(1)]);
        let c = engine.process(cid(3), &[cid(1)]);
        let a = engine.process(cid(1), &[]);

        assert_eq!(kinds(&m), vec![LaneKind::Merge, LaneKind::Tail]);
        assert_eq!(kinds(&b), vec![LaneKind::Node, LaneKind::Active]);
        assert_eq!(kinds(&c), vec![LaneKind::Active, LaneKind::Node]);
        // Both branches converge on the root.
        assert_eq!(kinds(&a), vec![LaneKind::Fork, LaneKind::Tail]);
    }

    #[test]
    fn merge_joins_lane_already_awaiting_parent() {
        let mut engine = LaneEngine::new();
        // Column 0 awaits M itself; column 1 already awaits M's second parent.
        engine.process(cid(10), &[cid(9)]);
        engine.process(cid(11), &[cid(5)]);
        let m = engine.process(cid(9), &[cid(7), cid(5)]);

        // The second parent joins column 1 instead of spawning a third lane.
        assert_eq!(kinds(&m), vec![LaneKind::Merge, LaneKind::Tail]);
        assert_eq!(
            engine.current_state(),
            &vec![Some(cid(7)), Some(cid(5))]
        );
    }

    #[test]
    fn freed_column_is_reused_before_growing() {
        let mut engine = LaneEngine::new();
        // Three parallel tips, middle one roots out, then a new tip appears.
        engine.process(cid(10), &[cid(1)]); // col 0
        engine.process(cid(11), &[cid(2)]); // col 1
        engine.process(cid(12), &[cid(3)]); // col 2
        let root = engine.process(cid(2), &[]); // col 1 frees
        assert_eq!(
            kinds(&root),
            vec![LaneKind::Active, LaneKind::Initial, LaneKind::Active]
        );

        let tip = engine.process(cid(13), &[cid(4)]);
        // Reuses column 1, not column 3.
        assert_eq!(
            kinds(&tip),
            vec![LaneKind::Active, LaneKind::Head, LaneKind::Active]
        );
    }

    #[test]
    fn trailing_free_columns_are_trimmed() {
        let mut engine = LaneEngine::new();
        engine.process(cid(10), &[cid(1)]);
        engine.process(cid(11), &[cid(2)]);
        engine.process(cid(2), &[]); // rightmost lane roots out
        assert_eq!(engine.current_state().len(), 1);
    }

    #[test]
    fn rewind_restores_pre_row_state() {
        let mut engine = LaneEngine::new();
        engine.process(cid(3), &[cid(2)]);
        engine.process(cid(2), &[cid(1)]);
        engine.process(cid(1), &[]);

        let tail = engine.rewind(1);
        assert_eq!(tail.len(), 2);
        assert_eq!(engine.rows_processed(), 1);
        assert_eq!(engine.current_state(), &vec![Some(cid(2))]);

        // Replaying the same rows reproduces the same output and state.
        let replayed = engine.process(cid(2), &[cid(1)]);
        assert_eq!(engine.current_state(), &tail[0]);
        assert_eq!(kinds(&replayed), vec![LaneKind::Node]);

        // Unchanged remainder can be re-attached instead of re-processed.
        engine.rewind(1);
        engine.restore_tail(tail);
        assert_eq!(engine.rows_processed(), 3);
        assert!(engine.current_state().is_empty());
    }

    #[test]
    fn rewind_to_zero_clears_state() {
        let mut engine = LaneEngine::new();
        engine.process(cid(3), &[cid(2)]);
        engine.process(cid(2), &[]);
        let tail = engine.rewind(0);
        assert_eq!(tail.len(), 2);
        assert_eq!(engine.rows_processed(), 0);
        assert!(engine.current_state().is_empty());
    }

    #[test]
    fn duplicate_parents_do_not_spawn_extra_lane() {
        let mut engine = LaneEngine::new();
        let m = engine.process(cid(9), &[cid(1), cid(1)]);
        assert_eq!(kinds(&m), vec![LaneKind::Merge]);
        assert_eq!(engine.current_state().len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Arbitrary parent wiring: each commit may point at up to two
        /// later rows (parents are always below their children).
        fn graphs() -> impl Strategy<Value = Vec<Vec<usize>>> {
            (2usize..24).prop_flat_map(|n| {
                proptest::collection::vec(
                    proptest::collection::vec(0usize..6, 0..=2),
                    n,
                )
                .prop_map(move |raw| {
                    raw.into_iter()
                        .enumerate()
                        .map(|(row, picks)| {
                            let mut parents: Vec<usize> = picks
                                .into_iter()
                                .map(|p| row + 1 + p)
                                .filter(|&candidate| candidate < n)
                                .collect();
                            parents.dedup();
                            parents
                        })
                        .collect()
                })
            })
        }

        proptest! {
            #[test]
            fn one_dot_per_row_and_minimal_allocation(graph in graphs()) {
                let mut engine = LaneEngine::new();
                for (row, parents) in graph.iter().enumerate() {
                    let occupied_before: Vec<bool> = engine
                        .current_state()
                        .iter()
                        .map(Option::is_some)
                        .collect();
                    let ids: Vec<CommitId> =
                        parents.iter().map(|&p| cid(p as u8)).collect();
                    let lanes = engine.process(cid(row as u8), &ids);

                    let dots = lanes.iter().filter(|l| l.kind.is_commit()).count();
                    prop_assert_eq!(dots, 1, "row {} lanes: {:?}", row, lanes);

                    // A column newly occupied this row implies no free
                    // column below it was available: minimal allocation.
                    for lane in &lanes {
                        let col = lane.index as usize;
                        let was_occupied =
                            occupied_before.get(col).copied().unwrap_or(false);
                        if lane.kind.is_occupied() && !was_occupied {
                            for below in &lanes[..col] {
                                prop_assert_ne!(
                                    below.kind,
                                    LaneKind::Empty,
                                    "gap below fresh column {} in row {}: {:?}",
                                    col,
                                    row,
                                    lanes
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}
