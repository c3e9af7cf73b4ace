//! Lane descriptors: the per-row drawing instructions for the commit graph.
//!
//! A [`Lane`] names one drawing column at one row and the connector shape a
//! renderer should draw there. Exactly one column per row carries a commit
//! dot shape; side junctions render [`LaneKind::Tail`] and connect into the
//! dot column. The shapes carry enough information to draw dots and
//! connecting segments without any graph knowledge of their own.

use serde::{Deserialize, Serialize};

/// The connector shape of one drawing column at one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneKind {
    /// No lane occupies this column at this row.
    Empty,
    /// A lane passes straight through this row.
    Active,
    /// The commit sits here; one child lane continues to one parent.
    Node,
    /// The commit sits here and has no parents; the lane ends below this row.
    Initial,
    /// The commit sits here and no lane was awaiting it; a new lane starts.
    Head,
    /// A lane that begins or ends at this row, connecting sideways into the
    /// commit's column: a sibling child lane converging from above, or an
    /// extra merge-parent lane departing below.
    Tail,
    /// The commit sits here and merges two or more parent lanes.
    Merge,
    /// The commit sits here and several child lanes converge into it.
    Fork,
}

impl LaneKind {
    /// Returns `true` if the commit's dot is drawn in this column.
    pub fn is_commit(&self) -> bool {
        matches!(
            self,
            Self::Node | Self::Initial | Self::Head | Self::Merge | Self::Fork
        )
    }

    /// Returns `true` if a lane occupies this column at this row.
    pub fn is_occupied(&self) -> bool {
        *self != Self::Empty
    }
}

/// One drawing column at one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    /// The column index, 0-based from the left.
    pub index: u32,
    /// The connector shape to draw.
    pub kind: LaneKind,
}

impl Lane {
    /// Create a new lane descriptor.
    pub fn new(index: u32, kind: LaneKind) -> Self {
        Self { index, kind }
    }
}
