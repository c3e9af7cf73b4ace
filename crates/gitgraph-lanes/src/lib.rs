//! Streaming lane layout for gitgraph.
//!
//! The [`LaneEngine`] walks finalized history rows top to bottom and assigns
//! every commit a drawing column, producing the per-row [`Lane`] descriptors
//! a renderer consumes. Columns are allocated lowest-free-first so the
//! rendered graph stays minimally wide, and per-row state snapshots allow
//! bounded recomputation when a row changes after it was first processed.
//!
//! [`Lane`]: gitgraph_types::Lane

pub mod engine;

pub use engine::LaneEngine;
