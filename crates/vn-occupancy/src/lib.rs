//! `vn-occupancy` — the multi-resolution voxel occupancy index.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`graph`]    | `OccupancyGraph` (per-level concurrent cell → id-set maps) |
//! | [`snapshot`] | `OccupancySnapshot`, JSON persistence                      |
//! | [`error`]    | `OccupancyError`, `OccupancyResult<T>`                     |
//!
//! # Concurrency contract
//!
//! Every level is a sharded concurrent map.  Rasterizer tasks insert from
//! many threads at once, searches read concurrently, and obstacle removal
//! deletes by id; none of them takes an external lock.  Two obstacles
//! occupying the same cell simply share the cell's id set.

pub mod error;
pub mod graph;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use error::{OccupancyError, OccupancyResult};
pub use graph::OccupancyGraph;
pub use snapshot::{CellRecord, OccupancySnapshot, SnapshotMeta};
