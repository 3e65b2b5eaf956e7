//! `vn-core` — foundational types for the `voxnav` navigation workspace.
//!
//! This crate is a dependency of every other `vn-*` crate.  It intentionally
//! has no `vn-*` dependencies and minimal external ones (only `glam` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ObstacleId`, `TaskId`                     |
//! | [`cell`]        | `CellIndex`, `LevelGrid` (multi-resolution math)      |
//! | [`bounds`]      | `SpaceConstraints` (axis-aligned search volume)       |
//! | [`cancel`]      | `CancelToken`, `CancelScope`                          |
//! | [`config`]      | `NavConfig`, `Parallelism`                            |
//! | [`time`]        | `Tick`                                                |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `vn-occupancy` snapshots.                      |

pub mod bounds;
pub mod cancel;
pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bounds::SpaceConstraints;
pub use cancel::{CancelScope, CancelToken};
pub use cell::{CellIndex, LEVEL_RISE, LevelGrid};
pub use config::{MAX_LEVELS, MIN_CELL_SIZE, NavConfig, Parallelism};
pub use error::{CoreError, CoreResult};
pub use glam::{Quat, Vec3};
pub use ids::{AgentId, ObstacleId, TaskId};
pub use time::Tick;
