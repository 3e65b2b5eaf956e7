//! `vn-mobility` — agent motion along processed paths.
//!
//! # Crate layout
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`state`]  | `MovementState`, `Advance`                            |
//! | [`store`]  | `MobilityStore` (one state per agent)                 |
//! | [`refine`] | `merge_refined` (splice a re-plan into the live path) |
//!
//! # Movement model
//!
//! Each control tick a moving agent walks `speed` world units along its
//! final path, possibly crossing several path points.  Position is exact
//! (no interpolation between ticks); arrival snaps onto the last point.

pub mod refine;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use refine::{SPLICE_ANGLE_DEG, merge_refined};
pub use state::{Advance, MovementState};
pub use store::MobilityStore;
