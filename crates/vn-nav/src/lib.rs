//! `vn-nav` — the control loop that ties the voxnav crates together.
//!
//! # Tick phases
//!
//! ```text
//! every tick:
//!   ① Graph ready — once the index is ready, GraphReady to every agent.
//!   ② Drain       — worker completions, oldest first; stale generations
//!                   are dropped.
//!   ③ Admission   — head of the queue starts its search while
//!                   active searches < limit (one per tick).
//!   ④ Motion      — Moving agents advance `speed` along the final path.
//!   ⑤ Wake        — agents whose behavior asked for this tick.
//!   ⑥ Deliver     — events → observer + behavior; commands applied in
//!                   ascending AgentId order.
//! ```
//!
//! Search, processing and refinement run on the shared worker pool and
//! report back through an [`ActionQueue`][vn_schedule::ActionQueue]; they
//! never touch agent state.
//!
//! | Module         | Contents                                        |
//! |----------------|-------------------------------------------------|
//! | [`navigator`]  | `Navigator` (tick loop, move requests, obstacles) |
//! | [`builder`]    | `NavigatorBuilder`                              |
//! | [`observer`]   | `NavObserver`, `NoopObserver`, `EventLog`       |
//! | `worker`       | background tasks and their completion messages  |
//! | [`error`]      | `NavError`, `NavResult<T>`                      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut nav = NavigatorBuilder::new(config, NoopBehavior)
//!     .obstacle(ObstacleId(0), TriangleMesh::cuboid(center, half))
//!     .agent(start, AgentSettings::new(bounds))
//!     .build()?;
//! nav.wait_ready(Duration::from_secs(5));
//! nav.tick(&mut NoopObserver);
//! nav.move_to(AgentId(0), goal, false)?;
//! ```

pub mod builder;
pub mod error;
pub mod navigator;
pub mod observer;
mod worker;

#[cfg(test)]
mod tests;

pub use builder::NavigatorBuilder;
pub use error::{NavError, NavResult};
pub use navigator::Navigator;
pub use observer::{EventLog, NavObserver, NoopObserver};
