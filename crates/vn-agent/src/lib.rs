//! `vn-agent` — agent records for the `voxnav` workspace.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`store`]      | `AgentStore` (SoA arrays)                             |
//! | [`state`]      | `AgentState`, `Trigger`, `transition`                 |
//! | [`settings`]   | `AgentSettings` (speed, level, algorithm, bounds)     |
//! | [`slot`]       | `PathSlot` (copy-on-read path buffer)                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `AgentState`/`Trigger`. |

pub mod settings;
pub mod slot;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use settings::AgentSettings;
pub use slot::PathSlot;
pub use state::{AgentState, Trigger, transition};
pub use store::AgentStore;
