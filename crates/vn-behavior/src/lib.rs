//! `vn-behavior` — how collaborators observe and steer agents.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`event`]   | `NavEvent` (named notifications)                          |
//! | [`command`] | `Command` (`MoveTo`, `RefinePath`, `WakeAt`, …)           |
//! | [`context`] | `NavContext<'a>` (read-only tick snapshot)                |
//! | [`model`]   | `AgentBehavior` trait                                     |
//! | [`noop`]    | `NoopBehavior`                                            |
//! | [`retry`]   | `RetryOnFailure` (wait, then re-issue the move)           |
//! | [`error`]   | `BehaviorError`, `BehaviorResult<T>`                      |
//!
//! # Design notes
//!
//! Behaviors never touch agent state.  They receive events after the
//! navigator's tick phases have run and answer with commands, which the
//! navigator applies sequentially in ascending agent order.

pub mod command;
pub mod context;
pub mod error;
pub mod event;
pub mod model;
pub mod noop;
pub mod retry;


pub use command::Command;
pub use context::NavContext;
pub use error::{BehaviorError, BehaviorResult};
pub use event::NavEvent;
pub use model::AgentBehavior;
pub use noop::NoopBehavior;
pub use retry::RetryOnFailure;
