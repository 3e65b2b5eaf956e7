//! What a behavior asks the navigator to do.

use vn_core::{Tick, Vec3};

/// A request returned from an [`AgentBehavior`][crate::AgentBehavior]
/// callback.  Commands are applied after the tick's events are delivered,
/// in ascending agent order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Start a new move request.  `top_priority` queues it ahead of
    /// everyone already waiting for a search slot.
    MoveTo { target: Vec3, top_priority: bool },

    /// Re-plan the tail of the current movement towards a new target.
    RefinePath(Vec3),

    Interrupt,
    Resume,

    /// Cancel everything in flight for this agent.
    StopAllAsyncWork,

    /// Call [`on_wake`][crate::AgentBehavior::on_wake] at the given tick.
    WakeAt(Tick),
}
