//! The `AgentBehavior` trait, the extension point for collaborator logic.

use vn_core::AgentId;

use crate::{Command, NavContext, NavEvent};

/// Reacts to navigation events on behalf of agents.
///
/// Both hooks default to doing nothing, so a behavior only implements what
/// it cares about.  Per-agent state belongs in the agent store (read through
/// `ctx.agents`), not in the behavior.
///
/// # Example
///
/// ```rust,ignore
/// struct Patrol(Vec3, Vec3);
///
/// impl AgentBehavior for Patrol {
///     fn on_event(&self, agent: AgentId, event: NavEvent, ctx: &NavContext<'_>) -> Vec<Command> {
///         match event {
///             NavEvent::TargetReached => {
///                 let here = ctx.agents.position[agent.index()];
///                 let next = if here.distance(self.0) < 1.0 { self.1 } else { self.0 };
///                 vec![Command::MoveTo { target: next, top_priority: false }]
///             }
///             _ => vec![],
///         }
///     }
/// }
/// ```
pub trait AgentBehavior: Send + Sync + 'static {
    /// Called once per event, in the order the events occurred.
    fn on_event(
        &self,
        _agent: AgentId,
        _event: NavEvent,
        _ctx:   &NavContext<'_>,
    ) -> Vec<Command> {
        vec![]
    }

    /// Called at a tick requested with [`Command::WakeAt`].
    fn on_wake(&self, _agent: AgentId, _ctx: &NavContext<'_>) -> Vec<Command> {
        vec![]
    }
}
