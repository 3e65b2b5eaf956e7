//! Retry failed searches after a delay.

use vn_core::AgentId;

use crate::{AgentBehavior, BehaviorError, BehaviorResult, Command, NavContext, NavEvent};

/// Re-issues an agent's last move request `delay` ticks after any search
/// failure (no path, occupied or out-of-bounds endpoints).
///
/// The navigator itself never retries; this is the collaborator-side
/// pattern for doing so.
#[derive(Copy, Clone, Debug)]
pub struct RetryOnFailure {
    delay: u64,
}

impl RetryOnFailure {
    pub fn new(delay: u64) -> BehaviorResult<Self> {
        if delay == 0 {
            return Err(BehaviorError::Config("retry delay must be at least one tick".into()));
        }
        Ok(Self { delay })
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }
}

impl AgentBehavior for RetryOnFailure {
    fn on_event(&self, _agent: AgentId, event: NavEvent, ctx: &NavContext<'_>) -> Vec<Command> {
        if event.is_search_failure() {
            vec![Command::WakeAt(ctx.tick + self.delay)]
        } else {
            vec![]
        }
    }

    fn on_wake(&self, agent: AgentId, ctx: &NavContext<'_>) -> Vec<Command> {
        let target = ctx.agents.target[agent.index()];
        vec![Command::MoveTo { target, top_priority: false }]
    }
}
