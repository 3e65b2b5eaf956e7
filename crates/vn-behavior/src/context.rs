//! Read-only navigator state passed to every behavior callback.

use vn_agent::AgentStore;
use vn_core::Tick;

/// Built once per tick after the navigator has finished mutating agent
/// state; no mutable access exists while it is alive.
pub struct NavContext<'a> {
    pub tick:   Tick,
    pub agents: &'a AgentStore,
}

impl<'a> NavContext<'a> {
    #[inline]
    pub fn new(tick: Tick, agents: &'a AgentStore) -> Self {
        Self { tick, agents }
    }
}
