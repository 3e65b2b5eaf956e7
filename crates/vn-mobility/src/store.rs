//! The `MobilityStore`: motion state for every agent.

use vn_core::{AgentId, Vec3};

use crate::{Advance, MovementState};

/// One [`MovementState`] per agent slot, indexed by `AgentId`.
#[derive(Debug, Default)]
pub struct MobilityStore {
    pub states: Vec<MovementState>,
}

impl MobilityStore {
    pub fn new(agent_count: usize) -> Self {
        Self { states: vec![MovementState::default(); agent_count] }
    }

    /// Grow to cover a newly spawned agent.
    pub fn push(&mut self) {
        self.states.push(MovementState::default());
    }

    /// Begin following a path of length `total` from its first point.
    pub fn begin(&mut self, agent: AgentId, total: f32) {
        self.states[agent.index()] = MovementState::start(total);
    }

    pub fn reset(&mut self, agent: AgentId) {
        self.states[agent.index()] = MovementState::default();
    }

    #[inline]
    pub fn advance(&mut self, agent: AgentId, path: &[Vec3], position: &mut Vec3, speed: f32) -> Advance {
        self.states[agent.index()].advance(path, position, speed)
    }

    #[inline]
    pub fn progress(&self, agent: AgentId) -> f32 {
        self.states[agent.index()].progress()
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> &MovementState {
        &self.states[agent.index()]
    }
}
