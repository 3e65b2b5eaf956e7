//! `AdmissionQueue`: agents waiting for a search slot.

use std::collections::VecDeque;

use vn_core::AgentId;

/// FIFO of agents waiting to start a search.
///
/// Each agent appears at most once; re-queuing an agent moves it.  The
/// navigator pops at most one agent per tick, and only while the number of
/// running searches is below the configured limit.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    inner: VecDeque<AgentId>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `agent` behind everyone already waiting.
    pub fn push_back(&mut self, agent: AgentId) {
        self.remove(agent);
        self.inner.push_back(agent);
    }

    /// Queue `agent` ahead of everyone already waiting.
    pub fn push_front(&mut self, agent: AgentId) {
        self.remove(agent);
        self.inner.push_front(agent);
    }

    /// Take `agent` out of the queue.  Returns whether it was queued.
    pub fn remove(&mut self, agent: AgentId) -> bool {
        match self.inner.iter().position(|&a| a == agent) {
            Some(i) => {
                self.inner.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn pop_front(&mut self) -> Option<AgentId> {
        self.inner.pop_front()
    }

    pub fn peek(&self) -> Option<AgentId> {
        self.inner.front().copied()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.inner.contains(&agent)
    }

    /// Waiting agents, head first.
    pub fn iter(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.inner.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
