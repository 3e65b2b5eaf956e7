//! `WakeQueue`: behavior wake-ups keyed by tick.
//!
//! Only agents that asked to be woken are stored, so the per-tick cost is
//! proportional to the wake-ups due, not to the number of agents.

use std::collections::BTreeMap;

use vn_core::{AgentId, Tick};

/// Ticks → agents whose behavior asked to be woken then.
#[derive(Debug, Default)]
pub struct WakeQueue {
    inner: BTreeMap<Tick, Vec<AgentId>>,
    /// Cached entry count for O(1) `len()`.
    total: usize,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `agent` to wake at `tick`.  An agent may be queued at
    /// several ticks.
    pub fn push(&mut self, tick: Tick, agent: AgentId) {
        self.inner.entry(tick).or_default().push(agent);
        self.total += 1;
    }

    /// Remove and return every agent due at or before `now`, earliest tick
    /// first, insertion order within a tick.
    pub fn drain_due(&mut self, now: Tick) -> Vec<AgentId> {
        let later = self.inner.split_off(&now.next());
        let due = std::mem::replace(&mut self.inner, later);
        let agents: Vec<AgentId> = due.into_values().flatten().collect();
        self.total -= agents.len();
        agents
    }

    /// Drop every pending wake-up of `agent`.  Returns how many were dropped.
    pub fn cancel(&mut self, agent: AgentId) -> usize {
        let mut dropped = 0;
        self.inner.retain(|_, agents| {
            let before = agents.len();
            agents.retain(|&a| a != agent);
            dropped += before - agents.len();
            !agents.is_empty()
        });
        self.total -= dropped;
        dropped
    }

    /// The earliest tick with at least one queued agent.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
