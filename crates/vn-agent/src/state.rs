//! Per-agent request lifecycle.
//!
//! ```text
//! Idle ──MoveRequested──► QueuedForSearch ──Admitted──► SearchRunning
//!  │                                                      │      │
//!  └──ShortHop──► PathProcessing ◄──────SearchFound───────┘      │
//!                     │                                   SearchFailed
//!                 Processed                                      ▼
//!                     ▼                                         Idle
//!                  Moving ◄──Resume── Paused
//!                  │   └───Interrupt────►┘
//!               Arrived
//!                  ▼
//!                 Idle
//! ```
//!
//! `Reset` leads to `Idle` from every state.

use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    #[default]
    Idle,
    QueuedForSearch,
    SearchRunning,
    PathProcessing,
    Moving,
    Paused,
}

impl AgentState {
    /// `true` while background work for the agent may be in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, AgentState::SearchRunning | AgentState::PathProcessing)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Inputs to [`transition`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trigger {
    MoveRequested,
    /// Target closer than one base cell; search is skipped.
    ShortHop,
    Admitted,
    SearchFound,
    SearchFailed,
    Processed,
    Arrived,
    Interrupt,
    Resume,
    Reset,
}

/// The transition table.  `None` means the trigger does not apply in
/// `state`, and the caller leaves the state unchanged.
pub fn transition(state: AgentState, trigger: Trigger) -> Option<AgentState> {
    use AgentState::*;
    use Trigger::*;

    match (state, trigger) {
        (_, Reset) => Some(Idle),
        (Idle, MoveRequested) => Some(QueuedForSearch),
        (Idle, ShortHop) => Some(PathProcessing),
        (QueuedForSearch, Admitted) => Some(SearchRunning),
        (SearchRunning, SearchFound) => Some(PathProcessing),
        (SearchRunning, SearchFailed) => Some(Idle),
        (PathProcessing, Processed) => Some(Moving),
        (Moving, Arrived) => Some(Idle),
        (Moving, Interrupt) => Some(Paused),
        (Paused, Resume) => Some(Moving),
        _ => None,
    }
}
