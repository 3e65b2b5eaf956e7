//! Notifications delivered to observers and behaviors.

use std::fmt;

/// Something that happened to one agent during a tick.
///
/// Events are collected while the tick runs and handed out, in order, at
/// the end of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NavEvent {
    /// The occupancy index finished primary processing.  Sent once to every
    /// live agent.
    GraphReady,

    MovementRequested,
    PathfindingRequested,
    AddedToQueue,
    QueueCameUp,
    PathfindingStarted,
    PathFound,
    PathNotFound,
    SearchFromOccupied,
    SearchToOccupied,
    SearchFromOutOfBounds,
    SearchToOutOfBounds,
    ProcessingStarted,
    ProcessingFinished,
    MovementStarted,
    MovementInterrupted,
    MovementResumed,
    TargetReached,

    RefinementRequested,
    RefinementStarted,
    RefinementSucceeded,
    RefinementFailed,
}

impl NavEvent {
    /// A search request ended without a path; the agent is back to idle.
    pub fn is_search_failure(self) -> bool {
        matches!(
            self,
            NavEvent::PathNotFound
                | NavEvent::SearchFromOccupied
                | NavEvent::SearchToOccupied
                | NavEvent::SearchFromOutOfBounds
                | NavEvent::SearchToOutOfBounds
        )
    }
}

impl fmt::Display for NavEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
