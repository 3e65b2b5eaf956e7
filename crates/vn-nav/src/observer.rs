//! Observer trait for progress reporting and event collection.

use vn_behavior::NavEvent;
use vn_core::{AgentId, Tick};

/// Callbacks invoked by [`Navigator::tick`][crate::Navigator::tick].
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
///
/// # Example: arrival counter
///
/// ```rust,ignore
/// struct Arrivals(usize);
///
/// impl NavObserver for Arrivals {
///     fn on_event(&mut self, _tick: Tick, _agent: AgentId, event: NavEvent) {
///         if event == NavEvent::TargetReached {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait NavObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every event, in emission order, before the behavior sees
    /// it.
    fn on_event(&mut self, _tick: Tick, _agent: AgentId, _event: NavEvent) {}

    /// Called at the end of each tick with the number of events delivered.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}
}

/// A [`NavObserver`] that does nothing.
pub struct NoopObserver;

impl NavObserver for NoopObserver {}

/// Records every delivered event.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<(Tick, AgentId, NavEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered to `agent`, oldest first.
    pub fn for_agent(&self, agent: AgentId) -> Vec<NavEvent> {
        self.events
            .iter()
            .filter(|&&(_, a, _)| a == agent)
            .map(|&(_, _, event)| event)
            .collect()
    }

    pub fn contains(&self, agent: AgentId, event: NavEvent) -> bool {
        self.events.iter().any(|&(_, a, e)| a == agent && e == event)
    }

    pub fn count(&self, event: NavEvent) -> usize {
        self.events.iter().filter(|&&(_, _, e)| e == event).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl NavObserver for EventLog {
    fn on_event(&mut self, tick: Tick, agent: AgentId, event: NavEvent) {
        self.events.push((tick, agent, event));
    }
}
