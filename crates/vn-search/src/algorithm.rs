//! The search interface and the closed set of algorithms behind it.

use vn_core::{CancelToken, SpaceConstraints, Vec3};
use vn_occupancy::OccupancyGraph;

use crate::{BestFirst, WaveFront};

// ── SearchOutcome ─────────────────────────────────────────────────────────────

/// What a search produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// Cell centers from start to goal, inclusive.
    Found(Vec<Vec3>),
    /// The reachable space was exhausted without meeting the goal.
    NoPath,
    /// The cancel token was observed at a checkpoint.
    Cancelled,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn into_path(self) -> Option<Vec<Vec3>> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

// ── PathSearch ────────────────────────────────────────────────────────────────

/// A grid pathfinding algorithm.
///
/// # Thread safety
///
/// Implementations are `Send + Sync`; one value is shared by every search
/// job that uses it.  All per-search state lives on the stack of
/// [`find_path`](PathSearch::find_path).
pub trait PathSearch: Send + Sync {
    /// Search from `start` to `goal` on `level`, staying inside
    /// `constraints` and polling `cancel` at every checkpoint.
    fn find_path(
        &self,
        graph:       &OccupancyGraph,
        start:       Vec3,
        goal:        Vec3,
        level:       usize,
        constraints: &SpaceConstraints,
        cancel:      &CancelToken,
    ) -> SearchOutcome;
}

// ── SearchAlgorithm ───────────────────────────────────────────────────────────

/// Per-agent algorithm choice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SearchAlgorithm {
    BestFirst(BestFirst),
    WaveFront(WaveFront),
}

impl SearchAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            SearchAlgorithm::BestFirst(_) => "best-first",
            SearchAlgorithm::WaveFront(_) => "wave-front",
        }
    }
}

impl Default for SearchAlgorithm {
    fn default() -> Self {
        SearchAlgorithm::BestFirst(BestFirst::default())
    }
}

impl PathSearch for SearchAlgorithm {
    fn find_path(
        &self,
        graph:       &OccupancyGraph,
        start:       Vec3,
        goal:        Vec3,
        level:       usize,
        constraints: &SpaceConstraints,
        cancel:      &CancelToken,
    ) -> SearchOutcome {
        match self {
            SearchAlgorithm::BestFirst(a) => a.find_path(graph, start, goal, level, constraints, cancel),
            SearchAlgorithm::WaveFront(a) => a.find_path(graph, start, goal, level, constraints, cancel),
        }
    }
}

impl From<BestFirst> for SearchAlgorithm {
    fn from(a: BestFirst) -> Self {
        SearchAlgorithm::BestFirst(a)
    }
}

impl From<WaveFront> for SearchAlgorithm {
    fn from(a: WaveFront) -> Self {
        SearchAlgorithm::WaveFront(a)
    }
}
