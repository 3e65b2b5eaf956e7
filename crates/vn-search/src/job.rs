//! A single search request and the job that executes it.

use tracing::debug;

use vn_core::{CancelToken, SpaceConstraints, Vec3};
use vn_occupancy::OccupancyGraph;

use crate::{PathSearch, SearchAlgorithm, SearchOutcome, SearchSlot};

// ── Endpoint validation ───────────────────────────────────────────────────────

/// Why a request was turned away before searching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndpointRejection {
    GoalOutOfBounds,
    StartOutOfBounds,
    StartOccupied,
    GoalOccupied,
}

/// Check a request's endpoints against the constraints (strict interior)
/// and level-0 occupancy.  The first failing check wins, in the order
/// goal bounds, start bounds, start occupancy, goal occupancy.
pub fn validate_endpoints(
    graph:       &OccupancyGraph,
    start:       Vec3,
    goal:        Vec3,
    constraints: &SpaceConstraints,
) -> Result<(), EndpointRejection> {
    if !constraints.contains_strict(goal) {
        return Err(EndpointRejection::GoalOutOfBounds);
    }
    if !constraints.contains_strict(start) {
        return Err(EndpointRejection::StartOutOfBounds);
    }
    if graph.is_occupied_at(start, 0) {
        return Err(EndpointRejection::StartOccupied);
    }
    if graph.is_occupied_at(goal, 0) {
        return Err(EndpointRejection::GoalOccupied);
    }
    Ok(())
}

// ── SearchRequest / SearchJob ─────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub start:       Vec3,
    pub goal:        Vec3,
    pub level:       usize,
    pub algorithm:   SearchAlgorithm,
    pub constraints: SpaceConstraints,
    pub cancel:      CancelToken,
}

/// Result of a [`SearchJob`].
#[derive(Clone, Debug, PartialEq)]
pub enum SearchReport {
    Rejected(EndpointRejection),
    Completed(SearchOutcome),
}

/// A request bound to an active-search slot.  Consumed by [`run`](Self::run).
#[derive(Debug)]
pub struct SearchJob {
    pub algorithm: SearchAlgorithm,
    pub request:   SearchRequest,
    pub slot:      SearchSlot,
}

impl SearchJob {
    pub fn new(request: SearchRequest, slot: SearchSlot) -> Self {
        Self { algorithm: request.algorithm, request, slot }
    }

    /// Validate the endpoints and search.  The slot is released on return.
    pub fn run(self, graph: &OccupancyGraph) -> SearchReport {
        let SearchJob { algorithm, request, slot: _slot } = self;
        let r = &request;

        if let Err(rejection) = validate_endpoints(graph, r.start, r.goal, &r.constraints) {
            debug!(?rejection, "search request rejected");
            return SearchReport::Rejected(rejection);
        }

        let outcome = algorithm.find_path(graph, r.start, r.goal, r.level, &r.constraints, &r.cancel);
        match &outcome {
            SearchOutcome::Found(path) => {
                debug!(algorithm = algorithm.name(), points = path.len(), "path found")
            }
            SearchOutcome::NoPath => debug!(algorithm = algorithm.name(), "no path"),
            SearchOutcome::Cancelled => debug!(algorithm = algorithm.name(), "search cancelled"),
        }
        SearchReport::Completed(outcome)
    }
}
