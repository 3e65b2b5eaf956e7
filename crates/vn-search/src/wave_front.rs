//! Wave-front (flood) search on level 0.
//!
//! Waves grow outward from the start one ring at a time.  A candidate is
//! rejected if it sits in the wave being expanded or the one before it, so
//! only two waves of history are consulted.  On a 6-connected grid every
//! face neighbour of a cell differs in distance parity, which makes this
//! lookback sufficient and the flood an exact breadth-first search.
//!
//! The goal is recognised as soon as it shows up as a neighbour, before
//! any occupancy or constraint filter, and the path is then recovered by
//! descending the waves from newest to oldest.

use rustc_hash::FxHashSet;

use vn_core::{CancelToken, CellIndex, SpaceConstraints, Vec3};
use vn_occupancy::OccupancyGraph;

use crate::{PathSearch, SearchOutcome};

/// Level-0 flood search.  The `level` argument of
/// [`find_path`](PathSearch::find_path) is ignored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveFront;

type Wave = FxHashSet<CellIndex>;

impl PathSearch for WaveFront {
    fn find_path(
        &self,
        graph:       &OccupancyGraph,
        start:       Vec3,
        goal:        Vec3,
        _level:      usize,
        constraints: &SpaceConstraints,
        cancel:      &CancelToken,
    ) -> SearchOutcome {
        let from = graph.cell_index(start, 0);
        let to = graph.cell_index(goal, 0);
        if from == to {
            return SearchOutcome::Found(vec![graph.cell_center(from, 0)]);
        }

        let mut waves: Vec<Wave> = vec![Wave::from_iter([from]), Wave::default()];
        loop {
            let n = waves.len();
            if waves[n - 2].is_empty() {
                return SearchOutcome::NoPath;
            }

            let mut next = Wave::default();
            let mut reached = false;
            'expand: for &cell in &waves[n - 2] {
                if cancel.is_cancelled() {
                    return SearchOutcome::Cancelled;
                }
                for neighbour in cell.axis_neighbours() {
                    if neighbour == to {
                        reached = true;
                        break 'expand;
                    }
                    let seen = waves[n - 2].contains(&neighbour)
                        || (n > 2 && waves[n - 3].contains(&neighbour));
                    if seen
                        || graph.is_occupied(neighbour, 0)
                        || !constraints.contains(graph.cell_center(neighbour, 0))
                    {
                        continue;
                    }
                    next.insert(neighbour);
                }
            }
            waves[n - 1] = next;
            if reached {
                return SearchOutcome::Found(descend(graph, &waves, to));
            }
            waves.push(Wave::default());
        }
    }
}

/// Walk from `goal` back through the waves, newest first, taking the first
/// neighbour (in axis order) found in each wave.  Returns start→goal centers.
fn descend(graph: &OccupancyGraph, waves: &[Wave], goal: CellIndex) -> Vec<Vec3> {
    let mut way = vec![goal];
    for wave in waves.iter().rev() {
        let Some(&last) = way.last() else { break };
        if let Some(step) = last.axis_neighbours().find(|n| wave.contains(n)) {
            way.push(step);
        }
    }
    way.into_iter().rev().map(|c| graph.cell_center(c, 0)).collect()
}
