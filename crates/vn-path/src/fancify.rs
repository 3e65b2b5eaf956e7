//! Waypoint snapping.
//!
//! Interior waypoints are pulled away from obstacles (to a cell whose whole
//! 3×3×3 neighbourhood is free) and then lifted to the coarsest free level
//! above the search level.  Both endpoints are left untouched.

use vn_core::{CellIndex, Vec3};
use vn_occupancy::OccupancyGraph;

pub fn fancify(graph: &OccupancyGraph, path: &[Vec3], level: usize) -> Vec<Vec3> {
    let Some((&first, rest)) = path.split_first() else {
        return Vec::new();
    };
    let Some((&last, interior)) = rest.split_last() else {
        return vec![first];
    };

    let mut out = Vec::with_capacity(path.len());
    out.push(first);
    for &p in interior {
        let snapped = free_adjacent_center(graph, graph.cell_index(p, level), level);
        let lifted = if graph.level_count() > 1 {
            graph.highest_free_level_center(snapped, level)
        } else {
            snapped
        };
        out.push(lifted);
    }
    out.push(last);
    out
}

/// Center of `index` if its neighbourhood is clear, else of the first
/// neighbour (x, y, z ascending) whose own neighbourhood is clear, else of
/// `index` anyway.
fn free_adjacent_center(graph: &OccupancyGraph, index: CellIndex, level: usize) -> Vec3 {
    let clear = |c: CellIndex| c.neighbourhood().all(|n| !graph.is_occupied(n, level));
    let chosen = if clear(index) {
        index
    } else {
        index.neighbourhood().find(|&n| clear(n)).unwrap_or(index)
    };
    graph.cell_center(chosen, level)
}
