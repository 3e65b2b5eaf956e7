//! Triangle-to-cell conversion.
//!
//! A triangle `(p0, p1, p2)` is covered by two nested line sweeps at a
//! fixed step: the outer sweep walks the edge `p1 → p2`, and for every outer
//! sample an inner sweep walks from `p0` towards it.  Every sample is
//! occupied on all levels.  With the step at most half a cell, no gap wider
//! than the step slips between samples, and the fixed order makes the
//! produced cell set reproducible.

use vn_core::{ObstacleId, Vec3};
use vn_occupancy::OccupancyGraph;

/// Sampling step for a grid with the given base cell size.
#[inline]
pub fn shift_step(base_cell_size: f32) -> f32 {
    (base_cell_size * base_cell_size).min(base_cell_size * 0.5)
}

/// Occupy every cell the triangle passes through.
pub fn occupy_triangle(graph: &OccupancyGraph, [p0, p1, p2]: [Vec3; 3], id: ObstacleId, step: f32) {
    let edge_len = p1.distance(p2);
    let edge_dir = (p2 - p1).normalize_or_zero();

    let mut outer = 0.0_f32;
    while outer < edge_len {
        let on_edge = p1 + edge_dir * outer;
        graph.occupy_all_levels(on_edge, id);

        let reach_sq = p0.distance_squared(on_edge);
        let inner_dir = (on_edge - p0).normalize_or_zero();
        let mut inner = 0.0_f32;
        while inner * inner < reach_sq {
            graph.occupy_all_levels(p0 + inner_dir * inner, id);
            inner += step;
        }

        outer += step;
    }
}
