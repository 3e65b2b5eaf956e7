//! Grid line-of-sight.

use vn_core::{CellIndex, Vec3};
use vn_occupancy::OccupancyGraph;

/// Whether the straight segment between the cells of `a` and `b` crosses
/// no occupied cell on `level`.
///
/// The walk happens in index space with a step of `min(1, base/4)` and
/// `trunc(distance) / step` samples.  Each sample is rounded to the nearest
/// index before the occupancy lookup.  The starting cell is not tested.
pub fn line_of_sight(graph: &OccupancyGraph, a: Vec3, b: Vec3, level: usize) -> bool {
    let from = graph.cell_index(a, level).as_vec3();
    let to = graph.cell_index(b, level).as_vec3();
    let step = (graph.base_cell_size() * 0.25).min(1.0);
    let samples = from.distance(to).trunc() / step;
    let dir = (to - from).normalize_or_zero();

    let mut cursor = from;
    let mut k = 0.0_f32;
    while k < samples {
        cursor += dir * step;
        let r = cursor.round();
        let index = CellIndex::new(r.x as i32, r.y as i32, r.z as i32);
        if graph.is_occupied(index, level) {
            return false;
        }
        k += 1.0;
    }
    true
}
