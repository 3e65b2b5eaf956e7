//! Catmull–Rom smoothing.
//!
//! ```text
//! waypoints ──densify (edges ≤ 10·base)──► control points
//!           ──reflect one unit past each end──► padded controls
//!           ──sample every inner span at k/segments──► spline
//!           ──drop samples in occupied level-0 cells──►
//!           ──thin (spacing² > 2·base²)──► output
//! ```
//!
//! Dropping occluded samples is lossy on purpose: the result never enters an
//! occupied cell, but it may cut a corner the raw path went around.

use vn_core::Vec3;
use vn_occupancy::OccupancyGraph;

/// Smooth `path` for an agent searching on `level`.
///
/// Paths shorter than two points, or whose every sample is occluded, come
/// back unchanged.
pub fn smooth(graph: &OccupancyGraph, path: &[Vec3], level: usize) -> Vec<Vec3> {
    if path.len() < 2 {
        return path.to_vec();
    }
    let base = graph.base_cell_size();
    let segments = ((graph.cell_size(level) * 8.0) as usize).max(1);

    let controls = densify(path, 10.0 * base);
    let samples: Vec<Vec3> = spline(&controls, segments)
        .filter(|&p| !graph.is_occupied_at(p, 0))
        .collect();
    if samples.is_empty() {
        return path.to_vec();
    }
    thin(&samples, 2.0 * base * base)
}

/// Uniform Catmull–Rom basis through `p1` (t = 0) and `p2` (t = 1).
#[inline]
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (-t * (1.0 - t) * (1.0 - t) * p0
        + (2.0 - 5.0 * t2 + 3.0 * t3) * p1
        + t * (1.0 + 4.0 * t - 3.0 * t2) * p2
        - t2 * (1.0 - t) * p3)
}

/// Split edges in half until none is longer than `max_edge`.
fn densify(path: &[Vec3], max_edge: f32) -> Vec<Vec3> {
    let max_sq = max_edge * max_edge;
    let mut way = path.to_vec();
    let mut i = 0;
    while i + 1 < way.len() {
        if way[i].distance_squared(way[i + 1]) > max_sq {
            let mid = way[i].lerp(way[i + 1], 0.5);
            way.insert(i + 1, mid);
        } else {
            i += 1;
        }
    }
    way
}

/// Every span between consecutive controls, `segments + 1` samples each.
fn spline(controls: &[Vec3], segments: usize) -> impl Iterator<Item = Vec3> + '_ {
    let n = controls.len();
    let head = controls[0] + (controls[0] - controls[1]).normalize_or_zero();
    let tail = controls[n - 1] + (controls[n - 1] - controls[n - 2]).normalize_or_zero();
    let padded = move |i: usize| match i {
        0 => head,
        i if i == n + 1 => tail,
        i => controls[i - 1],
    };

    (1..n).flat_map(move |i| {
        (0..=segments).map(move |k| {
            let t = k as f32 / segments as f32;
            catmull_rom(padded(i - 1), padded(i), padded(i + 1), padded(i + 2), t)
        })
    })
}

/// Keep the first point, then each point farther than `min_sq` (squared)
/// from the last kept one.  The final point is always kept.
fn thin(points: &[Vec3], min_sq: f32) -> Vec<Vec3> {
    let [first, body @ .., last] = points else {
        return points.to_vec();
    };
    let mut out = vec![*first];
    let mut kept = *first;
    for &p in body {
        if kept.distance_squared(p) > min_sq {
            out.push(p);
            kept = p;
        }
    }
    out.push(*last);
    out
}
