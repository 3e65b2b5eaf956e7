//! Line-of-sight shortcutting.

use vn_core::Vec3;
use vn_occupancy::OccupancyGraph;

use crate::line_of_sight;

/// Remove waypoints that can be skipped without losing sight.
///
/// One forward pass runs over the path, then the same pass over the
/// reversed path, so shortcuts are found from both ends.
pub fn optimize(graph: &OccupancyGraph, path: &[Vec3], level: usize) -> Vec<Vec3> {
    let mut forward = shortcut(graph, path.to_vec(), level);
    forward.reverse();
    let mut both = shortcut(graph, forward, level);
    both.reverse();
    both
}

/// If the ends see each other only they remain.  Otherwise, for
/// `i = 2, 4, …`, the first `path[i-1]` whose neighbours see each other is
/// dropped and the scan restarts.
fn shortcut(graph: &OccupancyGraph, mut path: Vec<Vec3>, level: usize) -> Vec<Vec3> {
    if path.len() < 3 {
        return path;
    }
    'restart: loop {
        let (first, last) = (path[0], path[path.len() - 1]);
        if line_of_sight(graph, first, last, level) {
            return vec![first, last];
        }
        let mut i = 2;
        while i < path.len() {
            if line_of_sight(graph, path[i - 2], path[i], level) {
                path.remove(i - 1);
                continue 'restart;
            }
            i += 2;
        }
        return path;
    }
}
