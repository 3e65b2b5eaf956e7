//! The full post-processing pipeline run for every found path.

use tracing::trace;

use vn_core::{CancelToken, Vec3};
use vn_occupancy::OccupancyGraph;

use crate::{PathError, PathResult, fancify, optimize, smooth};

/// Which optional passes run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathOptions {
    /// Snap waypoints away from obstacles, then shortcut by line of sight.
    pub optimize: bool,
    /// Catmull–Rom smoothing.
    pub smooth: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self { optimize: true, smooth: false }
    }
}

/// A path ready to be followed.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedPath {
    pub points: Vec<Vec3>,
    pub length: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessOutcome {
    Ready(ProcessedPath),
    Cancelled,
}

/// Turn a raw search path into the path an agent follows.
///
/// The last raw point (a cell center) is replaced by the exact `target`
/// and `start` is prepended, then the enabled passes run.  `cancel` is
/// checked before any work and again before the result is committed.
pub fn process_path(
    graph:   &OccupancyGraph,
    raw:     &[Vec3],
    start:   Vec3,
    target:  Vec3,
    level:   usize,
    options: PathOptions,
    cancel:  &CancelToken,
) -> PathResult<ProcessOutcome> {
    graph.check_level(level)?;
    if raw.is_empty() {
        return Err(PathError::EmptyPath);
    }
    if cancel.is_cancelled() {
        return Ok(ProcessOutcome::Cancelled);
    }

    let mut points = Vec::with_capacity(raw.len() + 1);
    points.push(start);
    points.extend_from_slice(raw);
    if let Some(last) = points.last_mut() {
        *last = target;
    }
    points.dedup();

    if options.optimize {
        points = fancify(graph, &points, level);
        points = optimize(graph, &points, level);
    }
    if options.smooth {
        points = smooth(graph, &points, level);
    }
    let length = path_length(&points);

    if cancel.is_cancelled() {
        return Ok(ProcessOutcome::Cancelled);
    }
    trace!(points = points.len(), length, "path processed");
    Ok(ProcessOutcome::Ready(ProcessedPath { points, length }))
}

/// Sum of segment lengths.
pub fn path_length(path: &[Vec3]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}
