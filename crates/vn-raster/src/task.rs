//! Units of rasterization work.

use std::ops::Range;
use std::sync::Arc;

use vn_core::{CancelToken, ObstacleId, TaskId};

use crate::{HeightField, ObstacleGeometry, TriangleMesh};

/// The geometry slice one task covers.
#[derive(Clone, Debug)]
pub enum RasterWork {
    /// Triangles `range` of a mesh.
    Triangles {
        mesh:  Arc<TriangleMesh>,
        range: Range<usize>,
    },
    /// Quad rows `rows` of a height field (each row spans every column).
    Rows {
        field: Arc<HeightField>,
        rows:  Range<usize>,
    },
    /// Remove the obstacle from the index, then queue `then` at the head of
    /// the queue.
    Release { then: Vec<RasterTask> },
}

/// One queued or running unit of rasterization work.
#[derive(Clone, Debug)]
pub struct RasterTask {
    pub id:         TaskId,
    pub obstacle:   ObstacleId,
    pub work:       RasterWork,
    pub cancel:     CancelToken,
    /// Obstacle generation the task was created for.  Work for an older
    /// generation is skipped.
    pub generation: u64,
}

impl RasterTask {
    /// A release of `obstacle` followed by `then`, which must belong to the
    /// same generation.
    pub fn release(obstacle: ObstacleId, generation: u64, then: Vec<RasterTask>) -> Self {
        Self {
            id: TaskId::next(),
            obstacle,
            work: RasterWork::Release { then },
            cancel: CancelToken::new(),
            generation,
        }
    }

    /// Triangles this task will process.
    pub fn triangle_count(&self) -> usize {
        match &self.work {
            RasterWork::Triangles { range, .. } => range.len(),
            RasterWork::Rows { field, rows } => rows.len() * field.quad_rows() * 2,
            RasterWork::Release { .. } => 0,
        }
    }

    /// Short label for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self.work {
            RasterWork::Triangles { .. } => "mesh",
            RasterWork::Rows { .. } => "terrain",
            RasterWork::Release { .. } => "release",
        }
    }
}

/// Split an obstacle into roughly `parallelism` tasks.
///
/// Meshes are cut into batches of `ceil(triangles / parallelism)` triangles;
/// height fields into slices of `ceil(quad_rows / parallelism)` rows.  Both
/// batch sizes are at least one.  Empty geometry yields no tasks.
pub fn split_geometry(
    obstacle:    ObstacleId,
    geometry:    &ObstacleGeometry,
    parallelism: usize,
    cancel:      &CancelToken,
    generation:  u64,
) -> Vec<RasterTask> {
    let parallelism = parallelism.max(1);
    let task = |work| RasterTask {
        id: TaskId::next(),
        obstacle,
        work,
        cancel: cancel.clone(),
        generation,
    };

    match geometry {
        ObstacleGeometry::Mesh(mesh) => {
            let total = mesh.triangle_count();
            let batch = total.div_ceil(parallelism).max(1);
            (0..total)
                .step_by(batch)
                .map(|start| {
                    task(RasterWork::Triangles {
                        mesh:  Arc::clone(mesh),
                        range: start..(start + batch).min(total),
                    })
                })
                .collect()
        }
        ObstacleGeometry::HeightField(field) => {
            // Quad rows are addressed by their far edge, 1..resolution.
            let end = field.resolution();
            let slice = field.quad_rows().div_ceil(parallelism).max(1);
            (1..end)
                .step_by(slice)
                .map(|start| {
                    task(RasterWork::Rows {
                        field: Arc::clone(field),
                        rows:  start..(start + slice).min(end),
                    })
                })
                .collect()
        }
    }
}
