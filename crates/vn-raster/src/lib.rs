//! `vn-raster` — converts obstacle geometry into occupied cells.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`geometry`]   | `TriangleMesh`, `HeightField`, `Transform`, `ObstacleGeometry` |
//! | [`sweep`]      | `occupy_triangle`, `shift_step` (fixed-step triangle sweep) |
//! | [`task`]       | `RasterTask`, `RasterWork`, `split_geometry`             |
//! | [`rasterizer`] | `ObstacleRasterizer` (bounded background pool + progress) |
//! | [`ready`]      | `ReadySignal` (one-shot ready notification)              |
//! | [`error`]      | `RasterError`, `RasterResult<T>`                         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let graph = Arc::new(OccupancyGraph::from_config(&config)?);
//! let pool = vn_raster::worker_pool(config.workers())?;
//! let raster = ObstacleRasterizer::new(Arc::clone(&graph), pool, &config);
//! raster.begin_primary([(ObstacleId(0), TriangleMesh::cuboid(c, h).into())])?;
//! raster.wait_ready(Duration::from_secs(5));
//! ```

pub mod error;
pub mod geometry;
pub mod rasterizer;
pub mod ready;
pub mod sweep;
pub mod task;


use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

pub use error::{RasterError, RasterResult};
pub use geometry::{HeightField, ObstacleGeometry, Transform, TriangleMesh};
pub use rasterizer::{ObstacleRasterizer, TaskSummary, TasksInfo};
pub use ready::ReadySignal;
pub use sweep::{occupy_triangle, shift_step};
pub use task::{RasterTask, RasterWork, split_geometry};

/// Build the shared background worker pool.
pub fn worker_pool(workers: usize) -> RasterResult<Arc<ThreadPool>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("vn-worker-{i}"))
        .build()?;
    Ok(Arc::new(pool))
}
