//! Rasterizer error type.

use thiserror::Error;

use vn_occupancy::OccupancyError;

/// Errors produced by `vn-raster`.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("the occupancy graph is not ready; wait for primary processing to finish")]
    GraphNotReady,

    #[error("primary processing was already started")]
    PrimaryAlreadyStarted,

    #[error("invalid obstacle geometry: {0}")]
    InvalidGeometry(String),

    #[error("could not build the worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

pub type RasterResult<T> = Result<T, RasterError>;
