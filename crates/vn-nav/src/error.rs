use thiserror::Error;

use vn_core::{AgentId, CoreError};
use vn_occupancy::OccupancyError;
use vn_raster::RasterError;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("the occupancy graph is not ready; wait for primary processing to finish")]
    GraphNotReady,

    #[error("{0} does not exist or was despawned")]
    AgentNotFound(AgentId),

    #[error("navigator configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Occupancy(#[from] OccupancyError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

pub type NavResult<T> = Result<T, NavError>;
