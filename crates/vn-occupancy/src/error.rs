//! Occupancy-index error type.

use thiserror::Error;

use vn_core::{CoreError, LevelGrid};

/// Errors produced by `vn-occupancy`.
#[derive(Debug, Error)]
pub enum OccupancyError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("snapshot is malformed: {0}")]
    Snapshot(String),

    #[error("snapshot grid {found:?} does not match index grid {expected:?}")]
    GridMismatch { expected: LevelGrid, found: LevelGrid },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OccupancyResult<T> = Result<T, OccupancyError>;
