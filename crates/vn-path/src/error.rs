use thiserror::Error;

use vn_core::CoreError;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("cannot process an empty path")]
    EmptyPath,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type PathResult<T> = Result<T, PathError>;
