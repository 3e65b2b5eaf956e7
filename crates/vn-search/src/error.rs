use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("heuristic weight {0} is outside [0, 1]")]
    InvalidHeuristicWeight(f32),
}

pub type SearchResult<T> = Result<T, SearchError>;
