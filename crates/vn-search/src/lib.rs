//! `vn-search` — pathfinding over the occupancy index.
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`algorithm`]  | `PathSearch` trait, `SearchAlgorithm`, `SearchOutcome` |
//! | [`best_first`] | `BestFirst` (weighted A*, 6- or 26-connected)         |
//! | [`wave_front`] | `WaveFront` (level-0 flood)                           |
//! | [`active`]     | `ActiveSearches`, `SearchSlot`                        |
//! | [`job`]        | `SearchRequest`, `SearchJob`, endpoint validation     |
//! | [`error`]      | `SearchError`, `SearchResult<T>`                      |

pub mod active;
pub mod algorithm;
pub mod best_first;
pub mod error;
pub mod job;
pub mod wave_front;


pub use active::{ActiveSearches, SearchSlot};
pub use algorithm::{PathSearch, SearchAlgorithm, SearchOutcome};
pub use best_first::{BestFirst, SearchStats};
pub use error::{SearchError, SearchResult};
pub use job::{EndpointRejection, SearchJob, SearchReport, SearchRequest, validate_endpoints};
pub use wave_front::WaveFront;
