//! `vn-path` — post-processing of raw search paths.
//!
//! | Module       | Contents                                           |
//! |--------------|----------------------------------------------------|
//! | [`sight`]    | `line_of_sight` (sampled grid walk)                |
//! | [`fancify`]  | `fancify` (waypoint snapping to free/coarse cells) |
//! | [`optimize`] | `optimize` (bidirectional shortcutting)            |
//! | [`smooth`]   | `smooth`, `catmull_rom`                            |
//! | [`process`]  | `process_path`, `PathOptions`, `path_length`       |
//! | [`error`]    | `PathError`, `PathResult<T>`                       |
//!
//! All passes only read the occupancy index.

pub mod error;
pub mod fancify;
pub mod optimize;
pub mod process;
pub mod sight;
pub mod smooth;


pub use error::{PathError, PathResult};
pub use fancify::fancify;
pub use optimize::optimize;
pub use process::{PathOptions, ProcessOutcome, ProcessedPath, path_length, process_path};
pub use sight::line_of_sight;
pub use smooth::{catmull_rom, smooth};
