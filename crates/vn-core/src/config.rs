//! Navigation service configuration.
//!
//! Typically built in code or loaded from JSON by the application crate and
//! passed to the `Navigator` builder.

use crate::{CoreError, CoreResult, LevelGrid};

/// Smallest accepted base cell size (exclusive).
pub const MIN_CELL_SIZE: f32 = 0.01;

/// Largest accepted number of resolution levels.
pub const MAX_LEVELS: usize = 16;

// ── Parallelism ───────────────────────────────────────────────────────────────

/// How many background workers to run.
///
/// Whatever the mode, the resolved width is clamped to
/// `[1, max(cores - 1, 1)]` so one core is always left for the control loop.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parallelism {
    /// One worker per logical core, minus one.
    #[default]
    Hardware,
    /// `ceil(cores * multiplier)` workers.
    CoreMultiplier(f32),
    /// Exactly this many workers.
    Fixed(usize),
}

impl Parallelism {
    /// Resolve against a known core count.
    pub fn resolve_for(self, cores: usize) -> usize {
        let ceiling = cores.saturating_sub(1).max(1);
        let wanted = match self {
            Parallelism::Hardware => ceiling,
            Parallelism::CoreMultiplier(m) => (cores as f32 * m).ceil().max(0.0) as usize,
            Parallelism::Fixed(n) => n,
        };
        wanted.clamp(1, ceiling)
    }

    /// Resolve against the host's available parallelism.
    pub fn resolve(self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        self.resolve_for(cores)
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration of the navigation service.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Edge length of a level-0 cell, in world units.
    pub base_cell_size: f32,

    /// Number of resolution levels (level 0 is the finest).
    pub level_count: usize,

    /// Worker pool width; also the concurrent search admission limit.
    pub parallelism: Parallelism,

    /// When set, the rasterizer dispatches every queued task immediately
    /// instead of waiting for a worker slot to free.
    pub aggressive_dispatch: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            base_cell_size:      1.0,
            level_count:         3,
            parallelism:         Parallelism::Hardware,
            aggressive_dispatch: false,
        }
    }
}

impl NavConfig {
    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        self.grid().map(|_| ())?;
        match self.parallelism {
            Parallelism::CoreMultiplier(m) if !(m.is_finite() && m > 0.0) => Err(
                CoreError::Config(format!("core multiplier {m} must be a positive number")),
            ),
            Parallelism::Fixed(0) => {
                Err(CoreError::Config("fixed parallelism must be at least 1".into()))
            }
            _ => Ok(()),
        }
    }

    /// The cell-size table described by this configuration.
    pub fn grid(&self) -> CoreResult<LevelGrid> {
        LevelGrid::new(self.base_cell_size, self.level_count)
    }

    /// Resolved worker count.
    pub fn workers(&self) -> usize {
        self.parallelism.resolve()
    }
}
