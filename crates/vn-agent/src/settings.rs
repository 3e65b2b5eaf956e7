//! Per-agent navigation settings.

use vn_core::{CoreError, CoreResult, SpaceConstraints, Vec3};
use vn_path::PathOptions;
use vn_search::SearchAlgorithm;

#[derive(Clone, Debug, PartialEq)]
pub struct AgentSettings {
    /// World units travelled per tick.
    pub speed: f32,
    /// Occupancy level searched on.
    pub level: usize,
    pub algorithm: SearchAlgorithm,
    /// Volume the agent's searches (and requests) must stay inside.
    pub constraints: SpaceConstraints,
    pub path: PathOptions,
}

impl AgentSettings {
    /// Settings with defaults for everything but the search volume.
    pub fn new(constraints: SpaceConstraints) -> Self {
        Self {
            speed: 0.1,
            level: 0,
            algorithm: SearchAlgorithm::default(),
            constraints,
            path: PathOptions::default(),
        }
    }

    /// Check the settings against an index with `level_count` levels.
    pub fn validate(&self, level_count: usize) -> CoreResult<()> {
        if self.level >= level_count {
            return Err(CoreError::InvalidLevel { level: self.level, count: level_count });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(CoreError::Config(format!("agent speed {} must be positive", self.speed)));
        }
        Ok(())
    }

    /// Whether `p` lies strictly inside the constraint volume.
    pub fn in_bounds(&self, p: Vec3) -> bool {
        self.constraints.contains_strict(p)
    }
}
