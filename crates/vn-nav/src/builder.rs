//! Fluent builder for constructing a [`Navigator`].

use std::sync::Arc;

use rayon::ThreadPool;
use rustc_hash::FxHashMap;
use tracing::info;

use vn_agent::{AgentSettings, AgentStore};
use vn_behavior::AgentBehavior;
use vn_core::{NavConfig, ObstacleId, Tick, Vec3};
use vn_mobility::MobilityStore;
use vn_occupancy::{OccupancyGraph, OccupancySnapshot};
use vn_raster::{ObstacleGeometry, ObstacleRasterizer, worker_pool};
use vn_schedule::{ActionQueue, AdmissionQueue, WakeQueue};
use vn_search::ActiveSearches;

use crate::worker::Workers;
use crate::{NavError, NavResult, Navigator};

/// Fluent builder for [`Navigator<B>`].
///
/// # Required inputs
///
/// - [`NavConfig`]: cell size, level count, parallelism
/// - `B: AgentBehavior`: collaborator logic (use
///   [`NoopBehavior`][vn_behavior::NoopBehavior] for none)
///
/// # Optional inputs
///
/// | Method            | Default                                   |
/// |-------------------|-------------------------------------------|
/// | `.agent(p, s)`    | No agents                                 |
/// | `.obstacle(id, g)`| No obstacles (index ready immediately)    |
/// | `.snapshot(s)`    | Primary processing of the given obstacles |
/// | `.pool(p)`        | A new pool of `config.workers()` threads  |
///
/// Obstacles and a snapshot are mutually exclusive: a snapshot replaces
/// primary processing.
///
/// # Example
///
/// ```rust,ignore
/// let mut nav = NavigatorBuilder::new(NavConfig::default(), NoopBehavior)
///     .obstacle(ObstacleId(0), TriangleMesh::cuboid(center, half))
///     .agent(Vec3::ZERO, AgentSettings::new(bounds))
///     .build()?;
/// nav.wait_ready(Duration::from_secs(5));
/// nav.move_to(AgentId(0), goal, false)?;
/// ```
pub struct NavigatorBuilder<B: AgentBehavior> {
    config:    NavConfig,
    behavior:  B,
    agents:    Vec<(Vec3, AgentSettings)>,
    obstacles: Vec<(ObstacleId, ObstacleGeometry)>,
    snapshot:  Option<OccupancySnapshot>,
    pool:      Option<Arc<ThreadPool>>,
}

impl<B: AgentBehavior> NavigatorBuilder<B> {
    pub fn new(config: NavConfig, behavior: B) -> Self {
        Self {
            config,
            behavior,
            agents:    Vec::new(),
            obstacles: Vec::new(),
            snapshot:  None,
            pool:      None,
        }
    }

    /// Add an agent.  Ids are assigned in call order from `AgentId(0)`.
    pub fn agent(mut self, position: Vec3, settings: AgentSettings) -> Self {
        self.agents.push((position, settings));
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = (Vec3, AgentSettings)>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Add an obstacle to primary processing.
    pub fn obstacle(mut self, id: ObstacleId, geometry: impl Into<ObstacleGeometry>) -> Self {
        self.obstacles.push((id, geometry.into()));
        self
    }

    pub fn obstacles(mut self, obstacles: impl IntoIterator<Item = (ObstacleId, ObstacleGeometry)>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    /// Start from a saved index instead of rasterizing.
    pub fn snapshot(mut self, snapshot: OccupancySnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Share an existing worker pool.
    pub fn pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Validate inputs, start primary processing (or restore the snapshot)
    /// and return the navigator.
    pub fn build(self) -> NavResult<Navigator<B>> {
        self.config.validate()?;
        if self.snapshot.is_some() && !self.obstacles.is_empty() {
            return Err(NavError::Config(
                "a snapshot replaces primary processing; do not add obstacles as well".into(),
            ));
        }

        let graph = Arc::new(OccupancyGraph::from_config(&self.config)?);

        let mut agents = AgentStore::new();
        for (position, settings) in self.agents {
            settings.validate(graph.level_count())?;
            agents.spawn(position, settings);
        }
        let mobility = MobilityStore::new(agents.count);

        let pool = match self.pool {
            Some(pool) => pool,
            None => worker_pool(self.config.workers())?,
        };
        let raster = ObstacleRasterizer::new(Arc::clone(&graph), Arc::clone(&pool), &self.config);
        match &self.snapshot {
            Some(snapshot) => raster.restore(snapshot)?,
            None => {
                raster.begin_primary(self.obstacles)?;
            }
        }

        let search_limit = self.config.workers();
        info!(
            agents = agents.count,
            levels = graph.level_count(),
            base_cell_size = graph.base_cell_size(),
            search_limit,
            "navigator built"
        );

        let actions = ActionQueue::new();
        let workers = Workers::new(pool, Arc::clone(&graph), actions.sender());
        Ok(Navigator {
            config:     self.config,
            graph,
            raster,
            workers,
            actions,
            active:     ActiveSearches::new(),
            behavior:   self.behavior,
            agents,
            mobility,
            admission:  AdmissionQueue::new(),
            wake_queue: WakeQueue::new(),
            obstacles:  FxHashMap::default(),
            events:     Vec::new(),
            now:        Tick::ZERO,
            search_limit,
            graph_ready_delivered: false,
        })
    }
}
