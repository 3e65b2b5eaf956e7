//! Structure-of-Arrays agent storage.

use vn_core::{AgentId, CancelScope, CancelToken, Vec3};

use crate::{AgentSettings, AgentState, PathSlot};

/// All per-agent state, one `Vec` per field.
///
/// Every `Vec` has exactly `count` elements and `AgentId` is the index
/// into all of them:
///
/// ```ignore
/// let pos = store.position[agent.index()];
/// ```
///
/// Despawned agents keep their slot (with `alive == false`) so ids stay
/// stable; they are skipped by [`agent_ids`](Self::agent_ids).
#[derive(Default)]
pub struct AgentStore {
    /// Number of slots ever spawned.  Equals the length of every `Vec`.
    pub count: usize,

    pub alive: Vec<bool>,
    pub state: Vec<AgentState>,

    // ── Geometry ──────────────────────────────────────────────────────────
    pub position: Vec<Vec3>,
    /// Destination of the current (or last) move request.
    pub target: Vec<Vec3>,
    /// Destination of an in-flight refinement.
    pub refine_target: Vec<Option<Vec3>>,

    pub settings: Vec<AgentSettings>,

    // ── Request bookkeeping ───────────────────────────────────────────────
    /// Bumped by every new request; continuations carrying an older value
    /// are stale.
    pub generation: Vec<u64>,
    pub refining: Vec<bool>,
    pub scope: Vec<CancelScope>,

    // ── Paths ─────────────────────────────────────────────────────────────
    /// Search output, one point per cell center.
    pub raw_path: Vec<PathSlot>,
    /// Post-processed path the agent follows.
    pub final_path: Vec<PathSlot>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an idle agent and return its id.
    pub fn spawn(&mut self, position: Vec3, settings: AgentSettings) -> AgentId {
        let id = AgentId(self.count as u32);
        self.count += 1;
        self.alive.push(true);
        self.state.push(AgentState::Idle);
        self.position.push(position);
        self.target.push(position);
        self.refine_target.push(None);
        self.settings.push(settings);
        self.generation.push(0);
        self.refining.push(false);
        self.scope.push(CancelScope::new());
        self.raw_path.push(PathSlot::new());
        self.final_path.push(PathSlot::new());
        id
    }

    /// Cancel the agent's work and retire its slot.  Returns `false` if it
    /// was not alive.
    pub fn despawn(&mut self, agent: AgentId) -> bool {
        if !self.is_alive(agent) {
            return false;
        }
        let i = agent.index();
        self.renew_request(agent);
        self.alive[i] = false;
        self.state[i] = AgentState::Idle;
        true
    }

    #[inline]
    pub fn is_alive(&self, agent: AgentId) -> bool {
        self.alive.get(agent.index()).copied().unwrap_or(false)
    }

    /// Live agents in ascending id order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId).filter(|&a| self.alive[a.index()])
    }

    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Start a new request epoch: cancel outstanding work, bump the
    /// generation and clear request-scoped state.  Returns the new
    /// generation.
    pub fn renew_request(&mut self, agent: AgentId) -> u64 {
        let generation = self.bump_generation(agent);
        let i = agent.index();
        self.refining[i] = false;
        self.refine_target[i] = None;
        self.raw_path[i].clear();
        self.final_path[i].clear();
        generation
    }

    /// Cancel outstanding work and bump the generation, keeping paths and
    /// flags.  Returns the new generation.
    pub fn bump_generation(&mut self, agent: AgentId) -> u64 {
        let i = agent.index();
        self.scope[i].renew();
        self.generation[i] += 1;
        self.generation[i]
    }

    /// Token for work issued under the agent's current scope.
    pub fn cancel_token(&self, agent: AgentId) -> CancelToken {
        self.scope[agent.index()].token()
    }
}
