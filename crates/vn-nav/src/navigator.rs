//! The `Navigator` struct and its tick loop.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace, warn};

use vn_agent::{AgentSettings, AgentState, AgentStore, Trigger, transition};
use vn_behavior::{AgentBehavior, Command, NavContext, NavEvent};
use vn_core::{AgentId, CancelScope, NavConfig, ObstacleId, Tick, Vec3};
use vn_mobility::{Advance, MobilityStore, merge_refined};
use vn_occupancy::{OccupancyGraph, OccupancySnapshot};
use vn_path::{ProcessedPath, path_length};
use vn_raster::{ObstacleGeometry, ObstacleRasterizer, TasksInfo};
use vn_schedule::{ActionQueue, AdmissionQueue, WakeQueue};
use vn_search::{ActiveSearches, EndpointRejection, SearchJob, SearchOutcome, SearchReport, SearchRequest};

use crate::worker::{Completion, ProcessingJob, Workers};
use crate::{NavError, NavObserver, NavResult};

// ── Navigator ─────────────────────────────────────────────────────────────────

/// The control loop.
///
/// `Navigator<B>` owns all agent state and drives the six-phase tick:
///
/// 1. **Graph ready**: once the index is ready, every live agent gets
///    [`NavEvent::GraphReady`] (exactly once).
/// 2. **Continuations**: worker completions are drained in send order.
///    Completions whose generation no longer matches the agent's are
///    dropped.
/// 3. **Admission**: if agents are queued and fewer than the limit of
///    searches are running, the head of the queue starts its search.
/// 4. **Motion**: every `Moving` agent advances `speed` along its final
///    path.
/// 5. **Wake**: agents whose behavior asked to be woken this tick are
///    collected.
/// 6. **Delivery**: this tick's events go to the observer and the
///    behavior; the returned commands are applied in ascending `AgentId`
///    order.  Events raised while applying commands are delivered next
///    tick.
///
/// Events raised by API calls between ticks are delivered on the next tick.
///
/// Create via [`NavigatorBuilder`][crate::NavigatorBuilder].
pub struct Navigator<B: AgentBehavior> {
    pub(crate) config:    NavConfig,
    pub(crate) graph:     Arc<OccupancyGraph>,
    pub(crate) raster:    ObstacleRasterizer,
    pub(crate) workers:   Workers,
    pub(crate) actions:   ActionQueue<Completion>,
    pub(crate) active:    ActiveSearches,
    pub(crate) behavior:  B,

    pub(crate) agents:     AgentStore,
    pub(crate) mobility:   MobilityStore,
    pub(crate) admission:  AdmissionQueue,
    pub(crate) wake_queue: WakeQueue,

    /// Cancellation scopes of obstacles submitted after primary processing.
    pub(crate) obstacles: FxHashMap<ObstacleId, CancelScope>,

    /// Events waiting for the delivery phase, in emission order.
    pub(crate) events: Vec<(AgentId, NavEvent)>,

    pub(crate) now:                   Tick,
    pub(crate) search_limit:          usize,
    pub(crate) graph_ready_delivered: bool,
}

impl<B: AgentBehavior> Navigator<B> {
    // ── Running ───────────────────────────────────────────────────────────

    /// Run one control tick.
    pub fn tick<O: NavObserver>(&mut self, observer: &mut O) {
        let now = self.now;
        observer.on_tick_start(now);

        // ── Phase 1: graph ready ──────────────────────────────────────────
        if !self.graph_ready_delivered && self.raster.is_ready() {
            self.graph_ready_delivered = true;
            let ready: Vec<_> = self.agents.agent_ids().map(|a| (a, NavEvent::GraphReady)).collect();
            // Ahead of anything requested since the index became ready.
            self.events.splice(0..0, ready);
        }

        // ── Phase 2: continuations ────────────────────────────────────────
        for completion in self.actions.drain() {
            self.apply_completion(completion);
        }

        // ── Phase 3: admission ────────────────────────────────────────────
        self.admit();

        // ── Phase 4: motion ───────────────────────────────────────────────
        self.advance_motion();

        // ── Phase 5 + 6: wake-ups, then delivery and commands ─────────────
        let woken = self.wake_queue.drain_due(now);
        let delivered = self.deliver(now, woken, observer);

        observer.on_tick_end(now, delivered);
        self.now = now.next();
    }

    /// Run exactly `n` ticks.
    pub fn run_ticks<O: NavObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.tick(observer);
        }
    }

    /// Tick until `done` holds or `max_ticks` ticks have run.  Returns
    /// whether `done` held.
    pub fn run_until<O, F>(&mut self, max_ticks: u64, observer: &mut O, mut done: F) -> bool
    where
        O: NavObserver,
        F: FnMut(&Self) -> bool,
    {
        for _ in 0..max_ticks {
            if done(self) {
                return true;
            }
            self.tick(observer);
        }
        done(self)
    }

    // ── Move requests ─────────────────────────────────────────────────────

    /// Start moving `agent` to `target`.
    ///
    /// The agent is reset first: it leaves the queue, outstanding work is
    /// cancelled and its paths and motion are cleared.  Targets closer than
    /// one base cell skip the search.  Otherwise the agent joins the
    /// admission queue, at the head when `top_priority` is set.
    pub fn move_to(&mut self, agent: AgentId, target: Vec3, top_priority: bool) -> NavResult<()> {
        self.check_alive(agent)?;
        let i = agent.index();
        self.reset_agent(agent);
        self.agents.target[i] = target;
        self.emit(agent, NavEvent::MovementRequested);

        if !self.raster.is_ready() {
            return Err(NavError::GraphNotReady);
        }
        self.graph.check_level(self.agents.settings[i].level)?;

        let position = self.agents.position[i];
        if position.distance(target) < self.graph.base_cell_size() {
            self.agents.raw_path[i].publish(vec![position, target]);
            self.fire(agent, Trigger::ShortHop);
            self.emit(agent, NavEvent::PathFound);
            self.emit(agent, NavEvent::ProcessingStarted);
            self.dispatch_processing(agent);
            return Ok(());
        }

        self.emit(agent, NavEvent::PathfindingRequested);
        self.fire(agent, Trigger::MoveRequested);
        if top_priority {
            self.admission.push_front(agent);
        } else {
            self.admission.push_back(agent);
        }
        self.emit(agent, NavEvent::AddedToQueue);
        Ok(())
    }

    /// Re-plan the rest of the current movement towards `new_target`
    /// without stopping.
    ///
    /// Returns `Ok(false)` when the agent is not moving, is already
    /// refining, or either endpoint is out of bounds or occupied.
    pub fn refine_path(&mut self, agent: AgentId, new_target: Vec3) -> NavResult<bool> {
        self.check_alive(agent)?;
        let i = agent.index();
        self.emit(agent, NavEvent::RefinementRequested);

        if self.agents.state[i] != AgentState::Moving || self.agents.refining[i] {
            return Ok(false);
        }
        let position = self.agents.position[i];
        let settings = &self.agents.settings[i];
        if !settings.in_bounds(position)
            || !settings.in_bounds(new_target)
            || self.graph.is_occupied_at(position, 0)
            || self.graph.is_occupied_at(new_target, 0)
        {
            return Ok(false);
        }
        let options = settings.path;

        self.admission.remove(agent);
        let generation = self.agents.bump_generation(agent);
        self.agents.refining[i] = true;
        self.agents.refine_target[i] = Some(new_target);
        self.emit(agent, NavEvent::RefinementStarted);

        let job = SearchJob::new(self.search_request(agent, position, new_target), self.active.acquire());
        debug!(%agent, generation, "refinement dispatched");
        self.workers.spawn_refine(agent, generation, job, options);
        Ok(true)
    }

    /// `Moving → Paused`.  Returns whether the agent was moving.
    pub fn interrupt(&mut self, agent: AgentId) -> NavResult<bool> {
        self.check_alive(agent)?;
        let changed = self.fire(agent, Trigger::Interrupt);
        if changed {
            self.emit(agent, NavEvent::MovementInterrupted);
        }
        Ok(changed)
    }

    /// `Paused → Moving`.  Returns whether the agent was paused.
    pub fn resume(&mut self, agent: AgentId) -> NavResult<bool> {
        self.check_alive(agent)?;
        let changed = self.fire(agent, Trigger::Resume);
        if changed {
            self.emit(agent, NavEvent::MovementResumed);
        }
        Ok(changed)
    }

    /// Cancel everything in flight for `agent`.
    ///
    /// Results still on their way are dropped.  An agent waiting on a
    /// search or on processing goes back to `Idle`; queue membership and
    /// motion are left alone.
    pub fn stop_all_async_work(&mut self, agent: AgentId) -> NavResult<()> {
        self.check_alive(agent)?;
        let i = agent.index();
        self.agents.bump_generation(agent);
        self.agents.refining[i] = false;
        self.agents.refine_target[i] = None;
        if matches!(self.agents.state[i], AgentState::SearchRunning | AgentState::PathProcessing) {
            self.fire(agent, Trigger::Reset);
        }
        Ok(())
    }

    /// Cancel all work, leave the queue and return to `Idle`.
    pub fn reset(&mut self, agent: AgentId) -> NavResult<()> {
        self.check_alive(agent)?;
        self.reset_agent(agent);
        Ok(())
    }

    // ── Agent lifecycle ───────────────────────────────────────────────────

    /// Add an idle agent at `position`.
    pub fn spawn_agent(&mut self, position: Vec3, settings: AgentSettings) -> NavResult<AgentId> {
        settings.validate(self.graph.level_count())?;
        let agent = self.agents.spawn(position, settings);
        self.mobility.push();
        if self.graph_ready_delivered {
            self.emit(agent, NavEvent::GraphReady);
        }
        debug!(%agent, "agent spawned");
        Ok(agent)
    }

    /// Cancel the agent's work and retire it.  Its id is not reused.
    pub fn despawn_agent(&mut self, agent: AgentId) -> NavResult<()> {
        self.check_alive(agent)?;
        self.admission.remove(agent);
        self.wake_queue.cancel(agent);
        self.agents.despawn(agent);
        self.mobility.reset(agent);
        debug!(%agent, "agent despawned");
        Ok(())
    }

    /// Replace the agent's settings.  Takes effect with the next request.
    pub fn update_settings(&mut self, agent: AgentId, settings: AgentSettings) -> NavResult<()> {
        self.check_alive(agent)?;
        settings.validate(self.graph.level_count())?;
        self.agents.settings[agent.index()] = settings;
        Ok(())
    }

    // ── Obstacle lifecycle ────────────────────────────────────────────────

    /// Rasterize a new obstacle.  Fails with `GraphNotReady` before primary
    /// processing has finished.
    pub fn submit_obstacle(&mut self, id: ObstacleId, geometry: impl Into<ObstacleGeometry>) -> NavResult<usize> {
        let token = self.obstacles.entry(id).or_default().token();
        Ok(self.raster.submit_obstacle(id, &geometry.into(), token, false)?)
    }

    /// Replace an obstacle's cells with those of new geometry.  Pending
    /// work for the old geometry is cancelled.
    pub fn resubmit_obstacle(&mut self, id: ObstacleId, geometry: impl Into<ObstacleGeometry>) -> NavResult<usize> {
        let scope = self.obstacles.entry(id).or_default();
        scope.renew();
        let token = scope.token();
        Ok(self.raster.submit_obstacle(id, &geometry.into(), token, true)?)
    }

    /// Cancel pending work for an obstacle and remove its cells.
    pub fn remove_obstacle(&mut self, id: ObstacleId) {
        if let Some(scope) = self.obstacles.remove(&id) {
            scope.cancel();
        }
        self.raster.remove_obstacle(id);
    }

    /// Cancel every queued and running rasterization task, including any
    /// submitted later.  Stopping before primary processing completes leaves
    /// the index not ready for good.
    pub fn stop_rasterization(&self) {
        self.raster.stop_all();
    }

    pub fn is_ready(&self) -> bool {
        self.raster.is_ready()
    }

    /// `(processed, total)` triangles of primary processing.
    pub fn processing_progress(&self) -> (u64, u64) {
        self.raster.processing_progress()
    }

    /// Block until the index is ready or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        self.raster.wait_ready(timeout)
    }

    /// Block until no rasterization is queued or running.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.raster.wait_idle(timeout)
    }

    pub fn tasks_info(&self) -> TasksInfo {
        self.raster.tasks_info()
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> OccupancySnapshot {
        self.graph.snapshot()
    }

    /// Write the occupancy index to `path` as JSON.
    pub fn save_snapshot(&self, path: &Path) -> NavResult<()> {
        let snapshot = self.graph.snapshot();
        snapshot.save(path)?;
        info!(path = %path.display(), cells = snapshot.cell_count(), "occupancy snapshot saved");
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<OccupancyGraph> {
        &self.graph
    }

    pub fn rasterizer(&self) -> &ObstacleRasterizer {
        &self.raster
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn mobility(&self) -> &MobilityStore {
        &self.mobility
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// The tick the next call to [`tick`](Self::tick) will run.
    pub fn current_tick(&self) -> Tick {
        self.now
    }

    /// Agents waiting for a search slot, head first.
    pub fn queued(&self) -> Vec<AgentId> {
        self.admission.iter().collect()
    }

    /// Searches (including refinements) currently running.
    pub fn active_searches(&self) -> usize {
        self.active.count()
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn state(&self, agent: AgentId) -> Option<AgentState> {
        self.agents.is_alive(agent).then(|| self.agents.state[agent.index()])
    }

    pub fn position(&self, agent: AgentId) -> Option<Vec3> {
        self.agents.is_alive(agent).then(|| self.agents.position[agent.index()])
    }

    /// A copy of the path the agent is following.
    pub fn final_path(&self, agent: AgentId) -> Option<Arc<Vec<Vec3>>> {
        self.agents.is_alive(agent).then(|| self.agents.final_path[agent.index()].snapshot())
    }

    /// Fraction of the current path covered.
    pub fn progress(&self, agent: AgentId) -> Option<f32> {
        self.agents.is_alive(agent).then(|| self.mobility.progress(agent))
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    fn apply_completion(&mut self, completion: Completion) {
        let (agent, generation) = completion.key();
        if !self.agents.is_alive(agent) || self.agents.generation[agent.index()] != generation {
            trace!(%agent, generation, "dropping stale completion");
            return;
        }
        match completion {
            Completion::SearchFinished { report, .. } => self.on_search_finished(agent, report),
            Completion::ProcessingFinished { path, .. } => self.on_processing_finished(agent, path),
            Completion::RefineFinished { path, .. } => self.on_refine_finished(agent, path),
        }
    }

    fn on_search_finished(&mut self, agent: AgentId, report: SearchReport) {
        let failure = match report {
            SearchReport::Rejected(EndpointRejection::GoalOutOfBounds) => NavEvent::SearchToOutOfBounds,
            SearchReport::Rejected(EndpointRejection::StartOutOfBounds) => NavEvent::SearchFromOutOfBounds,
            SearchReport::Rejected(EndpointRejection::StartOccupied) => NavEvent::SearchFromOccupied,
            SearchReport::Rejected(EndpointRejection::GoalOccupied) => NavEvent::SearchToOccupied,
            SearchReport::Completed(SearchOutcome::NoPath) => NavEvent::PathNotFound,
            SearchReport::Completed(SearchOutcome::Cancelled) => return,
            SearchReport::Completed(SearchOutcome::Found(raw)) => {
                self.agents.raw_path[agent.index()].publish(raw);
                self.fire(agent, Trigger::SearchFound);
                self.emit(agent, NavEvent::PathFound);
                self.emit(agent, NavEvent::ProcessingStarted);
                self.dispatch_processing(agent);
                return;
            }
        };
        self.fire(agent, Trigger::SearchFailed);
        self.emit(agent, failure);
    }

    fn on_processing_finished(&mut self, agent: AgentId, path: Option<ProcessedPath>) {
        let Some(path) = path else {
            self.fire(agent, Trigger::Reset);
            self.emit(agent, NavEvent::PathNotFound);
            return;
        };
        let i = agent.index();
        self.mobility.begin(agent, path.length);
        self.agents.final_path[i].publish(path.points);
        self.fire(agent, Trigger::Processed);
        self.emit(agent, NavEvent::ProcessingFinished);
        self.emit(agent, NavEvent::MovementStarted);
    }

    fn on_refine_finished(&mut self, agent: AgentId, refined: Option<Vec<Vec3>>) {
        let i = agent.index();
        self.agents.refining[i] = false;
        let new_target = self.agents.refine_target[i].take();

        let (Some(refined), Some(new_target)) = (refined, new_target) else {
            self.emit(agent, NavEvent::RefinementFailed);
            return;
        };
        if !matches!(self.agents.state[i], AgentState::Moving | AgentState::Paused) {
            trace!(%agent, "refined path arrived after the movement ended");
            return;
        }

        let merged = merge_refined(self.agents.position[i], &refined, new_target);
        self.mobility.begin(agent, path_length(&merged));
        self.agents.target[i] = new_target;
        self.agents.final_path[i].publish(merged);
        self.emit(agent, NavEvent::RefinementSucceeded);
    }

    /// Start at most one queued search.
    fn admit(&mut self) {
        if self.active.count() >= self.search_limit {
            return;
        }
        let Some(agent) = self.admission.pop_front() else { return };
        if !self.agents.is_alive(agent) || self.agents.state[agent.index()] != AgentState::QueuedForSearch {
            trace!(%agent, "queue entry no longer waiting; skipped");
            return;
        }

        let i = agent.index();
        debug!(
            %agent,
            active = self.active.count(),
            waiting = self.admission.len(),
            "search admitted"
        );
        self.emit(agent, NavEvent::QueueCameUp);
        self.fire(agent, Trigger::Admitted);
        self.emit(agent, NavEvent::PathfindingStarted);

        let request = self.search_request(agent, self.agents.position[i], self.agents.target[i]);
        let job = SearchJob::new(request, self.active.acquire());
        self.workers.spawn_search(agent, self.agents.generation[i], job);
    }

    fn advance_motion(&mut self) {
        for i in 0..self.agents.count {
            if !self.agents.alive[i] || self.agents.state[i] != AgentState::Moving {
                continue;
            }
            let agent = AgentId(i as u32);
            let path = self.agents.final_path[i].snapshot();
            let speed = self.agents.settings[i].speed;
            let arrived = self.mobility.advance(agent, &path, &mut self.agents.position[i], speed);
            if arrived == Advance::Arrived {
                self.fire(agent, Trigger::Arrived);
                self.emit(agent, NavEvent::TargetReached);
            }
        }
    }

    /// Hand this tick's events and wake-ups to the observer and behavior,
    /// then apply the commands they produced.  Returns the number of events
    /// delivered.
    fn deliver<O: NavObserver>(&mut self, now: Tick, woken: Vec<AgentId>, observer: &mut O) -> usize {
        let events = std::mem::take(&mut self.events);
        let mut commands: BTreeMap<AgentId, Vec<Command>> = BTreeMap::new();
        {
            let ctx = NavContext::new(now, &self.agents);
            for &(agent, event) in &events {
                observer.on_event(now, agent, event);
                let produced = self.behavior.on_event(agent, event, &ctx);
                if !produced.is_empty() {
                    commands.entry(agent).or_default().extend(produced);
                }
            }
            for agent in woken {
                if !self.agents.is_alive(agent) {
                    continue;
                }
                let produced = self.behavior.on_wake(agent, &ctx);
                if !produced.is_empty() {
                    commands.entry(agent).or_default().extend(produced);
                }
            }
        }

        for (agent, agent_commands) in commands {
            for command in agent_commands {
                self.apply_command(agent, command, now);
            }
        }
        events.len()
    }

    fn apply_command(&mut self, agent: AgentId, command: Command, now: Tick) {
        let result = match command {
            Command::MoveTo { target, top_priority } => self.move_to(agent, target, top_priority),
            Command::RefinePath(target) => self.refine_path(agent, target).map(drop),
            Command::Interrupt => self.interrupt(agent).map(drop),
            Command::Resume => self.resume(agent).map(drop),
            Command::StopAllAsyncWork => self.stop_all_async_work(agent),
            Command::WakeAt(tick) => {
                // Never at or before the tick being delivered.
                if tick > now {
                    self.wake_queue.push(tick, agent);
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(%agent, error = %e, "behavior command failed");
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn check_alive(&self, agent: AgentId) -> NavResult<()> {
        if self.agents.is_alive(agent) {
            Ok(())
        } else {
            Err(NavError::AgentNotFound(agent))
        }
    }

    fn emit(&mut self, agent: AgentId, event: NavEvent) {
        trace!(%agent, %event, "event");
        self.events.push((agent, event));
    }

    /// Apply a state-machine trigger.  Returns whether the state changed.
    fn fire(&mut self, agent: AgentId, trigger: Trigger) -> bool {
        let i = agent.index();
        match transition(self.agents.state[i], trigger) {
            Some(next) => {
                self.agents.state[i] = next;
                true
            }
            None => {
                trace!(%agent, state = %self.agents.state[i], ?trigger, "trigger ignored");
                false
            }
        }
    }

    /// Leave the queue, cancel outstanding work, clear paths and motion, go
    /// `Idle`.
    fn reset_agent(&mut self, agent: AgentId) {
        self.admission.remove(agent);
        self.agents.renew_request(agent);
        self.mobility.reset(agent);
        self.fire(agent, Trigger::Reset);
    }

    fn search_request(&self, agent: AgentId, start: Vec3, goal: Vec3) -> SearchRequest {
        let settings = &self.agents.settings[agent.index()];
        SearchRequest {
            start,
            goal,
            level:       settings.level,
            algorithm:   settings.algorithm,
            constraints: settings.constraints,
            cancel:      self.agents.cancel_token(agent),
        }
    }

    fn dispatch_processing(&self, agent: AgentId) {
        let i = agent.index();
        let settings = &self.agents.settings[i];
        self.workers.spawn_processing(ProcessingJob {
            agent,
            generation: self.agents.generation[i],
            raw:        self.agents.raw_path[i].snapshot(),
            start:      self.agents.position[i],
            target:     self.agents.target[i],
            level:      settings.level,
            options:    settings.path,
            cancel:     self.agents.cancel_token(agent),
        });
    }
}
