//! The background obstacle rasterizer.
//!
//! # Pipeline
//!
//! ```text
//! begin_primary / submit_obstacle / remove_obstacle
//!        │ split into RasterTasks
//!        ▼
//!   task queue (VecDeque under a mutex)
//!        │ pump(): while alive < max_parallelism
//!        ▼
//!   worker pool (rayon::ThreadPool::spawn)
//!        │ sweep triangles → OccupancyGraph::occupy_all_levels
//!        ▼
//!   task end: alive -= 1, readiness check, pump() again
//! ```
//!
//! `pump` runs after every enqueue and at the end of every task, so the
//! queue drains without a timer.  The control loop may also call it.
//!
//! # Obstacle generations
//!
//! Every obstacle id carries a generation behind a read-write lock.  A task
//! writes each triangle under the read lock and only while the generation
//! still matches its own.  Resubmit and remove bump the generation under
//! the write lock, so once they return no earlier task can add a cell.  A
//! resubmit then queues a release whose follow-up tasks (the new geometry)
//! go to the head of the queue when the release has run.  A plain submit
//! that arrives while a release is still pending is chained the same way.
//!
//! # Readiness
//!
//! Primary processing counts every triangle of every initial obstacle into
//! `total`.  Each processed triangle bumps `processed` (only until the index
//! is ready), superseded triangles included.  When a task ends with `processed >= total` and no task alive,
//! the one-shot ready signal fires.  A broadcast stop before that point
//! leaves the index not-ready for good.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex, RwLock};
use rayon::ThreadPool;
use rustc_hash::FxBuildHasher;
use tracing::{debug, error, info, trace};

use vn_core::{CancelToken, NavConfig, ObstacleId, TaskId, Vec3};
use vn_occupancy::{OccupancyGraph, OccupancySnapshot};

use crate::ready::ReadySignal;
use crate::sweep::{occupy_triangle, shift_step};
use crate::task::{RasterTask, RasterWork, split_geometry};
use crate::{ObstacleGeometry, RasterError, RasterResult};

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// A running task as listed by [`ObstacleRasterizer::tasks_info`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskSummary {
    pub id:        TaskId,
    pub obstacle:  ObstacleId,
    pub kind:      &'static str,
    pub triangles: usize,
}

/// Point-in-time view of the rasterizer's work.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TasksInfo {
    pub queued:    usize,
    pub alive:     usize,
    pub running:   Vec<TaskSummary>,
    pub processed: u64,
    pub total:     u64,
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct Shared {
    graph:           Arc<OccupancyGraph>,
    pool:            Arc<ThreadPool>,
    queue:           Mutex<VecDeque<RasterTask>>,
    idle:            Condvar,
    alive:           AtomicUsize,
    processed:       AtomicU64,
    total:           AtomicU64,
    primary_started: AtomicBool,
    started_at:      Mutex<Option<Instant>>,
    ready:           ReadySignal,
    broadcast:       CancelToken,
    running:         DashMap<TaskId, TaskSummary, FxBuildHasher>,
    generations:     DashMap<ObstacleId, Arc<RwLock<Generation>>, FxBuildHasher>,
    max_parallelism: usize,
    aggressive:      bool,
    step:            f32,
}

/// Per-obstacle submission state.
#[derive(Debug, Default)]
struct Generation {
    current:         u64,
    release_pending: bool,
}

/// Decrements `alive` and unlists the task however the task body exits.
struct AliveGuard<'a> {
    shared: &'a Shared,
    task:   TaskId,
}

impl Drop for AliveGuard<'_> {
    fn drop(&mut self) {
        self.shared.running.remove(&self.task);
        self.shared.alive.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Shared {
    fn enqueue(self: &Arc<Self>, tasks: Vec<RasterTask>) {
        if tasks.is_empty() {
            return;
        }
        self.queue.lock().extend(tasks);
        self.pump();
    }

    /// Launch queued tasks while worker slots are free.
    fn pump(self: &Arc<Self>) {
        loop {
            let task = {
                let mut queue = self.queue.lock();
                if !self.aggressive && self.alive.load(Ordering::SeqCst) >= self.max_parallelism {
                    return;
                }
                let Some(task) = queue.pop_front() else { return };
                self.alive.fetch_add(1, Ordering::SeqCst);
                task
            };
            self.running.insert(task.id, TaskSummary {
                id:        task.id,
                obstacle:  task.obstacle,
                kind:      task.kind(),
                triangles: task.triangle_count(),
            });
            trace!(task = %task.id, obstacle = %task.obstacle, kind = task.kind(), "dispatching raster task");

            let shared = Arc::clone(self);
            self.pool.spawn(move || shared.run(task));
        }
    }

    fn generation_lock(&self, id: ObstacleId) -> Arc<RwLock<Generation>> {
        Arc::clone(&self.generations.entry(id).or_default())
    }

    /// Generation for new work on `id`, and whether that work must wait for
    /// a release.  With `supersede` (or while a release is pending) every
    /// task created for `id` so far is retired; this waits for triangle
    /// writes in progress.
    fn claim(&self, id: ObstacleId, supersede: bool) -> (u64, bool) {
        let lock = self.generation_lock(id);
        let mut state = lock.write();
        if supersede || state.release_pending {
            state.current += 1;
            state.release_pending = true;
            (state.current, true)
        } else {
            (state.current, false)
        }
    }

    fn run(self: Arc<Self>, task: RasterTask) {
        {
            let _alive = AliveGuard { shared: &self, task: task.id };
            let outcome = catch_unwind(AssertUnwindSafe(|| self.execute(&task)));
            if outcome.is_err() {
                error!(task = %task.id, obstacle = %task.obstacle, "raster task panicked; its cells may be incomplete");
            }
        }
        self.after_task();
        self.pump();
    }

    fn execute(&self, task: &RasterTask) {
        let lock = self.generation_lock(task.obstacle);
        let cancelled = || self.broadcast.is_cancelled() || task.cancel.is_cancelled();
        // Returns false once the task is cancelled.  A superseded task still
        // counts its triangles so primary progress can complete, but writes
        // nothing.
        let write = |triangle: [Vec3; 3]| {
            if cancelled() {
                debug!(task = %task.id, "raster task cancelled");
                return false;
            }
            self.count_triangle();
            let state = lock.read();
            if state.current == task.generation {
                occupy_triangle(&self.graph, triangle, task.obstacle, self.step);
            }
            true
        };

        match &task.work {
            RasterWork::Release { then } => {
                let mut state = lock.write();
                if state.current != task.generation {
                    trace!(task = %task.id, obstacle = %task.obstacle, "superseded release skipped");
                    return;
                }
                let released = self.graph.release(task.obstacle);
                state.release_pending = false;
                drop(state);
                trace!(task = %task.id, obstacle = %task.obstacle, released, "obstacle released");
                let mut queue = self.queue.lock();
                for follow_up in then.iter().rev() {
                    queue.push_front(follow_up.clone());
                }
            }
            RasterWork::Triangles { mesh, range } => {
                for i in range.clone() {
                    if !write(mesh.triangle(i)) {
                        return;
                    }
                }
            }
            RasterWork::Rows { field, rows } => {
                for row in rows.clone() {
                    for col in 1..field.resolution() {
                        for triangle in field.quad_triangles(row, col) {
                            if !write(triangle) {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    #[inline]
    fn count_triangle(&self) {
        if !self.ready.is_ready() {
            self.processed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Readiness check plus idle wake-up, run after every task.
    fn after_task(&self) {
        if self.primary_started.load(Ordering::SeqCst)
            && !self.ready.is_ready()
            && self.processed.load(Ordering::SeqCst) >= self.total.load(Ordering::SeqCst)
            && self.alive.load(Ordering::SeqCst) == 0
        {
            self.notify_ready();
        }

        let queue = self.queue.lock();
        if queue.is_empty() && self.alive.load(Ordering::SeqCst) == 0 {
            self.idle.notify_all();
        }
    }

    fn notify_ready(&self) {
        if self.ready.fire() {
            let elapsed = self.started_at.lock().map(|t| t.elapsed()).unwrap_or_default();
            info!(
                triangles = self.total.load(Ordering::SeqCst),
                cells = self.graph.occupied_count(0),
                elapsed_ms = elapsed.as_millis() as u64,
                "occupancy graph ready"
            );
        }
    }
}

// ── ObstacleRasterizer ────────────────────────────────────────────────────────

/// Fills an [`OccupancyGraph`] from obstacle geometry on a bounded worker pool.
///
/// Cheap to clone; clones drive the same queue and counters.
#[derive(Clone)]
pub struct ObstacleRasterizer {
    shared: Arc<Shared>,
}

impl ObstacleRasterizer {
    /// Create a rasterizer writing into `graph` and running on `pool`.
    ///
    /// Pool width and dispatch policy come from `config`.
    pub fn new(graph: Arc<OccupancyGraph>, pool: Arc<ThreadPool>, config: &NavConfig) -> Self {
        let step = shift_step(graph.base_cell_size());
        Self {
            shared: Arc::new(Shared {
                graph,
                pool,
                queue:           Mutex::new(VecDeque::new()),
                idle:            Condvar::new(),
                alive:           AtomicUsize::new(0),
                processed:       AtomicU64::new(0),
                total:           AtomicU64::new(0),
                primary_started: AtomicBool::new(false),
                started_at:      Mutex::new(None),
                ready:           ReadySignal::new(),
                broadcast:       CancelToken::new(),
                running:         DashMap::with_hasher(FxBuildHasher),
                generations:     DashMap::with_hasher(FxBuildHasher),
                max_parallelism: config.workers(),
                aggressive:      config.aggressive_dispatch,
                step,
            }),
        }
    }

    pub fn graph(&self) -> &Arc<OccupancyGraph> {
        &self.shared.graph
    }

    pub fn max_parallelism(&self) -> usize {
        self.shared.max_parallelism
    }

    // ── Obstacle lifecycle ────────────────────────────────────────────────

    /// Start primary processing of the initial obstacle set.
    ///
    /// With no triangles at all the index is ready immediately.  Returns the
    /// number of tasks enqueued.
    pub fn begin_primary<I>(&self, obstacles: I) -> RasterResult<usize>
    where
        I: IntoIterator<Item = (ObstacleId, ObstacleGeometry)>,
    {
        if self.shared.primary_started.swap(true, Ordering::SeqCst) {
            return Err(RasterError::PrimaryAlreadyStarted);
        }
        *self.shared.started_at.lock() = Some(Instant::now());

        let cancel = self.shared.broadcast.clone();
        let mut total = 0u64;
        let mut tasks = Vec::new();
        for (id, geometry) in obstacles {
            total += geometry.triangle_count() as u64;
            let (generation, _) = self.shared.claim(id, false);
            tasks.extend(split_geometry(id, &geometry, self.shared.max_parallelism, &cancel, generation));
        }
        self.shared.total.store(total, Ordering::SeqCst);
        info!(tasks = tasks.len(), triangles = total, "primary processing started");

        if total == 0 {
            self.shared.notify_ready();
            return Ok(0);
        }
        let count = tasks.len();
        self.shared.enqueue(tasks);
        Ok(count)
    }

    /// Rasterize one more obstacle after primary processing.
    ///
    /// With `resubmit`, all earlier work for `id` is superseded and a
    /// release of its cells is queued; the new tasks run once the release
    /// has.  A submission made while a removal of `id` is still queued
    /// waits for the removal the same way.  Returns the number of tasks
    /// enqueued, the release included.
    pub fn submit_obstacle(
        &self,
        id:       ObstacleId,
        geometry: &ObstacleGeometry,
        cancel:   CancelToken,
        resubmit: bool,
    ) -> RasterResult<usize> {
        if !self.is_ready() {
            return Err(RasterError::GraphNotReady);
        }
        let (generation, chained) = self.shared.claim(id, resubmit);
        let tasks = split_geometry(id, geometry, self.shared.max_parallelism, &cancel, generation);
        let (tasks, count) = if chained {
            let count = tasks.len() + 1;
            (vec![RasterTask::release(id, generation, tasks)], count)
        } else {
            let count = tasks.len();
            (tasks, count)
        };
        debug!(obstacle = %id, tasks = count, resubmit, generation, "obstacle submitted");
        self.shared.enqueue(tasks);
        Ok(count)
    }

    /// Supersede all work for `id` and queue removal of its cells.
    pub fn remove_obstacle(&self, id: ObstacleId) {
        let (generation, _) = self.shared.claim(id, true);
        debug!(obstacle = %id, generation, "obstacle removal queued");
        self.shared.enqueue(vec![RasterTask::release(id, generation, Vec::new())]);
    }

    /// Replace the index contents with a snapshot and declare it ready.
    pub fn restore(&self, snapshot: &OccupancySnapshot) -> RasterResult<()> {
        self.shared.graph.restore(snapshot)?;
        self.shared.primary_started.store(true, Ordering::SeqCst);
        self.shared.notify_ready();
        Ok(())
    }

    /// Cancel every queued and running task, now and in the future.
    pub fn stop_all(&self) {
        self.shared.broadcast.cancel();
    }

    /// Launch queued tasks if worker slots are free.
    pub fn pump(&self) {
        self.shared.pump();
    }

    // ── Progress & readiness ──────────────────────────────────────────────

    pub fn is_ready(&self) -> bool {
        self.shared.ready.is_ready()
    }

    /// `(processed, total)` triangles of primary processing.
    pub fn processing_progress(&self) -> (u64, u64) {
        (
            self.shared.processed.load(Ordering::SeqCst),
            self.shared.total.load(Ordering::SeqCst),
        )
    }

    /// One message arrives on the returned channel when the index is ready.
    pub fn subscribe_ready(&self) -> Receiver<()> {
        self.shared.ready.subscribe()
    }

    /// Block until ready or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        self.shared.ready.wait(timeout)
    }

    /// Block until the queue is empty and no task is alive, or `timeout`
    /// elapses.  Returns whether the rasterizer went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut queue = self.shared.queue.lock();
        while !(queue.is_empty() && self.shared.alive.load(Ordering::SeqCst) == 0) {
            if self.shared.idle.wait_until(&mut queue, deadline).timed_out() {
                return queue.is_empty() && self.shared.alive.load(Ordering::SeqCst) == 0;
            }
        }
        true
    }

    pub fn tasks_info(&self) -> TasksInfo {
        let mut running: Vec<TaskSummary> =
            self.shared.running.iter().map(|entry| entry.value().clone()).collect();
        running.sort_by_key(|summary| summary.id);
        let (processed, total) = self.processing_progress();
        TasksInfo {
            queued: self.shared.queue.lock().len(),
            alive: self.shared.alive.load(Ordering::SeqCst),
            running,
            processed,
            total,
        }
    }

    #[cfg(test)]
    pub(crate) fn enqueue_raw(&self, tasks: Vec<RasterTask>) {
        self.shared.enqueue(tasks);
    }
}
