//! Background search and processing tasks, and the messages they send back.
//!
//! Workers run on the shared pool, read the occupancy graph and never touch
//! agent state.  Each task sends at most one [`Completion`]; cancelled work
//! sends nothing.  A panic inside a task is caught at the task boundary and
//! reported as a failure so the agent is not left waiting.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crossbeam_channel::Sender;
use rayon::ThreadPool;
use tracing::{error, trace, warn};

use vn_core::{AgentId, CancelToken, Vec3};
use vn_occupancy::OccupancyGraph;
use vn_path::{PathOptions, ProcessOutcome, ProcessedPath, fancify, optimize, process_path, smooth};
use vn_search::{SearchJob, SearchOutcome, SearchReport};

// ── Completion ────────────────────────────────────────────────────────────────

/// A worker's answer, tagged with the request generation it belongs to.
#[derive(Debug)]
pub(crate) enum Completion {
    SearchFinished {
        agent:      AgentId,
        generation: u64,
        report:     SearchReport,
    },
    /// `None` when processing failed.
    ProcessingFinished {
        agent:      AgentId,
        generation: u64,
        path:       Option<ProcessedPath>,
    },
    /// The processed refined path, `None` when the refinement failed.
    RefineFinished {
        agent:      AgentId,
        generation: u64,
        path:       Option<Vec<Vec3>>,
    },
}

impl Completion {
    pub(crate) fn key(&self) -> (AgentId, u64) {
        match *self {
            Completion::SearchFinished { agent, generation, .. }
            | Completion::ProcessingFinished { agent, generation, .. }
            | Completion::RefineFinished { agent, generation, .. } => (agent, generation),
        }
    }
}

// ── Jobs ──────────────────────────────────────────────────────────────────────

/// Inputs of one post-processing run.
pub(crate) struct ProcessingJob {
    pub agent:      AgentId,
    pub generation: u64,
    pub raw:        Arc<Vec<Vec3>>,
    pub start:      Vec3,
    pub target:     Vec3,
    pub level:      usize,
    pub options:    PathOptions,
    pub cancel:     CancelToken,
}

/// Spawns tasks on the pool and wires their results into the action queue.
#[derive(Clone)]
pub(crate) struct Workers {
    pool:  Arc<ThreadPool>,
    graph: Arc<OccupancyGraph>,
    tx:    Sender<Completion>,
}

impl Workers {
    pub(crate) fn new(pool: Arc<ThreadPool>, graph: Arc<OccupancyGraph>, tx: Sender<Completion>) -> Self {
        Self { pool, graph, tx }
    }

    pub(crate) fn spawn_search(&self, agent: AgentId, generation: u64, job: SearchJob) {
        let graph = Arc::clone(&self.graph);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            let report = catch_unwind(AssertUnwindSafe(|| job.run(&graph))).unwrap_or_else(|_| {
                error!(%agent, "search task panicked; reporting no path");
                SearchReport::Completed(SearchOutcome::NoPath)
            });
            if report == SearchReport::Completed(SearchOutcome::Cancelled) {
                return;
            }
            send(&tx, Completion::SearchFinished { agent, generation, report });
        });
    }

    pub(crate) fn spawn_processing(&self, job: ProcessingJob) {
        let graph = Arc::clone(&self.graph);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            let ProcessingJob { agent, generation, raw, start, target, level, options, cancel } = job;
            let result = catch_unwind(AssertUnwindSafe(|| {
                process_path(&graph, &raw, start, target, level, options, &cancel)
            }));
            let path = match result {
                Ok(Ok(ProcessOutcome::Ready(path))) => Some(path),
                Ok(Ok(ProcessOutcome::Cancelled)) => return,
                Ok(Err(e)) => {
                    warn!(%agent, error = %e, "path processing failed");
                    None
                }
                Err(_) => {
                    error!(%agent, "processing task panicked");
                    None
                }
            };
            send(&tx, Completion::ProcessingFinished { agent, generation, path });
        });
    }

    /// Search towards the refine target and run the enabled passes on the
    /// raw result.  Endpoints are left as found; the merge adds them.
    pub(crate) fn spawn_refine(&self, agent: AgentId, generation: u64, job: SearchJob, options: PathOptions) {
        let graph = Arc::clone(&self.graph);
        let tx = self.tx.clone();
        self.pool.spawn(move || {
            let level = job.request.level;
            let cancel = job.request.cancel.clone();
            let result = catch_unwind(AssertUnwindSafe(|| match job.run(&graph) {
                SearchReport::Completed(SearchOutcome::Found(raw)) => {
                    Some(refine_passes(&graph, raw, level, options))
                }
                _ => None,
            }));
            let path = result.unwrap_or_else(|_| {
                error!(%agent, "refine task panicked");
                None
            });
            if cancel.is_cancelled() {
                trace!(%agent, "refinement cancelled");
                return;
            }
            send(&tx, Completion::RefineFinished { agent, generation, path });
        });
    }
}

fn refine_passes(graph: &OccupancyGraph, mut points: Vec<Vec3>, level: usize, options: PathOptions) -> Vec<Vec3> {
    if options.optimize {
        points = fancify(graph, &points, level);
        points = optimize(graph, &points, level);
    }
    if options.smooth {
        points = smooth(graph, &points, level);
    }
    points
}

fn send(tx: &Sender<Completion>, completion: Completion) {
    if tx.send(completion).is_err() {
        // The navigator is gone; nobody is waiting for the result.
        trace!("completion dropped after navigator shutdown");
    }
}
