//! arena — patrol demo for the voxnav navigation workspace.
//!
//! Rasterizes a procedural arena (rolling floor plus staggered walls), then
//! lets a handful of agents patrol between waypoints on opposite edges.
//! Halfway through, agent 0 is redirected and a new wall drops into the
//! arena.  The finished occupancy index is saved as a JSON snapshot.
//!
//! ```text
//! cargo run -p arena -- [config.json]
//! RUST_LOG=vn_nav=trace cargo run -p arena
//! ```

mod scene;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vn_agent::AgentSettings;
use vn_behavior::{AgentBehavior, Command, NavContext, NavEvent};
use vn_core::{AgentId, NavConfig, ObstacleId, SpaceConstraints, Tick, Vec3};
use vn_nav::{NavObserver, NavigatorBuilder};
use vn_path::PathOptions;
use vn_raster::TriangleMesh;
use vn_search::{BestFirst, SearchAlgorithm, WaveFront};

use scene::{FLIGHT_Y, HALF_EXTENT, build_arena, waypoint};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:   usize = 6;
const SEED:          u64   = 7;
const LEGS:          usize = 2;     // arrivals per agent before the run ends
const PAUSE_TICKS:   u64   = 20;    // wait at each waypoint
const MAX_TICKS:     u64   = 4_000;
const REFINE_AT:     u64   = 60;
const DROP_WALL_AT:  u64   = 90;
const TICK_PAUSE:    Duration = Duration::from_millis(2);
const READY_TIMEOUT: Duration = Duration::from_secs(30);
const SNAPSHOT_PATH: &str  = "output/arena/occupancy.json";

// ── Behavior ──────────────────────────────────────────────────────────────────

/// Shuttle between two waypoints, pausing at each end and retrying after
/// failed searches.
struct Patrol {
    routes: Vec<[Vec3; 2]>,
    pause:  u64,
}

impl Patrol {
    /// The route end farther from where the agent is now.
    fn far_end(&self, agent: AgentId, ctx: &NavContext<'_>) -> Vec3 {
        let [a, b] = self.routes[agent.index()];
        let here = ctx.agents.position[agent.index()];
        if here.distance(a) < here.distance(b) { b } else { a }
    }
}

impl AgentBehavior for Patrol {
    fn on_event(&self, agent: AgentId, event: NavEvent, ctx: &NavContext<'_>) -> Vec<Command> {
        match event {
            NavEvent::GraphReady => {
                vec![Command::MoveTo { target: self.far_end(agent, ctx), top_priority: false }]
            }
            NavEvent::TargetReached => vec![Command::WakeAt(ctx.tick + self.pause)],
            e if e.is_search_failure() => vec![Command::WakeAt(ctx.tick + self.pause)],
            _ => vec![],
        }
    }

    fn on_wake(&self, agent: AgentId, ctx: &NavContext<'_>) -> Vec<Command> {
        vec![Command::MoveTo { target: self.far_end(agent, ctx), top_priority: false }]
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CountingObserver {
    events:      usize,
    arrivals:    usize,
    failures:    usize,
    refinements: usize,
    last_tick:   Tick,
}

impl NavObserver for CountingObserver {
    fn on_event(&mut self, tick: Tick, agent: AgentId, event: NavEvent) {
        self.events += 1;
        match event {
            NavEvent::TargetReached => {
                self.arrivals += 1;
                info!(%tick, %agent, "target reached");
            }
            NavEvent::RefinementSucceeded => self.refinements += 1,
            e if e.is_search_failure() => {
                self.failures += 1;
                warn!(%tick, %agent, event = %e, "search failed");
            }
            _ => {}
        }
    }

    fn on_tick_end(&mut self, tick: Tick, _delivered: usize) {
        self.last_tick = tick;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<NavConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening config {path}"))?;
            let config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing config {path}"))?;
            Ok(config)
        }
        None => Ok(NavConfig { base_cell_size: 1.0, level_count: 3, ..NavConfig::default() }),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    println!("=== arena — voxnav patrol demo ===");
    println!(
        "Agents: {AGENT_COUNT}  |  Cell: {}  |  Levels: {}  |  Seed: {SEED}",
        config.base_cell_size, config.level_count
    );
    println!();

    // 1. Scene.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let obstacles = build_arena(&mut rng)?;
    let triangles: usize = obstacles.iter().map(|(_, g)| g.triangle_count()).sum();
    println!("Arena: {} obstacles, {triangles} triangles", obstacles.len());

    // 2. Agents: even ids use best-first, odd ids wave-front.
    let bounds = SpaceConstraints::new(
        Vec3::new(-HALF_EXTENT, -0.5, -HALF_EXTENT),
        Vec3::new(HALF_EXTENT, 6.0, HALF_EXTENT),
    )?;
    let mut routes = Vec::with_capacity(AGENT_COUNT);
    let mut agents = Vec::with_capacity(AGENT_COUNT);
    for i in 0..AGENT_COUNT {
        let route = [waypoint(&mut rng, false), waypoint(&mut rng, true)];
        let algorithm = if i % 2 == 0 {
            SearchAlgorithm::from(BestFirst::new(0.5, true)?)
        } else {
            SearchAlgorithm::from(WaveFront)
        };
        let settings = AgentSettings {
            speed: 0.5,
            algorithm,
            path: PathOptions { optimize: true, smooth: i % 3 == 0 },
            ..AgentSettings::new(bounds)
        };
        agents.push((route[0], settings));
        routes.push(route);
    }

    // 3. Navigator.
    let t0 = Instant::now();
    let mut nav = NavigatorBuilder::new(config, Patrol { routes, pause: PAUSE_TICKS })
        .obstacles(obstacles)
        .agents(agents)
        .build()?;
    if !nav.wait_ready(READY_TIMEOUT) {
        let (done, total) = nav.processing_progress();
        bail!("occupancy index not ready after {READY_TIMEOUT:?} ({done}/{total} tasks)");
    }
    println!(
        "Rasterized in {:.3} s: {} occupied level-0 cells",
        t0.elapsed().as_secs_f64(),
        nav.graph().occupied_count(0)
    );

    // 4. Run.
    let mut obs = CountingObserver::default();
    let t1 = Instant::now();
    while obs.arrivals < AGENT_COUNT * LEGS && nav.current_tick().0 < MAX_TICKS {
        match nav.current_tick().0 {
            REFINE_AT => {
                let detour = Vec3::new(0.0, FLIGHT_Y + 4.0, 0.0);
                if !nav.refine_path(AgentId(0), detour)? {
                    info!("agent 0 not moving; refinement skipped");
                }
            }
            DROP_WALL_AT => {
                let wall = TriangleMesh::cuboid(Vec3::new(9.0, FLIGHT_Y, 0.0), Vec3::new(0.5, 3.0, 3.0));
                let tasks = nav.submit_obstacle(ObstacleId(100), wall)?;
                info!(tasks, "dropped a new wall");
            }
            _ => {}
        }
        nav.tick(&mut obs);
        std::thread::sleep(TICK_PAUSE);
    }
    nav.wait_idle(READY_TIMEOUT);

    // 5. Summary.
    println!(
        "Ran {} ticks in {:.3} s",
        obs.last_tick.0 + 1,
        t1.elapsed().as_secs_f64()
    );
    println!("  events delivered : {}", obs.events);
    println!("  arrivals         : {}", obs.arrivals);
    println!("  search failures  : {}", obs.failures);
    println!("  refinements      : {}", obs.refinements);
    println!();

    std::fs::create_dir_all("output/arena")?;
    nav.save_snapshot(Path::new(SNAPSHOT_PATH))?;
    println!("Snapshot written to {SNAPSHOT_PATH}");
    println!();

    // 6. Final agent table.
    println!("{:<8} {:<16} {:<24} {:<8}", "Agent", "State", "Position", "Progress");
    println!("{}", "-".repeat(58));
    for agent in nav.agents().agent_ids() {
        let (Some(state), Some(p)) = (nav.state(agent), nav.position(agent)) else {
            continue;
        };
        let progress = nav.progress(agent).unwrap_or(0.0);
        println!(
            "{:<8} {:<16} {:<24} {:<8.2}",
            agent.0,
            state.to_string(),
            format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z),
            progress,
        );
    }

    Ok(())
}
