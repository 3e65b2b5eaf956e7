//! Integration tests for vn-nav.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};
use rayon::ThreadPool;

use vn_agent::{AgentSettings, AgentState};
use vn_behavior::{AgentBehavior, NavEvent, NoopBehavior, RetryOnFailure};
use vn_core::{AgentId, CoreError, NavConfig, ObstacleId, Parallelism, SpaceConstraints, Vec3};
use vn_occupancy::OccupancySnapshot;
use vn_raster::{TriangleMesh, worker_pool};
use vn_search::{SearchOutcome, SearchReport};

use crate::worker::Completion;
use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

const WAIT: Duration = Duration::from_secs(10);
const MAX_STEPS: u64 = 5_000;

fn config() -> NavConfig {
    NavConfig {
        base_cell_size: 1.0,
        level_count:    2,
        parallelism:    Parallelism::Fixed(2),
        ..NavConfig::default()
    }
}

fn settings() -> AgentSettings {
    let bounds = SpaceConstraints::new(Vec3::splat(-10.0), Vec3::splat(10.0)).unwrap();
    let mut s = AgentSettings::new(bounds);
    s.speed = 0.5;
    s
}

fn slow_settings() -> AgentSettings {
    AgentSettings { speed: 0.05, ..settings() }
}

/// A thin wall across the x axis at `x`, covering y and z in `[-3, 3]`.
fn wall(x: f32) -> TriangleMesh {
    TriangleMesh::cuboid(Vec3::new(x, 0.0, 0.0), Vec3::new(0.1, 3.0, 3.0))
}

fn nav_at(positions: &[Vec3]) -> Navigator<NoopBehavior> {
    let mut b = NavigatorBuilder::new(config(), NoopBehavior);
    for &p in positions {
        b = b.agent(p, settings());
    }
    let nav = b.build().unwrap();
    assert!(nav.wait_ready(WAIT));
    nav
}

/// Navigator whose primary pass over a wall at `x = 4` has finished.
fn walled_nav(positions: &[Vec3]) -> Navigator<NoopBehavior> {
    let mut b = NavigatorBuilder::new(config(), NoopBehavior).obstacle(ObstacleId(0), wall(4.0));
    for &p in positions {
        b = b.agent(p, settings());
    }
    let nav = b.build().unwrap();
    assert!(nav.wait_ready(WAIT));
    assert!(nav.wait_idle(WAIT));
    nav
}

/// A one-thread pool whose only worker is parked until the returned sender
/// is dropped or sent to.
fn blocked_pool() -> (Arc<ThreadPool>, Sender<()>) {
    let pool = worker_pool(1).unwrap();
    let (tx, rx) = bounded::<()>(1);
    pool.spawn(move || {
        let _ = rx.recv();
    });
    (pool, tx)
}

/// Tick (sleeping briefly between ticks so workers can run) until `done`
/// holds.
fn step_until<B, F>(nav: &mut Navigator<B>, log: &mut EventLog, done: F) -> bool
where
    B: AgentBehavior,
    F: Fn(&Navigator<B>, &EventLog) -> bool,
{
    for _ in 0..MAX_STEPS {
        if done(nav, log) {
            return true;
        }
        nav.tick(log);
        std::thread::sleep(Duration::from_millis(1));
    }
    done(nav, log)
}

fn arrived<B: AgentBehavior>(agent: AgentId) -> impl Fn(&Navigator<B>, &EventLog) -> bool {
    move |_, log| log.contains(agent, NavEvent::TargetReached)
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn graph_ready_delivered_once_per_agent() {
        let mut nav = nav_at(&[Vec3::ZERO, Vec3::X]);
        let mut log = EventLog::new();
        nav.run_ticks(3, &mut log);
        assert_eq!(log.count(NavEvent::GraphReady), 2);

        let late = nav.spawn_agent(Vec3::Y, settings()).unwrap();
        nav.run_ticks(2, &mut log);
        assert_eq!(log.for_agent(late), vec![NavEvent::GraphReady]);
        assert_eq!(log.count(NavEvent::GraphReady), 3);
    }

    #[test]
    fn move_to_before_ready_fails() {
        let (pool, release) = blocked_pool();
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .pool(pool)
            .obstacle(ObstacleId(0), wall(4.0))
            .agent(Vec3::ZERO, settings())
            .build()
            .unwrap();
        assert!(!nav.is_ready());
        assert!(matches!(
            nav.move_to(AgentId(0), Vec3::new(6.0, 0.0, 0.0), false),
            Err(NavError::GraphNotReady)
        ));
        assert_eq!(nav.state(AgentId(0)), Some(AgentState::Idle));

        release.send(()).unwrap();
        assert!(nav.wait_ready(WAIT));
        let (processed, total) = nav.processing_progress();
        assert_eq!(processed, total);
        assert_eq!(total, 12);
    }

    #[test]
    fn stopped_rasterization_never_readies() {
        let (pool, release) = blocked_pool();
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .pool(pool)
            .obstacle(ObstacleId(0), wall(4.0))
            .agent(Vec3::ZERO, settings())
            .build()
            .unwrap();
        nav.stop_rasterization();
        drop(release);

        assert!(nav.wait_idle(WAIT));
        assert!(!nav.wait_ready(Duration::from_millis(50)));
        assert_eq!(nav.processing_progress().0, 0);
        assert!(matches!(
            nav.move_to(AgentId(0), Vec3::new(6.0, 0.0, 0.0), false),
            Err(NavError::GraphNotReady)
        ));
    }

    #[test]
    fn reaches_target_with_full_event_sequence() {
        let mut nav = nav_at(&[Vec3::ZERO]);
        let mut log = EventLog::new();
        nav.tick(&mut log);

        let a = AgentId(0);
        let target = Vec3::new(5.0, 0.0, 0.0);
        nav.move_to(a, target, false).unwrap();
        assert!(step_until(&mut nav, &mut log, arrived(a)));

        assert_eq!(log.for_agent(a), vec![
            NavEvent::GraphReady,
            NavEvent::MovementRequested,
            NavEvent::PathfindingRequested,
            NavEvent::AddedToQueue,
            NavEvent::QueueCameUp,
            NavEvent::PathfindingStarted,
            NavEvent::PathFound,
            NavEvent::ProcessingStarted,
            NavEvent::ProcessingFinished,
            NavEvent::MovementStarted,
            NavEvent::TargetReached,
        ]);
        assert_eq!(nav.state(a), Some(AgentState::Idle));
        assert_eq!(nav.position(a), Some(target));
        assert_eq!(nav.progress(a), Some(1.0));
        assert_eq!(nav.active_searches(), 0);
    }

    #[test]
    fn short_hop_skips_search() {
        let mut nav = nav_at(&[Vec3::ZERO]);
        let mut log = EventLog::new();
        let a = AgentId(0);
        let target = Vec3::new(0.5, 0.0, 0.0);
        nav.move_to(a, target, false).unwrap();
        assert_eq!(nav.state(a), Some(AgentState::PathProcessing));
        assert!(nav.queued().is_empty());

        assert!(step_until(&mut nav, &mut log, arrived(a)));
        assert!(!log.contains(a, NavEvent::PathfindingRequested));
        assert!(log.contains(a, NavEvent::PathFound));
        assert_eq!(nav.position(a), Some(target));
    }

    #[test]
    fn detours_around_wall() {
        let mut nav = walled_nav(&[Vec3::ZERO]);
        let mut log = EventLog::new();
        let a = AgentId(0);
        let target = Vec3::new(8.0, 0.0, 0.0);
        nav.move_to(a, target, false).unwrap();
        assert!(step_until(&mut nav, &mut log, arrived(a)));

        assert_eq!(nav.position(a), Some(target));
        // The straight line is blocked, so at least one waypoint remains.
        assert!(nav.final_path(a).unwrap().len() > 2);
    }

    #[test]
    fn rejected_endpoints_raise_named_events() {
        let mut nav = walled_nav(&[
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(50.0, 0.0, 0.0),
        ]);
        let mut log = EventLog::new();
        nav.move_to(AgentId(0), Vec3::new(4.0, 1.0, 0.0), false).unwrap();
        nav.move_to(AgentId(1), Vec3::new(50.0, 0.0, 0.0), false).unwrap();
        nav.move_to(AgentId(2), Vec3::new(-5.0, 0.0, 0.0), false).unwrap();
        nav.move_to(AgentId(3), Vec3::new(-5.0, 0.0, 0.0), false).unwrap();

        let expected = [
            (AgentId(0), NavEvent::SearchToOccupied),
            (AgentId(1), NavEvent::SearchToOutOfBounds),
            (AgentId(2), NavEvent::SearchFromOccupied),
            (AgentId(3), NavEvent::SearchFromOutOfBounds),
        ];
        assert!(step_until(&mut nav, &mut log, |_, log| {
            expected.iter().all(|&(a, e)| log.contains(a, e))
        }));
        for (a, _) in expected {
            assert_eq!(nav.state(a), Some(AgentState::Idle));
            assert!(!log.contains(a, NavEvent::PathFound));
        }
    }

    #[test]
    fn despawned_agent_rejects_requests() {
        let mut nav = nav_at(&[Vec3::ZERO, Vec3::X]);
        nav.despawn_agent(AgentId(0)).unwrap();
        assert!(matches!(
            nav.move_to(AgentId(0), Vec3::Y, false),
            Err(NavError::AgentNotFound(AgentId(0)))
        ));
        assert!(matches!(nav.despawn_agent(AgentId(0)), Err(NavError::AgentNotFound(_))));
        assert_eq!(nav.state(AgentId(0)), None);
        assert_eq!(nav.agents().live_count(), 1);
    }

    #[test]
    fn invalid_level_is_rejected() {
        let mut nav = nav_at(&[]);
        let bad = AgentSettings { level: 5, ..settings() };
        assert!(matches!(
            nav.spawn_agent(Vec3::ZERO, bad.clone()),
            Err(NavError::Core(CoreError::InvalidLevel { level: 5, count: 2 }))
        ));
        let built = NavigatorBuilder::new(config(), NoopBehavior).agent(Vec3::ZERO, bad).build();
        assert!(matches!(built, Err(NavError::Core(CoreError::InvalidLevel { .. }))));
    }
}

// ── Admission ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod admission {
    use super::*;

    #[test]
    fn queue_order_with_priority_insert() {
        let mut nav = nav_at(&[Vec3::ZERO, Vec3::Y, Vec3::Z]);
        let target = Vec3::new(6.0, 0.0, 0.0);
        nav.move_to(AgentId(0), target, false).unwrap();
        nav.move_to(AgentId(1), target, false).unwrap();
        nav.move_to(AgentId(2), target, true).unwrap();
        assert_eq!(nav.queued(), vec![AgentId(2), AgentId(0), AgentId(1)]);

        let mut log = EventLog::new();
        nav.tick(&mut log);
        assert!(log.contains(AgentId(2), NavEvent::QueueCameUp));
        assert!(!log.contains(AgentId(0), NavEvent::QueueCameUp));
        assert_eq!(nav.queued(), vec![AgentId(0), AgentId(1)]);
        assert_eq!(nav.state(AgentId(2)), Some(AgentState::SearchRunning));
    }

    #[test]
    fn admission_respects_search_limit() {
        let (pool, release) = blocked_pool();
        let positions: Vec<Vec3> = (0..4).map(|i| Vec3::new(0.0, i as f32, 0.0)).collect();
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .pool(pool)
            .agents(positions.iter().map(|&p| (p, settings())))
            .build()
            .unwrap();
        let limit = nav.search_limit();
        assert!(limit < positions.len());

        for i in 0..positions.len() {
            nav.move_to(AgentId(i as u32), Vec3::new(6.0, i as f32, 0.0), false).unwrap();
        }
        nav.run_ticks(positions.len() as u64 + 2, &mut NoopObserver);
        assert_eq!(nav.active_searches(), limit);
        assert_eq!(nav.queued().len(), positions.len() - limit);

        drop(release);
        let mut log = EventLog::new();
        assert!(step_until(&mut nav, &mut log, |n, _| {
            (0..4).all(|i| n.state(AgentId(i)) == Some(AgentState::Idle))
                && n.active_searches() == 0
        }));
        assert_eq!(log.count(NavEvent::TargetReached), positions.len());
    }

    #[test]
    fn move_to_leaves_queue_on_reset() {
        let mut nav = nav_at(&[Vec3::ZERO, Vec3::Y]);
        nav.move_to(AgentId(0), Vec3::new(6.0, 0.0, 0.0), false).unwrap();
        nav.move_to(AgentId(1), Vec3::new(6.0, 1.0, 0.0), false).unwrap();
        nav.reset(AgentId(0)).unwrap();
        assert_eq!(nav.queued(), vec![AgentId(1)]);
        assert_eq!(nav.state(AgentId(0)), Some(AgentState::Idle));
    }
}

// ── Continuations ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod continuations {
    use super::*;

    #[test]
    fn stale_completion_is_dropped() {
        let mut nav = nav_at(&[Vec3::ZERO]);
        let a = AgentId(0);
        nav.move_to(a, Vec3::new(6.0, 0.0, 0.0), false).unwrap();
        let current = nav.agents().generation[0];

        nav.actions
            .sender()
            .send(Completion::SearchFinished {
                agent:      a,
                generation: current - 1,
                report:     SearchReport::Completed(SearchOutcome::NoPath),
            })
            .unwrap();
        let mut log = EventLog::new();
        nav.tick(&mut log);
        assert!(!log.contains(a, NavEvent::PathNotFound));
        assert_ne!(nav.state(a), Some(AgentState::Idle));
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut nav = nav_at(&[Vec3::ZERO]);
        let mut log = EventLog::new();
        let a = AgentId(0);
        nav.move_to(a, Vec3::new(6.0, 0.0, 0.0), false).unwrap();
        nav.tick(&mut log);
        let second = Vec3::new(0.0, -6.0, 0.0);
        nav.move_to(a, second, false).unwrap();

        assert!(step_until(&mut nav, &mut log, arrived(a)));
        nav.run_ticks(20, &mut log);
        assert_eq!(log.count(NavEvent::MovementRequested), 2);
        assert_eq!(log.count(NavEvent::TargetReached), 1);
        assert_eq!(log.count(NavEvent::MovementStarted), 1);
        assert_eq!(nav.position(a), Some(second));
    }

    #[test]
    fn stopped_search_delivers_nothing_and_releases_slot() {
        let (pool, release) = blocked_pool();
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .pool(pool)
            .agent(Vec3::ZERO, settings())
            .build()
            .unwrap();
        let a = AgentId(0);
        let mut log = EventLog::new();
        nav.move_to(a, Vec3::new(6.0, 0.0, 0.0), false).unwrap();
        nav.tick(&mut log);
        assert_eq!(nav.state(a), Some(AgentState::SearchRunning));
        assert_eq!(nav.active_searches(), 1);

        nav.stop_all_async_work(a).unwrap();
        assert_eq!(nav.state(a), Some(AgentState::Idle));
        drop(release);

        assert!(step_until(&mut nav, &mut log, |n, _| n.active_searches() == 0));
        nav.run_ticks(5, &mut log);
        assert!(!log.contains(a, NavEvent::PathFound));
        assert!(!log.contains(a, NavEvent::PathNotFound));
    }

    #[test]
    fn stop_during_expansion_delivers_nothing() {
        let bounds = SpaceConstraints::new(Vec3::splat(-80.4), Vec3::splat(80.4)).unwrap();
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .agent(Vec3::ZERO, AgentSettings::new(bounds))
            .build()
            .unwrap();
        assert!(nav.wait_ready(WAIT));

        // Seal the goal so the search has to flood the whole volume.
        let goal = Vec3::splat(79.0);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            nav.graph().occupy_all_levels(goal + axis, ObstacleId(7));
            nav.graph().occupy_all_levels(goal - axis, ObstacleId(7));
        }

        let a = AgentId(0);
        let mut log = EventLog::new();
        nav.move_to(a, goal, false).unwrap();
        nav.tick(&mut log);
        assert_eq!(nav.state(a), Some(AgentState::SearchRunning));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(nav.active_searches(), 1);

        nav.stop_all_async_work(a).unwrap();
        assert_eq!(nav.state(a), Some(AgentState::Idle));
        assert!(step_until(&mut nav, &mut log, |n, _| n.active_searches() == 0));
        nav.run_ticks(5, &mut log);
        assert!(!log.contains(a, NavEvent::PathFound));
        assert!(!log.contains(a, NavEvent::PathNotFound));
        assert!(!log.contains(a, NavEvent::MovementStarted));
        assert_eq!(nav.state(a), Some(AgentState::Idle));
    }
}

// ── Movement control ──────────────────────────────────────────────────────────

#[cfg(test)]
mod control {
    use super::*;

    fn moving_nav() -> (Navigator<NoopBehavior>, EventLog) {
        let mut nav = NavigatorBuilder::new(config(), NoopBehavior)
            .agent(Vec3::ZERO, slow_settings())
            .build()
            .unwrap();
        assert!(nav.wait_ready(WAIT));
        let mut log = EventLog::new();
        nav.move_to(AgentId(0), Vec3::new(8.0, 0.0, 0.0), false).unwrap();
        assert!(step_until(&mut nav, &mut log, |n, _| {
            n.state(AgentId(0)) == Some(AgentState::Moving)
        }));
        (nav, log)
    }

    #[test]
    fn interrupt_and_resume() {
        let (mut nav, mut log) = moving_nav();
        let a = AgentId(0);
        assert!(!nav.resume(a).unwrap());
        assert!(nav.interrupt(a).unwrap());
        assert_eq!(nav.state(a), Some(AgentState::Paused));

        let held = nav.position(a);
        nav.run_ticks(10, &mut log);
        assert_eq!(nav.position(a), held);
        assert!(log.contains(a, NavEvent::MovementInterrupted));

        assert!(nav.resume(a).unwrap());
        assert!(step_until(&mut nav, &mut log, arrived(a)));
        assert!(log.contains(a, NavEvent::MovementResumed));
        assert!(!nav.interrupt(a).unwrap());
    }

    #[test]
    fn refine_redirects_movement() {
        let (mut nav, mut log) = moving_nav();
        let a = AgentId(0);
        let new_target = Vec3::new(0.0, 6.0, 0.0);
        assert!(nav.refine_path(a, new_target).unwrap());
        assert!(!nav.refine_path(a, new_target).unwrap());

        assert!(step_until(&mut nav, &mut log, arrived(a)));
        assert!(log.contains(a, NavEvent::RefinementStarted));
        assert!(log.contains(a, NavEvent::RefinementSucceeded));
        assert_eq!(nav.position(a), Some(new_target));
        assert_eq!(nav.agents().target[0], new_target);
        assert!(!nav.agents().refining[0]);
    }

    #[test]
    fn refine_rejected_when_not_applicable() {
        let mut nav = nav_at(&[Vec3::ZERO]);
        let mut log = EventLog::new();
        let a = AgentId(0);
        assert!(!nav.refine_path(a, Vec3::Y).unwrap());

        let (mut moving, _) = moving_nav();
        assert!(!moving.refine_path(a, Vec3::new(50.0, 0.0, 0.0)).unwrap());
        assert!(!moving.agents().refining[0]);

        nav.tick(&mut log);
        assert_eq!(log.for_agent(a), vec![NavEvent::GraphReady, NavEvent::RefinementRequested]);
    }

    #[test]
    fn retry_behavior_requeues_after_failure() {
        let mut nav = NavigatorBuilder::new(config(), RetryOnFailure::new(3).unwrap())
            .agent(Vec3::ZERO, settings())
            .build()
            .unwrap();
        assert!(nav.wait_ready(WAIT));
        let a = AgentId(0);
        nav.move_to(a, Vec3::new(50.0, 0.0, 0.0), false).unwrap();

        let mut log = EventLog::new();
        assert!(step_until(&mut nav, &mut log, |_, log| log.count(NavEvent::SearchToOutOfBounds) >= 2));
        assert!(log.count(NavEvent::MovementRequested) >= 2);
        assert_eq!(nav.agents().target[0], Vec3::new(50.0, 0.0, 0.0));
    }
}

// ── Obstacles & persistence ───────────────────────────────────────────────────

#[cfg(test)]
mod obstacles {
    use super::*;

    #[test]
    fn submit_and_remove_obstacle() {
        let mut nav = nav_at(&[]);
        assert!(nav.submit_obstacle(ObstacleId(7), wall(2.0)).unwrap() > 0);
        assert!(nav.wait_idle(WAIT));
        assert!(nav.graph().is_occupied_at(Vec3::new(2.0, 0.0, 0.0), 0));

        nav.resubmit_obstacle(ObstacleId(7), wall(-2.0)).unwrap();
        assert!(nav.wait_idle(WAIT));
        assert!(!nav.graph().is_occupied_at(Vec3::new(2.0, 0.0, 0.0), 0));
        assert!(nav.graph().is_occupied_at(Vec3::new(-2.0, 0.0, 0.0), 0));

        nav.remove_obstacle(ObstacleId(7));
        assert!(nav.wait_idle(WAIT));
        assert_eq!(nav.graph().occupied_count(0), 0);
        assert_eq!(nav.graph().occupied_count(1), 0);
    }

    #[test]
    fn snapshot_restores_ready_navigator() {
        let nav = walled_nav(&[]);
        let mut bytes = Vec::new();
        nav.snapshot().write_json(&mut bytes).unwrap();
        let snapshot = OccupancySnapshot::read_json(bytes.as_slice()).unwrap();

        let restored = NavigatorBuilder::new(config(), NoopBehavior).snapshot(snapshot).build().unwrap();
        assert!(restored.is_ready());
        for level in 0..2 {
            assert_eq!(restored.graph().occupied_count(level), nav.graph().occupied_count(level));
        }
    }

    #[test]
    fn snapshot_and_obstacles_are_exclusive() {
        let snapshot = nav_at(&[]).snapshot();
        let built = NavigatorBuilder::new(config(), NoopBehavior)
            .snapshot(snapshot)
            .obstacle(ObstacleId(0), wall(1.0))
            .build();
        assert!(matches!(built, Err(NavError::Config(_))));
    }

    #[test]
    fn snapshot_with_other_grid_is_rejected() {
        let snapshot = nav_at(&[]).snapshot();
        let other = NavConfig { level_count: 3, ..config() };
        let built = NavigatorBuilder::new(other, NoopBehavior).snapshot(snapshot).build();
        assert!(built.is_err());
    }
}
