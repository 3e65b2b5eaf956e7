//! Unit tests for vn-mobility.

use vn_core::{AgentId, Vec3};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn x(v: f32) -> Vec3 {
    Vec3::new(v, 0.0, 0.0)
}

fn line(n: usize) -> Vec<Vec3> {
    (0..n).map(|i| x(i as f32)).collect()
}

// ── Motion ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod motion {
    use super::*;

    #[test]
    fn walks_speed_per_tick() {
        let path = line(3);
        let mut state = MovementState::start(2.0);
        let mut pos = path[0];
        assert_eq!(state.advance(&path, &mut pos, 0.5), Advance::Moving);
        assert!((pos.x - 0.5).abs() < 1e-6);
        assert!((state.progress() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn crosses_points_mid_tick() {
        let path = line(3);
        let mut state = MovementState::start(2.0);
        let mut pos = path[0];
        state.advance(&path, &mut pos, 1.25);
        assert_eq!(state.segment, 1);
        assert!((pos.x - 1.25).abs() < 1e-6);
    }

    #[test]
    fn arrives_exactly_on_last_point() {
        let path = line(3);
        let mut state = MovementState::start(2.0);
        let mut pos = path[0];
        let mut ticks = 0;
        while state.advance(&path, &mut pos, 0.4) == Advance::Moving {
            ticks += 1;
            assert!(ticks < 10, "never arrived");
        }
        assert_eq!(pos, path[2]);
        assert_eq!(state.covered, state.total);
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn fast_agent_arrives_in_one_tick() {
        let path = line(4);
        let mut state = MovementState::start(3.0);
        let mut pos = path[0];
        assert_eq!(state.advance(&path, &mut pos, 10.0), Advance::Arrived);
        assert_eq!(pos, path[3]);
    }

    #[test]
    fn degenerate_paths_count_as_arrived() {
        let mut pos = x(1.0);
        assert_eq!(MovementState::start(0.0).advance(&[], &mut pos, 1.0), Advance::Arrived);
        assert_eq!(MovementState::start(0.0).advance(&[x(3.0)], &mut pos, 1.0), Advance::Arrived);
        assert_eq!(pos, x(3.0));
        assert_eq!(MovementState::default().progress(), 1.0);
    }

    #[test]
    fn store_tracks_each_agent() {
        let mut store = MobilityStore::new(1);
        store.push();
        store.begin(AgentId(1), 2.0);
        let mut pos = Vec3::ZERO;
        store.advance(AgentId(1), &line(3), &mut pos, 1.0);
        assert!((store.progress(AgentId(1)) - 0.5).abs() < 1e-6);
        assert_eq!(store.get(AgentId(0)).covered, 0.0);
        store.reset(AgentId(1));
        assert_eq!(*store.get(AgentId(1)), MovementState::default());
    }
}

// ── Refine merge ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod merge {
    use super::*;

    #[test]
    fn splices_after_shallow_turn() {
        let merged = merge_refined(x(0.2), &line(4), x(3.1));
        assert_eq!(merged, vec![x(0.2), x(1.0), x(2.0), x(3.1), x(3.0)]);
    }

    #[test]
    fn starts_at_closest_approach() {
        let merged = merge_refined(x(2.1), &line(4), x(3.1));
        assert_eq!(merged, vec![x(2.1), x(2.0), x(3.1), x(3.0)]);
    }

    #[test]
    fn sharp_turns_keep_closest_point() {
        let refined = vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 1.0)];
        let pos = Vec3::new(-0.1, 0.0, 0.0);
        let merged = merge_refined(pos, &refined, Vec3::new(0.0, 1.0, 1.1));
        assert_eq!(merged[0], pos);
        assert_eq!(merged[1], Vec3::ZERO);
        assert_eq!(*merged.last().unwrap(), refined[2]);
    }

    #[test]
    fn empty_refined_goes_straight() {
        assert_eq!(merge_refined(x(0.0), &[], x(5.0)), vec![x(0.0), x(5.0)]);
    }
}
