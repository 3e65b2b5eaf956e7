//! Unit tests for vn-agent.

use vn_core::{AgentId, CoreError, SpaceConstraints, Vec3};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn settings() -> AgentSettings {
    AgentSettings::new(SpaceConstraints::around(Vec3::ZERO, 10.0).unwrap())
}

fn store_with(n: usize) -> AgentStore {
    let mut store = AgentStore::new();
    for i in 0..n {
        store.spawn(Vec3::new(i as f32, 0.0, 0.0), settings());
    }
    store
}

// ── Transition table ──────────────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use super::*;
    use AgentState::*;

    const ALL: [AgentState; 6] = [Idle, QueuedForSearch, SearchRunning, PathProcessing, Moving, Paused];

    #[test]
    fn happy_path() {
        let mut s = Idle;
        for trigger in [
            Trigger::MoveRequested,
            Trigger::Admitted,
            Trigger::SearchFound,
            Trigger::Processed,
            Trigger::Interrupt,
            Trigger::Resume,
            Trigger::Arrived,
        ] {
            s = transition(s, trigger).unwrap_or_else(|| panic!("{s} rejected {trigger:?}"));
        }
        assert_eq!(s, Idle);
    }

    #[test]
    fn short_hop_skips_search() {
        assert_eq!(transition(Idle, Trigger::ShortHop), Some(PathProcessing));
    }

    #[test]
    fn search_failure_returns_to_idle() {
        assert_eq!(transition(SearchRunning, Trigger::SearchFailed), Some(Idle));
    }

    #[test]
    fn reset_from_anywhere() {
        for s in ALL {
            assert_eq!(transition(s, Trigger::Reset), Some(Idle));
        }
    }

    #[test]
    fn invalid_triggers_rejected() {
        assert_eq!(transition(Idle, Trigger::Interrupt), None);
        assert_eq!(transition(Paused, Trigger::Interrupt), None);
        assert_eq!(transition(Moving, Trigger::Resume), None);
        assert_eq!(transition(QueuedForSearch, Trigger::SearchFound), None);
        assert_eq!(transition(Moving, Trigger::MoveRequested), None);
    }

    #[test]
    fn busy_states() {
        let busy: Vec<_> = ALL.into_iter().filter(|s| s.is_busy()).collect();
        assert_eq!(busy, vec![SearchRunning, PathProcessing]);
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use super::*;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut store = AgentStore::new();
        assert_eq!(store.spawn(Vec3::ZERO, settings()), AgentId(0));
        assert_eq!(store.spawn(Vec3::ONE, settings()), AgentId(1));
        assert_eq!(store.count, 2);
        assert_eq!(store.position[1], Vec3::ONE);
        assert_eq!(store.target[1], Vec3::ONE);
        assert_eq!(store.state[0], AgentState::Idle);
    }

    #[test]
    fn despawn_keeps_ids_stable() {
        let mut store = store_with(3);
        assert!(store.despawn(AgentId(1)));
        assert!(!store.despawn(AgentId(1)));
        assert!(!store.despawn(AgentId(9)));
        assert_eq!(store.agent_ids().collect::<Vec<_>>(), vec![AgentId(0), AgentId(2)]);
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.count, 3);
    }

    #[test]
    fn despawn_cancels_outstanding_work() {
        let mut store = store_with(1);
        let token = store.cancel_token(AgentId(0));
        store.despawn(AgentId(0));
        assert!(token.is_cancelled());
    }

    #[test]
    fn renew_request_bumps_generation_and_clears() {
        let mut store = store_with(1);
        let a = AgentId(0);
        let token = store.cancel_token(a);
        store.final_path[0].publish(vec![Vec3::ZERO, Vec3::X]);
        store.refining[0] = true;
        store.refine_target[0] = Some(Vec3::Y);

        assert_eq!(store.renew_request(a), 1);
        assert!(token.is_cancelled());
        assert!(!store.cancel_token(a).is_cancelled());
        assert!(store.final_path[0].is_empty());
        assert!(!store.refining[0]);
        assert_eq!(store.refine_target[0], None);
        assert_eq!(store.renew_request(a), 2);
    }

    #[test]
    fn bump_generation_keeps_paths() {
        let mut store = store_with(1);
        let a = AgentId(0);
        let token = store.cancel_token(a);
        store.final_path[0].publish(vec![Vec3::ZERO, Vec3::X]);
        store.refining[0] = true;

        assert_eq!(store.bump_generation(a), 1);
        assert!(token.is_cancelled());
        assert_eq!(store.final_path[0].len(), 2);
        assert!(store.refining[0]);
    }

    #[test]
    fn settings_validation() {
        let mut s = settings();
        assert!(s.validate(1).is_ok());
        s.level = 2;
        assert!(matches!(s.validate(2), Err(CoreError::InvalidLevel { level: 2, count: 2 })));
        s.level = 0;
        s.speed = 0.0;
        assert!(matches!(s.validate(2), Err(CoreError::Config(_))));
    }
}

// ── Path slots ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod slots {
    use super::*;

    #[test]
    fn snapshot_survives_republish() {
        let slot = PathSlot::new();
        slot.publish(vec![Vec3::ZERO, Vec3::X]);
        let before = slot.snapshot();
        slot.publish(vec![Vec3::Y]);
        assert_eq!(before.len(), 2);
        assert_eq!(*slot.snapshot(), vec![Vec3::Y]);
    }

    #[test]
    fn clones_share_contents() {
        let slot = PathSlot::new();
        let reader = slot.clone();
        slot.publish(vec![Vec3::ONE]);
        assert_eq!(reader.len(), 1);
        slot.clear();
        assert!(reader.is_empty());
    }

    #[test]
    fn concurrent_readers_see_whole_paths() {
        let slot = PathSlot::new();
        std::thread::scope(|s| {
            let writer = slot.clone();
            s.spawn(move || {
                for n in 1..200 {
                    writer.publish(vec![Vec3::splat(n as f32); n]);
                }
            });
            for _ in 0..200 {
                let path = slot.snapshot();
                if let Some(first) = path.first() {
                    assert_eq!(path.len(), first.x as usize);
                }
            }
        });
    }
}
