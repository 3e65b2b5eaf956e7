//! Unit tests for vn-occupancy.

use std::sync::Arc;

use vn_core::{CellIndex, LevelGrid, ObstacleId, Vec3};

use crate::{OccupancyError, OccupancyGraph, OccupancySnapshot};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn graph(levels: usize) -> OccupancyGraph {
    OccupancyGraph::new(LevelGrid::new(1.0, levels).unwrap())
}

// ── Occupy / release ──────────────────────────────────────────────────────────

#[cfg(test)]
mod occupy {
    use super::*;

    #[test]
    fn occupy_marks_every_level() {
        let g = graph(3);
        g.occupy_all_levels(Vec3::new(2.2, 0.0, -1.0), ObstacleId(1));
        for level in 0..3 {
            assert!(g.is_occupied_at(Vec3::new(2.2, 0.0, -1.0), level));
            assert_eq!(g.occupied_count(level), 1);
        }
        assert!(g.is_occupied(CellIndex::new(2, 0, -1), 0));
    }

    #[test]
    fn occupy_range_is_clipped() {
        let g = graph(2);
        g.occupy(Vec3::ZERO, 1..10, ObstacleId(1));
        assert!(!g.is_occupied_at(Vec3::ZERO, 0));
        assert!(g.is_occupied_at(Vec3::ZERO, 1));
    }

    #[test]
    fn release_of_only_id_removes_cell_everywhere() {
        let g = graph(3);
        g.occupy_all_levels(Vec3::new(5.0, 5.0, 5.0), ObstacleId(9));
        let freed = g.release(ObstacleId(9));
        assert_eq!(freed, 3);
        for level in 0..3 {
            assert_eq!(g.occupied_count(level), 0);
            assert!(g.cells(level).is_empty());
        }
    }

    #[test]
    fn release_keeps_cells_shared_with_other_ids() {
        let g = graph(1);
        g.occupy_all_levels(Vec3::ZERO, ObstacleId(1));
        g.occupy_all_levels(Vec3::ZERO, ObstacleId(2));
        g.occupy_all_levels(Vec3::X * 3.0, ObstacleId(1));
        g.release(ObstacleId(1));
        assert_eq!(g.cells(0), vec![CellIndex::ORIGIN]);
        assert_eq!(g.obstacles_at(CellIndex::ORIGIN, 0), vec![ObstacleId(2)]);
    }

    #[test]
    fn concurrent_occupy_of_same_cell_keeps_both_ids() {
        let g = Arc::new(graph(2));
        let cell = Vec3::new(1.0, 1.0, 1.0);
        rayon::scope(|s| {
            for id in [ObstacleId(1), ObstacleId(2)] {
                let g = Arc::clone(&g);
                s.spawn(move |_| {
                    for _ in 0..1_000 {
                        g.occupy_all_levels(cell, id);
                    }
                });
            }
        });
        let idx = g.cell_index(cell, 0);
        assert_eq!(g.obstacles_at(idx, 0), vec![ObstacleId(1), ObstacleId(2)]);
    }

    #[test]
    fn out_of_range_level_reads_free() {
        let g = graph(1);
        g.occupy_all_levels(Vec3::ZERO, ObstacleId(1));
        assert!(!g.is_occupied(CellIndex::ORIGIN, 5));
        assert_eq!(g.occupied_count(5), 0);
    }
}

// ── Highest free level ────────────────────────────────────────────────────────

#[cfg(test)]
mod highest_free {
    use super::*;

    #[test]
    fn all_free_returns_coarsest_center() {
        let g = graph(3);
        let p = Vec3::new(3.1, 0.2, 0.0);
        let expected = g.cell_center(g.cell_index(p, 2), 2);
        assert_eq!(g.highest_free_level_center(p, 0), expected);
    }

    #[test]
    fn stops_below_first_occupied_level() {
        let g = graph(3);
        let p = Vec3::new(3.1, 0.2, 0.0);
        g.occupy(p, 1..2, ObstacleId(4));
        let expected = g.cell_center(g.cell_index(p, 0), 0);
        assert_eq!(g.highest_free_level_center(p, 0), expected);
    }

    #[test]
    fn occupied_min_level_returns_input() {
        let g = graph(2);
        let p = Vec3::new(0.3, 0.0, 0.0);
        g.occupy_all_levels(p, ObstacleId(1));
        assert_eq!(g.highest_free_level_center(p, 0), p);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use super::*;

    fn populated() -> OccupancyGraph {
        let g = OccupancyGraph::new(LevelGrid::new(0.75, 3).unwrap());
        for i in 0..20 {
            let p = Vec3::new(i as f32 * 0.6, (i % 3) as f32, -(i as f32) * 0.2);
            g.occupy_all_levels(p, ObstacleId(i % 4));
        }
        g
    }

    #[test]
    fn json_round_trip_reproduces_cells_and_grid() {
        let g = populated();
        let mut buf = Vec::new();
        g.snapshot().write_json(&mut buf).unwrap();

        let snap = OccupancySnapshot::read_json(buf.as_slice()).unwrap();
        let back = OccupancyGraph::from_snapshot(&snap).unwrap();

        assert!((back.base_cell_size() - 0.75).abs() < 1e-6);
        assert_eq!(back.level_count(), 3);
        for level in 0..3 {
            assert_eq!(back.cells(level), g.cells(level));
            for cell in g.cells(level) {
                assert_eq!(back.obstacles_at(cell, level), g.obstacles_at(cell, level));
            }
        }
    }

    #[test]
    fn snapshot_is_deterministic() {
        let g = populated();
        assert_eq!(g.snapshot(), g.snapshot());
    }

    #[test]
    fn level_count_mismatch_rejected() {
        let mut snap = populated().snapshot();
        snap.levels.pop();
        assert!(matches!(
            OccupancyGraph::from_snapshot(&snap),
            Err(OccupancyError::Snapshot(_))
        ));
    }

    #[test]
    fn restore_requires_same_grid() {
        let snap = populated().snapshot();
        let other = graph(3);
        assert!(matches!(other.restore(&snap), Err(OccupancyError::GridMismatch { .. })));

        let same = OccupancyGraph::new(LevelGrid::new(0.75, 3).unwrap());
        same.occupy_all_levels(Vec3::splat(100.0), ObstacleId(99));
        same.restore(&snap).unwrap();
        assert_eq!(same.snapshot(), snap);
    }
}
