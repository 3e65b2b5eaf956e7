//! The occupancy graph.
//!
//! # Data layout
//!
//! ```text
//! levels[L] : DashMap<CellIndex, FxHashSet<ObstacleId>>
//! ```
//!
//! A cell is present in `levels[L]` iff at least one obstacle occupies it.
//! `release` removes an id everywhere and drops every set it empties, so no
//! empty entry ever persists.
//!
//! Out-of-range levels are never a panic: queries on them report "free" and
//! writes to them are ignored.  Callers that need a hard failure validate
//! with [`OccupancyGraph::check_level`] first.

use std::ops::Range;

use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::debug;

use vn_core::{CellIndex, CoreResult, LevelGrid, NavConfig, ObstacleId, Vec3};

type LevelMap = DashMap<CellIndex, FxHashSet<ObstacleId>, FxBuildHasher>;

/// Multi-level sparse voxel occupancy index.
///
/// Share it as `Arc<OccupancyGraph>`; every method takes `&self`.
pub struct OccupancyGraph {
    grid:   LevelGrid,
    levels: Vec<LevelMap>,
}

impl OccupancyGraph {
    /// An empty index over `grid`.
    pub fn new(grid: LevelGrid) -> Self {
        let levels = (0..grid.level_count())
            .map(|_| DashMap::with_hasher(FxBuildHasher))
            .collect();
        Self { grid, levels }
    }

    /// An empty index sized by `config`.
    pub fn from_config(config: &NavConfig) -> CoreResult<Self> {
        Ok(Self::new(config.grid()?))
    }

    // ── Cell math ─────────────────────────────────────────────────────────

    #[inline]
    pub fn grid(&self) -> LevelGrid {
        self.grid
    }

    #[inline]
    pub fn base_cell_size(&self) -> f32 {
        self.grid.base_cell_size()
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.grid.level_count()
    }

    #[inline]
    pub fn cell_size(&self, level: usize) -> f32 {
        self.grid.cell_size(level)
    }

    #[inline]
    pub fn check_level(&self, level: usize) -> CoreResult<()> {
        self.grid.check_level(level)
    }

    #[inline]
    pub fn cell_index(&self, coord: Vec3, level: usize) -> CellIndex {
        self.grid.cell_index(coord, level)
    }

    #[inline]
    pub fn cell_center(&self, index: CellIndex, level: usize) -> Vec3 {
        self.grid.cell_center(index, level)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` if any obstacle occupies `index` on `level`.
    #[inline]
    pub fn is_occupied(&self, index: CellIndex, level: usize) -> bool {
        self.levels
            .get(level)
            .is_some_and(|map| map.contains_key(&index))
    }

    /// `true` if the cell covering `coord` on `level` is occupied.
    #[inline]
    pub fn is_occupied_at(&self, coord: Vec3, level: usize) -> bool {
        self.is_occupied(self.cell_index(coord, level), level)
    }

    /// Obstacles occupying `index` on `level`, sorted ascending.
    pub fn obstacles_at(&self, index: CellIndex, level: usize) -> Vec<ObstacleId> {
        let mut ids: Vec<ObstacleId> = self
            .levels
            .get(level)
            .and_then(|map| map.get(&index).map(|set| set.iter().copied().collect()))
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Number of occupied cells on `level`.
    pub fn occupied_count(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, DashMap::len)
    }

    /// Every occupied cell on `level`, sorted ascending.
    pub fn cells(&self, level: usize) -> Vec<CellIndex> {
        let mut cells: Vec<CellIndex> = self
            .levels
            .get(level)
            .map(|map| map.iter().map(|entry| *entry.key()).collect())
            .unwrap_or_default();
        cells.sort_unstable();
        cells
    }

    /// Walk levels upward from `min_level` and return the center of the
    /// coarsest cell covering `coord` that is still free, stopping at the
    /// first occupied level.  Returns `coord` unchanged when the cell on
    /// `min_level` itself is occupied.
    pub fn highest_free_level_center(&self, coord: Vec3, min_level: usize) -> Vec3 {
        let mut last_free = coord;
        for level in min_level..self.level_count() {
            let index = self.cell_index(coord, level);
            if self.is_occupied(index, level) {
                break;
            }
            last_free = self.cell_center(index, level);
        }
        last_free
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Mark the cells covering `coord` as occupied by `id` on every level in
    /// `levels` (clipped to the configured level count).
    pub fn occupy(&self, coord: Vec3, levels: Range<usize>, id: ObstacleId) {
        let end = levels.end.min(self.level_count());
        for level in levels.start..end {
            let index = self.cell_index(coord, level);
            self.levels[level].entry(index).or_default().insert(id);
        }
    }

    /// [`occupy`](Self::occupy) on every level.
    #[inline]
    pub fn occupy_all_levels(&self, coord: Vec3, id: ObstacleId) {
        self.occupy(coord, 0..self.level_count(), id);
    }

    /// Remove `id` from every cell on every level, dropping cells left empty.
    ///
    /// Returns the number of cells that became free.
    pub fn release(&self, id: ObstacleId) -> usize {
        let mut freed = 0;
        for map in &self.levels {
            let before = map.len();
            map.retain(|_, ids| {
                ids.remove(&id);
                !ids.is_empty()
            });
            freed += before.saturating_sub(map.len());
        }
        debug!(obstacle = %id, freed, "released obstacle");
        freed
    }

    /// Drop every occupied cell on every level.
    pub fn clear(&self) {
        for map in &self.levels {
            map.clear();
        }
    }

    /// Insert a whole id set for one cell.  Used by snapshot restore.
    pub(crate) fn insert_cell(&self, level: usize, index: CellIndex, ids: &[ObstacleId]) {
        if ids.is_empty() {
            return;
        }
        if let Some(map) = self.levels.get(level) {
            map.entry(index).or_default().extend(ids.iter().copied());
        }
    }
}
