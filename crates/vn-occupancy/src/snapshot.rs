//! Snapshot persistence for the occupancy index.
//!
//! # Format
//!
//! One list of cell records per level (index = level), followed by a
//! trailing metadata record carrying the base cell size as a plain float and
//! the level count:
//!
//! ```json
//! {
//!   "levels": [
//!     [ { "index": { "x": 1, "y": 0, "z": -2 }, "obstacles": [3, 7] } ],
//!     [ ... ]
//!   ],
//!   "meta": { "base_cell_size": 0.5, "level_count": 2 }
//! }
//! ```
//!
//! Cells and ids are written in ascending order so equal indexes always
//! produce byte-identical snapshots.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use vn_core::{CellIndex, LevelGrid, ObstacleId};

use crate::{OccupancyError, OccupancyGraph, OccupancyResult};

/// One occupied cell and the obstacles occupying it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub index:     CellIndex,
    pub obstacles: Vec<ObstacleId>,
}

/// Trailing metadata record.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub base_cell_size: f32,
    pub level_count:    usize,
}

/// A serialisable copy of every level of an [`OccupancyGraph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub levels: Vec<Vec<CellRecord>>,
    pub meta:   SnapshotMeta,
}

impl OccupancySnapshot {
    /// Check the metadata against the level lists and return the grid they
    /// describe.
    pub fn grid(&self) -> OccupancyResult<LevelGrid> {
        let grid = LevelGrid::new(self.meta.base_cell_size, self.meta.level_count)?;
        if self.levels.len() != self.meta.level_count {
            return Err(OccupancyError::Snapshot(format!(
                "metadata declares {} levels but {} are listed",
                self.meta.level_count,
                self.levels.len()
            )));
        }
        Ok(grid)
    }

    /// Total number of cell records across all levels.
    pub fn cell_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    // ── JSON I/O ──────────────────────────────────────────────────────────

    pub fn write_json<W: Write>(&self, writer: W) -> OccupancyResult<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> OccupancyResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the snapshot to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> OccupancyResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), cells = self.cell_count(), "occupancy snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> OccupancyResult<Self> {
        let snapshot = Self::read_json(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), cells = snapshot.cell_count(), "occupancy snapshot loaded");
        Ok(snapshot)
    }
}

impl OccupancyGraph {
    /// Copy every level into a snapshot.
    pub fn snapshot(&self) -> OccupancySnapshot {
        let levels = (0..self.level_count())
            .map(|level| {
                self.cells(level)
                    .into_iter()
                    .map(|index| CellRecord { index, obstacles: self.obstacles_at(index, level) })
                    .filter(|record| !record.obstacles.is_empty())
                    .collect()
            })
            .collect();
        OccupancySnapshot {
            levels,
            meta: SnapshotMeta {
                base_cell_size: self.base_cell_size(),
                level_count:    self.level_count(),
            },
        }
    }

    /// Build a new index with the snapshot's grid and contents.
    pub fn from_snapshot(snapshot: &OccupancySnapshot) -> OccupancyResult<Self> {
        let graph = Self::new(snapshot.grid()?);
        graph.fill_from(snapshot);
        Ok(graph)
    }

    /// Replace this index's contents with the snapshot's.
    ///
    /// The grid of a live index cannot change, so the snapshot must have been
    /// taken from an index with the same base size and level count.
    pub fn restore(&self, snapshot: &OccupancySnapshot) -> OccupancyResult<()> {
        let found = snapshot.grid()?;
        if found != self.grid() {
            return Err(OccupancyError::GridMismatch { expected: self.grid(), found });
        }
        self.clear();
        self.fill_from(snapshot);
        Ok(())
    }

    fn fill_from(&self, snapshot: &OccupancySnapshot) {
        for (level, records) in snapshot.levels.iter().enumerate() {
            for record in records {
                self.insert_cell(level, record.index, &record.obstacles);
            }
        }
    }
}
