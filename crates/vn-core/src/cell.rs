//! Multi-resolution cell arithmetic.
//!
//! # Design
//!
//! Space is covered by several nested cubic grids.  Level 0 is the finest;
//! every further level grows the cell edge by a fixed fraction of the base:
//!
//!   cell_size(L) = base + base * LEVEL_RISE * L
//!
//! A coordinate maps to the cell whose center is nearest on every axis.
//! Rounding is half-up on the magnitude with the sign re-applied, so the
//! origin cell straddles zero and is the only cell with a 0 component:
//!
//!   index  = trunc(|c| / size + 0.5) * sign(c)
//!   center = index * size

use std::fmt;

use glam::Vec3;

use crate::{CoreError, CoreResult, MAX_LEVELS, MIN_CELL_SIZE};

/// Fraction of the base cell size added per level.
pub const LEVEL_RISE: f32 = 0.33;

// ── CellIndex ─────────────────────────────────────────────────────────────────

/// Integer cell coordinates on one resolution level.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellIndex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellIndex {
    pub const ORIGIN: CellIndex = CellIndex { x: 0, y: 0, z: 0 };

    /// Axis neighbour offsets in the fixed visitation order -x, +x, -y, +y, -z, +z.
    pub const AXIS_OFFSETS: [(i32, i32, i32); 6] = [
        (-1, 0, 0),
        (1, 0, 0),
        (0, -1, 0),
        (0, 1, 0),
        (0, 0, -1),
        (0, 0, 1),
    ];

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, z: self.z + dz }
    }

    /// The index as a float vector (index space, not world space).
    #[inline]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Euclidean distance between two indices, in index units.
    #[inline]
    pub fn distance(self, other: CellIndex) -> f32 {
        self.as_vec3().distance(other.as_vec3())
    }

    /// The six face neighbours in the order of [`Self::AXIS_OFFSETS`].
    pub fn axis_neighbours(self) -> impl Iterator<Item = CellIndex> {
        Self::AXIS_OFFSETS
            .into_iter()
            .map(move |(dx, dy, dz)| self.offset(dx, dy, dz))
    }

    /// The 3×3×3 block centered on `self` (itself included), x outermost,
    /// each axis ascending from -1 to +1.
    pub fn neighbourhood(self) -> impl Iterator<Item = CellIndex> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| self.offset(dx, dy, dz)))
        })
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Half-up rounding of one coordinate component to a cell index.
#[inline]
fn axis_index(c: f32, size: f32) -> i32 {
    let magnitude = (c.abs() / size + 0.5) as i32;
    if c < 0.0 { -magnitude } else { magnitude }
}

// ── LevelGrid ─────────────────────────────────────────────────────────────────

/// Cell-size table for every resolution level.
///
/// `LevelGrid` is `Copy` and holds no heap data; every component that needs
/// cell math carries its own copy.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelGrid {
    base_cell_size: f32,
    level_count:    usize,
}

impl LevelGrid {
    /// Validate and build a grid.
    ///
    /// Fails with [`CoreError::Config`] when `base_cell_size` is not above
    /// [`MIN_CELL_SIZE`] or `level_count` is outside `1..=MAX_LEVELS`.
    pub fn new(base_cell_size: f32, level_count: usize) -> CoreResult<Self> {
        if !base_cell_size.is_finite() || base_cell_size <= MIN_CELL_SIZE {
            return Err(CoreError::Config(format!(
                "base cell size {base_cell_size} must be finite and above {MIN_CELL_SIZE}"
            )));
        }
        if level_count == 0 || level_count > MAX_LEVELS {
            return Err(CoreError::Config(format!(
                "level count {level_count} must be in 1..={MAX_LEVELS}"
            )));
        }
        Ok(Self { base_cell_size, level_count })
    }

    #[inline]
    pub fn base_cell_size(&self) -> f32 {
        self.base_cell_size
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// `Ok(())` if `level` exists, [`CoreError::InvalidLevel`] otherwise.
    #[inline]
    pub fn check_level(&self, level: usize) -> CoreResult<()> {
        if level < self.level_count {
            Ok(())
        } else {
            Err(CoreError::InvalidLevel { level, count: self.level_count })
        }
    }

    /// Edge length of a cell on `level`.
    #[inline]
    pub fn cell_size(&self, level: usize) -> f32 {
        self.base_cell_size + self.base_cell_size * LEVEL_RISE * level as f32
    }

    /// Index of the cell covering `coord` on `level`.
    #[inline]
    pub fn cell_index(&self, coord: Vec3, level: usize) -> CellIndex {
        let size = self.cell_size(level);
        CellIndex {
            x: axis_index(coord.x, size),
            y: axis_index(coord.y, size),
            z: axis_index(coord.z, size),
        }
    }

    /// Canonical center coordinate of `index` on `level`.
    #[inline]
    pub fn cell_center(&self, index: CellIndex, level: usize) -> Vec3 {
        index.as_vec3() * self.cell_size(level)
    }
}
