//! Obstacle geometry descriptors.
//!
//! Two shapes are understood: arbitrary triangle meshes with a rigid
//! transform, and square height fields (terrain).  Both are immutable once
//! built and shared with worker tasks through `Arc`.

use std::sync::Arc;

use vn_core::{Quat, Vec3};

use crate::{RasterError, RasterResult};

// ── Transform ─────────────────────────────────────────────────────────────────

/// Rigid transform with non-uniform scale.
///
/// `world = position + rotation * (scale * local)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale:    Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale:    Vec3::ONE,
    };

    pub fn from_translation(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    #[inline]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * local)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── TriangleMesh ──────────────────────────────────────────────────────────────

/// An indexed triangle list in local space plus its world transform.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    pub(crate) vertices:  Vec<Vec3>,
    pub(crate) indices:   Vec<u32>,
    pub(crate) transform: Transform,
}

impl TriangleMesh {
    /// Build a mesh, checking that `indices` describes whole triangles and
    /// never points past `vertices`.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>, transform: Transform) -> RasterResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(RasterError::InvalidGeometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RasterError::InvalidGeometry(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        Ok(Self { vertices, indices, transform })
    }

    /// An axis-aligned box centered on `center`, 12 triangles.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2,  0, 2, 3, // -z
            4, 6, 5,  4, 7, 6, // +z
            0, 4, 5,  0, 5, 1, // -y
            3, 2, 6,  3, 6, 7, // +y
            0, 3, 7,  0, 7, 4, // -x
            1, 5, 6,  1, 6, 2, // +x
        ];
        Self { vertices, indices, transform: Transform::from_translation(center) }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// World-space corners of triangle `i`.
    #[inline]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let base = i * 3;
        let corner = |k: usize| self.transform.apply(self.vertices[self.indices[base + k] as usize]);
        [corner(0), corner(1), corner(2)]
    }
}

// ── HeightField ───────────────────────────────────────────────────────────────

/// A square grid of normalized heights (terrain).
///
/// Sample `(row, col)` sits at
/// `origin + (col/(res-1) * size.x, h[row][col] * size.y, row/(res-1) * size.z)`.
/// Each grid quad contributes two triangles, so a field of resolution `res`
/// has `(res-1)² * 2` triangles.
#[derive(Clone, Debug)]
pub struct HeightField {
    heights:    Vec<f32>,
    resolution: usize,
    origin:     Vec3,
    size:       Vec3,
}

impl HeightField {
    /// `heights` is row-major, `resolution × resolution`.
    pub fn new(heights: Vec<f32>, resolution: usize, origin: Vec3, size: Vec3) -> RasterResult<Self> {
        if resolution < 2 {
            return Err(RasterError::InvalidGeometry(format!(
                "height field resolution {resolution} must be at least 2"
            )));
        }
        if heights.len() != resolution * resolution {
            return Err(RasterError::InvalidGeometry(format!(
                "expected {} heights for resolution {resolution}, got {}",
                resolution * resolution,
                heights.len()
            )));
        }
        Ok(Self { heights, resolution, origin, size })
    }

    /// A flat field at `origin.y`.
    pub fn flat(resolution: usize, origin: Vec3, size: Vec3) -> RasterResult<Self> {
        Self::new(vec![0.0; resolution * resolution], resolution, origin, size)
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of quad rows (`resolution - 1`).
    #[inline]
    pub fn quad_rows(&self) -> usize {
        self.resolution - 1
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.quad_rows() * self.quad_rows() * 2
    }

    /// World position of grid sample `(row, col)`.
    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> Vec3 {
        let span = (self.resolution - 1) as f32;
        let h = self.heights[row * self.resolution + col];
        self.origin
            + Vec3::new(
                col as f32 / span * self.size.x,
                h * self.size.y,
                row as f32 / span * self.size.z,
            )
    }

    /// The two triangles of the quad whose far corner is `(row, col)`.
    ///
    /// `row` and `col` range over `1..resolution`.
    pub fn quad_triangles(&self, row: usize, col: usize) -> [[Vec3; 3]; 2] {
        let p0 = self.sample(row - 1, col - 1);
        let p1 = self.sample(row, col - 1);
        let p2 = self.sample(row - 1, col);
        let p3 = self.sample(row, col);
        [[p0, p1, p2], [p1, p2, p3]]
    }
}

// ── ObstacleGeometry ──────────────────────────────────────────────────────────

/// What a scene collaborator hands to the rasterizer.
#[derive(Clone, Debug)]
pub enum ObstacleGeometry {
    Mesh(Arc<TriangleMesh>),
    HeightField(Arc<HeightField>),
}

impl ObstacleGeometry {
    pub fn triangle_count(&self) -> usize {
        match self {
            ObstacleGeometry::Mesh(mesh) => mesh.triangle_count(),
            ObstacleGeometry::HeightField(field) => field.triangle_count(),
        }
    }
}

impl From<TriangleMesh> for ObstacleGeometry {
    fn from(mesh: TriangleMesh) -> Self {
        ObstacleGeometry::Mesh(Arc::new(mesh))
    }
}

impl From<HeightField> for ObstacleGeometry {
    fn from(field: HeightField) -> Self {
        ObstacleGeometry::HeightField(Arc::new(field))
    }
}
