//! Procedural arena: a rolling floor and a row of staggered walls.

use rand::Rng;
use rand::rngs::SmallRng;

use vn_core::{ObstacleId, Vec3};
use vn_raster::{HeightField, ObstacleGeometry, RasterResult, TriangleMesh};

/// Half the arena's width along x and z.
pub const HALF_EXTENT: f32 = 20.0;

/// Height the agents fly at.
pub const FLIGHT_Y: f32 = 1.0;

const FLOOR_RESOLUTION: usize = 17;
const WALL_COUNT:       usize = 5;

/// Every obstacle in the arena, floor first.
pub fn build_arena(rng: &mut SmallRng) -> RasterResult<Vec<(ObstacleId, ObstacleGeometry)>> {
    let mut obstacles = Vec::with_capacity(WALL_COUNT + 1);

    let heights = (0..FLOOR_RESOLUTION * FLOOR_RESOLUTION).map(|_| rng.gen_range(0.0..1.0)).collect();
    let floor = HeightField::new(
        heights,
        FLOOR_RESOLUTION,
        Vec3::new(-HALF_EXTENT, -2.0, -HALF_EXTENT),
        Vec3::new(2.0 * HALF_EXTENT, 1.0, 2.0 * HALF_EXTENT),
    )?;
    obstacles.push((ObstacleId(0), floor.into()));

    // Walls alternate between the two halves of the arena so every straight
    // line across it is blocked at least once.
    for i in 0..WALL_COUNT {
        let x = -12.0 + 6.0 * i as f32;
        let side = if i % 2 == 0 { -6.0 } else { 6.0 };
        let z = side + rng.gen_range(-2.0..2.0);
        let wall = TriangleMesh::cuboid(Vec3::new(x, FLIGHT_Y, z), Vec3::new(0.5, 3.0, 10.0));
        obstacles.push((ObstacleId(i as u32 + 1), wall.into()));
    }
    Ok(obstacles)
}

/// A random waypoint near one of the arena's x edges.
pub fn waypoint(rng: &mut SmallRng, east: bool) -> Vec3 {
    let x = if east { HALF_EXTENT - 2.0 } else { 2.0 - HALF_EXTENT };
    Vec3::new(x, FLIGHT_Y, rng.gen_range(-15.0..15.0))
}
