//! # Chunk Coordinate Module
//!
//! Conversions between world-space block positions, chunk coordinates and
//! flattened indices. Both the `ChunkManager` and the `WorldContext` lay their
//! chunks out with these helpers, so a chunk index means the same thing in both.
//!
//! All chunk grids start at chunk `(0, 0, 0)`, whose origin is world position
//! `(0, 0, 0)`; every in-bounds world position is therefore non-negative and
//! plain integer division/remainder yields the chunk and local coordinates.

use cgmath::{Point3, Vector3};

use super::{CHUNK_SIZE, CHUNK_VOLUME};

/// Size of a chunk grid measured in blocks.
pub fn world_extent(dimensions: Vector3<i32>) -> Vector3<i32> {
    Vector3::new(
        dimensions.x * CHUNK_SIZE,
        dimensions.y * CHUNK_SIZE,
        dimensions.z * CHUNK_SIZE,
    )
}

/// Splits a world position into `(chunk coordinate, local coordinate)`.
///
/// # Returns
/// `None` if the position lies outside the grid.
pub fn split_world_position(
    position: Point3<i32>,
    dimensions: Vector3<i32>,
) -> Option<(Point3<i32>, Point3<i32>)> {
    let extent = world_extent(dimensions);
    let inside = (0..extent.x).contains(&position.x)
        && (0..extent.y).contains(&position.y)
        && (0..extent.z).contains(&position.z);
    if !inside {
        return None;
    }

    let chunk = Point3::new(
        position.x / CHUNK_SIZE,
        position.y / CHUNK_SIZE,
        position.z / CHUNK_SIZE,
    );
    let local = Point3::new(
        position.x % CHUNK_SIZE,
        position.y % CHUNK_SIZE,
        position.z % CHUNK_SIZE,
    );
    Some((chunk, local))
}

/// World-space origin of a chunk.
pub fn chunk_origin(coord: Point3<i32>) -> Point3<i32> {
    Point3::new(coord.x * CHUNK_SIZE, coord.y * CHUNK_SIZE, coord.z * CHUNK_SIZE)
}

/// Flattened index of a chunk coordinate, using the same X-fastest layout as
/// block containers.
pub fn chunk_index(coord: Point3<i32>, dimensions: Vector3<i32>) -> Option<usize> {
    let inside = (0..dimensions.x).contains(&coord.x)
        && (0..dimensions.y).contains(&coord.y)
        && (0..dimensions.z).contains(&coord.z);
    if !inside {
        return None;
    }
    let (dx, dy) = (dimensions.x as usize, dimensions.y as usize);
    Some(dy * dx * coord.z as usize + dx * coord.y as usize + coord.x as usize)
}

/// Inverse of [`chunk_index`].
pub fn chunk_coord_of_index(index: usize, dimensions: Vector3<i32>) -> Point3<i32> {
    let (dx, dy) = (dimensions.x.max(1) as usize, dimensions.y.max(1) as usize);
    Point3::new(
        (index % dx) as i32,
        ((index / dx) % dy) as i32,
        (index / (dx * dy)) as i32,
    )
}

/// Flattened index of a local coordinate inside a chunk-sized buffer.
///
/// The caller guarantees `local` is inside `[0, CHUNK_SIZE)`.
pub fn local_index(local: Point3<i32>) -> usize {
    let size = CHUNK_SIZE as usize;
    let index = size * size * local.z as usize + size * local.y as usize + local.x as usize;
    debug_assert!(index < CHUNK_VOLUME);
    index
}
