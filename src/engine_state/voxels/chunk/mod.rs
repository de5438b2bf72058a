//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed 32x32x32 block container with
//! a world-space origin, a dirty flag and a handle back to the `ChunkManager`
//! that owns it.
//!
//! ## Neighbor Access
//!
//! Local coordinates outside `[0, 32)` are not an error. They are translated to
//! world space (`position + local`) and forwarded to the manager, so the meshers
//! can test the visibility of a boundary face by reading one cell into the
//! neighboring chunk exactly as they would read an interior cell.
//!
//! ## Ownership
//!
//! The manager owns every chunk. The chunk only holds a `Weak` handle to the
//! manager, so it can never keep the manager alive; once the manager is gone,
//! forwarded reads fall back to air and forwarded writes are rejected.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Weak,
};

use cgmath::{Point3, Vector3};
use log::trace;

use crate::{
    engine_state::rendering::{
        meshing::{greedy_mesh, quick_mesh, MeshData},
        MeshType, RenderKey,
    },
    error::{Result, VoxelError},
};

use super::{
    block::Block,
    block_container::{BlockContainer, BlockVolume},
    chunk_manager::ChunkManager,
};

pub mod chunk_coords;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_SIZE²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_SIZE * CHUNK_SIZE;
/// The total number of blocks in a chunk (CHUNK_SIZE³).
pub const CHUNK_VOLUME: usize = (CHUNK_PLANE_SIZE * CHUNK_SIZE) as usize;

/// Represents a 32x32x32 collection of voxel blocks in the world.
///
/// Chunks are the unit of storage and of mesh regeneration: any write inside a
/// chunk marks it modified, and the manager re-meshes modified chunks once per tick.
pub struct Chunk {
    /// The block storage for this chunk
    container: BlockContainer,
    /// World-space position of local `(0, 0, 0)`
    position: Point3<i32>,
    /// Position of this chunk in the manager's chunk grid
    coord: Point3<i32>,
    /// Slot of this chunk in the manager's chunk array
    index: usize,
    /// Set by every in-bounds write, cleared when a re-mesh is scheduled
    is_modified: AtomicBool,
    /// Non-owning handle to the manager that owns this chunk
    manager: Weak<ChunkManager>,
}

impl Chunk {
    /// Creates an empty chunk for slot `index` of a manager.
    ///
    /// The render key of the chunk is its index, so meshes can be matched to the
    /// chunk's render components without a separate lookup.
    pub(crate) fn new(manager: Weak<ChunkManager>, index: usize, coord: Point3<i32>) -> Self {
        Chunk {
            container: BlockContainer::with_render_key(
                Vector3::new(CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE),
                RenderKey(index as u32),
            ),
            position: chunk_coords::chunk_origin(coord),
            coord,
            index,
            is_modified: AtomicBool::new(false),
            manager,
        }
    }

    /// World-space position of local `(0, 0, 0)`.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// Position of this chunk in the chunk grid.
    pub fn coord(&self) -> Point3<i32> {
        self.coord
    }

    /// Slot of this chunk in the manager's chunk array.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The underlying block storage.
    pub fn container(&self) -> &BlockContainer {
        &self.container
    }

    /// Whether the chunk has changed since its last scheduled re-mesh.
    pub fn is_modified(&self) -> bool {
        self.is_modified.load(Ordering::Acquire)
    }

    /// Forces the dirty flag.
    pub fn set_modified(&self, modified: bool) {
        self.is_modified.store(modified, Ordering::Release);
    }

    /// Clears the dirty flag and reports whether it was set.
    ///
    /// The swap is atomic, so two concurrent callers can never both see `true`
    /// for the same modification.
    pub fn take_modified(&self) -> bool {
        self.is_modified.swap(false, Ordering::AcqRel)
    }

    /// Whether a local coordinate lies inside this chunk.
    pub fn contains_local(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_SIZE).contains(&y) && (0..CHUNK_SIZE).contains(&z)
    }

    /// World position of a local coordinate, `None` when it does not fit in `i32`.
    fn to_world(&self, x: i32, y: i32, z: i32) -> Option<Point3<i32>> {
        Some(Point3::new(
            self.position.x.checked_add(x)?,
            self.position.y.checked_add(y)?,
            self.position.z.checked_add(z)?,
        ))
    }

    /// Reads a block by local coordinate.
    ///
    /// Coordinates outside the chunk are forwarded to the manager at
    /// `position + local`.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        if Self::contains_local(x, y, z) {
            return self.container.get_block(x, y, z);
        }

        match self.manager.upgrade() {
            Some(manager) => match self.to_world(x, y, z) {
                Some(world) => manager.get_block(world),
                // Past the representable range: above the ceiling is sky, anything else is the wall
                None if i64::from(self.position.y) + i64::from(y)
                    >= i64::from(manager.world_extent().y) =>
                {
                    Block::Air
                }
                None => manager.boundary_block(),
            },
            None => Block::Air,
        }
    }

    /// Writes a block by local coordinate.
    ///
    /// In-bounds writes mark the chunk modified (and its neighbor too when the
    /// cell is on the chunk's outer layer). Out-of-bounds writes are forwarded to
    /// the manager.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] if the target is outside the world, or
    /// if the manager no longer exists for a forwarded write.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<()> {
        let manager = self.manager.upgrade();

        if !Self::contains_local(x, y, z) {
            let Some(world) = self.to_world(x, y, z) else {
                return Err(VoxelError::OutOfBounds {
                    position: Point3::new(x, y, z),
                });
            };
            return match manager {
                Some(manager) => manager.set_block(world, block),
                None => Err(VoxelError::OutOfBounds { position: world }),
            };
        }

        self.container.set_block(x, y, z, block)?;
        self.set_modified(true);
        if let Some(manager) = manager {
            manager.invalidate_neighbors(self.coord, Point3::new(x, y, z));
        }
        Ok(())
    }

    /// Replaces the whole chunk and marks it modified.
    ///
    /// # Errors
    /// Returns [`VoxelError::SizeMismatch`] unless `blocks` has [`CHUNK_VOLUME`] entries.
    pub fn set_blocks(&self, blocks: Vec<Block>) -> Result<()> {
        self.container.set_blocks(blocks)?;
        self.set_modified(true);
        Ok(())
    }

    /// Resets the chunk to air and marks it modified.
    pub fn clear(&self) {
        trace!("Clearing chunk {:?}", self.coord);
        self.container.clear();
        self.set_modified(true);
    }

    /// Builds a per-face mesh of this chunk, reading neighbors through the manager.
    pub fn quick_mesh(&self, mesh_type: MeshType) -> Result<MeshData> {
        quick_mesh(self, mesh_type)
    }

    /// Builds a greedy mesh of this chunk, reading neighbors through the manager.
    pub fn greedy_mesh(&self, mesh_type: MeshType) -> Result<MeshData> {
        greedy_mesh(self, mesh_type)
    }
}

impl BlockVolume for Chunk {
    fn size(&self) -> Vector3<i32> {
        self.container.size()
    }

    fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        Chunk::get_block(self, x, y, z)
    }

    fn render_key(&self) -> Option<RenderKey> {
        BlockVolume::render_key(&self.container)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::WorldConfig, engine_state::voxels::block::Color};

    fn manager() -> Arc<ChunkManager> {
        ChunkManager::new(&WorldConfig {
            size_in_chunks: [2, 2, 2],
            border_chunks: 0,
            ..WorldConfig::default()
        })
    }

    fn green() -> Block {
        Block::solid(Color::rgb(0, 255, 0))
    }

    #[test]
    fn chunk_reports_origin_and_key() {
        let manager = manager();
        let chunk = manager.chunk_at(Point3::new(1, 0, 1)).unwrap();
        assert_eq!(chunk.position(), Point3::new(32, 0, 32));
        assert_eq!(
            BlockVolume::render_key(chunk),
            Some(RenderKey(chunk.index() as u32))
        );
        assert_eq!(BlockVolume::size(chunk), Vector3::new(32, 32, 32));
    }

    #[test]
    fn reads_outside_local_bounds_forward_to_manager() {
        let manager = manager();
        manager.set_block(Point3::new(33, 0, 0), green()).unwrap();

        let chunk = manager.chunk_at(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(chunk.get_block(33, 0, 0), green());
        assert_eq!(
            chunk.get_block(33, 0, 0),
            manager.get_block(chunk.position() + Vector3::new(33, 0, 0))
        );
        // Below the world floor the manager answers with its boundary block
        assert_eq!(chunk.get_block(0, -1, 0), manager.boundary_block());
    }

    #[test]
    fn far_local_coordinates_fall_back_instead_of_overflowing() {
        let manager = ChunkManager::new(&WorldConfig {
            size_in_chunks: [2, 1, 1],
            border_chunks: 0,
            ..WorldConfig::default()
        });
        let chunk = manager.chunk_at(Point3::new(1, 0, 0)).unwrap();

        assert_eq!(chunk.get_block(i32::MAX, 0, 0), manager.boundary_block());
        assert_eq!(chunk.get_block(i32::MIN, 0, 0), manager.boundary_block());
        assert_eq!(chunk.get_block(0, i32::MAX, 0), Block::Air);
        assert!(matches!(
            chunk.set_block(i32::MAX, 0, 0, Block::Air),
            Err(VoxelError::OutOfBounds { .. })
        ));
        assert!(matches!(
            chunk.set_block(0, 0, i32::MAX, green()),
            Err(VoxelError::OutOfBounds { .. })
        ));
        assert!(!chunk.is_modified());
    }

    #[test]
    fn in_bounds_write_marks_modified() {
        let manager = manager();
        let chunk = manager.chunk_at(Point3::new(0, 1, 0)).unwrap();
        assert!(!chunk.is_modified());

        chunk.set_block(5, 5, 5, green()).unwrap();
        assert!(chunk.is_modified());
        assert!(chunk.take_modified());
        assert!(!chunk.take_modified());
        assert_eq!(manager.get_block(Point3::new(5, 37, 5)), green());
    }

    #[test]
    fn out_of_bounds_write_lands_in_neighbor() {
        let manager = manager();
        let chunk = manager.chunk_at(Point3::new(0, 0, 0)).unwrap();
        let neighbor = manager.chunk_at(Point3::new(1, 0, 0)).unwrap();

        chunk.set_block(32, 1, 1, green()).unwrap();
        // The write sits on the neighbor's boundary layer, so both chunks are dirty
        assert!(chunk.is_modified());
        assert!(neighbor.is_modified());
        assert_eq!(neighbor.get_block(0, 1, 1), green());

        assert!(matches!(
            chunk.set_block(0, 0, 200, green()),
            Err(VoxelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn set_blocks_requires_full_chunk() {
        let manager = manager();
        let chunk = manager.chunk(0).unwrap();
        assert!(matches!(
            chunk.set_blocks(vec![green(); 10]),
            Err(VoxelError::SizeMismatch { .. })
        ));
        chunk.set_blocks(vec![green(); CHUNK_VOLUME]).unwrap();
        assert!(chunk.is_modified());
        assert_eq!(chunk.container().solid_count(), CHUNK_VOLUME);
    }
}
