//! # Block Container Module
//!
//! A flat, lazily allocated 3D array of blocks and the [`BlockVolume`] trait the
//! meshers read through.
//!
//! ## Storage
//!
//! Cells are stored in a single `Vec<Block>` indexed as
//! `(size.y * size.x * z) + (size.x * y) + x`. Until the first non-air write the
//! vector does not exist at all and the whole container reads as air, which keeps
//! untouched chunks (most of the sky) free.
//!
//! ## Locking
//!
//! Each container owns one `RwLock` around its storage. Every `get_block` and
//! `set_block` takes the lock for that single call only, so a meshing pass made
//! of many reads can interleave with writers on other threads. Per-cell reads and
//! writes are atomic; a whole mesh is not a snapshot.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cgmath::{Point3, Vector3};

use crate::{
    engine_state::rendering::{
        meshing::{greedy_mesh, quick_mesh, MeshData},
        MeshType, RenderKey,
    },
    error::{Result, VoxelError},
};

use super::block::Block;

/// Read access to a bounded block volume, as seen by the meshers.
///
/// `get_block` must never fail: coordinates outside `[0, size)` return whatever
/// the volume considers to be "outside" (air for a bare container, the
/// neighboring chunk's block for a chunk). This is what lets the meshers probe
/// one cell past any boundary without special cases.
pub trait BlockVolume: Send + Sync {
    /// Extents of the volume along X, Y and Z.
    fn size(&self) -> Vector3<i32>;

    /// Reads the block at the given local coordinate.
    fn get_block(&self, x: i32, y: i32, z: i32) -> Block;

    /// Identifier correlating meshes of this volume with external render components.
    fn render_key(&self) -> Option<RenderKey>;

    /// Reads the block at a local position.
    fn block_at(&self, position: Point3<i32>) -> Block {
        self.get_block(position.x, position.y, position.z)
    }

    /// Whether a local coordinate is inside `[0, size)` on every axis.
    fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        let size = self.size();
        (0..size.x).contains(&x) && (0..size.y).contains(&y) && (0..size.z).contains(&z)
    }
}

/// A flat 3D voxel store with lazy allocation and a per-container lock.
pub struct BlockContainer {
    /// Extents along X, Y and Z
    size: Vector3<i32>,
    /// Backing cells, `None` while the container is entirely air
    blocks: RwLock<Option<Vec<Block>>>,
    /// Correlates generated meshes with external render components
    render_key: Option<RenderKey>,
}

impl BlockContainer {
    /// Creates an all-air container of the given size.
    ///
    /// Negative extents are clamped to zero.
    pub fn new(size: Vector3<i32>) -> Self {
        BlockContainer {
            size: Vector3::new(size.x.max(0), size.y.max(0), size.z.max(0)),
            blocks: RwLock::new(None),
            render_key: None,
        }
    }

    /// Creates an all-air container that can be meshed.
    pub fn with_render_key(size: Vector3<i32>, render_key: RenderKey) -> Self {
        let mut container = Self::new(size);
        container.render_key = Some(render_key);
        container
    }

    /// Assigns or replaces the render key.
    pub fn set_render_key(&mut self, render_key: Option<RenderKey>) {
        self.render_key = render_key;
    }

    /// Extents along X, Y and Z.
    pub fn size(&self) -> Vector3<i32> {
        self.size
    }

    /// Number of cells in the container.
    pub fn volume(&self) -> usize {
        (self.size.x as usize) * (self.size.y as usize) * (self.size.z as usize)
    }

    /// Extent along a single axis.
    ///
    /// # Errors
    /// Returns [`VoxelError::InvalidAxis`] if `axis` is not in `0..3`.
    pub fn axis_extent(&self, axis: usize) -> Result<i32> {
        match axis {
            0 => Ok(self.size.x),
            1 => Ok(self.size.y),
            2 => Ok(self.size.z),
            _ => Err(VoxelError::InvalidAxis(axis)),
        }
    }

    /// Whether a coordinate lies inside `[0, size)` on every axis.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        (0..self.size.x).contains(&x) && (0..self.size.y).contains(&y) && (0..self.size.z).contains(&z)
    }

    /// Flattened index of an in-bounds coordinate.
    pub fn index_of(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains(x, y, z) {
            return None;
        }
        let (sx, sy) = (self.size.x as usize, self.size.y as usize);
        Some(sy * sx * z as usize + sx * y as usize + x as usize)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Vec<Block>>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Vec<Block>>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a block.
    ///
    /// Returns [`Block::Air`] for coordinates outside the container and for
    /// containers that were never written to.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        let Some(index) = self.index_of(x, y, z) else {
            return Block::Air;
        };
        match self.read().as_ref() {
            Some(blocks) => blocks[index],
            None => Block::Air,
        }
    }

    /// Reads the block at a position.
    pub fn get(&self, position: Point3<i32>) -> Block {
        self.get_block(position.x, position.y, position.z)
    }

    /// Writes a block, allocating storage on the first non-air write.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] and leaves the container unchanged if
    /// the coordinate is outside `[0, size)`.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<()> {
        let index = self.index_of(x, y, z).ok_or(VoxelError::OutOfBounds {
            position: Point3::new(x, y, z),
        })?;

        let mut guard = self.write();
        if let Some(blocks) = guard.as_mut() {
            blocks[index] = block;
            return Ok(());
        }

        // Writing air into an unallocated container changes nothing
        if !block.is_air() {
            let mut blocks = vec![Block::Air; self.volume()];
            blocks[index] = block;
            *guard = Some(blocks);
        }
        Ok(())
    }

    /// Writes the block at a position.
    pub fn set(&self, position: Point3<i32>, block: Block) -> Result<()> {
        self.set_block(position.x, position.y, position.z, block)
    }

    /// Replaces every cell at once.
    ///
    /// An array that is entirely air releases the storage instead of keeping it.
    ///
    /// # Errors
    /// Returns [`VoxelError::SizeMismatch`] if `blocks.len()` is not the container volume.
    pub fn set_blocks(&self, blocks: Vec<Block>) -> Result<()> {
        if blocks.len() != self.volume() {
            return Err(VoxelError::SizeMismatch {
                expected: self.volume(),
                actual: blocks.len(),
            });
        }

        let replacement = if blocks.iter().all(Block::is_air) {
            None
        } else {
            Some(blocks)
        };
        *self.write() = replacement;
        Ok(())
    }

    /// Sets every cell to the same block.
    pub fn fill(&self, block: Block) {
        let replacement = if block.is_air() {
            None
        } else {
            Some(vec![block; self.volume()])
        };
        *self.write() = replacement;
    }

    /// Copies every cell out of the container.
    pub fn to_blocks(&self) -> Vec<Block> {
        match self.read().as_ref() {
            Some(blocks) => blocks.clone(),
            None => vec![Block::Air; self.volume()],
        }
    }

    /// Resets the container to all air by dropping its storage.
    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Whether backing storage currently exists.
    pub fn is_allocated(&self) -> bool {
        self.read().is_some()
    }

    /// Whether every cell is air.
    pub fn is_empty(&self) -> bool {
        match self.read().as_ref() {
            Some(blocks) => blocks.iter().all(Block::is_air),
            None => true,
        }
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        match self.read().as_ref() {
            Some(blocks) => blocks.iter().filter(|block| block.is_solid()).count(),
            None => 0,
        }
    }

    /// Builds a mesh with one quad per visible face.
    ///
    /// # Errors
    /// Returns [`VoxelError::MissingRenderKey`] if the container has no render key.
    pub fn quick_mesh(&self, mesh_type: MeshType) -> Result<MeshData> {
        quick_mesh(self, mesh_type)
    }

    /// Builds a mesh that merges coplanar faces into maximal rectangles.
    ///
    /// # Errors
    /// Returns [`VoxelError::MissingRenderKey`] if the container has no render key.
    pub fn greedy_mesh(&self, mesh_type: MeshType) -> Result<MeshData> {
        greedy_mesh(self, mesh_type)
    }
}

impl BlockVolume for BlockContainer {
    fn size(&self) -> Vector3<i32> {
        self.size
    }

    fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        BlockContainer::get_block(self, x, y, z)
    }

    fn render_key(&self) -> Option<RenderKey> {
        self.render_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::Color;

    fn red() -> Block {
        Block::solid(Color::rgb(255, 0, 0))
    }

    #[test]
    fn new_container_is_unallocated_air() {
        let container = BlockContainer::new(Vector3::new(4, 3, 2));
        assert_eq!(container.volume(), 24);
        assert!(!container.is_allocated());
        assert!(container.is_empty());
        assert_eq!(container.get_block(1, 1, 1), Block::Air);
    }

    #[test]
    fn index_layout_is_x_fastest() {
        let container = BlockContainer::new(Vector3::new(4, 3, 2));
        assert_eq!(container.index_of(0, 0, 0), Some(0));
        assert_eq!(container.index_of(1, 0, 0), Some(1));
        assert_eq!(container.index_of(0, 1, 0), Some(4));
        assert_eq!(container.index_of(0, 0, 1), Some(12));
        assert_eq!(container.index_of(3, 2, 1), Some(23));
        assert_eq!(container.index_of(4, 0, 0), None);
    }

    #[test]
    fn first_solid_write_allocates() {
        let container = BlockContainer::new(Vector3::new(2, 2, 2));
        container.set_block(0, 0, 0, Block::Air).unwrap();
        assert!(!container.is_allocated());

        container.set_block(1, 0, 1, red()).unwrap();
        assert!(container.is_allocated());
        assert_eq!(container.get_block(1, 0, 1), red());
        assert_eq!(container.get_block(0, 0, 0), Block::Air);
        assert_eq!(container.solid_count(), 1);
    }

    #[test]
    fn out_of_bounds_access_never_panics() {
        let container = BlockContainer::new(Vector3::new(2, 2, 2));
        container.fill(red());

        for (x, y, z) in [(-1, 0, 0), (2, 0, 0), (0, -1, 0), (0, 2, 0), (0, 0, -1), (0, 0, 2)] {
            assert_eq!(container.get_block(x, y, z), Block::Air);
            let before = container.to_blocks();
            assert!(matches!(
                container.set_block(x, y, z, Block::Air),
                Err(VoxelError::OutOfBounds { .. })
            ));
            assert_eq!(container.to_blocks(), before);
        }
    }

    #[test]
    fn set_blocks_checks_length() {
        let container = BlockContainer::new(Vector3::new(2, 2, 2));
        let result = container.set_blocks(vec![red(); 7]);
        assert!(matches!(
            result,
            Err(VoxelError::SizeMismatch { expected: 8, actual: 7 })
        ));

        container.set_blocks(vec![red(); 8]).unwrap();
        assert_eq!(container.solid_count(), 8);

        container.set_blocks(vec![Block::Air; 8]).unwrap();
        assert!(!container.is_allocated());
    }

    #[test]
    fn clear_resets_to_air() {
        let container = BlockContainer::new(Vector3::new(3, 3, 3));
        container.set_block(2, 2, 2, red()).unwrap();
        container.clear();
        assert!(!container.is_allocated());
        assert_eq!(container.get_block(2, 2, 2), Block::Air);
        assert_eq!(container.size(), Vector3::new(3, 3, 3));
    }

    #[test]
    fn axis_extent_rejects_bad_axis() {
        let container = BlockContainer::new(Vector3::new(5, 6, 7));
        assert_eq!(container.axis_extent(1).unwrap(), 6);
        assert!(matches!(container.axis_extent(3), Err(VoxelError::InvalidAxis(3))));
    }

    #[test]
    fn meshing_requires_render_key() {
        let container = BlockContainer::new(Vector3::new(1, 1, 1));
        container.fill(red());
        assert!(matches!(
            container.greedy_mesh(MeshType::Render),
            Err(VoxelError::MissingRenderKey)
        ));
        assert!(matches!(
            container.quick_mesh(MeshType::Collision),
            Err(VoxelError::MissingRenderKey)
        ));
    }
}
