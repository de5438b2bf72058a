//! # World Context Module
//!
//! A transient block buffer used while a world is generated or loaded, before
//! the chunks that will hold it exist or while they are busy meshing.
//!
//! The buffer is laid out in the same chunk grid as the [`ChunkManager`]: one
//! optional `Vec<Block>` per chunk index, each allocated on its first non-air
//! write. Once loading is done the whole context is handed to
//! [`ChunkManager::install_world`].
//!
//! [`ChunkManager`]: super::chunk_manager::ChunkManager
//! [`ChunkManager::install_world`]: super::chunk_manager::ChunkManager::install_world

use std::sync::{PoisonError, RwLock};

use cgmath::{Point3, Vector3};

use crate::{
    config::WorldConfig,
    error::{Result, VoxelError},
};

use super::{
    block::Block,
    chunk::{chunk_coords, CHUNK_VOLUME},
};

/// Per-chunk block buffers for a world that is still being built.
pub struct WorldContext {
    /// Chunk grid dimensions
    dimensions: Vector3<i32>,
    /// One buffer slot per chunk index, `None` until first written
    chunks: RwLock<Vec<Option<Vec<Block>>>>,
}

impl WorldContext {
    /// Creates an empty context sized to a world's padded chunk grid.
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_dimensions(config.padded_dimensions())
    }

    /// Creates an empty context for an explicit chunk grid.
    pub fn with_dimensions(dimensions: Vector3<i32>) -> Self {
        let dimensions = Vector3::new(dimensions.x.max(0), dimensions.y.max(0), dimensions.z.max(0));
        let count = (dimensions.x as usize) * (dimensions.y as usize) * (dimensions.z as usize);
        WorldContext {
            dimensions,
            chunks: RwLock::new(vec![None; count]),
        }
    }

    /// Chunk grid dimensions.
    pub fn dimensions(&self) -> Vector3<i32> {
        self.dimensions
    }

    /// Number of chunk slots.
    pub fn chunk_count(&self) -> usize {
        self.chunks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Flattened index of a chunk coordinate.
    pub fn chunk_index(&self, coord: Point3<i32>) -> Option<usize> {
        chunk_coords::chunk_index(coord, self.dimensions)
    }

    /// Writes a block at a world position.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] if the position lies outside the grid.
    pub fn set_block(&self, position: Point3<i32>, block: Block) -> Result<()> {
        let (coord, local) = chunk_coords::split_world_position(position, self.dimensions)
            .ok_or(VoxelError::OutOfBounds { position })?;
        let index = self
            .chunk_index(coord)
            .ok_or(VoxelError::ChunkOutOfRange { coord })?;

        let mut chunks = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        let offset = chunk_coords::local_index(local);
        if let Some(blocks) = chunks[index].as_mut() {
            blocks[offset] = block;
            return Ok(());
        }

        if !block.is_air() {
            let mut blocks = vec![Block::Air; CHUNK_VOLUME];
            blocks[offset] = block;
            chunks[index] = Some(blocks);
        }
        Ok(())
    }

    /// Reads a block at a world position, Air outside the grid or in untouched chunks.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        let Some((coord, local)) = chunk_coords::split_world_position(position, self.dimensions)
        else {
            return Block::Air;
        };
        let Some(index) = self.chunk_index(coord) else {
            return Block::Air;
        };

        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        match &chunks[index] {
            Some(blocks) => blocks[chunk_coords::local_index(local)],
            None => Block::Air,
        }
    }

    /// Copies out the blocks of one chunk.
    ///
    /// A chunk that was never written returns a fresh all-air buffer, so callers
    /// always get exactly [`CHUNK_VOLUME`] blocks.
    ///
    /// # Errors
    /// Returns [`VoxelError::ChunkOutOfRange`] if the coordinate is outside the grid.
    pub fn get_blocks(&self, coord: Point3<i32>) -> Result<Vec<Block>> {
        let index = self
            .chunk_index(coord)
            .ok_or(VoxelError::ChunkOutOfRange { coord })?;
        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(chunks[index]
            .clone()
            .unwrap_or_else(|| vec![Block::Air; CHUNK_VOLUME]))
    }

    /// Whether any non-air block was ever written into the chunk.
    pub fn is_chunk_touched(&self, coord: Point3<i32>) -> bool {
        let Some(index) = self.chunk_index(coord) else {
            return false;
        };
        self.chunks.read().unwrap_or_else(PoisonError::into_inner)[index].is_some()
    }

    /// Number of chunks holding an allocated buffer.
    pub fn touched_chunk_count(&self) -> usize {
        self.chunks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Drops every buffer.
    pub fn clear(&self) {
        let mut chunks = self.chunks.write().unwrap_or_else(PoisonError::into_inner);
        chunks.iter_mut().for_each(|slot| *slot = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::Color;

    fn context() -> WorldContext {
        WorldContext::with_dimensions(Vector3::new(2, 1, 2))
    }

    #[test]
    fn untouched_chunks_read_as_full_air_buffers() {
        let context = context();
        let blocks = context.get_blocks(Point3::new(1, 0, 1)).unwrap();
        assert_eq!(blocks.len(), CHUNK_VOLUME);
        assert!(blocks.iter().all(Block::is_air));
        assert!(!context.is_chunk_touched(Point3::new(1, 0, 1)));
    }

    #[test]
    fn writes_allocate_only_the_touched_chunk() {
        let context = context();
        let block = Block::solid(Color::rgb(1, 2, 3));

        context.set_block(Point3::new(40, 3, 2), Block::Air).unwrap();
        assert_eq!(context.touched_chunk_count(), 0);

        context.set_block(Point3::new(40, 3, 2), block).unwrap();
        assert_eq!(context.touched_chunk_count(), 1);
        assert!(context.is_chunk_touched(Point3::new(1, 0, 0)));
        assert_eq!(context.get_block(Point3::new(40, 3, 2)), block);

        let blocks = context.get_blocks(Point3::new(1, 0, 0)).unwrap();
        assert_eq!(blocks[chunk_coords::local_index(Point3::new(8, 3, 2))], block);
    }

    #[test]
    fn rejects_positions_outside_the_grid() {
        let context = context();
        assert!(matches!(
            context.set_block(Point3::new(0, 32, 0), Block::sprite(1)),
            Err(VoxelError::OutOfBounds { .. })
        ));
        assert!(matches!(
            context.get_blocks(Point3::new(2, 0, 0)),
            Err(VoxelError::ChunkOutOfRange { .. })
        ));
        assert_eq!(context.get_block(Point3::new(-1, 0, 0)), Block::Air);
    }

    #[test]
    fn clear_drops_all_buffers() {
        let context = context();
        context.set_block(Point3::new(0, 0, 0), Block::sprite(2)).unwrap();
        context.set_block(Point3::new(63, 31, 63), Block::sprite(2)).unwrap();
        assert_eq!(context.touched_chunk_count(), 2);
        context.clear();
        assert_eq!(context.touched_chunk_count(), 0);
        assert_eq!(context.chunk_count(), 4);
    }
}
