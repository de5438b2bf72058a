//! # Chunk Manager Module
//!
//! The `ChunkManager` owns every chunk of the world and is the single
//! authoritative API for reading and writing blocks by world position.
//!
//! ## Layout
//!
//! The chunk array is sized once from the padded chunk grid (the playable area
//! plus `border_chunks` on each horizontal side) and its slots are never
//! reassigned. Because the array itself never changes, iterating it needs no
//! lock; only the voxel contents of each chunk are locked, per call.
//!
//! ## World Edge
//!
//! Reads past the top of the world return air so the sky stays open. Every other
//! read outside the grid returns the opaque boundary block, which makes the
//! meshers treat the world edge as a wall and skip the outward faces there.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{info, trace, warn};

use crate::{
    config::WorldConfig,
    engine_state::{
        rendering::mesh_generator::MeshGenerator,
        task_management::TaskScheduler,
    },
    error::{Result, VoxelError},
};

use super::{
    block::{Block, BlockSide},
    chunk::{chunk_coords, Chunk, CHUNK_SIZE},
    world_context::WorldContext,
};

/// Owns the fixed grid of chunks making up the world.
pub struct ChunkManager {
    /// Padded chunk grid dimensions
    dimensions: Vector3<i32>,
    /// World size in blocks
    extent: Vector3<i32>,
    /// One chunk per grid slot, in chunk index order
    chunks: Vec<Chunk>,
    /// Returned for reads past the sides and bottom of the world
    boundary_block: Block,
}

impl ChunkManager {
    /// Creates the manager and every chunk of the padded grid.
    ///
    /// Each chunk receives a weak handle to the manager, so the returned `Arc`
    /// is the only thing keeping the world alive. The configuration is expected
    /// to have passed [`WorldConfig::validate`].
    pub fn new(config: &WorldConfig) -> Arc<Self> {
        let dimensions = config.padded_dimensions();
        let count = config.chunk_count();

        let manager = Arc::new_cyclic(|manager| {
            let chunks = (0..count)
                .map(|index| {
                    let coord = chunk_coords::chunk_coord_of_index(index, dimensions);
                    Chunk::new(manager.clone(), index, coord)
                })
                .collect();

            ChunkManager {
                dimensions,
                extent: chunk_coords::world_extent(dimensions),
                chunks,
                boundary_block: Block::solid(config.boundary_color),
            }
        });

        info!(
            "Created chunk manager with {} chunks ({:?} grid, {:?} blocks)",
            manager.chunks.len(),
            manager.dimensions,
            manager.extent
        );
        manager
    }

    /// Padded chunk grid dimensions.
    pub fn dimensions(&self) -> Vector3<i32> {
        self.dimensions
    }

    /// World size in blocks.
    pub fn world_extent(&self) -> Vector3<i32> {
        self.extent
    }

    /// The opaque block standing in for everything past the world edge.
    pub fn boundary_block(&self) -> Block {
        self.boundary_block
    }

    /// All chunks, in chunk index order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The chunk stored in a slot.
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// The chunk at a chunk grid coordinate.
    pub fn chunk_at(&self, coord: Point3<i32>) -> Option<&Chunk> {
        self.chunk_index(coord).and_then(|index| self.chunks.get(index))
    }

    /// Flattened index of a chunk grid coordinate.
    pub fn chunk_index(&self, coord: Point3<i32>) -> Option<usize> {
        chunk_coords::chunk_index(coord, self.dimensions)
    }

    /// Splits a world position into `(chunk coordinate, local coordinate)`.
    pub fn world_to_chunk(&self, position: Point3<i32>) -> Option<(Point3<i32>, Point3<i32>)> {
        chunk_coords::split_world_position(position, self.dimensions)
    }

    /// World position of a local coordinate inside a chunk.
    pub fn chunk_to_world(&self, coord: Point3<i32>, local: Point3<i32>) -> Point3<i32> {
        chunk_coords::chunk_origin(coord) + Vector3::new(local.x, local.y, local.z)
    }

    /// Reads the block at a world position.
    ///
    /// Positions at or above the world ceiling are air. Any other position
    /// outside the world is the boundary block.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        match self.locate(position) {
            Some((chunk, local)) => chunk.container().get(local),
            None if position.y >= self.extent.y => Block::Air,
            None => self.boundary_block,
        }
    }

    /// Writes the block at a world position and marks the owning chunk dirty.
    ///
    /// Writes on the outer layer of a chunk also mark the chunk across that face
    /// dirty, since its visible faces depend on this cell.
    ///
    /// # Errors
    /// Returns [`VoxelError::OutOfBounds`] if the position lies outside the world.
    pub fn set_block(&self, position: Point3<i32>, block: Block) -> Result<()> {
        let Some((chunk, local)) = self.locate(position) else {
            warn!("Rejected block write outside the world at {:?}", position);
            return Err(VoxelError::OutOfBounds { position });
        };

        chunk.container().set(local, block)?;
        chunk.set_modified(true);
        self.invalidate_neighbors(chunk.coord(), local);
        Ok(())
    }

    fn locate(&self, position: Point3<i32>) -> Option<(&Chunk, Point3<i32>)> {
        let (coord, local) = self.world_to_chunk(position)?;
        Some((self.chunk_at(coord)?, local))
    }

    /// Marks dirty every neighbor whose faces touch the cell at `local` in chunk `coord`.
    pub(crate) fn invalidate_neighbors(&self, coord: Point3<i32>, local: Point3<i32>) {
        for side in BlockSide::all() {
            let axis = side.axis();
            let edge = if side.is_negative() { 0 } else { CHUNK_SIZE - 1 };
            if local[axis] != edge {
                continue;
            }
            if let Some(neighbor) = self.chunk_at(coord + side.offset()) {
                trace!("Invalidating chunk {:?} across {:?}", neighbor.coord(), side);
                neighbor.set_modified(true);
            }
        }
    }

    /// Number of chunks waiting for a re-mesh.
    pub fn dirty_chunk_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.is_modified()).count()
    }

    /// Marks every chunk dirty.
    pub fn mark_all_modified(&self) {
        self.chunks.iter().for_each(|chunk| chunk.set_modified(true));
    }

    /// Schedules a re-mesh for every dirty chunk and clears its flag.
    ///
    /// Meant to be called once per tick. A chunk is scheduled at most once per
    /// call no matter how many writes it received.
    ///
    /// # Returns
    /// The number of chunks scheduled.
    pub fn update(
        self: &Arc<Self>,
        generator: &MeshGenerator,
        scheduler: &mut dyn TaskScheduler,
    ) -> usize {
        let mut scheduled = 0;
        for chunk in &self.chunks {
            if !chunk.take_modified() {
                continue;
            }
            trace!("Scheduling re-mesh of chunk {:?}", chunk.coord());
            generator.schedule(Arc::clone(self), chunk.index(), scheduler);
            scheduled += 1;
        }
        scheduled
    }

    /// Copies a fully loaded world into the chunks and marks every chunk dirty.
    ///
    /// # Errors
    /// Returns [`VoxelError::SizeMismatch`] if the context was built for a
    /// different chunk grid.
    pub fn install_world(&self, context: &WorldContext) -> Result<()> {
        if context.dimensions() != self.dimensions {
            return Err(VoxelError::SizeMismatch {
                expected: self.chunks.len(),
                actual: context.chunk_count(),
            });
        }

        for chunk in &self.chunks {
            chunk.container().set_blocks(context.get_blocks(chunk.coord())?)?;
        }
        self.mark_all_modified();

        info!(
            "Installed world with {} populated chunks out of {}",
            context.touched_chunk_count(),
            self.chunks.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::engine_state::{
        rendering::{meshing::MeshData, MeshRenderer, MeshType, RenderKey},
        task_management::InlineTaskRunner,
        voxels::block::Color,
    };

    fn config() -> WorldConfig {
        WorldConfig {
            size_in_chunks: [2, 2, 2],
            border_chunks: 1,
            boundary_color: Color::BLACK,
        }
    }

    #[derive(Default)]
    struct CollectingRenderer {
        meshes: Mutex<Vec<MeshData>>,
    }

    impl MeshRenderer for CollectingRenderer {
        fn render_mesh(&self, mesh: MeshData) {
            self.meshes.lock().unwrap().push(mesh);
        }
    }

    #[test]
    fn grid_includes_border_padding() {
        let manager = ChunkManager::new(&config());
        assert_eq!(manager.dimensions(), Vector3::new(4, 2, 4));
        assert_eq!(manager.chunks().len(), 32);
        assert_eq!(manager.world_extent(), Vector3::new(128, 64, 128));
        for (index, chunk) in manager.chunks().iter().enumerate() {
            assert_eq!(chunk.index(), index);
            assert_eq!(manager.chunk_index(chunk.coord()), Some(index));
        }
    }

    #[test]
    fn world_edge_fallbacks() {
        let manager = ChunkManager::new(&config());
        let wall = Block::solid(Color::BLACK);
        assert_eq!(manager.get_block(Point3::new(10, 64, 10)), Block::Air);
        assert_eq!(manager.get_block(Point3::new(10, 500, -3)), Block::Air);
        assert_eq!(manager.get_block(Point3::new(-1, 10, 10)), wall);
        assert_eq!(manager.get_block(Point3::new(10, -1, 10)), wall);
        assert_eq!(manager.get_block(Point3::new(10, 10, 128)), wall);
        assert_eq!(manager.get_block(Point3::new(10, 10, 10)), Block::Air);
    }

    #[test]
    fn coordinate_mapping_round_trips() {
        let manager = ChunkManager::new(&config());
        let position = Point3::new(70, 40, 100);
        let (coord, local) = manager.world_to_chunk(position).unwrap();
        assert_eq!(coord, Point3::new(2, 1, 3));
        assert_eq!(local, Point3::new(6, 8, 4));
        assert_eq!(manager.chunk_to_world(coord, local), position);
    }

    #[test]
    fn writes_mark_chunks_and_boundary_neighbors() {
        let manager = ChunkManager::new(&config());
        let block = Block::solid(Color::rgb(9, 9, 9));

        manager.set_block(Point3::new(40, 5, 40), block).unwrap();
        assert_eq!(manager.dirty_chunk_count(), 1);
        assert_eq!(manager.get_block(Point3::new(40, 5, 40)), block);

        manager.chunks().iter().for_each(|chunk| chunk.set_modified(false));
        // Corner cell of chunk (1, 0, 1) touches the -X, -Y and -Z neighbors; -Y is outside the grid
        manager.set_block(Point3::new(32, 0, 32), block).unwrap();
        assert_eq!(manager.dirty_chunk_count(), 3);
        assert!(manager.chunk_at(Point3::new(0, 0, 1)).unwrap().is_modified());
        assert!(manager.chunk_at(Point3::new(1, 0, 0)).unwrap().is_modified());

        assert!(matches!(
            manager.set_block(Point3::new(0, -1, 0), block),
            Err(VoxelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn install_world_copies_and_marks_dirty() {
        let manager = ChunkManager::new(&config());
        let context = WorldContext::new(&config());
        let block = Block::sprite(4);
        context.set_block(Point3::new(100, 50, 3), block).unwrap();

        manager.install_world(&context).unwrap();
        assert_eq!(manager.get_block(Point3::new(100, 50, 3)), block);
        assert_eq!(manager.dirty_chunk_count(), manager.chunks().len());

        let wrong = WorldContext::with_dimensions(Vector3::new(1, 1, 1));
        assert!(matches!(
            manager.install_world(&wrong),
            Err(VoxelError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn update_schedules_each_dirty_chunk_once() {
        let manager = ChunkManager::new(&config());
        let renderer = Arc::new(CollectingRenderer::default());
        let generator = MeshGenerator::new(renderer.clone(), MeshType::Render);
        let mut runner = InlineTaskRunner::new();

        let block = Block::solid(Color::rgb(200, 10, 10));
        manager.set_block(Point3::new(40, 5, 40), block).unwrap();
        manager.set_block(Point3::new(41, 5, 40), block).unwrap();

        assert_eq!(manager.update(&generator, &mut runner), 1);
        assert_eq!(manager.dirty_chunk_count(), 0);
        assert_eq!(manager.update(&generator, &mut runner), 0);

        let meshes = renderer.meshes.lock().unwrap();
        assert_eq!(meshes.len(), 1);
        let index = manager.chunk_at(Point3::new(1, 0, 1)).unwrap().index();
        assert_eq!(meshes[0].render_key(), Some(RenderKey(index as u32)));
        // Two merged cells: four merged quads around the sides plus top and bottom
        assert_eq!(meshes[0].quad_count(), 6);
    }
}
