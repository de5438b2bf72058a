//! # Engine State Module
//!
//! The per-tick coordinator of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the worker pool and the mesh generator
//! * `rendering` - Meshers, mesh data and the mesh generation task
//! * `task_management` - Worker threads and the task traits
//! * `voxels` - Blocks, containers, chunks and world loading
//!
//! ## Architecture
//!
//! Collaborators are passed in at construction: the render collaborator goes to
//! the `MeshGenerator`, the configuration sizes the `ChunkManager` and the
//! worker pool. Nothing is looked up through global state.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info};

use crate::{config::EngineConfig, error::Result};

use rendering::{MeshGenerator, MeshRenderer};
use task_management::TaskManager;
use voxels::{block::Block, chunk_manager::ChunkManager, world_context::WorldContext};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```ignore
/// let mut engine = EngineState::new(&EngineConfig::default(), renderer)?;
/// engine.load_world(&context)?;
///
/// // Main loop
/// loop {
///     engine.tick();
/// }
/// ```
pub struct EngineState {
    /// The voxel world
    chunk_manager: Arc<ChunkManager>,
    /// Worker pool running mesh generation
    task_manager: TaskManager,
    /// Schedules re-meshes and routes finished meshes to the renderer
    mesh_generator: MeshGenerator,
}

impl EngineState {
    /// Creates the world and starts the worker pool.
    ///
    /// # Errors
    /// Returns [`crate::VoxelError::InvalidConfig`] for a world too large to
    /// address, and [`crate::VoxelError::WorkerSpawn`] if the worker threads
    /// cannot be started.
    pub fn new(config: &EngineConfig, renderer: Arc<dyn MeshRenderer>) -> Result<Self> {
        config.world.validate()?;
        let chunk_manager = ChunkManager::new(&config.world);
        let task_manager = TaskManager::new(config.worker_count())?;
        let mesh_generator = MeshGenerator::new(renderer, config.mesh_type);

        info!(
            "Engine ready: {} chunks, {} workers, {:?} meshes",
            chunk_manager.chunks().len(),
            task_manager.worker_count(),
            config.mesh_type
        );

        Ok(EngineState {
            chunk_manager,
            task_manager,
            mesh_generator,
        })
    }

    pub fn chunk_manager(&self) -> &Arc<ChunkManager> {
        &self.chunk_manager
    }

    /// Installs a fully loaded world; every chunk is re-meshed on the next tick.
    pub fn load_world(&mut self, context: &WorldContext) -> Result<()> {
        self.chunk_manager.install_world(context)
    }

    /// Writes a block by world position.
    pub fn set_block(&self, position: Point3<i32>, block: Block) -> Result<()> {
        self.chunk_manager.set_block(position, block)
    }

    /// Reads a block by world position.
    pub fn get_block(&self, position: Point3<i32>) -> Block {
        self.chunk_manager.get_block(position)
    }

    /// Runs one engine tick.
    ///
    /// Delivers finished meshes, schedules re-meshes of chunks that changed since
    /// the last tick, and feeds queued work to idle workers.
    pub fn tick(&mut self) {
        let delivered = self.task_manager.process_completed_tasks();
        let scheduled = self
            .chunk_manager
            .update(&self.mesh_generator, &mut self.task_manager);
        self.task_manager.process_queued_tasks();

        if delivered > 0 || scheduled > 0 {
            debug!(
                "Tick: {} meshes delivered, {} chunks scheduled, {} tasks pending",
                delivered,
                scheduled,
                self.task_manager.pending_tasks()
            );
        }
    }

    /// Mesh tasks queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.task_manager.pending_tasks()
    }

    /// Whether every change so far has been meshed and delivered.
    pub fn is_idle(&self) -> bool {
        self.pending_tasks() == 0 && self.chunk_manager.dirty_chunk_count() == 0
    }
}
