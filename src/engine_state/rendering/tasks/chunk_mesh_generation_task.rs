//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which greedily meshes one
//! chunk on a worker and, once back on the thread draining completed tasks,
//! forwards the finished `MeshData` to the renderer.

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    engine_state::{
        rendering::{meshing::MeshData, MeshRenderer, MeshType},
        task_management::task::{Task, TaskResult},
        voxels::chunk_manager::ChunkManager,
    },
    error::{Result, VoxelError},
};

/// A task that generates the mesh of a chunk in a background thread.
///
/// The task holds the manager rather than the chunk itself, since chunks are
/// owned by the manager's array and addressed by index.
pub struct ChunkMeshGenerationTask {
    /// The manager owning the chunk
    chunk_manager: Arc<ChunkManager>,
    /// Slot of the chunk in the manager's array
    chunk_index: usize,
    /// Which merge rules to mesh with
    mesh_type: MeshType,
    /// Where the finished mesh is delivered
    renderer: Arc<dyn MeshRenderer>,
}

impl ChunkMeshGenerationTask {
    /// Creates a new chunk mesh generation task.
    ///
    /// # Arguments
    /// * `chunk_manager` - The manager owning the chunk
    /// * `chunk_index` - Slot of the chunk to mesh
    /// * `mesh_type` - Which merge rules to use
    /// * `renderer` - Receives the mesh once the task completes
    pub fn new(
        chunk_manager: Arc<ChunkManager>,
        chunk_index: usize,
        mesh_type: MeshType,
        renderer: Arc<dyn MeshRenderer>,
    ) -> Self {
        ChunkMeshGenerationTask {
            chunk_manager,
            chunk_index,
            mesh_type,
            renderer,
        }
    }

    fn generate(&self) -> Result<MeshData> {
        let chunk = self
            .chunk_manager
            .chunk(self.chunk_index)
            .ok_or(VoxelError::UnknownChunk(self.chunk_index))?;
        chunk.greedy_mesh(self.mesh_type)
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Runs the greedy mesher over the chunk.
    ///
    /// Errors are carried back in the result. No partial mesh is ever delivered.
    fn process(&self) -> Box<dyn TaskResult> {
        Box::new(ChunkMeshGenerationTaskResult {
            chunk_index: self.chunk_index,
            mesh: self.generate(),
            renderer: self.renderer.clone(),
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    chunk_index: usize,
    mesh: Result<MeshData>,
    renderer: Arc<dyn MeshRenderer>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Delivers the mesh to the renderer, or logs and drops a failed build.
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task>> {
        match self.mesh {
            Ok(mesh) => {
                debug!(
                    "Delivering mesh for chunk {} ({} quads)",
                    self.chunk_index,
                    mesh.quad_count()
                );
                self.renderer.render_mesh(mesh);
            }
            Err(error) => warn!("Dropping mesh for chunk {}: {}", self.chunk_index, error),
        }
        Vec::new()
    }
}
