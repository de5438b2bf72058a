//! Scheduling of chunk meshing.
//!
//! The `MeshGenerator` wraps the greedy mesher as a unit of background work and
//! routes every finished mesh to the render collaborator it was built with.

use std::sync::Arc;

use crate::{
    engine_state::{
        task_management::TaskScheduler,
        voxels::{block_container::BlockVolume, chunk_manager::ChunkManager},
    },
    error::Result,
};

use super::{
    meshing::greedy_mesh, tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
    MeshRenderer, MeshType,
};

/// Turns dirty chunks into meshes for a renderer.
pub struct MeshGenerator {
    renderer: Arc<dyn MeshRenderer>,
    mesh_type: MeshType,
}

impl MeshGenerator {
    /// Creates a generator delivering `mesh_type` meshes to `renderer`.
    pub fn new(renderer: Arc<dyn MeshRenderer>, mesh_type: MeshType) -> Self {
        MeshGenerator {
            renderer,
            mesh_type,
        }
    }

    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    pub fn renderer(&self) -> &Arc<dyn MeshRenderer> {
        &self.renderer
    }

    /// Submits a background re-mesh of one chunk.
    ///
    /// The mesh reaches the renderer when the scheduler handles the completed
    /// task. A failed build is logged and never delivered.
    ///
    /// # Returns
    /// `true` if the task started right away, `false` if it was queued.
    pub fn schedule(
        &self,
        chunk_manager: Arc<ChunkManager>,
        chunk_index: usize,
        scheduler: &mut dyn TaskScheduler,
    ) -> bool {
        scheduler.publish_task(Box::new(ChunkMeshGenerationTask::new(
            chunk_manager,
            chunk_index,
            self.mesh_type,
            Arc::clone(&self.renderer),
        )))
    }

    /// Meshes a volume on the calling thread and delivers the result.
    ///
    /// # Errors
    /// Returns [`crate::VoxelError::MissingRenderKey`] if the volume has no
    /// render key; nothing is delivered in that case.
    pub fn generate_now<V: BlockVolume + ?Sized>(&self, volume: &V) -> Result<()> {
        let mesh = greedy_mesh(volume, self.mesh_type)?;
        self.renderer.render_mesh(mesh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cgmath::{Point3, Vector3};

    use super::*;
    use crate::{
        config::WorldConfig,
        engine_state::{
            rendering::{meshing::MeshData, RenderKey},
            task_management::InlineTaskRunner,
            voxels::{
                block::{Block, Color},
                block_container::BlockContainer,
            },
        },
        error::VoxelError,
    };

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
    fn scheduled_chunk_mesh_reaches_renderer() {
        let manager = ChunkManager::new(&WorldConfig {
            size_in_chunks: [1, 1, 1],
            border_chunks: 0,
            ..WorldConfig::default()
        });
        manager
            .set_block(Point3::new(3, 3, 3), Block::solid(Color::WHITE))
            .unwrap();

        let renderer = Arc::new(CollectingRenderer::default());
        let generator = MeshGenerator::new(renderer.clone(), MeshType::Collision);
        let mut runner = InlineTaskRunner::new();

        assert!(generator.schedule(manager.clone(), 0, &mut runner));
        let meshes = renderer.meshes.lock().unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].quad_count(), 6);
        assert_eq!(meshes[0].mesh_type(), MeshType::Collision);
        assert_eq!(meshes[0].render_key(), Some(RenderKey(0)));
    }

    #[test]
    fn failed_builds_are_not_delivered() {
        let manager = ChunkManager::new(&WorldConfig {
            size_in_chunks: [1, 1, 1],
            border_chunks: 0,
            ..WorldConfig::default()
        });
        let renderer = Arc::new(CollectingRenderer::default());
        let generator = MeshGenerator::new(renderer.clone(), MeshType::Render);
        let mut runner = InlineTaskRunner::new();

        generator.schedule(manager, 99, &mut runner);
        assert_eq!(runner.completed_tasks(), 1);
        assert!(renderer.meshes.lock().unwrap().is_empty());

        let keyless = BlockContainer::new(Vector3::new(2, 2, 2));
        keyless.fill(Block::solid(Color::BLACK));
        assert!(matches!(
            generator.generate_now(&keyless),
            Err(VoxelError::MissingRenderKey)
        ));
        assert!(renderer.meshes.lock().unwrap().is_empty());
    }

    #[test]
    fn generate_now_delivers_synchronously() {
        let renderer = Arc::new(CollectingRenderer::default());
        let generator = MeshGenerator::new(renderer.clone(), MeshType::Render);
        let container = BlockContainer::with_render_key(Vector3::new(3, 1, 1), RenderKey(42));
        container.fill(Block::solid(Color::WHITE));

        generator.generate_now(&container).unwrap();
        let meshes = renderer.meshes.lock().unwrap();
        assert_eq!(meshes[0].quad_count(), 6);
        assert_eq!(meshes[0].render_key(), Some(RenderKey(42)));
    }
}
