//! Background tasks for the rendering system.
//!
//! These tasks run the expensive meshing passes on worker threads so the
//! thread driving the world stays responsive.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Builds the mesh of one chunk and hands it to the renderer

pub mod chunk_mesh_generation_task;
