//! Mesh generation for the voxel engine.
//!
//! This module turns block volumes into triangle meshes and hands them to a
//! render collaborator. It owns no GPU state: whatever draws or collides with
//! the meshes lives behind the [`MeshRenderer`] trait.
//!
//! # Architecture
//! - `meshing`: `MeshData` and the quick and greedy meshers
//! - `mesh_generator`: schedules meshing of a chunk as a background task
//! - `tasks`: the background task itself
//! - `vertex`: the interleaved vertex format for upload

use serde::{Deserialize, Serialize};

pub mod mesh_generator;
pub mod meshing;
pub mod tasks;
mod vertex;

pub use mesh_generator::MeshGenerator;
pub use meshing::MeshData;
pub use vertex::Vertex;

/// Which rules a mesher uses to merge neighboring faces.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshType {
    /// Faces merge only when their blocks are identical, so colors survive.
    #[default]
    Render,
    /// Any two visible solid faces merge; color is irrelevant to physics.
    Collision,
}

/// Correlates a generated mesh with the render or collision components it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKey(pub u32);

/// The consumer of finished meshes.
///
/// Called on the thread that processes completed tasks, never with a partially
/// built mesh.
pub trait MeshRenderer: Send + Sync {
    /// Takes ownership of a finished mesh.
    fn render_mesh(&self, mesh: MeshData);
}
