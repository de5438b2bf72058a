//! Vertex data structures for mesh upload.
//!
//! `MeshData` keeps positions and colors in separate lists while a mesh is being
//! built. This module defines the interleaved form a renderer uploads.

use cgmath::Vector3;

use crate::engine_state::voxels::block::Color;

/// A single colored mesh vertex.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Color: 4x u8, RGBA (4 bytes)
///
/// Total size: 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in the volume's local space
    pub position: [f32; 3],
    /// RGBA color of the face this vertex belongs to
    pub color: [u8; 4],
}

impl Vertex {
    /// Creates a new vertex.
    pub fn new(position: Vector3<f32>, color: Color) -> Self {
        Vertex {
            position: [position.x, position.y, position.z],
            color: color.to_array(),
        }
    }
}
