//! Mesh accumulation for a single meshing pass.
//!
//! A `MeshData` is created empty at the start of a pass, filled by the mesher,
//! and handed to the renderer once the pass is complete. It is never mutated
//! after handoff.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cgmath::Vector3;

use crate::engine_state::{
    rendering::{MeshType, RenderKey, Vertex},
    voxels::block::Color,
};

/// Triangle order for a quad wound counter-clockwise as given.
const FRONT_TRIANGLES: [u32; 6] = [0, 1, 2, 0, 2, 3];
/// Triangle order for a quad that faces the other way.
const BACK_TRIANGLES: [u32; 6] = [0, 2, 1, 0, 3, 2];

#[derive(Debug, Default)]
struct MeshBuffers {
    vertices: Vec<Vector3<f32>>,
    triangles: Vec<u32>,
    colors: Vec<Color>,
    sprite_positions: Vec<Vector3<f32>>,
    sprite_data: Vec<u8>,
}

/// Vertices, triangles, per-vertex colors and sprites produced by one meshing pass.
///
/// The parallel lists always satisfy:
/// - `vertices.len() == 4 * quad_count`
/// - `colors.len() == vertices.len()`
/// - `triangles.len() == 6 * quad_count`
/// - `sprite_positions.len() == sprite_data.len()`
///
/// All buffers sit behind one lock, so faces may be appended from several
/// threads. The accessors return copies.
#[derive(Debug)]
pub struct MeshData {
    render_key: Option<RenderKey>,
    mesh_type: MeshType,
    buffers: Mutex<MeshBuffers>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new(render_key: Option<RenderKey>, mesh_type: MeshType) -> Self {
        MeshData {
            render_key,
            mesh_type,
            buffers: Mutex::new(MeshBuffers::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MeshBuffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one quad.
    ///
    /// # Arguments
    /// * `vertices` - The four corners, in order around the quad
    /// * `color` - Color copied to each of the four vertices
    /// * `backwards` - Reverses the triangle winding so the quad faces the other way
    pub fn add_colored_face(&self, vertices: [Vector3<f32>; 4], color: Color, backwards: bool) {
        let mut buffers = self.lock();
        let base = buffers.vertices.len() as u32;
        let order = if backwards {
            BACK_TRIANGLES
        } else {
            FRONT_TRIANGLES
        };

        buffers.vertices.extend_from_slice(&vertices);
        buffers.colors.extend_from_slice(&[color; 4]);
        buffers.triangles.extend(order.iter().map(|offset| base + offset));
    }

    /// Appends one point sprite.
    pub fn add_sprite(&self, position: Vector3<f32>, metadata: u8) {
        let mut buffers = self.lock();
        buffers.sprite_positions.push(position);
        buffers.sprite_data.push(metadata);
    }

    pub fn render_key(&self) -> Option<RenderKey> {
        self.render_key
    }

    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    pub fn vertices(&self) -> Vec<Vector3<f32>> {
        self.lock().vertices.clone()
    }

    pub fn triangles(&self) -> Vec<u32> {
        self.lock().triangles.clone()
    }

    pub fn colors(&self) -> Vec<Color> {
        self.lock().colors.clone()
    }

    pub fn sprite_positions(&self) -> Vec<Vector3<f32>> {
        self.lock().sprite_positions.clone()
    }

    pub fn sprite_data(&self) -> Vec<u8> {
        self.lock().sprite_data.clone()
    }

    /// Number of quads appended so far.
    pub fn quad_count(&self) -> usize {
        self.lock().vertices.len() / 4
    }

    /// Number of sprites appended so far.
    pub fn sprite_count(&self) -> usize {
        self.lock().sprite_data.len()
    }

    /// Whether the mesh holds neither quads nor sprites.
    pub fn is_empty(&self) -> bool {
        let buffers = self.lock();
        buffers.vertices.is_empty() && buffers.sprite_data.is_empty()
    }

    /// Positions and colors zipped into the upload vertex format.
    pub fn vertices_interleaved(&self) -> Vec<Vertex> {
        let buffers = self.lock();
        buffers
            .vertices
            .iter()
            .zip(buffers.colors.iter())
            .map(|(position, color)| Vertex::new(*position, *color))
            .collect()
    }

    /// The interleaved vertices as raw bytes, ready for a vertex buffer.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let vertices = self.vertices_interleaved();
        bytemuck::cast_slice::<Vertex, u8>(&vertices).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> [Vector3<f32>; 4] {
        [
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn faces_keep_parallel_lists_in_step() {
        let mesh = MeshData::new(Some(RenderKey(3)), MeshType::Render);
        assert!(mesh.is_empty());

        mesh.add_colored_face(unit_quad(), Color::WHITE, false);
        mesh.add_colored_face(unit_quad(), Color::BLACK, true);

        assert_eq!(mesh.quad_count(), 2);
        assert_eq!(mesh.vertices().len(), 8);
        assert_eq!(mesh.colors().len(), 8);
        assert_eq!(mesh.triangles(), vec![0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6]);
        assert_eq!(mesh.colors()[5], Color::BLACK);
        assert_eq!(mesh.render_key(), Some(RenderKey(3)));
    }

    #[test]
    fn sprites_are_stored_in_pairs() {
        let mesh = MeshData::new(None, MeshType::Collision);
        mesh.add_sprite(Vector3::new(0.5, 0.5, 0.5), 9);
        assert_eq!(mesh.sprite_count(), 1);
        assert_eq!(mesh.sprite_positions(), vec![Vector3::new(0.5, 0.5, 0.5)]);
        assert_eq!(mesh.sprite_data(), vec![9]);
        assert_eq!(mesh.quad_count(), 0);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn accessors_return_copies() {
        let mesh = MeshData::new(None, MeshType::Render);
        mesh.add_colored_face(unit_quad(), Color::WHITE, false);
        let mut vertices = mesh.vertices();
        vertices.clear();
        assert_eq!(mesh.vertices().len(), 4);
    }

    #[test]
    fn interleaved_vertices_match_buffers() {
        let mesh = MeshData::new(None, MeshType::Render);
        let red = Color::rgb(255, 0, 0);
        mesh.add_colored_face(unit_quad(), red, false);

        let interleaved = mesh.vertices_interleaved();
        assert_eq!(interleaved.len(), 4);
        assert_eq!(interleaved[2].position, [1.0, 1.0, 1.0]);
        assert_eq!(interleaved[2].color, red.to_array());
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<Vertex>());
    }
}
