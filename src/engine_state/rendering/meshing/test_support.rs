//! Test helpers for comparing meshes face by face.

use crate::engine_state::voxels::block::BlockSide;

use super::{in_plane_axes, MeshData};

/// One unit cell face covered by a quad of a mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct UnitFace {
    /// The cell whose face this is
    pub cell: [i32; 3],
    pub side: BlockSide,
    pub color: [u8; 4],
    /// Index of the quad the face was cut from
    pub quad: usize,
}

impl UnitFace {
    /// Identity of the face including its color, ignoring which quad produced it.
    pub fn key(&self) -> ([i32; 3], u8, [u8; 4]) {
        (self.cell, self.side.code(), self.color)
    }

    /// Identity of the face ignoring color.
    pub fn position_key(&self) -> ([i32; 3], u8) {
        (self.cell, self.side.code())
    }
}

/// Cuts every quad of a mesh back into unit cell faces, sorted by [`UnitFace::key`].
///
/// The facing of each quad is recovered from its triangle winding.
pub(crate) fn unit_faces(mesh: &MeshData) -> Vec<UnitFace> {
    let vertices = mesh.vertices();
    let triangles = mesh.triangles();
    let colors = mesh.colors();
    let mut faces = Vec::new();

    for quad in 0..mesh.quad_count() {
        let base = quad * 4;
        let origin = vertices[base];
        let du = vertices[base + 1] - origin;
        let dv = vertices[base + 3] - origin;

        let d = (0..3)
            .find(|&axis| du[axis] == 0.0 && dv[axis] == 0.0)
            .expect("quad is not axis aligned");
        let (i, j) = in_plane_axes(d);
        let back = triangles[quad * 6 + 1] as usize == base + 2;
        let side = BlockSide::from_axis(d, back).expect("valid axis");

        for a in 0..du[i] as i32 {
            for b in 0..dv[j] as i32 {
                let mut cell = [origin.x as i32, origin.y as i32, origin.z as i32];
                cell[i] += a;
                cell[j] += b;
                if !back {
                    cell[d] -= 1;
                }
                faces.push(UnitFace {
                    cell,
                    side,
                    color: colors[base].to_array(),
                    quad,
                });
            }
        }
    }

    faces.sort_by_key(UnitFace::key);
    faces
}
