//! Mesh generation for block volumes.
//!
//! Two meshers turn any [`BlockVolume`] into a [`MeshData`]:
//! - `quick`: one quad per visible face, the reference for correctness
//! - `greedy`: merges coplanar visible faces into maximal rectangles
//!
//! Both emit the same visible surface and share the quad conventions defined
//! here, so their output can be compared face for face.
//!
//! # Quad Conventions
//! A face perpendicular to axis `d` spans the in-plane axes `i = (d + 1) % 3`
//! and `j = (d + 2) % 3`. Its corners are `o`, `o + du`, `o + du + dv`, `o + dv`
//! where `du` runs along `i` and `dv` along `j`. Positive-facing quads sit on the
//! far side of their cell (`o[d] = cell[d] + 1`) and keep that winding;
//! negative-facing quads sit on the near side and are wound backwards.
//!
//! [`BlockVolume`]: crate::engine_state::voxels::block_container::BlockVolume

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{
    block::{Block, BlockSide},
    block_container::BlockVolume,
};

mod greedy;
mod mesh_data;
mod quick;

#[cfg(test)]
pub(crate) mod test_support;

pub use greedy::greedy_mesh;
pub use mesh_data::MeshData;
pub use quick::quick_mesh;

/// The two axes spanning the plane perpendicular to `axis`.
pub(crate) fn in_plane_axes(axis: usize) -> (usize, usize) {
    ((axis + 1) % 3, (axis + 2) % 3)
}

/// Whether the face of `cell` on `side` can be seen, i.e. its neighbor does not occlude it.
pub(crate) fn is_face_visible<V: BlockVolume + ?Sized>(
    volume: &V,
    cell: Point3<i32>,
    side: BlockSide,
) -> bool {
    !volume.block_at(cell + side.offset()).is_solid()
}

/// Corners of a quad covering `extent_i` by `extent_j` cells starting at `cell`.
pub(crate) fn quad_corners(
    cell: Point3<i32>,
    side: BlockSide,
    extent_i: i32,
    extent_j: i32,
) -> [Vector3<f32>; 4] {
    let d = side.axis();
    let (i, j) = in_plane_axes(d);

    let mut origin = Vector3::new(cell.x as f32, cell.y as f32, cell.z as f32);
    if !side.is_negative() {
        origin[d] += 1.0;
    }

    let mut du = Vector3::new(0.0, 0.0, 0.0);
    du[i] = extent_i as f32;
    let mut dv = Vector3::new(0.0, 0.0, 0.0);
    dv[j] = extent_j as f32;

    [origin, origin + du, origin + du + dv, origin + dv]
}

/// Sprites are placed at the center of their cell.
pub(crate) fn sprite_position(cell: Point3<i32>) -> Vector3<f32> {
    Vector3::new(
        cell.x as f32 + 0.5,
        cell.y as f32 + 0.5,
        cell.z as f32 + 0.5,
    )
}

/// Emits one point sprite for every sprite block of the volume.
pub(crate) fn emit_sprites<V: BlockVolume + ?Sized>(volume: &V, mesh: &MeshData) {
    let size = volume.size();
    for z in 0..size.z {
        for y in 0..size.y {
            for x in 0..size.x {
                if let Block::Sprite { metadata } = volume.get_block(x, y, z) {
                    mesh.add_sprite(sprite_position(Point3::new(x, y, z)), metadata);
                }
            }
        }
    }
}
