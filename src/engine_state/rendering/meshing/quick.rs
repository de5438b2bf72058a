//! Per-face meshing.
//!
//! Emits one unit quad for every solid face whose neighbor is not solid. The
//! output is larger than a greedy mesh but trivially correct, which makes it the
//! yardstick the greedy mesher is tested against.

use cgmath::Point3;

use crate::{
    engine_state::{
        rendering::MeshType,
        voxels::{
            block::{Block, BlockSide},
            block_container::BlockVolume,
        },
    },
    error::{Result, VoxelError},
};

use super::{emit_sprites, is_face_visible, quad_corners, MeshData};

/// Builds a mesh with one quad per visible solid face and one sprite per sprite block.
///
/// `mesh_type` only tags the result: without merging there is nothing for the
/// render and collision rules to disagree about.
///
/// # Errors
/// Returns [`VoxelError::MissingRenderKey`] if the volume has no render key.
pub fn quick_mesh<V: BlockVolume + ?Sized>(volume: &V, mesh_type: MeshType) -> Result<MeshData> {
    let render_key = volume.render_key().ok_or(VoxelError::MissingRenderKey)?;
    let mesh = MeshData::new(Some(render_key), mesh_type);
    let size = volume.size();

    for side in BlockSide::all() {
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let Block::Solid { color } = volume.get_block(x, y, z) else {
                        continue;
                    };
                    let cell = Point3::new(x, y, z);
                    if is_face_visible(volume, cell, side) {
                        mesh.add_colored_face(
                            quad_corners(cell, side, 1, 1),
                            color,
                            side.is_negative(),
                        );
                    }
                }
            }
        }
    }

    emit_sprites(volume, &mesh);
    Ok(mesh)
}
