//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent
//! coplanar visible faces into maximal rectangles, so a flat wall of identical
//! blocks becomes one quad instead of one quad per block.
//!
//! # Algorithm
//! Every axis `d` is swept twice, once for the faces pointing towards `+d` and
//! once for those pointing towards `-d`. For each slice along `d` a fresh
//! `merged` grid over the in-plane axes `(i, j)` tracks which cells already
//! belong to a quad. From each unmerged cell with a visible face the quad first
//! grows along `j`, then row by row along `i` while the whole row still matches;
//! the first row that fails stops the growth and is left for a later quad.

use bitvec::prelude::*;
use cgmath::Point3;
use log::debug;
use web_time::Instant;

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

use super::{in_plane_axes, is_face_visible, quad_corners, sprite_position, MeshData};

/// Whether the face of cell `b` can join a quad started by block `a`.
///
/// Render meshes only merge identical blocks. Collision meshes merge any
/// visible solid faces, since color does not matter to physics.
fn compare_step<V: BlockVolume + ?Sized>(
    volume: &V,
    a: Block,
    b: Point3<i32>,
    side: BlockSide,
    mesh_type: MeshType,
) -> bool {
    let block_b = volume.block_at(b);
    if !block_b.is_solid() || !is_face_visible(volume, b, side) {
        return false;
    }
    match mesh_type {
        MeshType::Render => block_b == a,
        MeshType::Collision => true,
    }
}

/// Generates a mesh for a volume, merging coplanar faces into maximal rectangles.
///
/// Sprite blocks are emitted once each as point sprites and never merged.
///
/// # Errors
/// Returns [`VoxelError::MissingRenderKey`] if the volume has no render key.
///
/// # Performance
/// Each face direction visits every cell once, so the cost is linear in the
/// volume, while the output is bounded by the number of maximal rectangles
/// rather than the number of visible faces.
pub fn greedy_mesh<V: BlockVolume + ?Sized>(volume: &V, mesh_type: MeshType) -> Result<MeshData> {
    let render_key = volume.render_key().ok_or(VoxelError::MissingRenderKey)?;
    let start = Instant::now();
    let mesh = MeshData::new(Some(render_key), mesh_type);
    let size = volume.size();

    for d in 0..3 {
        let (i, j) = in_plane_axes(d);
        let (extent_i, extent_j) = (size[i], size[j]);

        for back in [false, true] {
            let side = BlockSide::from_axis(d, back)?;
            let emit_sprites = d == 0 && !back;

            for slice in 0..size[d] {
                let mut merged = bitvec![0; (extent_i * extent_j) as usize];
                let cell_index = |ai: i32, aj: i32| (ai * extent_j + aj) as usize;

                for ai in 0..extent_i {
                    for aj in 0..extent_j {
                        if merged[cell_index(ai, aj)] {
                            continue;
                        }

                        let mut a = Point3::new(0, 0, 0);
                        a[d] = slice;
                        a[i] = ai;
                        a[j] = aj;

                        let block = volume.block_at(a);
                        let color = match block {
                            Block::Air => continue,
                            Block::Sprite { metadata } => {
                                if emit_sprites {
                                    mesh.add_sprite(sprite_position(a), metadata);
                                }
                                merged.set(cell_index(ai, aj), true);
                                continue;
                            }
                            Block::Solid { color } => color,
                        };

                        if !is_face_visible(volume, a, side) {
                            continue;
                        }

                        // Grow along j
                        let mut width = 1;
                        while aj + width < extent_j {
                            let mut b = a;
                            b[j] = aj + width;
                            if merged[cell_index(ai, aj + width)]
                                || !compare_step(volume, block, b, side, mesh_type)
                            {
                                break;
                            }
                            width += 1;
                        }

                        // Grow along i, one full row at a time
                        let mut height = 1;
                        'rows: while ai + height < extent_i {
                            for k in 0..width {
                                let mut b = a;
                                b[i] = ai + height;
                                b[j] = aj + k;
                                if merged[cell_index(ai + height, aj + k)]
                                    || !compare_step(volume, block, b, side, mesh_type)
                                {
                                    break 'rows;
                                }
                            }
                            height += 1;
                        }

                        mesh.add_colored_face(quad_corners(a, side, height, width), color, back);

                        for mi in ai..ai + height {
                            for mj in aj..aj + width {
                                merged.set(cell_index(mi, mj), true);
                            }
                        }
                    }
                }
            }
        }
    }

    debug!(
        "Greedy meshed {:?} ({:?}) into {} quads and {} sprites in {:?}",
        render_key,
        mesh_type,
        mesh.quad_count(),
        mesh.sprite_count(),
        start.elapsed()
    );

    Ok(mesh)
}
