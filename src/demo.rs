//! # Demo World
//!
//! A small terraced world and a renderer that only logs what it receives. Used
//! by the binary to exercise loading, scheduling and meshing end to end.

use std::sync::atomic::{AtomicUsize, Ordering};

use cgmath::Point3;
use log::debug;

use crate::{
    config::WorldConfig,
    engine_state::{
        rendering::{MeshData, MeshRenderer},
        voxels::{
            block::{Block, Color},
            chunk::CHUNK_SIZE,
            world_context::WorldContext,
        },
    },
    error::Result,
};

/// Edge length of one terrace tile in blocks.
const TERRACE_SIZE: i32 = 8;

/// A renderer that counts the meshes it is handed.
#[derive(Default)]
pub struct LogRenderer {
    meshes: AtomicUsize,
    quads: AtomicUsize,
    sprites: AtomicUsize,
}

impl LogRenderer {
    pub fn mesh_count(&self) -> usize {
        self.meshes.load(Ordering::Relaxed)
    }

    pub fn quad_count(&self) -> usize {
        self.quads.load(Ordering::Relaxed)
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.load(Ordering::Relaxed)
    }
}

impl MeshRenderer for LogRenderer {
    fn render_mesh(&self, mesh: MeshData) {
        debug!(
            "Received {:?} mesh {:?}: {} quads, {} sprites, {} vertex bytes",
            mesh.mesh_type(),
            mesh.render_key(),
            mesh.quad_count(),
            mesh.sprite_count(),
            mesh.vertex_bytes().len()
        );
        self.meshes.fetch_add(1, Ordering::Relaxed);
        self.quads.fetch_add(mesh.quad_count(), Ordering::Relaxed);
        self.sprites.fetch_add(mesh.sprite_count(), Ordering::Relaxed);
    }
}

/// Builds a world of square terraces of random height with the odd sprite on top.
///
/// Only the playable area is filled; the border chunks stay empty.
pub fn build_terraced_world(config: &WorldConfig, seed: u64) -> Result<WorldContext> {
    let context = WorldContext::new(config);
    let mut rng = fastrand::Rng::with_seed(seed);

    let border = config.border_chunks as i32 * CHUNK_SIZE;
    let [size_x, size_y, size_z] = config.size_in_chunks.map(|size| size as i32 * CHUNK_SIZE);
    let tallest = (size_y / 2).max(1);

    for tile_x in (0..size_x).step_by(TERRACE_SIZE as usize) {
        for tile_z in (0..size_z).step_by(TERRACE_SIZE as usize) {
            let height = rng.i32(1..=tallest);
            let color = Color::random(&mut rng);

            for x in tile_x..(tile_x + TERRACE_SIZE).min(size_x) {
                for z in tile_z..(tile_z + TERRACE_SIZE).min(size_z) {
                    for y in 0..height {
                        let position = Point3::new(border + x, y, border + z);
                        context.set_block(position, Block::solid(color))?;
                    }
                    if height < size_y && rng.u8(..) < 8 {
                        context.set_block(
                            Point3::new(border + x, height, border + z),
                            Block::sprite(rng.u8(..)),
                        )?;
                    }
                }
            }
        }
    }

    Ok(context)
}
