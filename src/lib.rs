#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesh Engine
//!
//! Voxel storage and surface extraction for block-based worlds: a sparse grid of
//! blocks goes in, compact triangle meshes for rendering and collision come out,
//! incrementally and per chunk.
//!
//! ## Key Modules
//!
//! * `config` - World and engine settings, loadable from JSON
//! * `engine_state` - The per-tick coordinator plus the voxel, meshing and task subsystems
//! * `error` - The crate-wide error type
//!
//! ## Data Flow
//!
//! World load fills a `WorldContext`, which is installed into the `ChunkManager`.
//! Every tick the manager schedules a greedy re-mesh for each dirty chunk on the
//! worker pool, and finished meshes are handed to a `MeshRenderer`.
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     if let Err(error) = voxel_mesh_engine::run() {
//!         log::error!("{error}");
//!     }
//! }
//! ```

use std::{env, sync::Arc, thread, time::Duration};

use log::info;
use web_time::Instant;

pub mod config;
pub mod demo;
pub mod engine_state;
pub mod error;

pub use config::{EngineConfig, WorldConfig};
pub use engine_state::{
    rendering::{MeshData, MeshGenerator, MeshRenderer, MeshType, RenderKey, Vertex},
    task_management::{InlineTaskRunner, Task, TaskManager, TaskResult, TaskScheduler},
    voxels::{
        block::{Block, BlockSide, Color},
        block_container::{BlockContainer, BlockVolume},
        chunk::{Chunk, CHUNK_SIZE, CHUNK_VOLUME},
        chunk_manager::ChunkManager,
        world_context::WorldContext,
    },
    EngineState,
};
pub use error::{Result, VoxelError};

/// Seed of the demo world, fixed so runs are comparable.
const DEMO_SEED: u64 = 0x7e77ace5;

/// Runs the demo: loads the configuration named by the first argument (or the
/// defaults), builds a terraced world and ticks until every chunk is meshed.
pub fn run() -> Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let renderer = Arc::new(demo::LogRenderer::default());
    let mut engine = EngineState::new(&config, renderer.clone())?;

    let start = Instant::now();
    let context = demo::build_terraced_world(&config.world, DEMO_SEED)?;
    info!(
        "Generated world with {} populated chunks in {:?}",
        context.touched_chunk_count(),
        start.elapsed()
    );

    let start = Instant::now();
    engine.load_world(&context)?;
    engine.tick();
    while !engine.is_idle() {
        thread::sleep(Duration::from_millis(1));
        engine.tick();
    }

    info!(
        "Meshed {} chunks into {} quads and {} sprites in {:?}",
        renderer.mesh_count(),
        renderer.quad_count(),
        renderer.sprite_count(),
        start.elapsed()
    );
    Ok(())
}
