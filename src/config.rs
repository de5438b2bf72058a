//! # Configuration Module
//!
//! Static world and engine settings. Every field has a default, so a missing or
//! partial JSON file still yields a working configuration.
//!
//! ```json
//! {
//!   "world": { "size_in_chunks": [8, 4, 8], "border_chunks": 1 },
//!   "worker_threads": 4,
//!   "mesh_type": "Render"
//! }
//! ```

use std::{fs, num::NonZeroUsize, path::Path, thread};

use cgmath::Vector3;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{
        rendering::MeshType,
        voxels::{block::Color, chunk::CHUNK_SIZE},
    },
    error::{Result, VoxelError},
};

/// Dimensions of the voxel world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Playable chunk grid along X, Y and Z
    pub size_in_chunks: [u32; 3],
    /// Chunks padded on each horizontal side to fake an infinite world edge
    pub border_chunks: u32,
    /// Color of the opaque block returned for positions past the world edge
    pub boundary_color: Color,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            size_in_chunks: [4, 2, 4],
            border_chunks: 1,
            boundary_color: Color::STONE,
        }
    }
}

impl WorldConfig {
    /// Padded chunk counts along each axis, wide enough not to overflow.
    fn padded_chunk_counts(&self) -> [u64; 3] {
        let [x, y, z] = self.size_in_chunks.map(u64::from);
        let border = 2 * u64::from(self.border_chunks);
        [x + border, y, z + border]
    }

    /// Checks that the padded world, measured in blocks, fits in `i32` on every axis.
    ///
    /// # Errors
    /// Returns [`VoxelError::InvalidConfig`] naming the first axis that does not fit.
    pub fn validate(&self) -> Result<()> {
        let limit = i32::MAX as u64 / CHUNK_SIZE as u64;
        for (axis, count) in ["x", "y", "z"].iter().zip(self.padded_chunk_counts()) {
            if count > limit {
                return Err(VoxelError::InvalidConfig(format!(
                    "world is {count} chunks along {axis}, at most {limit} fit"
                )));
            }
        }
        Ok(())
    }

    /// Chunk grid dimensions including the horizontal border padding.
    ///
    /// Axes too large for a world (see [`WorldConfig::validate`]) are clamped.
    pub fn padded_dimensions(&self) -> Vector3<i32> {
        let limit = i32::MAX / CHUNK_SIZE;
        let [x, y, z] = self
            .padded_chunk_counts()
            .map(|count| i32::try_from(count).map_or(limit, |count| count.min(limit)));
        Vector3::new(x, y, z)
    }

    /// Total number of chunks in the padded grid.
    pub fn chunk_count(&self) -> usize {
        let dimensions = self.padded_dimensions();
        (dimensions.x as usize) * (dimensions.y as usize) * (dimensions.z as usize)
    }
}

/// Top-level engine settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    /// Number of meshing worker threads, `None` for the available parallelism
    pub worker_threads: Option<usize>,
    /// Which mesh the engine regenerates for dirty chunks
    pub mesh_type: MeshType,
}

impl EngineConfig {
    /// Reads a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`crate::VoxelError::ConfigIo`] if the file cannot be read, and
    /// [`crate::VoxelError::ConfigParse`] if it is not valid configuration JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration from a JSON string.
    ///
    /// # Errors
    /// Returns [`VoxelError::ConfigParse`] for malformed JSON and
    /// [`VoxelError::InvalidConfig`] for a world too large to address.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.world.validate()?;
        Ok(config)
    }

    /// Resolved worker thread count, never zero.
    pub fn worker_count(&self) -> usize {
        match self.worker_threads {
            Some(count) => count.max(1),
            None => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}
