//! # Error Module
//!
//! A single error type shared by the voxel store, the meshers and the task glue.
//!
//! Out-of-range *reads* are never errors anywhere in the crate: they resolve to
//! Air or to the world-edge boundary block so meshing can probe one cell past any
//! boundary. Out-of-range *writes* are reported through [`VoxelError::OutOfBounds`].

use cgmath::Point3;
use thiserror::Error;

/// Errors produced by the voxel engine.
#[derive(Error, Debug)]
pub enum VoxelError {
    /// A bulk block array did not match the container volume.
    #[error("block array has {actual} entries but the container holds {expected}")]
    SizeMismatch {
        /// Number of cells in the container
        expected: usize,
        /// Length of the array that was supplied
        actual: usize,
    },

    /// An axis index outside `0..3` was used.
    #[error("axis index {0} is outside 0..3")]
    InvalidAxis(usize),

    /// A mesh was requested from a volume that has no render key.
    #[error("cannot build a mesh without a render key")]
    MissingRenderKey,

    /// A write targeted a position outside the container or world.
    #[error("position {position:?} is outside the writable bounds")]
    OutOfBounds {
        /// The rejected position
        position: Point3<i32>,
    },

    /// A chunk coordinate outside the chunk grid.
    #[error("chunk coordinate {coord:?} is outside the chunk grid")]
    ChunkOutOfRange {
        /// The rejected chunk coordinate
        coord: Point3<i32>,
    },

    /// No chunk occupies the given slot of the chunk array.
    #[error("no chunk at index {0}")]
    UnknownChunk(usize),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The configuration parsed but describes an unusable world.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A background task panicked while running.
    #[error("task panicked: {0}")]
    TaskPanicked(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, VoxelError>;
