//! # Block Module
//!
//! This module provides the voxel cell value stored in every container, together
//! with the face enumeration used by the meshers.
//!
//! A block is one of three exhaustive states:
//! * `Air` - empty, never meshed, never occludes
//! * `Solid` - an opaque colored cube that produces quads and occludes neighbors
//! * `Sprite` - a non-occluding billboard emitted as a point sprite

use serde::{Deserialize, Serialize};

pub use block_side::BlockSide;
pub use color::Color;

pub mod block_side;
pub mod color;

/// Represents a single voxel block in the world.
///
/// This is a small `Copy` value, so containers store it inline and readers
/// receive it by value rather than through a reference into locked storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Block {
    /// An empty cell.
    #[default]
    Air,

    /// An opaque cube of a single color.
    Solid {
        /// The color of every face of the cube
        color: Color,
    },

    /// A billboard sprite that does not occlude its neighbors.
    Sprite {
        /// Renderer-defined sprite selector
        metadata: u8,
    },
}

impl Block {
    /// Creates a solid block of the given color.
    pub const fn solid(color: Color) -> Self {
        Block::Solid { color }
    }

    /// Creates a sprite block carrying the given metadata byte.
    pub const fn sprite(metadata: u8) -> Self {
        Block::Sprite { metadata }
    }

    /// Returns `true` for [`Block::Air`].
    pub fn is_air(&self) -> bool {
        matches!(self, Block::Air)
    }

    /// Returns `true` for blocks that occlude the faces of their neighbors.
    pub fn is_solid(&self) -> bool {
        matches!(self, Block::Solid { .. })
    }

    /// Returns `true` for sprite blocks.
    pub fn is_sprite(&self) -> bool {
        matches!(self, Block::Sprite { .. })
    }

    /// The face color of a solid block.
    pub fn color(&self) -> Option<Color> {
        match self {
            Block::Solid { color } => Some(*color),
            Block::Air | Block::Sprite { .. } => None,
        }
    }

    /// The metadata byte of a sprite block.
    pub fn metadata(&self) -> Option<u8> {
        match self {
            Block::Sprite { metadata } => Some(*metadata),
            Block::Air | Block::Solid { .. } => None,
        }
    }
}
