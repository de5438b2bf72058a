//! # Block Side Module
//!
//! This module defines the six cardinal faces of a voxel block.
//!
//! The integer codes are fixed and shared with the surrounding engine. They are
//! laid out so that the negative-facing side of axis `d` has code `d` and the
//! positive-facing side has code `d + 3`, which lets the greedy mesher turn an
//! `(axis, back)` pair into a side without a lookup table.

use cgmath::Vector3;
use num_derive::FromPrimitive;

use crate::error::{Result, VoxelError};

/// Represents the six possible faces of a voxel block.
///
/// The order is: [WEST, DOWN, SOUTH, EAST, UP, NORTH]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockSide {
    /// Facing negative X
    WEST = 0,

    /// Facing negative Y
    DOWN = 1,

    /// Facing negative Z
    SOUTH = 2,

    /// Facing positive X
    EAST = 3,

    /// Facing positive Y
    UP = 4,

    /// Facing positive Z
    NORTH = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in code order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::WEST,
            BlockSide::DOWN,
            BlockSide::SOUTH,
            BlockSide::EAST,
            BlockSide::UP,
            BlockSide::NORTH,
        ]
    }

    /// Converts a fixed side code back into a `BlockSide`.
    ///
    /// # Returns
    /// `None` if the code is not in `0..6`.
    pub fn from_code(code: u8) -> Option<Self> {
        num::FromPrimitive::from_u8(code)
    }

    /// Returns the fixed integer code of this side.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Maps a mesher pass to the side it produces.
    ///
    /// # Arguments
    /// * `axis` - The axis the pass sweeps along (0 = X, 1 = Y, 2 = Z)
    /// * `back` - Whether this is the back (negative-facing) pass
    ///
    /// # Errors
    /// Returns [`VoxelError::InvalidAxis`] if `axis` is not in `0..3`.
    pub fn from_axis(axis: usize, back: bool) -> Result<Self> {
        if axis > 2 {
            return Err(VoxelError::InvalidAxis(axis));
        }
        let code = if back { axis } else { axis + 3 };
        Self::from_code(code as u8).ok_or(VoxelError::InvalidAxis(axis))
    }

    /// The axis this side is perpendicular to.
    pub fn axis(self) -> usize {
        (self as usize) % 3
    }

    /// Whether the side faces towards the negative end of its axis.
    pub fn is_negative(self) -> bool {
        (self as usize) < 3
    }

    /// The side facing the opposite way.
    pub fn opposite(self) -> Self {
        match self {
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::DOWN => BlockSide::UP,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::EAST => BlockSide::WEST,
            BlockSide::UP => BlockSide::DOWN,
            BlockSide::NORTH => BlockSide::SOUTH,
        }
    }

    /// The unit offset from a block to its neighbor across this side.
    pub fn offset(self) -> Vector3<i32> {
        let mut offset = Vector3::new(0, 0, 0);
        offset[self.axis()] = if self.is_negative() { -1 } else { 1 };
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed() {
        assert_eq!(BlockSide::WEST.code(), 0);
        assert_eq!(BlockSide::DOWN.code(), 1);
        assert_eq!(BlockSide::SOUTH.code(), 2);
        assert_eq!(BlockSide::EAST.code(), 3);
        assert_eq!(BlockSide::UP.code(), 4);
        assert_eq!(BlockSide::NORTH.code(), 5);
        assert_eq!(BlockSide::from_code(6), None);
    }

    #[test]
    fn axis_pairs_round_trip() {
        for side in BlockSide::all() {
            let back = side.is_negative();
            assert_eq!(BlockSide::from_axis(side.axis(), back).unwrap(), side);
            assert_eq!(side.opposite().axis(), side.axis());
            assert_ne!(side.opposite().is_negative(), back);
        }
        assert!(matches!(
            BlockSide::from_axis(3, false),
            Err(VoxelError::InvalidAxis(3))
        ));
    }

    #[test]
    fn offsets_point_outward() {
        assert_eq!(BlockSide::EAST.offset(), Vector3::new(1, 0, 0));
        assert_eq!(BlockSide::DOWN.offset(), Vector3::new(0, -1, 0));
        assert_eq!(BlockSide::SOUTH.offset(), Vector3::new(0, 0, -1));
    }
}
