//! # Block Color Module
//!
//! The per-block RGBA color carried by solid blocks and copied into every
//! vertex of the faces they produce.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute keeps the four channels packed in RGBA order so a
/// slice of colors can be uploaded to the GPU directly.
#[repr(C)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Neutral grey used for the world-edge wall by default.
    pub const STONE: Color = Color::rgb(128, 128, 128);

    /// Creates a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Generates a random opaque color.
    ///
    /// Used by the demo world and by randomised tests.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Color::rgb(rng.u8(..), rng.u8(..), rng.u8(..))
    }

    /// Returns the channels as an array in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
