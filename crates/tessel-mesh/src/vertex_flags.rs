//! The per-vertex render flags word.
//!
//! | Bits    | Field                                                   |
//! |---------|---------------------------------------------------------|
//! | 0..8    | glow level                                              |
//! | 8..15   | renderer-defined, preserved untouched                   |
//! | 15..27  | coarse normal: 4 bits per axis (x, y, z)                |
//! | 27..32  | renderer-defined, preserved untouched                   |
//!
//! Each normal nibble is `magnitude << 1 | sign`, with the magnitude a 3-bit
//! quantization of `|component| * 7`. The encoding assumes unit vectors.

use glam::Vec3;

/// Bit offset of the normal sub-field.
pub const NORMAL_BIT_POS: u32 = 15;

/// Width of the normal sub-field.
pub const NORMAL_BITS: u32 = 12;

/// Mask of the normal sub-field within the flags word.
pub const NORMAL_BIT_MASK: u32 = ((1 << NORMAL_BITS) - 1) << NORMAL_BIT_POS;

/// Mask of the glow level.
pub const GLOW_LEVEL_MASK: u32 = 0xFF;

const AXIS_STEPS: f32 = 7.0;

/// A flags word with typed access to its sub-fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VertexFlags(pub u32);

impl VertexFlags {
    /// Glow level, 0..=255.
    pub fn glow_level(self) -> u8 {
        (self.0 & GLOW_LEVEL_MASK) as u8
    }

    /// Replaces the glow level, keeping every other bit.
    pub fn with_glow_level(self, glow: u8) -> Self {
        Self((self.0 & !GLOW_LEVEL_MASK) | u32::from(glow))
    }

    /// Decodes the coarse normal.
    pub fn normal(self) -> Vec3 {
        unpack_flags_normal(self.0 >> NORMAL_BIT_POS)
    }

    /// Replaces the coarse normal, keeping every other bit.
    pub fn with_normal(self, normal: Vec3) -> Self {
        Self((self.0 & !NORMAL_BIT_MASK) | (pack_flags_normal(normal) << NORMAL_BIT_POS))
    }

    /// Returns `true` if the normal sub-field is all zero.
    pub fn has_normal(self) -> bool {
        self.0 & NORMAL_BIT_MASK != 0
    }
}

/// Packs a unit vector into the 12-bit normal sub-field (unshifted).
pub fn pack_flags_normal(v: Vec3) -> u32 {
    pack_nibble(v.x) | (pack_nibble(v.y) << 4) | (pack_nibble(v.z) << 8)
}

/// Unpacks a 12-bit normal sub-field (already shifted down). Higher bits are ignored.
pub fn unpack_flags_normal(bits: u32) -> Vec3 {
    Vec3::new(
        unpack_nibble(bits),
        unpack_nibble(bits >> 4),
        unpack_nibble(bits >> 8),
    )
}

fn pack_nibble(c: f32) -> u32 {
    let magnitude = (c.abs().min(1.0) * AXIS_STEPS).round() as u32;
    let sign = u32::from(c < 0.0 && magnitude > 0);
    (magnitude << 1) | sign
}

fn unpack_nibble(bits: u32) -> f32 {
    let magnitude = ((bits >> 1) & 0b111) as f32 / AXIS_STEPS;
    if bits & 1 == 1 { -magnitude } else { magnitude }
}
