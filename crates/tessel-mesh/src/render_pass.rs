//! Render buckets a face can be assigned to.

/// Which rendering stage a face is drawn in.
///
/// Meshes store the raw `i16` per face; `-1` means "unassigned" and is
/// treated as [`RenderPass::Opaque`] by filtered merges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum RenderPass {
    /// Back-face culled, depth-written, no blending.
    Opaque = 0,
    /// Alpha-blended geometry sorted back to front.
    Transparent = 1,
    /// Opaque without back-face culling (foliage, panes).
    OpaqueNoCull = 2,
    /// Blended without back-face culling.
    BlendNoCull = 3,
    /// Water and other liquids.
    Liquid = 4,
    /// Grass-tinted top soil layer.
    TopSoil = 5,
    /// Debug or meta geometry.
    Meta = 6,
}

impl RenderPass {
    /// Raw value stored for unassigned faces.
    pub const UNASSIGNED: i16 = -1;

    /// All passes in discriminant order.
    pub const ALL: [RenderPass; 7] = [
        Self::Opaque,
        Self::Transparent,
        Self::OpaqueNoCull,
        Self::BlendNoCull,
        Self::Liquid,
        Self::TopSoil,
        Self::Meta,
    ];

    /// The raw per-face value.
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Decodes a raw per-face value. `-1` decodes to [`RenderPass::Opaque`].
    pub fn from_i16(raw: i16) -> Option<Self> {
        match raw {
            Self::UNASSIGNED => Some(Self::Opaque),
            r if r >= 0 => Self::ALL.get(r as usize).copied(),
            _ => None,
        }
    }

    /// Returns `true` if a face tagged `raw` belongs in this pass.
    pub fn accepts(self, raw: i16) -> bool {
        raw == self.as_i16() || (raw == Self::UNASSIGNED && self == Self::Opaque)
    }
}
