//! RGBA byte packing.
//!
//! Colors live in the mesh as four bytes per vertex in `r, g, b, a` order.
//! Producers that carry colors as a single 32-bit value use these helpers;
//! the conversion is explicit shifts, so it does not depend on host byte order.

/// Packs `[r, g, b, a]` into `0xAABBGGRR`.
pub fn pack_rgba(rgba: [u8; 4]) -> u32 {
    u32::from(rgba[0])
        | (u32::from(rgba[1]) << 8)
        | (u32::from(rgba[2]) << 16)
        | (u32::from(rgba[3]) << 24)
}

/// Unpacks `0xAABBGGRR` into `[r, g, b, a]`.
pub fn unpack_rgba(packed: u32) -> [u8; 4] {
    [
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    ]
}

/// Multiplies each component by `light / 255`, per channel.
pub fn multiply_rgba(rgba: [u8; 4], light: [u8; 4]) -> [u8; 4] {
    std::array::from_fn(|c| (u32::from(rgba[c]) * u32::from(light[c]) / 255) as u8)
}
