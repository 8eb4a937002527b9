//! Normal packing in the `GL_INT_2_10_10_10_REV` layout.
//!
//! | Bits    | Field                              |
//! |---------|------------------------------------|
//! | 0..10   | x, 10-bit two's complement          |
//! | 10..20  | y, 10-bit two's complement          |
//! | 20..30  | z, 10-bit two's complement          |
//! | 30..32  | w, unused by the mesh buffer        |
//!
//! Shaders read this word directly, so the layout is fixed.

use glam::Vec3;

/// Width of one packed axis in bits.
pub const NORMAL_AXIS_BITS: u32 = 10;

/// Mask covering the x, y and z fields.
pub const NORMAL_XYZ_MASK: u32 = (1 << (3 * NORMAL_AXIS_BITS)) - 1;

/// Mask covering the two spare w bits.
pub const NORMAL_W_MASK: u32 = !NORMAL_XYZ_MASK;

const AXIS_MASK: u32 = (1 << NORMAL_AXIS_BITS) - 1;
const AXIS_SCALE: f32 = 511.0;

/// Packs a direction (components in `-1.0..=1.0`) into one 32-bit word.
///
/// Components outside the unit range are clamped. The w bits are zero.
pub fn pack_normal(v: Vec3) -> u32 {
    pack_axis(v.x) | (pack_axis(v.y) << NORMAL_AXIS_BITS) | (pack_axis(v.z) << (2 * NORMAL_AXIS_BITS))
}

/// Unpacks the x, y and z fields of a packed normal. The w bits are ignored.
pub fn unpack_normal(packed: u32) -> Vec3 {
    Vec3::new(
        unpack_axis(packed),
        unpack_axis(packed >> NORMAL_AXIS_BITS),
        unpack_axis(packed >> (2 * NORMAL_AXIS_BITS)),
    )
}

/// Returns the two spare bits (30 and 31) shifted down to `0..4`.
pub fn packed_w_bits(packed: u32) -> u32 {
    packed >> (3 * NORMAL_AXIS_BITS)
}

fn pack_axis(c: f32) -> u32 {
    let q = (c.clamp(-1.0, 1.0) * AXIS_SCALE).round() as i32;
    (q as u32) & AXIS_MASK
}

fn unpack_axis(bits: u32) -> f32 {
    // Move the 10-bit field to the top, then arithmetic-shift back to sign-extend.
    let v = (((bits & AXIS_MASK) << 22) as i32) >> 22;
    v as f32 / AXIS_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_axis_aligned_normals_are_exact() {
        for v in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            assert_eq!(unpack_normal(pack_normal(v)), v);
        }
    }

    #[test]
    fn test_field_positions() {
        assert_eq!(pack_normal(Vec3::X), 511);
        assert_eq!(pack_normal(Vec3::Y), 511 << 10);
        assert_eq!(pack_normal(Vec3::Z), 511 << 20);
        // -1 is 0b10_0000_0001 in 10-bit two's complement.
        assert_eq!(pack_normal(Vec3::NEG_X), 0x201);
        assert_eq!(pack_normal(Vec3::NEG_X) & NORMAL_W_MASK, 0);
    }

    #[test]
    fn test_random_unit_vectors_round_trip_within_quantization() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let bound = 1.0 / 511.0;
        for _ in 0..1000 {
            let v = loop {
                let c = Vec3::new(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                );
                if c.length_squared() > 1e-4 {
                    break c.normalize();
                }
            };
            let back = unpack_normal(pack_normal(v));
            let err = (back - v).abs();
            assert!(
                err.max_element() <= bound,
                "{v:?} came back as {back:?}"
            );
        }
    }

    #[test]
    fn test_out_of_range_components_are_clamped() {
        let back = unpack_normal(pack_normal(Vec3::new(3.0, -2.0, 0.0)));
        assert_eq!(back, Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_w_bits_are_ignored_on_unpack() {
        let packed = pack_normal(Vec3::Y) | (0b11 << 30);
        assert_eq!(packed_w_bits(packed), 0b11);
        assert_eq!(unpack_normal(packed), Vec3::Y);
    }
}
