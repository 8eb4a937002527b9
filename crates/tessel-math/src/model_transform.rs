//! Named transform descriptor composed into a single matrix.

use glam::{DMat4, Mat4, Vec3};

/// Translation, rotation and scale applied about a pivot point.
///
/// The composed matrix is
/// `T(translation + origin) * Rx * Ry * Rz * S(scale) * T(-origin)`,
/// so rotation and scale happen about `origin` and the translation is applied last.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelTransform {
    /// Offset applied after rotation and scale.
    pub translation: Vec3,
    /// Rotation about X, Y and Z in degrees, applied X first.
    pub rotation_deg: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Pivot for rotation and scale.
    pub origin: Vec3,
}

impl ModelTransform {
    /// The identity transform with its pivot at the coordinate origin.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation_deg: Vec3::ZERO,
        scale: Vec3::ONE,
        origin: Vec3::ZERO,
    };

    /// Sets the translation.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Sets the rotation in degrees.
    pub fn with_rotation_deg(mut self, rotation_deg: Vec3) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    /// Sets a per-axis scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the same scale on every axis.
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    /// Sets the pivot point.
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Returns `true` if applying this transform would not move anything.
    pub fn is_identity(&self) -> bool {
        self.translation == Vec3::ZERO && self.rotation_deg == Vec3::ZERO && self.scale == Vec3::ONE
    }

    /// Single-precision composed matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation + self.origin)
            * rotation_xyz(self.rotation_deg * (std::f32::consts::PI / 180.0))
            * Mat4::from_scale(self.scale)
            * Mat4::from_translation(-self.origin)
    }

    /// Double-precision composed matrix, for world-space work where f32 drifts.
    pub fn matrix_f64(&self) -> DMat4 {
        let rad = self.rotation_deg.as_dvec3() * (std::f64::consts::PI / 180.0);
        DMat4::from_translation((self.translation + self.origin).as_dvec3())
            * DMat4::from_rotation_x(rad.x)
            * DMat4::from_rotation_y(rad.y)
            * DMat4::from_rotation_z(rad.z)
            * DMat4::from_scale(self.scale.as_dvec3())
            * DMat4::from_translation(-self.origin.as_dvec3())
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation about X, then Y, then Z (radians), as `Rx * Ry * Rz`.
pub fn rotation_xyz(rad: Vec3) -> Mat4 {
    Mat4::from_rotation_x(rad.x) * Mat4::from_rotation_y(rad.y) * Mat4::from_rotation_z(rad.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_identity_matrix() {
        assert_eq!(ModelTransform::IDENTITY.matrix(), Mat4::IDENTITY);
        assert!(ModelTransform::default().is_identity());
    }

    #[test]
    fn test_scale_about_origin_keeps_origin_fixed() {
        let t = ModelTransform::IDENTITY
            .with_uniform_scale(2.0)
            .with_origin(Vec3::splat(0.5));
        let m = t.matrix();
        assert!(approx(m.transform_point3(Vec3::splat(0.5)), Vec3::splat(0.5)));
        assert!(approx(m.transform_point3(Vec3::ONE), Vec3::splat(1.5)));
    }

    #[test]
    fn test_rotation_about_center_then_translate() {
        let t = ModelTransform::IDENTITY
            .with_rotation_deg(Vec3::new(0.0, 90.0, 0.0))
            .with_origin(Vec3::new(0.5, 0.0, 0.5))
            .with_translation(Vec3::new(10.0, 0.0, 0.0));
        let m = t.matrix();
        // +X edge of a unit block swings to the -Z edge under a +90° Y rotation.
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.5));
        assert!(approx(p, Vec3::new(10.5, 0.0, 0.0)), "{p:?}");
    }

    #[test]
    fn test_f64_matrix_agrees_with_f32() {
        let t = ModelTransform::IDENTITY
            .with_rotation_deg(Vec3::new(30.0, 45.0, 60.0))
            .with_scale(Vec3::new(1.0, 2.0, 0.5))
            .with_origin(Vec3::splat(0.5))
            .with_translation(Vec3::new(-3.0, 1.0, 2.0));
        let p = Vec3::new(0.25, 0.75, 1.0);
        let a = t.matrix().transform_point3(p);
        let b = t.matrix_f64().transform_point3(p.as_dvec3()).as_vec3();
        assert!(approx(a, b), "{a:?} vs {b:?}");
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        let rad = Vec3::new(0.3, 0.7, 1.1);
        let expected = Mat4::from_rotation_x(rad.x)
            * Mat4::from_rotation_y(rad.y)
            * Mat4::from_rotation_z(rad.z);
        assert_eq!(rotation_xyz(rad), expected);
    }
}
