//! Matrix seam for the mesh transform engine.

use glam::{DMat4, Mat4, Vec3};

/// A 4x4 transform that can move mesh positions and reorient mesh directions.
///
/// Implemented for single- and double-precision matrices so both precisions
/// drive the same per-channel transform code. The bottom row is assumed to be
/// `(0, 0, 0, 1)`; no perspective divide happens.
pub trait MeshTransform {
    /// Transforms a position, including translation.
    fn transform_point(&self, p: Vec3) -> Vec3;

    /// Transforms a direction, ignoring translation.
    fn transform_vector(&self, v: Vec3) -> Vec3;
}

impl MeshTransform for Mat4 {
    fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_point3(p)
    }

    fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.transform_vector3(v)
    }
}

impl MeshTransform for DMat4 {
    fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_point3(p.as_dvec3()).as_vec3()
    }

    fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.transform_vector3(v.as_dvec3()).as_vec3()
    }
}
