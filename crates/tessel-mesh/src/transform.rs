//! In-place geometric transforms.
//!
//! One generic engine serves both matrix precisions. Besides positions it
//! reorients packed normals, the coarse normal in each flags word, and the
//! per-face facing bytes, so all of them stay consistent with the geometry.

use glam::{DMat4, Mat4, Vec3};
use tessel_math::{
    Facing, MeshTransform, ModelTransform, NORMAL_W_MASK, pack_normal, rotation_xyz, unpack_normal,
};

use crate::mesh_data::MeshData;
use crate::vertex_flags::VertexFlags;

/// A sub-rectangle of texture space that unit UVs are mapped into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexRect {
    /// Left edge; unit u = 0 maps here.
    pub x1: f32,
    /// Top edge; unit v = 0 maps here.
    pub y1: f32,
    /// Right edge; unit u = 1 maps here.
    pub x2: f32,
    /// Bottom edge; unit v = 1 maps here.
    pub y2: f32,
}

impl TexRect {
    /// Rectangle spanning `(x1, y1)` to `(x2, y2)`.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal extent, `x2 - x1`.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Vertical extent, `y2 - y1`.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

impl MeshData {
    /// Applies `matrix` to every vertex in use, about `origin` if given.
    ///
    /// - positions: `m * (p - origin) + origin`
    /// - packed normals: transformed as directions and renormalized; the two
    ///   w bits are kept
    /// - flags normals: transformed as directions and renormalized; all other
    ///   flag bits are kept, and an all-zero normal stays zero
    /// - facing bytes: the facing's normal is transformed and snapped back to
    ///   the nearest facing; `0` and out-of-range bytes are left alone
    pub fn apply_transform<M: MeshTransform>(&mut self, matrix: &M, origin: Option<Vec3>) -> &mut Self {
        let origin = origin.unwrap_or(Vec3::ZERO);
        let n = self.vertices_count;

        for p in self.positions[..n * 3].chunks_exact_mut(3) {
            let moved = matrix.transform_point(Vec3::new(p[0], p[1], p[2]) - origin) + origin;
            p.copy_from_slice(&moved.to_array());
        }

        if let Some(normals) = self.normals.as_mut() {
            let used = n.max(self.normals_count).min(normals.len());
            for packed in &mut normals[..used] {
                let turned = matrix.transform_vector(unpack_normal(*packed)).normalize_or_zero();
                *packed = pack_normal(turned) | (*packed & NORMAL_W_MASK);
            }
        }

        if let Some(flags) = self.flags.as_mut() {
            for word in &mut flags[..n] {
                let current = VertexFlags(*word);
                let turned = matrix.transform_vector(current.normal());
                if turned.length_squared() > 0.0 {
                    *word = current.with_normal(turned.normalize()).0;
                }
            }
        }

        if let Some(faces) = self.xyz_faces.as_mut() {
            for face in &mut faces[..self.xyz_faces_count] {
                if let Some(facing) = Facing::from_mesh_data_index(*face) {
                    let turned = matrix.transform_vector(facing.normal());
                    *face = Facing::from_vector(turned).mesh_data_index();
                }
            }
        }

        self
    }

    /// Moves every position by `offset`. Directions are unaffected.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        let n = self.vertices_count;
        for p in self.positions[..n * 3].chunks_exact_mut(3) {
            p[0] += offset.x;
            p[1] += offset.y;
            p[2] += offset.z;
        }
        self
    }

    /// Rotates about `origin` by the given radians, X first, then Y, then Z.
    pub fn rotate(&mut self, origin: Vec3, rad_x: f32, rad_y: f32, rad_z: f32) -> &mut Self {
        let matrix = rotation_xyz(Vec3::new(rad_x, rad_y, rad_z));
        self.apply_transform(&matrix, Some(origin))
    }

    /// Scales positions about `origin`. Directions are left as they are.
    pub fn scale(&mut self, origin: Vec3, sx: f32, sy: f32, sz: f32) -> &mut Self {
        let factor = Vec3::new(sx, sy, sz);
        let n = self.vertices_count;
        for p in self.positions[..n * 3].chunks_exact_mut(3) {
            let scaled = (Vec3::new(p[0], p[1], p[2]) - origin) * factor + origin;
            p.copy_from_slice(&scaled.to_array());
        }
        self
    }

    /// Applies a composed model transform. The identity transform is a no-op.
    pub fn model_transform(&mut self, transform: &ModelTransform) -> &mut Self {
        if transform.is_identity() {
            return self;
        }
        self.apply_transform(&transform.matrix(), None)
    }

    /// Applies an arbitrary single-precision matrix.
    pub fn matrix_transform(&mut self, matrix: &Mat4) -> &mut Self {
        self.apply_transform(matrix, None)
    }

    /// Applies an arbitrary single-precision matrix about `origin`.
    pub fn matrix_transform_about(&mut self, matrix: &Mat4, origin: Vec3) -> &mut Self {
        self.apply_transform(matrix, Some(origin))
    }

    /// Applies a double-precision matrix. Every channel the single-precision
    /// path touches is transformed here as well.
    pub fn matrix_transform_f64(&mut self, matrix: &DMat4) -> &mut Self {
        self.apply_transform(matrix, None)
    }

    /// Maps every unit UV in use into `rect`.
    pub fn set_tex_pos(&mut self, rect: &TexRect) -> &mut Self {
        let n = self.vertices_count;
        if let Some(uv) = self.uv.as_mut() {
            for t in uv[..n * 2].chunks_exact_mut(2) {
                t[0] = rect.x1 + t[0] * rect.width();
                t[1] = rect.y1 + t[1] * rect.height();
            }
        }
        self
    }

    /// Builder form of [`set_tex_pos`](Self::set_tex_pos).
    pub fn with_tex_pos(mut self, rect: &TexRect) -> Self {
        self.set_tex_pos(rect);
        self
    }
}
