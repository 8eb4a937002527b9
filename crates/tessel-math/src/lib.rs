//! Vector encodings and transform math shared by the mesh buffer: packed normals,
//! cardinal facings, and model transform matrices.

mod facing;
mod matrix;
mod model_transform;
mod packed_normal;

pub use facing::Facing;
pub use matrix::MeshTransform;
pub use model_transform::{ModelTransform, rotation_xyz};
pub use packed_normal::{
    NORMAL_AXIS_BITS, NORMAL_W_MASK, NORMAL_XYZ_MASK, pack_normal, packed_w_bits, unpack_normal,
};
