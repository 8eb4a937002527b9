//! Growable multi-channel mesh buffer: parallel vertex attribute channels with
//! explicit capacity, per-face metadata, mesh merging (plain and filtered by
//! render pass), and in-place matrix transforms that keep packed normals and
//! face facings consistent with the moved geometry.

pub mod async_tessellate;
pub mod color;
pub mod custom;
mod growth;
mod lifecycle;
mod merge;
pub mod mesh_data;
mod mutators;
pub mod render_pass;
mod transform;
pub mod validate;
pub mod vertex_flags;


pub use async_tessellate::{
    TessellationError, TessellationJob, TessellationPipeline, TessellationResult, TessellationTask,
};
pub use color::{pack_rgba, unpack_rgba};
pub use custom::{CustomChannel, Interleave};
pub use growth::{FACE_CHANNEL_GROWTH, MIN_INDEX_CAPACITY, MIN_VERTEX_CAPACITY};
pub use mesh_data::{DrawMode, MeshData, MeshLayout, UploadHints, VboOffsets};
pub use render_pass::RenderPass;
pub use transform::TexRect;
pub use validate::MeshError;
pub use vertex_flags::VertexFlags;

pub use tessel_math::{Facing, MeshTransform, ModelTransform};
