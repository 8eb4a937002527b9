//! The mesh buffer store: channel layout, construction and read access.
//!
//! Every channel is a backing array sized to a capacity, paired with a logical
//! count of entries in use. Four counting axes exist:
//!
//! | Axis         | Channels                                               |
//! |--------------|--------------------------------------------------------|
//! | vertices     | positions (3), uv (2), rgba (4), flags (1)             |
//! | normals      | packed normals (1), grown separately from vertices     |
//! | indices      | indices (1)                                            |
//! | faces        | xyz faces, climate/season color map ids, render passes |
//!
//! An optional channel that is `None` is not tracked for this mesh; every
//! operation skips it.

use glam::{Vec2, Vec3};

use crate::custom::CustomChannel;

/// How the index buffer is assembled into primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Every three indices form a triangle.
    #[default]
    Triangles,
    /// Every two indices form a line.
    Lines,
    /// Indices form a connected strip of lines.
    LineStrip,
}

/// Selects which optional channels [`MeshData::with_capacity`] allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshLayout {
    /// Packed normals, one word per vertex.
    pub normals: bool,
    /// Texture coordinates, two floats per vertex.
    pub uv: bool,
    /// Vertex colors, four bytes per vertex.
    pub rgba: bool,
    /// Render flags, one word per vertex.
    pub flags: bool,
    /// Per-face facing bytes.
    pub xyz_faces: bool,
    /// Per-face climate and season color map ids.
    pub color_maps: bool,
    /// Per-face render pass ids.
    pub render_passes: bool,
}

impl MeshLayout {
    /// Positions and indices only.
    pub const POSITIONS_ONLY: Self = Self {
        normals: false,
        uv: false,
        rgba: false,
        flags: false,
        xyz_faces: false,
        color_maps: false,
        render_passes: false,
    };

    /// Every optional channel.
    pub const ALL: Self = Self {
        normals: true,
        uv: true,
        rgba: true,
        flags: true,
        xyz_faces: true,
        color_maps: true,
        render_passes: true,
    };
}

impl Default for MeshLayout {
    /// uv, rgba and flags plus empty face channels; no normals.
    fn default() -> Self {
        Self {
            normals: false,
            ..Self::ALL
        }
    }
}

/// GPU usage hints read by the upload side. Plain data, no invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadHints {
    /// Positions rarely change.
    pub xyz_static: bool,
    /// Texture coordinates rarely change.
    pub uv_static: bool,
    /// Colors rarely change.
    pub rgba_static: bool,
    /// Flags rarely change.
    pub flags_static: bool,
    /// Normals rarely change.
    pub normals_static: bool,
    /// Indices rarely change.
    pub indices_static: bool,
    /// Positions advance per instance rather than per vertex.
    pub xyz_instanced: bool,
    /// Texture coordinates advance per instance.
    pub uv_instanced: bool,
    /// Colors advance per instance.
    pub rgba_instanced: bool,
    /// Flags advance per instance.
    pub flags_instanced: bool,
}

impl Default for UploadHints {
    fn default() -> Self {
        Self {
            xyz_static: true,
            uv_static: true,
            rgba_static: true,
            flags_static: true,
            normals_static: true,
            indices_static: true,
            xyz_instanced: false,
            uv_instanced: false,
            rgba_instanced: false,
            flags_instanced: false,
        }
    }
}

/// Element offsets into already-uploaded GPU buffers, used for partial updates.
///
/// Each offset must not exceed its channel's backing length; see
/// [`MeshData::validate`](crate::MeshData::validate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VboOffsets {
    /// Offset into the position buffer, in floats.
    pub xyz: usize,
    /// Offset into the uv buffer, in floats.
    pub uv: usize,
    /// Offset into the color buffer, in bytes.
    pub rgba: usize,
    /// Offset into the flags buffer, in words.
    pub flags: usize,
    /// Offset into the normals buffer, in words.
    pub normals: usize,
    /// Offset into the index buffer, in indices.
    pub indices: usize,
}

/// A CPU-side mesh made of independently sized, independently optional channels.
///
/// Backing arrays are over-allocated and grow geometrically; the logical counts
/// say how much of each array is in use. Not synchronized: a mesh is mutated by
/// one thread at a time, and background tessellation gives every worker its own
/// instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub(crate) positions: Vec<f32>,
    pub(crate) normals: Option<Vec<u32>>,
    pub(crate) uv: Option<Vec<f32>>,
    pub(crate) rgba: Option<Vec<u8>>,
    pub(crate) flags: Option<Vec<u32>>,
    pub(crate) indices: Vec<u32>,

    pub(crate) xyz_faces: Option<Vec<u8>>,
    pub(crate) climate_color_map_ids: Option<Vec<u8>>,
    pub(crate) season_color_map_ids: Option<Vec<u8>>,
    pub(crate) render_passes: Option<Vec<i16>>,

    pub(crate) custom_floats: Option<CustomChannel<f32>>,
    pub(crate) custom_ints: Option<CustomChannel<i32>>,
    pub(crate) custom_shorts: Option<CustomChannel<i16>>,
    pub(crate) custom_bytes: Option<CustomChannel<u8>>,

    pub(crate) vertices_count: usize,
    pub(crate) normals_count: usize,
    pub(crate) indices_count: usize,
    pub(crate) xyz_faces_count: usize,
    pub(crate) color_map_ids_count: usize,
    pub(crate) render_pass_count: usize,

    /// Primitive assembly for the index buffer.
    pub draw_mode: DrawMode,
    /// GPU usage hints.
    pub hints: UploadHints,
    /// Partial-update offsets.
    pub offsets: VboOffsets,
}

static_assertions::assert_impl_all!(MeshData: Send, Sync, Clone);

impl MeshData {
    /// Creates a mesh with no backing arrays at all.
    ///
    /// The first append allocates the minimum capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with arrays pre-sized for `vertices` vertices and
    /// `indices` indices. Face channels selected by `layout` start empty;
    /// use [`with_xyz_faces`](Self::with_xyz_faces) and friends to pre-size them.
    pub fn with_capacity(vertices: usize, indices: usize, layout: MeshLayout) -> Self {
        Self {
            positions: vec![0.0; vertices * 3],
            normals: layout.normals.then(|| vec![0; vertices]),
            uv: layout.uv.then(|| vec![0.0; vertices * 2]),
            rgba: layout.rgba.then(|| vec![0; vertices * 4]),
            flags: layout.flags.then(|| vec![0; vertices]),
            indices: vec![0; indices],
            xyz_faces: layout.xyz_faces.then(Vec::new),
            climate_color_map_ids: layout.color_maps.then(Vec::new),
            season_color_map_ids: layout.color_maps.then(Vec::new),
            render_passes: layout.render_passes.then(Vec::new),
            ..Self::default()
        }
    }

    /// Allocates the facing channel with one slot per 4 vertices of capacity.
    pub fn with_xyz_faces(mut self) -> Self {
        self.xyz_faces = Some(vec![0; self.vertex_capacity() / 4]);
        self.xyz_faces_count = 0;
        self
    }

    /// Allocates both color map id channels with one slot per 4 vertices of capacity.
    pub fn with_color_maps(mut self) -> Self {
        let faces = self.vertex_capacity() / 4;
        self.climate_color_map_ids = Some(vec![0; faces]);
        self.season_color_map_ids = Some(vec![0; faces]);
        self.color_map_ids_count = 0;
        self
    }

    /// Allocates the render pass channel with one slot per 4 vertices of capacity.
    pub fn with_render_passes(mut self) -> Self {
        self.render_passes = Some(vec![0; self.vertex_capacity() / 4]);
        self.render_pass_count = 0;
        self
    }

    /// Attaches a custom float channel.
    pub fn with_custom_floats(mut self, channel: CustomChannel<f32>) -> Self {
        self.custom_floats = Some(channel);
        self
    }

    /// Attaches a custom int channel.
    pub fn with_custom_ints(mut self, channel: CustomChannel<i32>) -> Self {
        self.custom_ints = Some(channel);
        self
    }

    /// Attaches a custom short channel.
    pub fn with_custom_shorts(mut self, channel: CustomChannel<i16>) -> Self {
        self.custom_shorts = Some(channel);
        self
    }

    /// Attaches a custom byte channel.
    pub fn with_custom_bytes(mut self, channel: CustomChannel<u8>) -> Self {
        self.custom_bytes = Some(channel);
        self
    }

    /// Sets the draw mode.
    pub fn with_draw_mode(mut self, draw_mode: DrawMode) -> Self {
        self.draw_mode = draw_mode;
        self
    }

    // --- counts and capacities ---

    /// Number of vertices in use.
    pub fn vertices_count(&self) -> usize {
        self.vertices_count
    }

    /// Number of vertices the vertex channels can hold without growing.
    pub fn vertex_capacity(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of normals appended through [`add_normal`](Self::add_normal)
    /// or carried over by a merge.
    pub fn normals_count(&self) -> usize {
        self.normals_count
    }

    /// Number of indices in use.
    pub fn indices_count(&self) -> usize {
        self.indices_count
    }

    /// Number of indices the index channel can hold without growing.
    pub fn index_capacity(&self) -> usize {
        self.indices.len()
    }

    /// Number of facing entries in use.
    pub fn xyz_faces_count(&self) -> usize {
        self.xyz_faces_count
    }

    /// Number of color map id pairs in use.
    pub fn color_map_ids_count(&self) -> usize {
        self.color_map_ids_count
    }

    /// Number of render pass entries in use.
    pub fn render_pass_count(&self) -> usize {
        self.render_pass_count
    }

    /// Number of complete 4-vertex quads.
    pub fn quad_count(&self) -> usize {
        self.vertices_count / 4
    }

    /// Returns `true` if the mesh holds no vertices and no indices.
    pub fn is_empty(&self) -> bool {
        self.vertices_count == 0 && self.indices_count == 0
    }

    // --- per-vertex reads ---

    /// Position of vertex `i`. Panics if `i` is outside the backing array.
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    /// Texture coordinate of vertex `i`, if tracked.
    pub fn uv(&self, i: usize) -> Option<Vec2> {
        self.uv.as_ref().map(|uv| Vec2::from_slice(&uv[i * 2..i * 2 + 2]))
    }

    /// Color of vertex `i` as `[r, g, b, a]`, if tracked.
    pub fn rgba(&self, i: usize) -> Option<[u8; 4]> {
        self.rgba
            .as_ref()
            .map(|rgba| [rgba[i * 4], rgba[i * 4 + 1], rgba[i * 4 + 2], rgba[i * 4 + 3]])
    }

    /// Flags word of vertex `i`, if tracked.
    pub fn flags(&self, i: usize) -> Option<u32> {
        self.flags.as_ref().map(|flags| flags[i])
    }

    /// Packed normal of vertex `i`, if tracked.
    pub fn normal(&self, i: usize) -> Option<u32> {
        self.normals.as_ref().map(|normals| normals[i])
    }

    // --- logical slices ---

    /// Positions in use, 3 floats per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.vertices_count * 3]
    }

    /// Mutable positions in use, for tessellators adjusting geometry in place.
    pub fn positions_mut(&mut self) -> &mut [f32] {
        &mut self.positions[..self.vertices_count * 3]
    }

    /// Texture coordinates in use, 2 floats per vertex.
    pub fn uvs(&self) -> Option<&[f32]> {
        self.uv.as_deref().map(|uv| &uv[..self.vertices_count * 2])
    }

    /// Colors in use, 4 bytes per vertex.
    pub fn colors(&self) -> Option<&[u8]> {
        self.rgba.as_deref().map(|rgba| &rgba[..self.vertices_count * 4])
    }

    /// Flags words in use.
    pub fn flag_words(&self) -> Option<&[u32]> {
        self.flags.as_deref().map(|flags| &flags[..self.vertices_count])
    }

    /// Packed normals in use: the larger of the vertex and normal counts,
    /// bounded by the normal channel's capacity.
    pub fn normals(&self) -> Option<&[u32]> {
        self.normals.as_deref().map(|normals| {
            let n = self.vertices_count.max(self.normals_count).min(normals.len());
            &normals[..n]
        })
    }

    /// Indices in use.
    pub fn indices(&self) -> &[u32] {
        &self.indices[..self.indices_count]
    }

    /// Facing bytes in use.
    pub fn xyz_faces(&self) -> Option<&[u8]> {
        self.xyz_faces.as_deref().map(|f| &f[..self.xyz_faces_count])
    }

    /// Climate color map ids in use.
    pub fn climate_color_map_ids(&self) -> Option<&[u8]> {
        self.climate_color_map_ids
            .as_deref()
            .map(|ids| &ids[..self.color_map_ids_count])
    }

    /// Season color map ids in use.
    pub fn season_color_map_ids(&self) -> Option<&[u8]> {
        self.season_color_map_ids
            .as_deref()
            .map(|ids| &ids[..self.color_map_ids_count])
    }

    /// Render pass ids in use.
    pub fn render_passes(&self) -> Option<&[i16]> {
        self.render_passes
            .as_deref()
            .map(|passes| &passes[..self.render_pass_count])
    }

    /// Raw render pass id of face `face`, or `-1` when the face has no entry.
    pub fn render_pass_of(&self, face: usize) -> i16 {
        self.render_passes()
            .and_then(|passes| passes.get(face).copied())
            .unwrap_or(-1)
    }

    /// The custom float channel, if attached.
    pub fn custom_floats(&self) -> Option<&CustomChannel<f32>> {
        self.custom_floats.as_ref()
    }

    /// Mutable custom float channel, if attached.
    pub fn custom_floats_mut(&mut self) -> Option<&mut CustomChannel<f32>> {
        self.custom_floats.as_mut()
    }

    /// The custom int channel, if attached.
    pub fn custom_ints(&self) -> Option<&CustomChannel<i32>> {
        self.custom_ints.as_ref()
    }

    /// Mutable custom int channel, if attached.
    pub fn custom_ints_mut(&mut self) -> Option<&mut CustomChannel<i32>> {
        self.custom_ints.as_mut()
    }

    /// The custom short channel, if attached.
    pub fn custom_shorts(&self) -> Option<&CustomChannel<i16>> {
        self.custom_shorts.as_ref()
    }

    /// Mutable custom short channel, if attached.
    pub fn custom_shorts_mut(&mut self) -> Option<&mut CustomChannel<i16>> {
        self.custom_shorts.as_mut()
    }

    /// The custom byte channel, if attached.
    pub fn custom_bytes(&self) -> Option<&CustomChannel<u8>> {
        self.custom_bytes.as_ref()
    }

    /// Mutable custom byte channel, if attached.
    pub fn custom_bytes_mut(&mut self) -> Option<&mut CustomChannel<u8>> {
        self.custom_bytes.as_mut()
    }

    // --- byte views for GPU upload ---

    /// Positions in use as bytes (zero-copy).
    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions())
    }

    /// Texture coordinates in use as bytes.
    pub fn uv_bytes(&self) -> Option<&[u8]> {
        self.uvs().map(bytemuck::cast_slice)
    }

    /// Flags in use as bytes.
    pub fn flags_bytes(&self) -> Option<&[u8]> {
        self.flag_words().map(bytemuck::cast_slice)
    }

    /// Packed normals in use as bytes.
    pub fn normals_bytes(&self) -> Option<&[u8]> {
        self.normals().map(bytemuck::cast_slice)
    }

    /// Indices in use as bytes.
    pub fn indices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mesh_has_no_arrays() {
        let mesh = MeshData::new();
        assert_eq!(mesh.vertex_capacity(), 0);
        assert_eq!(mesh.index_capacity(), 0);
        assert!(mesh.uvs().is_none());
        assert!(mesh.colors().is_none());
        assert!(mesh.normals().is_none());
        assert!(mesh.xyz_faces().is_none());
        assert!(mesh.render_passes().is_none());
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_with_capacity_sizes_each_channel_by_its_stride() {
        let mesh = MeshData::with_capacity(8, 12, MeshLayout::ALL);
        assert_eq!(mesh.positions.len(), 24);
        assert_eq!(mesh.uv.as_ref().map(Vec::len), Some(16));
        assert_eq!(mesh.rgba.as_ref().map(Vec::len), Some(32));
        assert_eq!(mesh.flags.as_ref().map(Vec::len), Some(8));
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(8));
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.vertex_capacity(), 8);
        assert_eq!(mesh.index_capacity(), 12);
        // Face channels are present but empty until explicitly sized.
        assert_eq!(mesh.xyz_faces.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_layout_controls_channel_presence() {
        let mesh = MeshData::with_capacity(4, 6, MeshLayout::POSITIONS_ONLY);
        assert!(mesh.uv.is_none());
        assert!(mesh.rgba.is_none());
        assert!(mesh.flags.is_none());
        assert!(mesh.normals.is_none());
        assert!(mesh.xyz_faces.is_none());
        assert!(mesh.climate_color_map_ids.is_none());
        assert!(mesh.render_passes.is_none());
    }

    #[test]
    fn test_face_channel_builders_size_per_quad() {
        let mesh = MeshData::with_capacity(16, 24, MeshLayout::default())
            .with_xyz_faces()
            .with_color_maps()
            .with_render_passes();
        assert_eq!(mesh.xyz_faces.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.climate_color_map_ids.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.season_color_map_ids.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.render_passes.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.xyz_faces_count(), 0);
    }

    #[test]
    fn test_render_pass_of_missing_entry_is_unassigned() {
        let mesh = MeshData::with_capacity(4, 6, MeshLayout::POSITIONS_ONLY);
        assert_eq!(mesh.render_pass_of(0), -1);
    }

    #[test]
    fn test_default_hints_are_static_and_not_instanced() {
        let hints = UploadHints::default();
        assert!(hints.xyz_static && hints.indices_static);
        assert!(!hints.xyz_instanced && !hints.rgba_instanced);
        assert_eq!(VboOffsets::default().xyz, 0);
    }
}
