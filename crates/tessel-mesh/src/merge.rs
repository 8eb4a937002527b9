//! Appending one mesh onto another.
//!
//! The destination decides which channels receive data: a channel the
//! destination does not track drops the source's data, and a channel the
//! source does not track is zero-filled in the destination. Source and
//! destination never share storage afterwards.

use std::ops::Range;

use glam::Vec3;

use crate::color::multiply_rgba;
use crate::custom::CustomChannel;
use crate::mesh_data::{DrawMode, MeshData};
use crate::render_pass::RenderPass;

impl MeshData {
    /// Appends every vertex, index, face entry and custom value of `source`.
    ///
    /// Source indices are shifted by one past the last index already in this
    /// mesh (by draw mode, see [`next_index_base`](Self::next_index_base)),
    /// or by zero when this mesh has no indices yet.
    pub fn add_mesh_data(&mut self, source: &MeshData) {
        let base = self.next_index_base();

        self.append_vertices(source, 0..source.vertices_count, Vec3::ZERO, None);
        self.append_shifted_indices(source.indices(), base);
        self.append_face_entries(source);
        self.append_custom_values(source, None);

        tracing::trace!(
            vertices = source.vertices_count,
            indices = source.indices_count,
            "merged mesh"
        );
    }

    /// Appends `source` with every position moved by `offset` and every color
    /// multiplied per channel by `light / 255`.
    ///
    /// Source indices are shifted by this mesh's vertex count before the merge.
    pub fn add_mesh_data_offset(&mut self, source: &MeshData, offset: Vec3, light: [u8; 4]) {
        let Ok(base) = u32::try_from(self.vertices_count) else {
            panic!("vertex count {} exceeds the u32 index range", self.vertices_count);
        };

        self.append_vertices(source, 0..source.vertices_count, offset, Some(light));
        self.append_shifted_indices(source.indices(), base);
        self.append_face_entries(source);
        self.append_custom_values(source, None);
    }

    /// Appends only the quads of `source` whose render pass matches `pass`.
    ///
    /// The source is walked in quads of 4 vertices and 6 indices; quad `q`
    /// belongs to the render pass stored for face `q`. Faces without an entry,
    /// and faces stored as `-1`, count as [`RenderPass::Opaque`]. Kept quads'
    /// indices are renumbered so they reference the copied vertices; a source
    /// index must not point below its own quad's first vertex.
    pub fn add_mesh_data_filtered(&mut self, source: &MeshData, pass: RenderPass) {
        let quads = source.quad_count();
        let source_indices = source.indices();
        let mut kept = 0;

        for quad in 0..quads {
            if !pass.accepts(source.render_pass_of(quad)) {
                continue;
            }

            let quad_base = self.vertices_count;
            let first_vertex = quad * 4;
            self.append_vertices(source, first_vertex..first_vertex + 4, Vec3::ZERO, None);
            self.append_custom_values(source, Some(first_vertex..first_vertex + 4));
            self.copy_face_entry(source, quad);

            assert!(
                source_indices.len() >= quad * 6 + 6,
                "quad {quad} has no full set of 6 indices ({} in source)",
                source_indices.len()
            );
            for &index in &source_indices[quad * 6..quad * 6 + 6] {
                let renumbered = quad_base as i64 + i64::from(index) - first_vertex as i64;
                let Ok(renumbered) = u32::try_from(renumbered) else {
                    panic!(
                        "quad {quad} references vertex {index} outside its own quad \
                         (renumbered to {renumbered})"
                    );
                };
                self.add_index(renumbered);
            }
            kept += 1;
        }

        tracing::debug!(
            ?pass,
            kept,
            skipped = quads - kept,
            vertices = self.vertices_count,
            "filtered merge"
        );
    }

    /// First index value for geometry appended after the current indices:
    /// one past the last index for triangles, one past the second-to-last
    /// for line modes, `0` when there are no indices.
    pub fn next_index_base(&self) -> u32 {
        if self.indices_count == 0 {
            return 0;
        }
        let slot = match self.draw_mode {
            DrawMode::Triangles => self.indices_count - 1,
            DrawMode::Lines | DrawMode::LineStrip => self.indices_count.saturating_sub(2),
        };
        self.indices[slot] + 1
    }

    fn append_vertices(
        &mut self,
        source: &MeshData,
        range: Range<usize>,
        offset: Vec3,
        light: Option<[u8; 4]>,
    ) {
        let n = range.len();
        if n == 0 {
            return;
        }
        self.reserve_vertices(n);
        let at = self.vertices_count;
        let end = at + n;

        let src = &source.positions[range.start * 3..range.end * 3];
        for (dst, src) in self.positions[at * 3..end * 3]
            .chunks_exact_mut(3)
            .zip(src.chunks_exact(3))
        {
            dst[0] = src[0] + offset.x;
            dst[1] = src[1] + offset.y;
            dst[2] = src[2] + offset.z;
        }

        copy_channel(&mut self.uv, &source.uv, 2, at, range.clone());
        copy_channel(&mut self.rgba, &source.rgba, 4, at, range.clone());
        copy_channel(&mut self.flags, &source.flags, 1, at, range.clone());

        if let (Some(light), Some(rgba)) = (light, self.rgba.as_mut()) {
            for color in rgba[at * 4..end * 4].chunks_exact_mut(4) {
                let lit = multiply_rgba([color[0], color[1], color[2], color[3]], light);
                color.copy_from_slice(&lit);
            }
        }

        if let Some(normals) = self.normals.as_mut() {
            if normals.len() < end {
                normals.resize(end.max(self.positions.len() / 3), 0);
            }
            let src = source.normals.as_deref().unwrap_or_default();
            for (dst, i) in normals[at..end].iter_mut().zip(range) {
                *dst = src.get(i).copied().unwrap_or_default();
            }
            self.normals_count = end;
        }

        self.vertices_count = end;
    }

    fn append_shifted_indices(&mut self, indices: &[u32], base: u32) {
        self.ensure_index_room(indices.len());
        for &index in indices {
            self.add_index(index + base);
        }
    }

    fn append_face_entries(&mut self, source: &MeshData) {
        let faces = source
            .xyz_faces_count
            .max(source.color_map_ids_count)
            .max(source.render_pass_count);
        for face in 0..faces {
            self.copy_face_entry(source, face);
        }
    }

    /// Copies whichever of face `face`'s entries the source has and this mesh tracks.
    fn copy_face_entry(&mut self, source: &MeshData, face: usize) {
        if self.xyz_faces.is_some() {
            if let Some(&facing) = source.xyz_faces().and_then(|f| f.get(face)) {
                self.add_xyz_face(facing);
            }
        }
        if self.climate_color_map_ids.is_some() && self.season_color_map_ids.is_some() {
            let climate = source.climate_color_map_ids().and_then(|ids| ids.get(face));
            let season = source.season_color_map_ids().and_then(|ids| ids.get(face));
            if let (Some(&climate), Some(&season)) = (climate, season) {
                self.add_color_map_index(climate, season);
            }
        }
        if self.render_passes.is_some() {
            if let Some(&pass) = source.render_passes().and_then(|p| p.get(face)) {
                self.add_render_pass(pass);
            }
        }
    }

    fn append_custom_values(&mut self, source: &MeshData, vertices: Option<Range<usize>>) {
        merge_custom(&mut self.custom_floats, &source.custom_floats, vertices.clone());
        merge_custom(&mut self.custom_ints, &source.custom_ints, vertices.clone());
        merge_custom(&mut self.custom_shorts, &source.custom_shorts, vertices.clone());
        merge_custom(&mut self.custom_bytes, &source.custom_bytes, vertices);
    }
}

/// Copies `range` of a per-vertex channel with `stride` components into the
/// destination at vertex `at`, zero-filling when the source lacks the channel.
fn copy_channel<T: Copy + Default>(
    dest: &mut Option<Vec<T>>,
    source: &Option<Vec<T>>,
    stride: usize,
    at: usize,
    range: Range<usize>,
) {
    let Some(dest) = dest.as_mut() else {
        return;
    };
    let target = &mut dest[at * stride..(at + range.len()) * stride];
    match source {
        Some(src) => target.copy_from_slice(&src[range.start * stride..range.end * stride]),
        None => target.fill(T::default()),
    }
}

/// Appends a custom channel's values: all of them, or only those of `vertices`
/// picked out by the channel's values-per-vertex.
fn merge_custom<T: Copy + Default>(
    dest: &mut Option<CustomChannel<T>>,
    source: &Option<CustomChannel<T>>,
    vertices: Option<Range<usize>>,
) {
    let (Some(dest), Some(source)) = (dest.as_mut(), source.as_ref()) else {
        return;
    };
    match vertices {
        None => dest.add_slice(source.values()),
        Some(range) => {
            let per_vertex = source.values_per_vertex();
            let end = range.end * per_vertex;
            assert!(
                source.count() >= end,
                "custom channel holds {} values, vertices up to {} need {end}",
                source.count(),
                range.end
            );
            dest.add_slice(&source.values()[range.start * per_vertex..end]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshLayout;

    #[test]
    fn test_next_index_base_by_draw_mode() {
        let mut mesh = MeshData::new();
        assert_eq!(mesh.next_index_base(), 0);

        mesh.add_indices(&[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.next_index_base(), 4);

        let mut lines = MeshData::new().with_draw_mode(DrawMode::Lines);
        lines.add_indices(&[0, 1, 1, 2, 2, 0]);
        assert_eq!(lines.next_index_base(), 3);
    }

    #[test]
    fn test_copy_channel_zero_fills_missing_source() {
        let mut dest = Some(vec![7u8; 8]);
        copy_channel(&mut dest, &None, 4, 1, 0..1);
        assert_eq!(dest, Some(vec![7, 7, 7, 7, 0, 0, 0, 0]));
    }

    #[test]
    fn test_offset_merge_moves_lights_and_renumbers() {
        let mut source = MeshData::with_capacity(4, 6, MeshLayout::default());
        for p in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y] {
            source.add_vertex(p, [255, 128, 0, 255]);
        }
        source.add_quad_indices([0, 1, 2, 0, 2, 3]);

        let mut dest = source.clone();
        dest.add_mesh_data_offset(&source, Vec3::new(0.0, 0.0, 2.0), [255, 0, 255, 255]);

        assert_eq!(dest.vertices_count(), 8);
        assert_eq!(dest.position(5), Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(dest.rgba(4), Some([255, 0, 0, 255]));
        assert_eq!(dest.rgba(0), Some([255, 128, 0, 255]));
        assert_eq!(&dest.indices()[6..], &[4, 5, 6, 4, 6, 7]);
    }
}
