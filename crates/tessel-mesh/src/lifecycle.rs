//! Clearing, compaction and memory accounting.

use std::mem;

use crate::custom::CustomChannel;
use crate::mesh_data::MeshData;

impl MeshData {
    /// Zeroes every logical count, custom channels included. Backing arrays
    /// keep their size so the mesh can be refilled without reallocating.
    pub fn clear(&mut self) {
        self.vertices_count = 0;
        self.normals_count = 0;
        self.indices_count = 0;
        self.xyz_faces_count = 0;
        self.color_map_ids_count = 0;
        self.render_pass_count = 0;
        for_each_custom(self, |c| c.clear(), |c| c.clear(), |c| c.clear(), |c| c.clear());
    }

    /// Reallocates every tracked channel to exactly its logical size.
    ///
    /// Normals keep `max(vertices, normals)` entries so every vertex still has one.
    pub fn compact_buffers(&mut self) {
        let before = self.size_in_bytes();
        let vertices = self.vertices_count;

        shrink(&mut self.positions, vertices * 3);
        if let Some(uv) = self.uv.as_mut() {
            shrink(uv, vertices * 2);
        }
        if let Some(rgba) = self.rgba.as_mut() {
            shrink(rgba, vertices * 4);
        }
        if let Some(flags) = self.flags.as_mut() {
            shrink(flags, vertices);
        }
        if let Some(normals) = self.normals.as_mut() {
            let used = vertices.max(self.normals_count).min(normals.len());
            shrink(normals, used);
        }
        shrink(&mut self.indices, self.indices_count);

        if let Some(faces) = self.xyz_faces.as_mut() {
            shrink(faces, self.xyz_faces_count);
        }
        if let Some(ids) = self.climate_color_map_ids.as_mut() {
            shrink(ids, self.color_map_ids_count);
        }
        if let Some(ids) = self.season_color_map_ids.as_mut() {
            shrink(ids, self.color_map_ids_count);
        }
        if let Some(passes) = self.render_passes.as_mut() {
            shrink(passes, self.render_pass_count);
        }
        for_each_custom(self, |c| c.compact(), |c| c.compact(), |c| c.compact(), |c| c.compact());

        tracing::debug!(before, after = self.size_in_bytes(), "compacted mesh");
    }

    /// Allocated bytes across every tracked channel. Counts backing length,
    /// not logical size.
    pub fn size_in_bytes(&self) -> usize {
        fn bytes<T>(channel: Option<&Vec<T>>) -> usize {
            channel.map_or(0, |v| v.len() * mem::size_of::<T>())
        }

        bytes(Some(&self.positions))
            + bytes(self.normals.as_ref())
            + bytes(self.uv.as_ref())
            + bytes(self.rgba.as_ref())
            + bytes(self.flags.as_ref())
            + bytes(Some(&self.indices))
            + bytes(self.xyz_faces.as_ref())
            + bytes(self.climate_color_map_ids.as_ref())
            + bytes(self.season_color_map_ids.as_ref())
            + bytes(self.render_passes.as_ref())
            + self.custom_floats.as_ref().map_or(0, CustomChannel::size_in_bytes)
            + self.custom_ints.as_ref().map_or(0, CustomChannel::size_in_bytes)
            + self.custom_shorts.as_ref().map_or(0, CustomChannel::size_in_bytes)
            + self.custom_bytes.as_ref().map_or(0, CustomChannel::size_in_bytes)
    }
}

fn shrink<T>(channel: &mut Vec<T>, len: usize) {
    channel.truncate(len);
    channel.shrink_to_fit();
}

fn for_each_custom(
    mesh: &mut MeshData,
    floats: impl FnOnce(&mut CustomChannel<f32>),
    ints: impl FnOnce(&mut CustomChannel<i32>),
    shorts: impl FnOnce(&mut CustomChannel<i16>),
    bytes: impl FnOnce(&mut CustomChannel<u8>),
) {
    if let Some(c) = mesh.custom_floats.as_mut() {
        floats(c);
    }
    if let Some(c) = mesh.custom_ints.as_mut() {
        ints(c);
    }
    if let Some(c) = mesh.custom_shorts.as_mut() {
        shorts(c);
    }
    if let Some(c) = mesh.custom_bytes.as_mut() {
        bytes(c);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::custom::Interleave;
    use crate::mesh_data::MeshLayout;

    fn quad_mesh() -> MeshData {
        let mut mesh = MeshData::with_capacity(16, 24, MeshLayout::ALL)
            .with_xyz_faces()
            .with_render_passes()
            .with_custom_floats(CustomChannel::new(32, Interleave::Stride(2)));
        for (i, p) in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y]
            .into_iter()
            .enumerate()
        {
            mesh.add_vertex_with_flags(p, Vec2::new(p.x, p.y), [255; 4], i as u32);
            mesh.add_normal(Vec3::Z);
        }
        mesh.add_quad_indices([0, 1, 2, 0, 2, 3]);
        mesh.add_xyz_face(3);
        mesh.add_render_pass(0);
        if let Some(custom) = mesh.custom_floats_mut() {
            custom.add_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        }
        mesh
    }

    #[test]
    fn test_clone_is_deep_and_keeps_capacity() {
        let original = quad_mesh();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_eq!(copy.vertex_capacity(), 16);

        copy.translate(Vec3::ONE);
        assert_eq!(original.position(0), Vec3::ZERO);
        assert_eq!(copy.position(0), Vec3::ONE);
    }

    #[test]
    fn test_clear_zeroes_counts_and_keeps_storage() {
        let mut mesh = quad_mesh();
        let bytes = mesh.size_in_bytes();
        mesh.clear();

        assert!(mesh.is_empty());
        assert_eq!(mesh.normals_count(), 0);
        assert_eq!(mesh.xyz_faces_count(), 0);
        assert_eq!(mesh.render_pass_count(), 0);
        assert_eq!(mesh.custom_floats().map(CustomChannel::count), Some(0));
        assert_eq!(mesh.size_in_bytes(), bytes);
    }

    #[test]
    fn test_compact_sizes_exactly_and_preserves_data() {
        let mut mesh = quad_mesh();
        let positions = mesh.positions().to_vec();
        let uvs = mesh.uvs().map(<[f32]>::to_vec);
        let normals = mesh.normals().map(<[u32]>::to_vec);
        let indices = mesh.indices().to_vec();

        mesh.compact_buffers();

        assert_eq!(mesh.vertex_capacity(), mesh.vertices_count());
        assert_eq!(mesh.index_capacity(), mesh.indices_count());
        assert_eq!(mesh.xyz_faces.as_ref().map(Vec::len), Some(1));
        assert_eq!(mesh.render_passes.as_ref().map(Vec::len), Some(1));
        assert_eq!(mesh.custom_floats().map(CustomChannel::capacity), Some(8));
        assert_eq!(mesh.positions(), positions.as_slice());
        assert_eq!(mesh.uvs().map(<[f32]>::to_vec), uvs);
        assert_eq!(mesh.normals().map(<[u32]>::to_vec), normals);
        assert_eq!(mesh.indices(), indices.as_slice());

        // A second pass changes nothing.
        let snapshot = mesh.clone();
        mesh.compact_buffers();
        assert_eq!(mesh, snapshot);
    }

    #[test]
    fn test_size_in_bytes_counts_backing_length() {
        let mesh = MeshData::with_capacity(4, 6, MeshLayout::POSITIONS_ONLY);
        assert_eq!(mesh.size_in_bytes(), 4 * 3 * 4 + 6 * 4);

        let mut full = MeshData::with_capacity(4, 6, MeshLayout::ALL);
        let empty = full.size_in_bytes();
        // uv, rgba, flags and normals on top of positions and indices.
        assert_eq!(empty, 48 + 24 + 32 + 16 + 16 + 16);
        full.add_xyz_face(1);
        assert_eq!(full.size_in_bytes(), empty + 32);
    }

    #[test]
    fn test_compact_empty_mesh_releases_everything() {
        let mut mesh = MeshData::with_capacity(64, 96, MeshLayout::ALL);
        mesh.compact_buffers();
        assert_eq!(mesh.size_in_bytes(), 0);
        assert!(mesh.uvs().is_some(), "channels stay tracked");
    }
}
