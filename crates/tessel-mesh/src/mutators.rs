//! Point-of-use appenders and removers.
//!
//! Every appender checks the capacity of the channels it writes, grows them if
//! needed, writes at the logical count and bumps it. Vertex appenders skip
//! optional channels the mesh does not track and write zero into tracked
//! channels they have no value for. Single-channel appenders panic when their
//! channel is not tracked.

use glam::{Vec2, Vec3};
use tessel_math::{Facing, pack_normal};

use crate::growth::ensure_face_room;
use crate::mesh_data::MeshData;

impl MeshData {
    /// Appends a vertex with a color and no texture coordinate.
    pub fn add_vertex(&mut self, position: Vec3, color: [u8; 4]) {
        self.push_vertex(position, None, Some(color), None);
    }

    /// Appends a vertex with a texture coordinate and no color.
    pub fn add_vertex_uv(&mut self, position: Vec3, uv: Vec2) {
        self.push_vertex(position, Some(uv), None, None);
    }

    /// Appends a vertex with a texture coordinate and a color.
    pub fn add_vertex_uv_color(&mut self, position: Vec3, uv: Vec2, color: [u8; 4]) {
        self.push_vertex(position, Some(uv), Some(color), None);
    }

    /// Appends a vertex with every per-vertex attribute.
    pub fn add_vertex_with_flags(&mut self, position: Vec3, uv: Vec2, color: [u8; 4], flags: u32) {
        self.push_vertex(position, Some(uv), Some(color), Some(flags));
    }

    pub(crate) fn push_vertex(
        &mut self,
        position: Vec3,
        uv: Option<Vec2>,
        color: Option<[u8; 4]>,
        flags: Option<u32>,
    ) {
        self.ensure_vertex_room();
        let i = self.vertices_count;

        self.positions[i * 3..i * 3 + 3].copy_from_slice(&position.to_array());
        if let Some(channel) = self.uv.as_mut() {
            channel[i * 2..i * 2 + 2].copy_from_slice(&uv.unwrap_or_default().to_array());
        }
        if let Some(channel) = self.rgba.as_mut() {
            channel[i * 4..i * 4 + 4].copy_from_slice(&color.unwrap_or_default());
        }
        if let Some(channel) = self.flags.as_mut() {
            channel[i] = flags.unwrap_or_default();
        }

        self.vertices_count += 1;
    }

    /// Appends a packed normal for a unit vector.
    ///
    /// # Panics
    ///
    /// Panics if the mesh does not track normals.
    pub fn add_normal(&mut self, normal: Vec3) {
        self.push_packed_normal(pack_normal(normal));
    }

    /// Appends the packed normal of a cardinal facing.
    ///
    /// # Panics
    ///
    /// Panics if the mesh does not track normals.
    pub fn add_normal_facing(&mut self, facing: Facing) {
        self.push_packed_normal(facing.packed_normal());
    }

    pub(crate) fn push_packed_normal(&mut self, packed: u32) {
        self.ensure_normal_room();
        let Some(normals) = self.normals.as_mut() else {
            panic!("add_normal on a mesh without a normal channel");
        };
        normals[self.normals_count] = packed;
        self.normals_count += 1;
    }

    /// Appends one index.
    pub fn add_index(&mut self, index: u32) {
        self.ensure_index_room(1);
        self.indices[self.indices_count] = index;
        self.indices_count += 1;
    }

    /// Appends the six indices of a quad drawn as two triangles.
    pub fn add_quad_indices(&mut self, indices: [u32; 6]) {
        self.add_indices(&indices);
    }

    /// Appends a run of indices with at most one growth.
    pub fn add_indices(&mut self, indices: &[u32]) {
        self.ensure_index_room(indices.len());
        let end = self.indices_count + indices.len();
        self.indices[self.indices_count..end].copy_from_slice(indices);
        self.indices_count = end;
    }

    /// Appends a face-direction byte (`0` = none, `1..=6` = a [`Facing`]).
    ///
    /// # Panics
    ///
    /// Panics if the mesh does not track face directions.
    pub fn add_xyz_face(&mut self, face: u8) {
        let count = self.xyz_faces_count;
        let Some(faces) = self.xyz_faces.as_mut() else {
            panic!("add_xyz_face on a mesh without a face-direction channel");
        };
        ensure_face_room(faces, count);
        faces[count] = face;
        self.xyz_faces_count += 1;
    }

    /// Appends a climate/season color map id pair.
    ///
    /// # Panics
    ///
    /// Panics if the mesh does not track color maps.
    pub fn add_color_map_index(&mut self, climate: u8, season: u8) {
        let count = self.color_map_ids_count;
        let (Some(climates), Some(seasons)) = (
            self.climate_color_map_ids.as_mut(),
            self.season_color_map_ids.as_mut(),
        ) else {
            panic!("add_color_map_index on a mesh without color map channels");
        };
        ensure_face_room(climates, count);
        ensure_face_room(seasons, count);
        climates[count] = climate;
        seasons[count] = season;
        self.color_map_ids_count += 1;
    }

    /// Appends a raw render pass id (`-1` = unassigned).
    ///
    /// # Panics
    ///
    /// Panics if the mesh does not track render passes.
    pub fn add_render_pass(&mut self, pass: i16) {
        let count = self.render_pass_count;
        let Some(passes) = self.render_passes.as_mut() else {
            panic!("add_render_pass on a mesh without a render pass channel");
        };
        ensure_face_room(passes, count);
        passes[count] = pass;
        self.render_pass_count += 1;
    }

    /// Drops the last index. Saturates at zero.
    pub fn remove_index(&mut self) {
        self.indices_count = self.indices_count.saturating_sub(1);
    }

    /// Drops the last vertex. Saturates at zero.
    pub fn remove_vertex(&mut self) {
        self.remove_vertices(1);
    }

    /// Drops the last `n` vertices. Saturates at zero.
    pub fn remove_vertices(&mut self, n: usize) {
        self.vertices_count = self.vertices_count.saturating_sub(n);
    }
}
