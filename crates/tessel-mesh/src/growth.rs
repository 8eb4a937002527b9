//! Capacity growth for every channel.
//!
//! Vertex and index channels double; normals double on their own axis; face
//! channels grow additively. No growth call ever shrinks a channel.

use crate::mesh_data::MeshData;

/// Vertex capacity allocated by the first growth of an empty mesh.
pub const MIN_VERTEX_CAPACITY: usize = 4;

/// Index capacity allocated by the first growth of an empty mesh.
pub const MIN_INDEX_CAPACITY: usize = 6;

/// Entries added to a face channel each time it fills up.
pub const FACE_CHANNEL_GROWTH: usize = 32;

impl MeshData {
    /// Doubles the vertex capacity of positions, uv, rgba and flags.
    ///
    /// Normals are not touched; see [`grow_normals_buffer`](Self::grow_normals_buffer).
    pub fn grow_vertex_buffer(&mut self) {
        let capacity = (self.vertex_capacity() * 2).max(MIN_VERTEX_CAPACITY);
        self.resize_vertex_channels(capacity);
    }

    /// Grows the vertex channels so `additional` more vertices fit, to at
    /// least double the current capacity.
    pub fn reserve_vertices(&mut self, additional: usize) {
        let needed = self.vertices_count + additional;
        if needed <= self.vertex_capacity() {
            return;
        }
        let capacity = needed
            .max(self.vertex_capacity() * 2)
            .max(MIN_VERTEX_CAPACITY);
        self.resize_vertex_channels(capacity);
    }

    /// Doubles the normal channel. No-op when normals are not tracked.
    pub fn grow_normals_buffer(&mut self) {
        if let Some(normals) = self.normals.as_mut() {
            let capacity = (normals.len() * 2).max(MIN_VERTEX_CAPACITY);
            tracing::trace!(from = normals.len(), to = capacity, "grew normal buffer");
            normals.resize(capacity, 0);
        }
    }

    /// Doubles the index capacity.
    pub fn grow_index_buffer(&mut self) {
        let capacity = (self.indices.len() * 2).max(MIN_INDEX_CAPACITY);
        self.resize_index_channel(capacity);
    }

    /// Grows the index channel to `max(2 * count, count + hint)` so a bulk
    /// append of `hint` indices needs a single reallocation.
    pub fn grow_index_buffer_by(&mut self, hint: usize) {
        let capacity = (self.indices_count * 2)
            .max(self.indices_count + hint)
            .max(self.indices.len())
            .max(MIN_INDEX_CAPACITY);
        self.resize_index_channel(capacity);
    }

    pub(crate) fn ensure_vertex_room(&mut self) {
        if self.vertices_count >= self.vertex_capacity() {
            self.grow_vertex_buffer();
        }
    }

    pub(crate) fn ensure_normal_room(&mut self) {
        let full = self
            .normals
            .as_ref()
            .is_some_and(|normals| self.normals_count >= normals.len());
        if full {
            self.grow_normals_buffer();
        }
    }

    pub(crate) fn ensure_index_room(&mut self, additional: usize) {
        if self.indices_count + additional > self.indices.len() {
            if additional == 1 {
                self.grow_index_buffer();
            } else {
                self.grow_index_buffer_by(additional);
            }
        }
    }

    fn resize_vertex_channels(&mut self, capacity: usize) {
        if capacity <= self.vertex_capacity() {
            return;
        }
        tracing::trace!(
            from = self.vertex_capacity(),
            to = capacity,
            "grew vertex buffer"
        );
        self.positions.resize(capacity * 3, 0.0);
        if let Some(uv) = self.uv.as_mut() {
            uv.resize(capacity * 2, 0.0);
        }
        if let Some(rgba) = self.rgba.as_mut() {
            rgba.resize(capacity * 4, 0);
        }
        if let Some(flags) = self.flags.as_mut() {
            flags.resize(capacity, 0);
        }
    }

    fn resize_index_channel(&mut self, capacity: usize) {
        if capacity <= self.indices.len() {
            return;
        }
        tracing::trace!(from = self.indices.len(), to = capacity, "grew index buffer");
        self.indices.resize(capacity, 0);
    }
}

/// Makes room for one more entry in a face channel, growing it by
/// [`FACE_CHANNEL_GROWTH`] when full.
pub(crate) fn ensure_face_room<T: Copy + Default>(channel: &mut Vec<T>, count: usize) {
    if count >= channel.len() {
        let len = count.max(channel.len()) + FACE_CHANNEL_GROWTH;
        channel.resize(len, T::default());
    }
}
