//! Custom per-vertex channels carrying arbitrary interleaved values to the GPU.

use std::mem;

/// How a custom channel's values are grouped per vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interleave {
    /// A fixed number of values per vertex.
    Stride(usize),
    /// Widths of consecutive sub-fields; a vertex holds their sum.
    Sizes(Vec<usize>),
}

impl Interleave {
    /// Number of values one vertex occupies.
    pub fn values_per_vertex(&self) -> usize {
        match self {
            Self::Stride(stride) => *stride,
            Self::Sizes(sizes) => sizes.iter().sum(),
        }
    }

    /// Start offset of each sub-field within a vertex.
    pub fn offsets(&self) -> Vec<usize> {
        match self {
            Self::Stride(_) => vec![0],
            Self::Sizes(sizes) => sizes
                .iter()
                .scan(0, |acc, &size| {
                    let start = *acc;
                    *acc += size;
                    Some(start)
                })
                .collect(),
        }
    }
}

impl Default for Interleave {
    fn default() -> Self {
        Self::Stride(1)
    }
}

/// A growable buffer of custom vertex values of type `T`.
///
/// Like the built-in channels it keeps an over-allocated backing array and a
/// logical count; capacity doubles on overflow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomChannel<T> {
    values: Vec<T>,
    count: usize,
    /// Per-vertex grouping of the values.
    pub interleave: Interleave,
    /// Values advance per instance rather than per vertex.
    pub instanced: bool,
    /// GPU usage hint: the data rarely changes.
    pub static_draw: bool,
    /// Element offset into an already-uploaded GPU buffer.
    pub base_offset: usize,
}

impl<T: Copy + Default> CustomChannel<T> {
    /// Creates a channel with room for `capacity` values.
    pub fn new(capacity: usize, interleave: Interleave) -> Self {
        Self {
            values: vec![T::default(); capacity],
            count: 0,
            interleave,
            instanced: false,
            static_draw: true,
            base_offset: 0,
        }
    }

    /// Values in use.
    pub fn values(&self) -> &[T] {
        &self.values[..self.count]
    }

    /// Mutable values in use.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values[..self.count]
    }

    /// Number of values in use.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Length of the backing array.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Number of values one vertex occupies.
    pub fn values_per_vertex(&self) -> usize {
        self.interleave.values_per_vertex()
    }

    /// The values belonging to `vertex`. Panics past the backing array.
    pub fn vertex_values(&self, vertex: usize) -> &[T] {
        let n = self.values_per_vertex();
        &self.values[vertex * n..vertex * n + n]
    }

    /// Appends one value, growing if needed.
    pub fn add(&mut self, value: T) {
        if self.count >= self.values.len() {
            self.grow_buffer(1);
        }
        self.values[self.count] = value;
        self.count += 1;
    }

    /// Appends a run of values with at most one growth.
    pub fn add_slice(&mut self, values: &[T]) {
        let end = self.count + values.len();
        if end > self.values.len() {
            self.grow_buffer(values.len());
        }
        self.values[self.count..end].copy_from_slice(values);
        self.count = end;
    }

    /// Grows the backing array to `max(2 * capacity, count + at_least)`.
    pub fn grow_buffer(&mut self, at_least: usize) {
        let new_len = (self.values.len() * 2).max(self.count + at_least);
        self.values.resize(new_len, T::default());
    }

    /// Forgets all values without releasing the backing array.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Shrinks the backing array to exactly the values in use.
    pub fn compact(&mut self) {
        self.values.truncate(self.count);
        self.values.shrink_to_fit();
    }

    /// Allocated size of the backing array in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.values.len() * mem::size_of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_per_vertex() {
        assert_eq!(Interleave::Stride(3).values_per_vertex(), 3);
        assert_eq!(Interleave::Sizes(vec![2, 1, 4]).values_per_vertex(), 7);
        assert_eq!(Interleave::Sizes(vec![2, 1, 4]).offsets(), vec![0, 2, 3]);
    }

    #[test]
    fn test_add_grows_from_zero() {
        let mut channel = CustomChannel::<f32>::new(0, Interleave::Stride(2));
        for i in 0..9 {
            channel.add(i as f32);
        }
        assert_eq!(channel.count(), 9);
        assert!(channel.capacity() >= 9);
        assert_eq!(channel.values()[8], 8.0);
        assert_eq!(channel.vertex_values(2), &[4.0, 5.0]);
    }

    #[test]
    fn test_add_slice_grows_once_to_fit() {
        let mut channel = CustomChannel::<i32>::new(2, Interleave::default());
        channel.add_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(channel.values(), &[1, 2, 3, 4, 5]);
        assert_eq!(channel.capacity(), 5);
    }

    #[test]
    fn test_clear_keeps_storage_and_compact_drops_slack() {
        let mut channel = CustomChannel::<u8>::new(16, Interleave::Stride(4));
        channel.add_slice(&[1, 2, 3, 4]);
        channel.clear();
        assert_eq!(channel.count(), 0);
        assert_eq!(channel.capacity(), 16);

        channel.add_slice(&[9, 9]);
        channel.compact();
        assert_eq!(channel.capacity(), 2);
        assert_eq!(channel.size_in_bytes(), 2);
    }

    #[test]
    fn test_size_in_bytes_uses_element_width() {
        let channel = CustomChannel::<i16>::new(10, Interleave::default());
        assert_eq!(channel.size_in_bytes(), 20);
    }
}
