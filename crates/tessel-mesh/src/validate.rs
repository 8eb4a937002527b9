//! Structural checks for consumers that need a well-formed mesh, such as GPU upload.

use crate::custom::CustomChannel;
use crate::mesh_data::MeshData;

/// A broken structural invariant found by [`MeshData::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// A logical count exceeds its channel's backing length.
    #[error("{channel}: count {count} exceeds capacity {capacity}")]
    CountExceedsCapacity {
        channel: &'static str,
        count: usize,
        capacity: usize,
    },

    /// A channel's backing length disagrees with the shared capacity of its axis.
    #[error("{channel}: backing length {actual}, expected {expected}")]
    BackingLength {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An index references a vertex past the vertex count.
    #[error("index {value} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        value: u32,
        vertex_count: usize,
    },

    /// A partial-update offset lies past the channel's backing length.
    #[error("{channel}: write offset {offset} exceeds backing length {len}")]
    OffsetOutOfRange {
        channel: &'static str,
        offset: usize,
        len: usize,
    },
}

impl MeshData {
    /// Checks counts against capacities, channel lengths against their axis,
    /// indices against the vertex count and write offsets against lengths.
    pub fn validate(&self) -> Result<(), MeshError> {
        let capacity = self.vertex_capacity();

        backing("positions", capacity * 3, self.positions.len())?;
        fits("vertices", self.vertices_count, capacity)?;
        if let Some(uv) = &self.uv {
            backing("uv", capacity * 2, uv.len())?;
        }
        if let Some(rgba) = &self.rgba {
            backing("rgba", capacity * 4, rgba.len())?;
        }
        if let Some(flags) = &self.flags {
            backing("flags", capacity, flags.len())?;
        }
        if let Some(normals) = &self.normals {
            fits("normals", self.normals_count, normals.len())?;
        }

        fits("indices", self.indices_count, self.indices.len())?;
        if let Some(faces) = &self.xyz_faces {
            fits("xyz_faces", self.xyz_faces_count, faces.len())?;
        }
        if let Some(ids) = &self.climate_color_map_ids {
            fits("climate_color_map_ids", self.color_map_ids_count, ids.len())?;
        }
        if let Some(ids) = &self.season_color_map_ids {
            fits("season_color_map_ids", self.color_map_ids_count, ids.len())?;
        }
        if let Some(passes) = &self.render_passes {
            fits("render_passes", self.render_pass_count, passes.len())?;
        }
        custom_fits("custom_floats", self.custom_floats.as_ref())?;
        custom_fits("custom_ints", self.custom_ints.as_ref())?;
        custom_fits("custom_shorts", self.custom_shorts.as_ref())?;
        custom_fits("custom_bytes", self.custom_bytes.as_ref())?;

        if let Some((position, &value)) = self
            .indices()
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= self.vertices_count)
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                value,
                vertex_count: self.vertices_count,
            });
        }

        let offsets = &self.offsets;
        offset("xyz", offsets.xyz, self.positions.len())?;
        offset("indices", offsets.indices, self.indices.len())?;
        if let Some(uv) = &self.uv {
            offset("uv", offsets.uv, uv.len())?;
        }
        if let Some(rgba) = &self.rgba {
            offset("rgba", offsets.rgba, rgba.len())?;
        }
        if let Some(flags) = &self.flags {
            offset("flags", offsets.flags, flags.len())?;
        }
        if let Some(normals) = &self.normals {
            offset("normals", offsets.normals, normals.len())?;
        }

        Ok(())
    }
}

fn fits(channel: &'static str, count: usize, capacity: usize) -> Result<(), MeshError> {
    if count > capacity {
        return Err(MeshError::CountExceedsCapacity {
            channel,
            count,
            capacity,
        });
    }
    Ok(())
}

fn backing(channel: &'static str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if expected != actual {
        return Err(MeshError::BackingLength {
            channel,
            expected,
            actual,
        });
    }
    Ok(())
}

fn offset(channel: &'static str, offset: usize, len: usize) -> Result<(), MeshError> {
    if offset > len {
        return Err(MeshError::OffsetOutOfRange {
            channel,
            offset,
            len,
        });
    }
    Ok(())
}

fn custom_fits<T: Copy + Default>(
    channel: &'static str,
    custom: Option<&CustomChannel<T>>,
) -> Result<(), MeshError> {
    match custom {
        Some(c) => fits(channel, c.count(), c.capacity()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::mesh_data::MeshLayout;

    fn quad() -> MeshData {
        let mut mesh = MeshData::with_capacity(4, 6, MeshLayout::default());
        for p in [Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y] {
            mesh.add_vertex(p, [255; 4]);
        }
        mesh.add_quad_indices([0, 1, 2, 0, 2, 3]);
        mesh
    }

    #[test]
    fn test_well_formed_mesh_validates() {
        assert_eq!(quad().validate(), Ok(()));
        assert_eq!(MeshData::new().validate(), Ok(()));
    }

    #[test]
    fn test_index_past_vertex_count_is_reported() {
        let mut mesh = quad();
        mesh.add_index(4);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                position: 6,
                value: 4,
                vertex_count: 4,
            })
        );
    }

    #[test]
    fn test_mismatched_channel_length_is_reported() {
        let mut mesh = quad();
        if let Some(uv) = mesh.uv.as_mut() {
            uv.push(0.0);
        }
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::BackingLength { channel: "uv", .. })
        ));
    }

    #[test]
    fn test_offset_past_backing_length_is_reported() {
        let mut mesh = quad();
        mesh.offsets.rgba = 17;
        let err = mesh.validate().unwrap_err();
        assert_eq!(err.to_string(), "rgba: write offset 17 exceeds backing length 16");
    }

    #[test]
    fn test_count_past_capacity_is_reported() {
        let mut mesh = quad();
        mesh.indices_count = 7;
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::CountExceedsCapacity { channel: "indices", .. })
        ));
    }
}
