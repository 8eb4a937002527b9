//! A minimal block tessellator: emits the six faces of an axis-aligned cube.

use glam::{Vec2, Vec3};
use tessel_mesh::{Facing, MeshData, RenderPass, VertexFlags};

/// Appends the six faces of the cube spanning `min..min + size`.
///
/// Every face is one quad: four vertices, six indices and one entry in each
/// face channel the mesh tracks. Transparent cubes are tagged for the
/// transparent pass, opaque ones are left unassigned.
pub fn tessellate_cube(mesh: &mut MeshData, min: Vec3, size: f32, transparent: bool) {
    let half = size * 0.5;
    let center = min + Vec3::splat(half);
    let alpha = if transparent { 128 } else { 255 };
    let pass = if transparent {
        RenderPass::Transparent.as_i16()
    } else {
        RenderPass::UNASSIGNED
    };

    for facing in Facing::ALL {
        let normal = facing.normal();
        let (u, v) = face_tangents(facing);
        let base = mesh.vertices_count() as u32;
        let shade = face_shade(facing);
        let flags = VertexFlags(0).with_normal(normal).0;

        for (corner, uv) in [
            (-u - v, Vec2::new(0.0, 0.0)),
            (u - v, Vec2::new(1.0, 0.0)),
            (u + v, Vec2::new(1.0, 1.0)),
            (-u + v, Vec2::new(0.0, 1.0)),
        ] {
            let position = center + (normal + corner) * half;
            mesh.add_vertex_with_flags(position, uv, [shade, shade, shade, alpha], flags);
            if mesh.normals().is_some() {
                mesh.add_normal_facing(facing);
            }
        }

        mesh.add_quad_indices([base, base + 1, base + 2, base, base + 2, base + 3]);
        if mesh.xyz_faces().is_some() {
            mesh.add_xyz_face(facing.mesh_data_index());
        }
        if mesh.climate_color_map_ids().is_some() {
            mesh.add_color_map_index(0, 0);
        }
        if mesh.render_passes().is_some() {
            mesh.add_render_pass(pass);
        }
    }
}

/// In-plane axes `(u, v)` of a face with `u x v` pointing along its normal,
/// so corners walked `-u-v, +u-v, +u+v, -u+v` wind counter-clockwise.
fn face_tangents(facing: Facing) -> (Vec3, Vec3) {
    match facing {
        Facing::North => (Vec3::NEG_X, Vec3::Y),
        Facing::East => (Vec3::NEG_Z, Vec3::Y),
        Facing::South => (Vec3::X, Vec3::Y),
        Facing::West => (Vec3::Z, Vec3::Y),
        Facing::Up => (Vec3::X, Vec3::NEG_Z),
        Facing::Down => (Vec3::X, Vec3::Z),
    }
}

fn face_shade(facing: Facing) -> u8 {
    match facing {
        Facing::Up => 255,
        Facing::Down => 128,
        Facing::North | Facing::South => 204,
        Facing::East | Facing::West => 153,
    }
}
