//! Demo binary: tessellates a field of cubes on worker threads, merges the
//! results into one mesh pool per render pass, transforms and compacts the
//! pools, and reports their sizes.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p tessel-demo -- --cubes 256 --workers 4`.

mod cube;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tessel_config::{CliArgs, Config, DemoConfig, MeshConfig, default_config_dir};
use tessel_mesh::{
    MeshData, MeshLayout, ModelTransform, RenderPass, TessellationPipeline, TessellationResult,
    TessellationTask,
};
use tracing::{info, warn};

/// Passes the demo sorts geometry into.
const POOL_PASSES: [RenderPass; 2] = [RenderPass::Opaque, RenderPass::Transparent];

/// Cubes are scattered inside this cube of space.
const FIELD_EXTENT: f32 = 64.0;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(|| default_config_dir().ok())
        .unwrap_or_else(|| PathBuf::from(".tessel"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessel_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let started = Instant::now();
    let results = tessellate_cubes(&config);
    let failed = results.iter().filter(|r| r.mesh.is_err()).count();
    info!(
        meshes = results.len() - failed,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tessellation finished"
    );

    for (pass, mut pool) in build_pools(&config.mesh, &results) {
        pool.model_transform(&model_transform(&config.demo));
        if config.mesh.compact_results {
            pool.compact_buffers();
        }
        if config.debug.validate_meshes
            && let Err(e) = pool.validate()
        {
            warn!(?pass, "pool failed validation: {e}");
        }
        info!(
            ?pass,
            vertices = pool.vertices_count(),
            indices = pool.indices_count(),
            quads = pool.quad_count(),
            bytes = pool.size_in_bytes(),
            "mesh pool"
        );
    }
}

/// Layout selected by the mesh config.
fn mesh_layout(config: &MeshConfig) -> MeshLayout {
    MeshLayout {
        normals: config.normals,
        uv: config.uv,
        rgba: config.rgba,
        flags: config.flags,
        xyz_faces: config.xyz_faces,
        color_maps: config.color_maps,
        render_passes: config.render_passes,
    }
}

fn model_transform(config: &DemoConfig) -> ModelTransform {
    ModelTransform::IDENTITY
        .with_translation(Vec3::from_array(config.translation))
        .with_rotation_deg(Vec3::from_array(config.rotation_deg))
        .with_scale(Vec3::from_array(config.scale))
        .with_origin(Vec3::from_array(config.origin))
}

/// Runs one tessellation task per cube and collects the results, ordered by
/// cube. Failed jobs are included, so every accepted task yields one result.
fn tessellate_cubes(config: &Config) -> Vec<TessellationResult> {
    let workers = match config.demo.workers {
        0 => num_cpus::get(),
        n => n,
    };
    let budget = config.demo.budget.max(1);
    let mut pipeline = TessellationPipeline::new(
        workers,
        budget,
        mesh_layout(&config.mesh),
        config.mesh.initial_vertices,
        config.mesh.initial_indices,
        config.mesh.compact_results,
    );

    let mut rng = Xoshiro256StarStar::seed_from_u64(42);
    let mut pending: Vec<TessellationTask> = (0..u64::from(config.demo.cubes))
        .map(|key| {
            let min = Vec3::new(
                rng.gen_range(0.0..FIELD_EXTENT),
                rng.gen_range(0.0..FIELD_EXTENT),
                rng.gen_range(0.0..FIELD_EXTENT),
            )
            .floor();
            let transparent = rng.gen_bool(0.25);
            TessellationTask::new(key, move |mesh: &mut MeshData| {
                cube::tessellate_cube(mesh, min, 1.0, transparent);
            })
        })
        .collect();
    pending.reverse();

    let mut expected = pending.len();
    let mut results = Vec::with_capacity(expected);
    while results.len() < expected {
        // Only this thread submits, so a free slot seen here stays free.
        while pipeline.in_flight_count() < budget {
            let Some(task) = pending.pop() else {
                break;
            };
            let key = task.key;
            if !pipeline.submit(task) {
                warn!(key, "pipeline rejected task");
                expected -= 1;
            }
        }
        results.extend(pipeline.drain_results());
        std::thread::sleep(Duration::from_millis(1));
    }
    pipeline.shutdown();

    results.sort_by_key(|r| r.key);
    results
}

/// Filters every result into one pool per pass.
fn build_pools(config: &MeshConfig, results: &[TessellationResult]) -> Vec<(RenderPass, MeshData)> {
    POOL_PASSES
        .into_iter()
        .map(|pass| {
            let mut pool = MeshData::with_capacity(
                config.initial_vertices,
                config.initial_indices,
                mesh_layout(config),
            );
            for result in results {
                match &result.mesh {
                    Ok(mesh) => pool.add_mesh_data_filtered(mesh, pass),
                    Err(e) => warn!(key = result.key, %e, ?pass, "skipping failed cube"),
                }
            }
            (pass, pool)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tessel_mesh::TessellationError;

    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.demo.cubes = 12;
        config.demo.workers = 2;
        config.demo.budget = 3;
        config.mesh.initial_vertices = 24;
        config.mesh.initial_indices = 36;
        config
    }

    #[test]
    fn test_mesh_layout_follows_config() {
        let mut mesh = MeshConfig::default();
        mesh.normals = false;
        mesh.color_maps = true;
        let layout = mesh_layout(&mesh);
        assert!(!layout.normals);
        assert!(layout.color_maps);
        assert!(layout.render_passes);
    }

    #[test]
    fn test_every_cube_is_tessellated_once() {
        let results = tessellate_cubes(&small_config());
        let keys: Vec<u64> = results.iter().map(|r| r.key).collect();
        assert_eq!(keys, (0..12).collect::<Vec<_>>());
        assert!(
            results
                .iter()
                .all(|r| r.mesh.as_ref().map(|m| m.vertices_count()) == Ok(24))
        );
    }

    #[test]
    fn test_pools_partition_all_geometry() {
        let config = small_config();
        let results = tessellate_cubes(&config);
        let pools = build_pools(&config.mesh, &results);

        let pooled: usize = pools.iter().map(|(_, pool)| pool.vertices_count()).sum();
        assert_eq!(pooled, 12 * 24);
        for (pass, pool) in &pools {
            assert_eq!(pool.validate(), Ok(()), "{pass:?}");
            assert!(pool.render_passes().unwrap().iter().all(|&p| pass.accepts(p)));
        }
    }

    #[test]
    fn test_failed_results_are_left_out_of_pools() {
        let config = small_config();
        let mut results = tessellate_cubes(&config);
        results[0].mesh = Err(TessellationError::Panicked("boom".to_string()));
        let pools = build_pools(&config.mesh, &results);

        let pooled: usize = pools.iter().map(|(_, pool)| pool.vertices_count()).sum();
        assert_eq!(pooled, 11 * 24);
    }

    #[test]
    fn test_identity_demo_transform() {
        let mut demo = DemoConfig::default();
        demo.rotation_deg = [0.0; 3];
        assert!(model_transform(&demo).is_identity());
    }
}
