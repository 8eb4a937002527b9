//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mesh buffer sizing and channel selection.
    pub mesh: MeshConfig,
    /// Demo workload settings.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Initial sizing and tracked channels of freshly built meshes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertex capacity of a new mesh.
    pub initial_vertices: usize,
    /// Index capacity of a new mesh.
    pub initial_indices: usize,
    /// Track packed vertex normals.
    pub normals: bool,
    /// Track texture coordinates.
    pub uv: bool,
    /// Track per-vertex RGBA colors.
    pub rgba: bool,
    /// Track per-vertex flag words.
    pub flags: bool,
    /// Track one facing byte per face.
    pub xyz_faces: bool,
    /// Track climate and season color map ids per face.
    pub color_maps: bool,
    /// Track one render pass per face.
    pub render_passes: bool,
    /// Shrink finished meshes to their exact size before handing them out.
    pub compact_results: bool,
}

/// Workload of the tessellation demo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of cubes to tessellate.
    pub cubes: u32,
    /// Worker threads (0 = one per CPU).
    pub workers: usize,
    /// Maximum tasks in flight.
    pub budget: usize,
    /// Model transform applied to the merged pools.
    pub translation: [f32; 3],
    /// Rotation about X, Y and Z in degrees.
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
    /// Pivot for rotation and scale.
    pub origin: [f32; 3],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Run structural validation on every finished mesh.
    pub validate_meshes: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            initial_vertices: 1024,
            initial_indices: 1536,
            normals: true,
            uv: true,
            rgba: true,
            flags: true,
            xyz_faces: true,
            color_maps: false,
            render_passes: true,
            compact_results: true,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            cubes: 64,
            workers: 0,
            budget: 32,
            translation: [0.0, 0.0, 0.0],
            rotation_deg: [0.0, 45.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            origin: [0.5, 0.5, 0.5],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            validate_meshes: cfg!(debug_assertions),
        }
    }
}

/// The per-user config directory, `<platform config dir>/tessel`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("tessel"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Reads `config.ron` from `config_dir`. A missing file is replaced by
    /// the defaults, which are written back so the user has something to edit.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(config_dir)?;
            log::info!("Wrote default settings to {}", path.display());
            return Ok(defaults);
        }

        let config = Self::read(&path)?;
        config.check()?;
        log::info!("Using settings from {}", path.display());
        Ok(config)
    }

    /// Writes the settings to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new().depth_limit(2))
            .map_err(ConfigError::Encode)?;
        std::fs::create_dir_all(config_dir).map_err(write_err)?;
        std::fs::write(&path, text).map_err(write_err)
    }

    /// Re-reads the file; yields the new settings only when they differ.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        fresh.check()?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Settings changed on disk");
        Ok(Some(fresh))
    }

    /// Rejects settings no mesh pipeline can run with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.demo.budget == 0 {
            return Err(ConfigError::Invalid {
                field: "demo.budget",
                reason: "at least one task must be allowed in flight",
            });
        }
        if self.demo.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ConfigError::Invalid {
                field: "demo.scale",
                reason: "each axis must be finite and non-zero",
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
