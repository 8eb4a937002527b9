//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// tessel demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessel-demo", about = "Tessellate cubes into per-render-pass mesh pools")]
pub struct CliArgs {
    /// Number of cubes to tessellate.
    #[arg(long)]
    pub cubes: Option<u32>,

    /// Worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(cubes) = args.cubes {
            self.demo.cubes = cubes;
        }
        if let Some(workers) = args.workers {
            self.demo.workers = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from(["tessel-demo", "--cubes", "3", "--log-level", "debug"]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.demo.cubes, 3);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.demo.workers, 0);
        assert_eq!(config.mesh, crate::MeshConfig::default());
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_config_dir_flag_parses_path() {
        let args = CliArgs::parse_from(["tessel-demo", "--config", "/tmp/tessel"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/tessel")));
    }
}
