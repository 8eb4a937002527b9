//! Configuration for the tessel tools.
//!
//! Settings persist to disk as RON files, can be overridden from the command
//! line via clap, and support hot-reload detection. Unknown fields are ignored
//! and missing fields take their defaults, so older and newer files both load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, DemoConfig, MeshConfig, default_config_dir};
pub use error::ConfigError;
