use std::path::PathBuf;

/// Failure to locate, read, write or interpret `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid [`Config`](crate::Config).
    #[error("malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot encode config: {0}")]
    Encode(#[source] ron::Error),

    /// A setting holds a value the mesh pipeline cannot run with.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    /// The platform has no per-user configuration directory and none was given.
    #[error("no config directory: pass --config <dir>")]
    NoConfigDir,
}
