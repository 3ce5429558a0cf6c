//! CLI error types.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No policy file was given and the config names none.
    #[error("no policy file given. Pass one or set `policy` in {}", .config.display())]
    PolicyNotConfigured { config: PathBuf },

    /// The policy parsed, but some entries were ignored.
    #[error("ignored {count} malformed entries in {}", .path.display())]
    MalformedPolicy { path: PathBuf, count: usize },

    /// `bootstrap.source` is not set in the config.
    #[error("no hardening library configured. Set `bootstrap.source` in {}", .config.display())]
    BootstrapNotConfigured { config: PathBuf },

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the loading pipeline.
    #[error(transparent)]
    Loader(#[from] loader::Error),

    /// An error occurred in the policy layer.
    #[error(transparent)]
    Policy(#[from] policy::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
