//! Configuration loading from gravymoat.toml.

use loader::{Context, Lockdown, LockdownOptions};
use policy::Policy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Policy file (JSON, or TOML with a `.toml` extension).
    pub policy: Option<PathBuf>,

    /// Globals censored unless a resource is granted them.
    #[serde(default = "default_censored_globals")]
    pub censored_globals: Vec<String>,

    /// Hardening bootstrap configuration.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Where the hardening library lives and how to lock down.
#[derive(Debug, Deserialize, Default)]
pub struct BootstrapConfig {
    /// Path to the single-file hardening library.
    pub source: Option<PathBuf>,

    /// Options passed to `lockdown()`.
    #[serde(default)]
    pub lockdown: LockdownOptions,
}

fn default_censored_globals() -> Vec<String> {
    loader::codegen::DEFAULT_CENSORED_GLOBALS
        .iter()
        .map(|g| g.to_string())
        .collect()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Create a default configuration.
    pub fn default_config() -> Self {
        Self {
            policy: None,
            censored_globals: default_censored_globals(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    /// The hardening bootstrap described by this config, if any.
    pub fn lockdown(&self) -> Result<Option<Lockdown>, loader::Error> {
        self.bootstrap
            .source
            .as_ref()
            .map(|path| Lockdown::from_file(path, self.bootstrap.lockdown.clone()))
            .transpose()
    }

    /// Build a pipeline context for offline inspection.
    ///
    /// Without a configured hardening library the bootstrap is left empty.
    pub fn context(&self, policy: Policy) -> Result<Context, loader::Error> {
        let builder = Context::builder(policy).censored_globals(self.censored_globals.clone());
        match self.lockdown()? {
            Some(lockdown) => builder.bootstrap(lockdown).build(),
            None => builder.bootstrap(String::new()).build(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
