//! Hardening bootstrap served at the `lockdown:` locator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Produces the source evaluated before the entry module.
///
/// The pipeline calls this once while building its [`Context`](crate::Context)
/// and serves the result verbatim afterwards.
pub trait BootstrapSource {
    fn source(&self) -> Result<String>;
}

impl BootstrapSource for String {
    fn source(&self) -> Result<String> {
        Ok(self.clone())
    }
}

impl BootstrapSource for &str {
    fn source(&self) -> Result<String> {
        Ok((*self).to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taming {
    Safe,
    Unsafe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackFiltering {
    Concise,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideTaming {
    Min,
    Moderate,
    Severe,
}

/// Options passed to `lockdown()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockdownOptions {
    /// Keeps a usable `Date.now()`.
    pub date_taming: Taming,
    /// Keeps `Math.random()`.
    pub math_taming: Taming,
    /// Lets code observe stack traces.
    pub error_taming: Taming,
    pub stack_filtering: StackFiltering,
    pub override_taming: OverrideTaming,
    /// Keeps the locale-sensitive `toLocale*` methods.
    pub locale_taming: Taming,
}

impl Default for LockdownOptions {
    fn default() -> Self {
        Self {
            date_taming: Taming::Unsafe,
            math_taming: Taming::Unsafe,
            error_taming: Taming::Unsafe,
            stack_filtering: StackFiltering::Verbose,
            override_taming: OverrideTaming::Severe,
            locale_taming: Taming::Unsafe,
        }
    }
}

/// Hardening library source followed by a `lockdown()` call.
#[derive(Debug, Clone)]
pub struct Lockdown {
    library: String,
    options: LockdownOptions,
}

impl Lockdown {
    /// `library` must be a single self-contained script that defines a
    /// global `lockdown` function.
    pub fn new(library: impl Into<String>, options: LockdownOptions) -> Self {
        Self {
            library: library.into(),
            options,
        }
    }

    /// Read the hardening library from `path`.
    pub fn from_file(path: impl AsRef<Path>, options: LockdownOptions) -> Result<Self> {
        let library = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::new(library, options))
    }
}

impl BootstrapSource for Lockdown {
    fn source(&self) -> Result<String> {
        let options = serde_json::to_string_pretty(&self.options)
            .map_err(|e| Error::Config(format!("invalid lockdown options: {e}")))?;
        Ok(format!("{}\nlockdown({options});\n", self.library))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let json = serde_json::to_value(LockdownOptions::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dateTaming": "unsafe",
                "mathTaming": "unsafe",
                "errorTaming": "unsafe",
                "stackFiltering": "verbose",
                "overrideTaming": "severe",
                "localeTaming": "unsafe",
            })
        );
    }

    #[test]
    fn test_partial_options_keep_defaults() {
        let options: LockdownOptions =
            serde_json::from_str(r#"{"errorTaming": "safe"}"#).unwrap();
        assert_eq!(options.error_taming, Taming::Safe);
        assert_eq!(options.override_taming, OverrideTaming::Severe);
    }

    #[test]
    fn test_source_appends_call() {
        let lockdown = Lockdown::new("globalThis.lockdown = () => {};", LockdownOptions::default());
        let source = lockdown.source().unwrap();
        assert!(source.starts_with("globalThis.lockdown = () => {};\nlockdown({"));
        assert!(source.contains(r#""overrideTaming": "severe""#));
        assert!(source.ends_with("});\n"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ses.js");
        std::fs::write(&path, "/* ses */").unwrap();

        let lockdown = Lockdown::from_file(&path, LockdownOptions::default()).unwrap();
        assert!(lockdown.source().unwrap().starts_with("/* ses */\nlockdown("));

        let missing = Lockdown::from_file(dir.path().join("absent.js"), LockdownOptions::default());
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
