//! Host runtime boundary.
//!
//! The host owns actual module resolution and file access. The pipeline
//! wraps the host's own steps, which it receives as [`NextResolve`] and
//! [`NextLoad`] implementations on every call.

use crate::Result;
use std::fmt;
use std::future::Future;

/// Module format as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// ECMAScript module source.
    Module,
    /// Legacy CommonJS source.
    CommonJs,
    /// Host-provided builtin with no source.
    Builtin,
    Json,
    Wasm,
    Other(String),
}

impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Module => "module",
            Self::CommonJs => "commonjs",
            Self::Builtin => "builtin",
            Self::Json => "json",
            Self::Wasm => "wasm",
            Self::Other(other) => other,
        }
    }

    /// Executable source whose globals get censored.
    pub fn is_censorable(&self) -> bool {
        matches!(self, Self::Module | Self::CommonJs)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module source as text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Text(String),
    Bytes(Vec<u8>),
}

impl Source {
    /// Decode to text. Invalid UTF-8 is replaced rather than rejected.
    pub fn into_text(self) -> String {
        match self {
            Source::Text(text) => text,
            Source::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub locator: String,
    pub format: Option<Format>,
}

impl Resolved {
    pub fn new(locator: impl Into<String>, format: Option<Format>) -> Self {
        Self {
            locator: locator.into(),
            format,
        }
    }
}

/// Outcome of loading a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// Absent for formats the host loads itself, such as builtins.
    pub source: Option<Source>,
    pub format: Format,
}

impl Loaded {
    pub fn new(source: Option<Source>, format: Format) -> Self {
        Self { source, format }
    }

    /// ES module text produced by the pipeline itself.
    pub fn module(source: impl Into<String>) -> Self {
        Self {
            source: Some(Source::Text(source.into())),
            format: Format::Module,
        }
    }
}

/// The host's own resolution step.
pub trait NextResolve: Send + Sync {
    /// Resolve `specifier` without any policy applied.
    fn resolve(&self, specifier: &str) -> impl Future<Output = Result<Resolved>> + Send;
}

/// The host's own load step.
pub trait NextLoad: Send + Sync {
    /// Read the module at `locator` without any rewriting applied.
    fn load(
        &self,
        locator: &str,
        format: Option<&Format>,
    ) -> impl Future<Output = Result<Loaded>> + Send;
}
