//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// Only failures to obtain a policy document at all surface here. Entries of
/// an unexpected shape inside a well-formed document are tolerated and
/// reported as [`PolicyWarning`](crate::PolicyWarning)s instead.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Failed to parse a policy document.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// An I/O error occurred while reading policy.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
