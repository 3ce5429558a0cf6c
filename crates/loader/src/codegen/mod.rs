//! Source generators for the pipeline's own modules and prologues.
//!
//! Output is a function of the inputs only, so the same policy and source
//! always produce byte-identical results.

mod attenuate;
mod censor;

pub use attenuate::attenuation_source;
pub use censor::{DEFAULT_CENSORED_GLOBALS, censorship_prologue};

use crate::locator::LOCKDOWN_SCHEME;

/// Statement prepended to the entry module so the hardening bootstrap is
/// evaluated before any of its own statements.
pub fn entry_prelude() -> String {
    format!("import {}; ", string_literal(LOCKDOWN_SCHEME))
}

/// Quote `text` as a double-quoted string literal.
fn string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
