//! Synthetic locator protocol.
//!
//! The host only deals in string locators. Two reserved schemes mark
//! modules the pipeline serves itself:
//!
//! - `lockdown:` is the hardening bootstrap.
//! - `attenuate:?specifier=<specifier>&keys=<a,b,...>` is a narrowed
//!   re-export of `specifier`.
//!
//! Everything else is an ordinary locator owned by the host.

use crate::{Error, Result};
use policy::SymbolList;
use std::fmt;
use url::form_urlencoded;

pub const LOCKDOWN_SCHEME: &str = "lockdown:";
pub const ATTENUATE_SCHEME: &str = "attenuate:";

/// Parsed form of a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorKind {
    /// A module the host resolved.
    Real(String),
    HardeningBootstrap,
    Attenuation {
        specifier: String,
        symbols: SymbolList,
    },
}

impl LocatorKind {
    /// Classify a locator string.
    ///
    /// Fails with [`Error::MissingParameter`] for an `attenuate:` locator
    /// without a specifier or keys.
    pub fn parse(locator: &str) -> Result<Self> {
        if is_bootstrap(locator) {
            return Ok(Self::HardeningBootstrap);
        }

        let Some(rest) = locator.strip_prefix(ATTENUATE_SCHEME) else {
            return Ok(Self::Real(locator.to_string()));
        };

        let query = rest.split_once('?').map_or(rest, |(_, query)| query);
        let mut specifier = None;
        let mut keys = None;
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*name {
                "specifier" => specifier = Some(value.into_owned()),
                "keys" => keys = Some(value.into_owned()),
                _ => {}
            }
        }

        let missing = |parameter| Error::MissingParameter {
            locator: locator.to_string(),
            parameter,
        };

        let specifier = specifier
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("specifier"))?;
        let symbols = keys
            .and_then(|keys| SymbolList::new(keys.split(',').filter(|k| !k.is_empty())))
            .ok_or_else(|| missing("keys"))?;

        Ok(Self::Attenuation { specifier, symbols })
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(locator) => f.write_str(locator),
            Self::HardeningBootstrap => f.write_str(LOCKDOWN_SCHEME),
            Self::Attenuation { specifier, symbols } => {
                let keys: Vec<&str> = symbols.iter().collect();
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("specifier", specifier)
                    .append_pair("keys", &keys.join(","))
                    .finish();
                write!(f, "{ATTENUATE_SCHEME}?{query}")
            }
        }
    }
}

/// Whether `locator` names the hardening bootstrap.
pub fn is_bootstrap(locator: &str) -> bool {
    locator.starts_with(LOCKDOWN_SCHEME)
}
