//! Source pipeline in front of the host's load step.

use crate::codegen::{attenuation_source, censorship_prologue, entry_prelude};
use crate::host::{Format, Loaded, NextLoad, Source};
use crate::locator::LocatorKind;
use crate::registry::ResourceId;
use crate::{Context, Error, Result};

impl Context {
    /// Load the module at `locator`.
    ///
    /// Synthetic locators are served without touching the host. For real
    /// modules the host's source is rewritten: the entry module gets the
    /// hardening bootstrap import, every other executable module gets the
    /// censorship prologue for its resource. Other formats pass through.
    pub async fn load<L: NextLoad>(
        &self,
        locator: &str,
        format: Option<&Format>,
        next: &L,
    ) -> Result<Loaded> {
        match LocatorKind::parse(locator)? {
            LocatorKind::HardeningBootstrap => {
                tracing::debug!("loading hardening bootstrap");
                Ok(Loaded::module(self.bootstrap.clone()))
            }
            LocatorKind::Attenuation { specifier, symbols } => {
                tracing::debug!(%specifier, "loading attenuated module");
                Ok(Loaded::module(attenuation_source(
                    &specifier,
                    symbols.as_slice(),
                )?))
            }
            LocatorKind::Real(_) => self.load_real(locator, format, next).await,
        }
    }

    async fn load_real<L: NextLoad>(
        &self,
        locator: &str,
        format: Option<&Format>,
        next: &L,
    ) -> Result<Loaded> {
        let owner = self.registry.owning_resource_id(locator).await?;
        tracing::debug!(%owner, locator, ?format, "loading");

        let loaded = next.load(locator, format).await?;
        tracing::debug!(locator, format = %loaded.format, "loaded");

        match owner {
            ResourceId::Root => {
                let source = required_source(locator, loaded.source)?;
                Ok(Loaded::new(
                    Some(Source::Text(entry_prelude() + &source)),
                    loaded.format,
                ))
            }
            ResourceId::Named(resource) if loaded.format.is_censorable() => {
                let source = required_source(locator, loaded.source)?;
                let allowed = self.policy.global_grants(&resource).await;
                tracing::debug!(locator, %resource, "censoring");
                let prologue = censorship_prologue(&allowed, self.censored.as_slice());
                Ok(Loaded::new(
                    Some(Source::Text(prologue + &source)),
                    loaded.format,
                ))
            }
            ResourceId::Named(_) => Ok(loaded),
        }
    }
}

/// Text of a module that is about to be rewritten. Without it the host
/// would read the file itself and run it unmodified.
fn required_source(locator: &str, source: Option<Source>) -> Result<String> {
    source
        .map(Source::into_text)
        .ok_or_else(|| Error::MissingSource(locator.to_string()))
}
