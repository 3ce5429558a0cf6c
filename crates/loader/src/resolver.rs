//! Policy gate in front of the host's resolution step.

use crate::host::{Format, NextResolve, Resolved};
use crate::locator::{LocatorKind, is_bootstrap};
use crate::registry::ResourceId;
use crate::{Context, Error, Result};
use policy::Decision;

impl Context {
    /// Resolve `specifier` imported by the module at `requester`.
    ///
    /// `requester` is `None` only for the entry module, which is resolved
    /// unconditionally and becomes the root resource. Otherwise the
    /// requester's resource must hold a grant for `specifier`; a partial
    /// builtin grant resolves to a synthetic attenuation locator instead of
    /// the real module.
    pub async fn resolve<R: NextResolve>(
        &self,
        specifier: &str,
        requester: Option<&str>,
        next: &R,
    ) -> Result<Resolved> {
        tracing::debug!(specifier, ?requester, "resolving");

        let Some(requester) = requester else {
            let resolved = next.resolve(specifier).await?;
            tracing::debug!(locator = %resolved.locator, "resolved entry module");
            self.registry
                .record_resolution(ResourceId::Root, resolved.clone())
                .await;
            return Ok(resolved);
        };

        // An attenuation module has to reach the real target it narrows.
        if let LocatorKind::Attenuation { .. } = LocatorKind::parse(requester)? {
            return self.pass_through(specifier, next).await;
        }

        let owner = self.registry.owning_resource_id(requester).await?;
        let resource = match &owner {
            // TODO: self-imports and the entry module skip policy entirely;
            // decide whether both should be subject to grants too.
            ResourceId::Root => return self.pass_through(specifier, next).await,
            ResourceId::Named(id) if id == specifier => {
                return self.pass_through(specifier, next).await;
            }
            ResourceId::Named(id) => id,
        };

        match self.policy.lookup(resource).await.check(specifier) {
            Decision::Allow => self.pass_through(specifier, next).await,
            Decision::Attenuate(symbols) => {
                let locator = LocatorKind::Attenuation {
                    specifier: specifier.to_string(),
                    symbols,
                }
                .to_string();
                tracing::debug!(specifier, %resource, %locator, "attenuating");
                Ok(Resolved::new(locator, Some(Format::Module)))
            }
            Decision::Deny { reason } => {
                tracing::debug!(specifier, %resource, %reason, "denied");
                Err(Error::PolicyDenied {
                    specifier: specifier.to_string(),
                    resource: resource.clone(),
                })
            }
        }
    }

    /// Hand a granted specifier to the host and record who it belongs to.
    ///
    /// The owner is the specifier string itself, not a canonical package
    /// identity.
    async fn pass_through<R: NextResolve>(&self, specifier: &str, next: &R) -> Result<Resolved> {
        if is_bootstrap(specifier) {
            return Ok(Resolved::new(
                LocatorKind::HardeningBootstrap.to_string(),
                Some(Format::Module),
            ));
        }

        let resolved = next.resolve(specifier).await?;
        tracing::debug!(specifier, locator = %resolved.locator, "resolved");
        self.registry
            .record_resolution(ResourceId::named(specifier), resolved.clone())
            .await;
        Ok(resolved)
    }
}
