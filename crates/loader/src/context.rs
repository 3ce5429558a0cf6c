//! Shared pipeline state.

use crate::bootstrap::BootstrapSource;
use crate::codegen::DEFAULT_CENSORED_GLOBALS;
use crate::registry::ModuleGraphRegistry;
use crate::{Error, Result};
use policy::{Policy, PolicyStore, is_binding_name};

/// Everything the resolve and load steps share.
///
/// Build one per process with [`Context::builder`] before the first
/// resolution and pass it by reference to every call.
#[derive(Debug)]
pub struct Context {
    pub(crate) policy: PolicyStore,
    pub(crate) registry: ModuleGraphRegistry,
    pub(crate) bootstrap: String,
    pub(crate) censored: Vec<String>,
}

impl Context {
    pub fn builder(policy: Policy) -> ContextBuilder {
        ContextBuilder::new(policy)
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    pub fn registry(&self) -> &ModuleGraphRegistry {
        &self.registry
    }

    /// Source served at the `lockdown:` locator.
    pub fn bootstrap_source(&self) -> &str {
        &self.bootstrap
    }

    /// Globals censored unless granted.
    pub fn censored_globals(&self) -> &[String] {
        &self.censored
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    policy: Policy,
    bootstrap: Option<Box<dyn BootstrapSource>>,
    censored: Vec<String>,
}

impl ContextBuilder {
    fn new(policy: Policy) -> Self {
        Self {
            policy,
            bootstrap: None,
            censored: DEFAULT_CENSORED_GLOBALS.iter().map(|g| g.to_string()).collect(),
        }
    }

    /// Provider of the hardening bootstrap source. Required.
    pub fn bootstrap(mut self, source: impl BootstrapSource + 'static) -> Self {
        self.bootstrap = Some(Box::new(source));
        self
    }

    /// Replace the list of globals censored by default.
    pub fn censored_globals<I, S>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.censored = globals.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<Context> {
        let provider = self
            .bootstrap
            .ok_or_else(|| Error::Config("no hardening bootstrap configured".to_string()))?;
        let bootstrap = provider.source()?;

        if let Some(bad) = self.censored.iter().find(|g| !is_binding_name(g)) {
            return Err(Error::InvalidSymbol(bad.clone()));
        }

        Ok(Context {
            policy: PolicyStore::with_policy(self.policy),
            registry: ModuleGraphRegistry::new(),
            bootstrap,
            censored: self.censored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_bootstrap() {
        let err = Context::builder(Policy::default()).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let ctx = Context::builder(Policy::default())
            .bootstrap("/* hardened */")
            .build()
            .unwrap();
        assert_eq!(ctx.bootstrap_source(), "/* hardened */");
        assert_eq!(ctx.censored_globals(), ["process"]);
    }

    #[test]
    fn test_rejects_bad_global_names() {
        let err = Context::builder(Policy::default())
            .bootstrap("")
            .censored_globals(["process", "a;b"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSymbol(name) if name == "a;b"));

        for strict in ["eval", "arguments", "let", "yield", "class"] {
            let err = Context::builder(Policy::default())
                .bootstrap("")
                .censored_globals(["process", strict])
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidSymbol(name) if name == strict));
        }
    }
}
