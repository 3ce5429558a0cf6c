//! Capability-enforcing module loading pipeline.
//!
//! This crate sits between a module-loading host and the code it runs. Every
//! resolve and load request passes through a shared [`Context`], which
//!
//! - refuses imports the requester's resource holds no grant for,
//! - redirects partially granted builtins to a synthetic module that
//!   re-exports only the granted names,
//! - shadows ambient globals such as `process` at the top of every
//!   dependency's source unless its resource was granted them, and
//! - makes the entry module import the hardening bootstrap before anything
//!   else runs.
//!
//! # Example
//!
//! ```ignore
//! use loader::{Context, Lockdown, LockdownOptions};
//! use policy::Policy;
//!
//! # async fn example(host: &impl loader::Host) -> loader::Result<()> {
//! let policy = Policy::load("policy.json")?;
//! let ctx = Context::builder(policy)
//!     .bootstrap(Lockdown::from_file("node_modules/ses/dist/ses.cjs", LockdownOptions::default())?)
//!     .build()?;
//!
//! let entry = ctx.resolve("./main.mjs", None, host).await?;
//! let source = ctx.load(&entry.locator, entry.format.as_ref(), host).await?;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
pub mod codegen;
mod context;
mod error;
mod host;
pub mod locator;
mod loader;
mod registry;
mod resolver;

pub use bootstrap::{
    BootstrapSource, Lockdown, LockdownOptions, OverrideTaming, StackFiltering, Taming,
};
pub use context::{Context, ContextBuilder};
pub use error::{Error, Result};
pub use host::{Format, Loaded, NextLoad, NextResolve, Resolved, Source};
pub use locator::LocatorKind;
pub use registry::{ModuleGraphRegistry, ModuleRecord, ResourceId};

/// A host that provides both of its own steps.
pub trait Host: NextResolve + NextLoad {}

impl<T: NextResolve + NextLoad> Host for T {}
