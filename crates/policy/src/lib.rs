//! Resource-scoped capability policy for module graphs.
//!
//! Core principle: **a module may only import what its resource was granted.**
//!
//! A [`Policy`] maps resource ids to a [`ResourcePolicy`] describing which
//! builtin modules, packages and ambient globals that resource may reach.
//! Anything not listed is denied. The [`PolicyStore`] holds the process-wide
//! policy consulted by the resolve/load pipeline.

mod capability;
mod error;
mod policy;
mod store;

pub use capability::{BuiltinGrant, Decision, SymbolList, is_binding_name};
pub use error::{Error, Result};
pub use policy::{Policy, PolicyWarning, ResourcePolicy};
pub use store::PolicyStore;
