//! Process-wide policy holder.

use crate::{Policy, ResourcePolicy};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the active [`Policy`].
///
/// Written once by [`PolicyStore::init`] before the first resolution and
/// only read afterwards.
#[derive(Debug, Default)]
pub struct PolicyStore {
    policy: RwLock<Option<Arc<Policy>>>,
}

impl PolicyStore {
    /// Create an empty store. Until [`init`](Self::init) is called every
    /// lookup yields an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that is already initialized with `policy`.
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy: RwLock::new(Some(Arc::new(policy))),
        }
    }

    /// Install the policy.
    ///
    /// Calling this again replaces the policy rather than failing. Anything
    /// already resolved keeps the decision it got under the old one.
    pub async fn init(&self, policy: Policy) {
        let mut slot = self.policy.write().await;
        if slot.is_some() {
            tracing::warn!("policy store re-initialized; replacing active policy");
        }
        *slot = Some(Arc::new(policy));
    }

    /// Grants for `resource`, or an empty policy if it has no entry.
    pub async fn lookup(&self, resource: &str) -> ResourcePolicy {
        let slot = self.policy.read().await;
        match slot.as_deref() {
            Some(policy) => policy.resource(resource).cloned().unwrap_or_default(),
            None => {
                tracing::warn!(resource, "policy lookup before init; denying everything");
                ResourcePolicy::default()
            }
        }
    }

    /// Names of the globals `resource` may keep.
    pub async fn global_grants(&self, resource: &str) -> BTreeSet<String> {
        let policy = self.lookup(resource).await;
        policy
            .globals
            .keys()
            .filter(|name| policy.allows_global(name))
            .cloned()
            .collect()
    }
}
