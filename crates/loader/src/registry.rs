//! Module graph bookkeeping.

use crate::{Error, Resolved, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Policy scope a module belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// The entry module. Fully trusted.
    Root,
    /// The literal specifier the module was first imported by.
    Named(String),
}

impl ResourceId {
    pub fn named(id: impl Into<String>) -> Self {
        Self::Named(id.into())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("$root$"),
            Self::Named(id) => f.write_str(id),
        }
    }
}

/// What the registry remembers about a resolved locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub locator: String,
    pub owner: ResourceId,
    pub resolution: Resolved,
}

/// Maps every resolved locator to its owning resource.
///
/// Grows for the life of the process; entries are never evicted.
#[derive(Debug, Default)]
pub struct ModuleGraphRegistry {
    modules: RwLock<HashMap<String, Arc<ModuleRecord>>>,
}

impl ModuleGraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `resolution.locator` belongs to `owner`.
    ///
    /// Recording the same locator again overwrites the previous owner.
    pub async fn record_resolution(&self, owner: ResourceId, resolution: Resolved) {
        let locator = resolution.locator.clone();
        let record = Arc::new(ModuleRecord {
            locator: locator.clone(),
            owner,
            resolution,
        });

        let mut modules = self.modules.write().await;
        if let Some(previous) = modules.get(&locator) {
            if previous.owner != record.owner {
                tracing::warn!(
                    %locator,
                    previous = %previous.owner,
                    current = %record.owner,
                    "module re-resolved under a different resource"
                );
            }
        }
        modules.insert(locator, record);
    }

    /// Owner of `locator`.
    ///
    /// A miss means a load arrived before its resolve, which the host must
    /// never do.
    pub async fn owning_resource_id(&self, locator: &str) -> Result<ResourceId> {
        self.record(locator)
            .await
            .map(|record| record.owner.clone())
            .ok_or_else(|| Error::UnresolvedModule(locator.to_string()))
    }

    pub async fn record(&self, locator: &str) -> Option<Arc<ModuleRecord>> {
        self.modules.read().await.get(locator).cloned()
    }

    pub async fn len(&self) -> usize {
        self.modules.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.modules.read().await.is_empty()
    }
}
