//! Per-resource state: provider attribution and instance map

use crate::instance::ResourceInstance;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_addrs::{AbsResource, InstanceKey, ProviderConfig};

/// State of one resource block and all of its instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Absolute address of the resource
    pub addr: AbsResource,
    /// Provider configuration responsible for this resource
    ///
    /// Resource-wide: every instance of the resource is attributed to this
    /// configuration, so writing one instance updates it for all siblings.
    pub provider_config: ProviderConfig,
    /// Repetition key of the provider configuration instance, for providers
    /// that are themselves expanded
    pub provider_key: InstanceKey,
    /// Instances of this resource by repetition key
    pub instances: IndexMap<InstanceKey, ResourceInstance>,
}

impl ResourceState {
    /// New resource record with no instances
    #[inline]
    #[must_use]
    pub fn new(addr: AbsResource, provider_config: ProviderConfig, provider_key: InstanceKey) -> Self {
        Self {
            addr,
            provider_config,
            provider_key,
            instances: IndexMap::new(),
        }
    }

    /// Look up one instance
    #[inline]
    #[must_use]
    pub fn instance(&self, key: &InstanceKey) -> Option<&ResourceInstance> {
        self.instances.get(key)
    }

    /// Mutable access to one instance
    #[inline]
    pub fn instance_mut(&mut self, key: &InstanceKey) -> Option<&mut ResourceInstance> {
        self.instances.get_mut(key)
    }

    /// Get or create the instance with the given key
    pub fn ensure_instance(&mut self, key: InstanceKey) -> &mut ResourceInstance {
        self.instances.entry(key).or_default()
    }

    /// Whether the resource has no instances left
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
