//! Per-module state and its single-threaded mutation primitives
//!
//! Every method here assumes exclusive access. Concurrent callers must go
//! through [`crate::SyncState`], which holds the tree-wide lock while it
//! delegates to these primitives.

use crate::instance::{DeposedKey, ResourceInstance};
use crate::object::ResourceInstanceObject;
use crate::resource::ResourceState;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_addrs::{
    InstanceKey, ModuleInstance, ProviderConfig, Resource,
    ResourceInstance as ResourceInstanceAddr,
};

/// One recorded output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputValue {
    /// The value itself
    pub value: Value,
    /// Whether the value must be redacted from human-facing output
    pub sensitive: bool,
    /// Deprecation message to surface when the output is referenced, if any
    pub deprecated: Option<String>,
}

/// State of one module instance: its resources, outputs, and locals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Address of this module instance
    pub addr: ModuleInstance,
    /// Resources by in-module address
    pub resources: IndexMap<Resource, ResourceState>,
    /// Output values by name
    pub outputs: IndexMap<String, OutputValue>,
    /// Local values by name
    pub locals: IndexMap<String, Value>,
}

impl ModuleState {
    /// Empty module record
    #[must_use]
    pub fn new(addr: ModuleInstance) -> Self {
        Self {
            addr,
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
            locals: IndexMap::new(),
        }
    }

    /// True when the module tracks nothing at all
    ///
    /// A non-root module in this condition must be pruned from the tree:
    /// keeping it around would make module existence ambiguous for
    /// dependency resolution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty() && self.locals.is_empty()
    }

    /// Look up one resource
    #[inline]
    #[must_use]
    pub fn resource(&self, addr: &Resource) -> Option<&ResourceState> {
        self.resources.get(addr)
    }

    /// Look up one resource instance
    #[must_use]
    pub fn resource_instance(&self, addr: &ResourceInstanceAddr) -> Option<&ResourceInstance> {
        self.resources.get(&addr.resource)?.instance(&addr.key)
    }

    /// Look up one output value
    #[inline]
    #[must_use]
    pub fn output_value(&self, name: &str) -> Option<&OutputValue> {
        self.outputs.get(name)
    }

    /// Look up one local value
    #[inline]
    #[must_use]
    pub fn local_value(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Upsert an output value; overwrites any existing value of that name
    pub fn set_output_value(
        &mut self,
        name: impl Into<String>,
        value: Value,
        sensitive: bool,
        deprecated: Option<String>,
    ) {
        self.outputs.insert(
            name.into(),
            OutputValue {
                value,
                sensitive,
                deprecated,
            },
        );
    }

    /// Delete an output value; absent names are a no-op
    ///
    /// The caller is responsible for pruning the module afterwards.
    pub fn remove_output_value(&mut self, name: &str) {
        self.outputs.shift_remove(name);
    }

    /// Upsert a local value; overwrites any existing value of that name
    pub fn set_local_value(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    /// Delete a local value; absent names are a no-op
    ///
    /// The caller is responsible for pruning the module afterwards.
    pub fn remove_local_value(&mut self, name: &str) {
        self.locals.shift_remove(name);
    }

    /// Get or create the record for a resource, updating its provider
    /// attribution either way
    pub fn ensure_resource(
        &mut self,
        addr: Resource,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) -> &mut ResourceState {
        let abs = addr.absolute(self.addr.clone());
        let rs = self
            .resources
            .entry(addr)
            .or_insert_with(|| ResourceState::new(abs, provider_config.clone(), provider_key.clone()));
        rs.provider_config = provider_config;
        rs.provider_key = provider_key;
        rs
    }

    /// Update resource-level provider metadata, creating the resource
    /// record if absent
    pub fn set_resource_provider(
        &mut self,
        addr: Resource,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        self.ensure_resource(addr, provider_config, provider_key);
    }

    /// Delete a resource and all of its instances; absent addresses are a
    /// no-op
    pub fn remove_resource(&mut self, addr: &Resource) {
        self.resources.shift_remove(addr);
    }

    /// Write the current generation object of one instance
    ///
    /// A `Some` object replaces any existing current object and, as a side
    /// effect, updates the resource-wide provider attribution: the latest
    /// write wins. `None` removes the current generation without touching
    /// provider metadata; if that leaves the instance with no objects the
    /// instance is deleted, and if that empties the resource the resource
    /// is deleted too.
    pub fn set_resource_instance_current(
        &mut self,
        addr: &ResourceInstanceAddr,
        obj: Option<ResourceInstanceObject>,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        match obj {
            Some(obj) => {
                let rs = self.ensure_resource(addr.resource.clone(), provider_config, provider_key);
                rs.ensure_instance(addr.key.clone()).current = Some(obj);
            }
            None => {
                let Some(rs) = self.resources.get_mut(&addr.resource) else {
                    return;
                };
                if let Some(inst) = rs.instance_mut(&addr.key) {
                    inst.current = None;
                }
                self.prune_resource_instance(addr);
            }
        }
    }

    /// Write a deposed generation object under an explicit key
    ///
    /// Only for deposed objects whose key is already known, e.g. reloaded
    /// from a persisted snapshot; to depose the current object use
    /// [`Self::depose_resource_instance_object`] instead. `None` removes
    /// the deposed object under that key, cascading instance and resource
    /// deletion as for current-object removal.
    ///
    /// # Panics
    /// Panics when writing a `Some` object for a resource that is not
    /// already tracked: deposed records presuppose a tracked resource.
    pub fn set_resource_instance_deposed(
        &mut self,
        addr: &ResourceInstanceAddr,
        key: DeposedKey,
        obj: Option<ResourceInstanceObject>,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        match obj {
            Some(obj) => {
                let Some(rs) = self.resources.get_mut(&addr.resource) else {
                    panic!(
                        "attempt to write deposed object for untracked resource {}",
                        addr.resource
                    );
                };
                rs.provider_config = provider_config;
                rs.provider_key = provider_key;
                rs.ensure_instance(addr.key.clone()).deposed.insert(key, obj);
            }
            None => {
                let Some(rs) = self.resources.get_mut(&addr.resource) else {
                    return;
                };
                if let Some(inst) = rs.instance_mut(&addr.key) {
                    inst.deposed.shift_remove(&key);
                }
                self.prune_resource_instance(addr);
            }
        }
    }

    /// Move one instance's current object into its deposed set
    ///
    /// Returns the deposed key used, or `None` when the instance had no
    /// current object (including when the resource or instance is not
    /// tracked at all).
    ///
    /// # Panics
    /// Panics if `forced` names a key already present in the deposed set.
    pub fn depose_resource_instance_object(
        &mut self,
        addr: &ResourceInstanceAddr,
        forced: Option<DeposedKey>,
    ) -> Option<DeposedKey> {
        let inst = self
            .resources
            .get_mut(&addr.resource)?
            .instance_mut(&addr.key)?;
        inst.depose_current(forced)
    }

    /// Restore a deposed object as current, only if no current object
    /// exists; returns whether the restore happened
    pub fn maybe_restore_resource_instance_deposed(
        &mut self,
        addr: &ResourceInstanceAddr,
        key: &DeposedKey,
    ) -> bool {
        let Some(inst) = self
            .resources
            .get_mut(&addr.resource)
            .and_then(|rs| rs.instance_mut(&addr.key))
        else {
            return false;
        };
        inst.maybe_restore_deposed(key)
    }

    /// Drop every record of one instance without any destroy action
    ///
    /// Only for instances whose underlying infrastructure is independently
    /// known to be gone or no longer ours to track.
    pub fn forget_resource_instance_all(&mut self, addr: &ResourceInstanceAddr) {
        if let Some(rs) = self.resources.get_mut(&addr.resource) {
            rs.instances.shift_remove(&addr.key);
            if rs.is_empty() {
                self.resources.shift_remove(&addr.resource);
            }
        }
    }

    /// Drop the record of one deposed object without any destroy action
    pub fn forget_resource_instance_deposed(
        &mut self,
        addr: &ResourceInstanceAddr,
        key: &DeposedKey,
    ) {
        if let Some(inst) = self
            .resources
            .get_mut(&addr.resource)
            .and_then(|rs| rs.instance_mut(&addr.key))
        {
            inst.deposed.shift_remove(key);
        }
        self.prune_resource_instance(addr);
    }

    /// Remove the instance if it has no objects left, then the resource if
    /// it has no instances left
    fn prune_resource_instance(&mut self, addr: &ResourceInstanceAddr) {
        let Some(rs) = self.resources.get_mut(&addr.resource) else {
            return;
        };
        if rs.instance(&addr.key).is_some_and(|inst| !inst.has_objects()) {
            rs.instances.shift_remove(&addr.key);
        }
        if rs.is_empty() {
            self.resources.shift_remove(&addr.resource);
        }
    }
}
