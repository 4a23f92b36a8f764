//! The whole-run state tree
//!
//! [`State`] owns every [`ModuleState`] keyed by module instance address,
//! in insertion order. The root module always has an entry, even when
//! empty; it is the permanent anchor for traversal and identity. Like the
//! rest of the data model, nothing here locks — concurrent access goes
//! through [`crate::SyncState`].

use crate::checks::CheckResults;
use crate::instance::ResourceInstance;
use crate::module::{ModuleState, OutputValue};
use crate::resource::ResourceState;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_addrs::{
    AbsLocalValue, AbsOutputValue, AbsResource, AbsResourceInstance, ModuleCall, ModuleInstance,
};

/// Authoritative in-memory model of all provisioned infrastructure objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    modules: IndexMap<ModuleInstance, ModuleState>,
    /// Snapshot of check results from the most recent completed run, if
    /// any; replaced wholesale, never merged
    pub check_results: Option<CheckResults>,
}

impl State {
    /// Empty state: just the root module with nothing in it
    #[must_use]
    pub fn new() -> Self {
        let root = ModuleInstance::root();
        let mut modules = IndexMap::new();
        modules.insert(root.clone(), ModuleState::new(root));
        Self {
            modules,
            check_results: None,
        }
    }

    /// Look up one module
    #[inline]
    #[must_use]
    pub fn module(&self, addr: &ModuleInstance) -> Option<&ModuleState> {
        self.modules.get(addr)
    }

    /// Mutable access to one module
    #[inline]
    pub fn module_mut(&mut self, addr: &ModuleInstance) -> Option<&mut ModuleState> {
        self.modules.get_mut(addr)
    }

    /// The root module, which always exists
    #[must_use]
    pub fn root_module(&self) -> &ModuleState {
        self.modules
            .get(&ModuleInstance::root())
            .expect("state tree lost its root module")
    }

    /// Iterate all tracked modules in insertion order
    pub fn modules(&self) -> impl Iterator<Item = &ModuleState> {
        self.modules.values()
    }

    /// Get or create the module record for the given address
    pub fn ensure_module(&mut self, addr: &ModuleInstance) -> &mut ModuleState {
        self.modules
            .entry(addr.clone())
            .or_insert_with(|| ModuleState::new(addr.clone()))
    }

    /// Delete a module and everything in it; absent addresses are a no-op
    ///
    /// # Panics
    /// Panics on an attempt to remove the root module, which must always
    /// be present.
    pub fn remove_module(&mut self, addr: &ModuleInstance) {
        assert!(!addr.is_root(), "attempt to remove the root module");
        self.modules.shift_remove(addr);
    }

    /// Delete every empty non-root module
    ///
    /// The built-in mutation paths prune as they go; this whole-tree sweep
    /// is for callers doing multi-step edits through the explicit lock.
    pub fn prune(&mut self) {
        self.modules
            .retain(|addr, ms| addr.is_root() || !ms.is_empty());
    }

    /// Look up one resource
    #[must_use]
    pub fn resource(&self, addr: &AbsResource) -> Option<&ResourceState> {
        self.modules.get(&addr.module)?.resource(&addr.resource)
    }

    /// Look up one resource instance
    #[must_use]
    pub fn resource_instance(&self, addr: &AbsResourceInstance) -> Option<&ResourceInstance> {
        self.modules
            .get(&addr.module)?
            .resource_instance(&addr.resource)
    }

    /// Look up one output value
    #[must_use]
    pub fn output_value(&self, addr: &AbsOutputValue) -> Option<&OutputValue> {
        self.modules.get(&addr.module)?.output_value(&addr.name)
    }

    /// Look up one local value
    #[must_use]
    pub fn local_value(&self, addr: &AbsLocalValue) -> Option<&Value> {
        self.modules.get(&addr.module)?.local_value(&addr.name)
    }

    /// Output values of every instance of one module call
    ///
    /// Collects the outputs of each tracked instance of `call` declared in
    /// `parent`, in module insertion order.
    #[must_use]
    pub fn module_outputs(
        &self,
        parent: &ModuleInstance,
        call: &ModuleCall,
    ) -> Vec<(AbsOutputValue, &OutputValue)> {
        let mut outputs = Vec::new();
        for ms in self.modules.values() {
            let Some((inst_parent, inst_call)) = ms.addr.call() else {
                continue;
            };
            if inst_parent == *parent && inst_call == *call {
                for (name, output) in &ms.outputs {
                    outputs.push((AbsOutputValue::new(ms.addr.clone(), name.clone()), output));
                }
            }
        }
        outputs
    }

    /// Relocate a module instance to a new address
    ///
    /// Used when configuration refactoring moves or renames a module. The
    /// module's own address and the addresses recorded on its resources are
    /// rewritten to the destination.
    ///
    /// # Panics
    /// Panics when either address is the root, when the source is not
    /// tracked, or when the destination is already tracked.
    pub fn move_module_instance(&mut self, src: &ModuleInstance, dst: &ModuleInstance) {
        assert!(
            !src.is_root() && !dst.is_root(),
            "cannot move to or from the root module"
        );
        assert!(
            self.modules.get(dst).is_none(),
            "move destination {dst} is already tracked"
        );
        let Some(mut ms) = self.modules.shift_remove(src) else {
            panic!("move source {src} is not tracked");
        };
        ms.addr = dst.clone();
        for rs in ms.resources.values_mut() {
            rs.addr.module = dst.clone();
        }
        self.modules.insert(dst.clone(), ms);
    }

    /// Move a module instance only when the source exists and the
    /// destination does not; returns whether a move happened
    pub fn maybe_move_module_instance(&mut self, src: &ModuleInstance, dst: &ModuleInstance) -> bool {
        if self.modules.get(src).is_none() || self.modules.get(dst).is_some() {
            return false;
        }
        self.move_module_instance(src, dst);
        true
    }

    /// Relocate a resource to a new address
    ///
    /// The containing destination module is created if needed; the emptied
    /// source module is pruned unless it is the root.
    ///
    /// # Panics
    /// Panics when the source is not tracked or the destination is already
    /// tracked.
    pub fn move_abs_resource(&mut self, src: &AbsResource, dst: &AbsResource) {
        assert!(
            self.resource(dst).is_none(),
            "move destination {dst} is already tracked"
        );
        let Some(mut rs) = self
            .modules
            .get_mut(&src.module)
            .and_then(|ms| ms.resources.shift_remove(&src.resource))
        else {
            panic!("move source {src} is not tracked");
        };
        rs.addr = dst.clone();
        self.ensure_module(&dst.module)
            .resources
            .insert(dst.resource.clone(), rs);
        self.prune_module_if_empty(&src.module);
    }

    /// Move a resource only when the source exists and the destination
    /// does not; returns whether a move happened
    pub fn maybe_move_abs_resource(&mut self, src: &AbsResource, dst: &AbsResource) -> bool {
        if self.resource(src).is_none() || self.resource(dst).is_some() {
            return false;
        }
        self.move_abs_resource(src, dst);
        true
    }

    /// Relocate a single resource instance to a new address
    ///
    /// The destination resource inherits the source resource's provider
    /// attribution when it does not exist yet. Emptied source records are
    /// pruned.
    ///
    /// # Panics
    /// Panics when the source instance is not tracked or the destination
    /// instance is already tracked.
    pub fn move_abs_resource_instance(
        &mut self,
        src: &AbsResourceInstance,
        dst: &AbsResourceInstance,
    ) {
        assert!(
            self.resource_instance(dst).is_none(),
            "move destination {dst} is already tracked"
        );
        let Some(src_rs) = self
            .modules
            .get_mut(&src.module)
            .and_then(|ms| ms.resources.get_mut(&src.resource.resource))
        else {
            panic!("move source {src} is not tracked");
        };
        let provider_config = src_rs.provider_config.clone();
        let provider_key = src_rs.provider_key.clone();
        let Some(inst) = src_rs.instances.shift_remove(&src.resource.key) else {
            panic!("move source {src} is not tracked");
        };
        if src_rs.is_empty() {
            self.modules
                .get_mut(&src.module)
                .expect("source module vanished during move")
                .resources
                .shift_remove(&src.resource.resource);
        }
        self.prune_module_if_empty(&src.module);

        let dst_ms = self.ensure_module(&dst.module);
        let dst_rs = dst_ms.ensure_resource(
            dst.resource.resource.clone(),
            provider_config,
            provider_key,
        );
        dst_rs.instances.insert(dst.resource.key.clone(), inst);
    }

    /// Move a resource instance only when the source exists and the
    /// destination does not; returns whether a move happened
    pub fn maybe_move_abs_resource_instance(
        &mut self,
        src: &AbsResourceInstance,
        dst: &AbsResourceInstance,
    ) -> bool {
        if self.resource_instance(src).is_none() || self.resource_instance(dst).is_some() {
            return false;
        }
        self.move_abs_resource_instance(src, dst);
        true
    }

    fn prune_module_if_empty(&mut self, addr: &ModuleInstance) {
        if addr.is_root() {
            return;
        }
        if self.modules.get(addr).is_some_and(ModuleState::is_empty) {
            tracing::trace!(module = %addr, "pruning empty module");
            self.modules.shift_remove(addr);
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
