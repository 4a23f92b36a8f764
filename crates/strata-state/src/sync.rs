//! Concurrency-safe facade over the state tree
//!
//! [`SyncState`] is the only entry point graph-walk workers may use while
//! the walk is running. It wraps the tree in one reader/writer lock and
//! exposes coarse, atomic operations: every mutator runs start-to-finish
//! under the exclusive lock (including the pruning its removals require),
//! and every reader returns a defensive copy taken under the shared lock,
//! so a returned value is private to its caller forever.
//!
//! The facade guarantees mutual exclusion of effects but no ordering
//! between operations issued concurrently by different workers. Callers
//! needing sequencing must arrange it themselves, e.g. through
//! dependency-graph ordering.

use crate::checks::CheckSource;
use crate::instance::{DeposedKey, Generation, ResourceInstance};
use crate::module::{ModuleState, OutputValue};
use crate::object::{ObjectStatus, ResourceInstanceObject};
use crate::resource::ResourceState;
use crate::state::State;
use crate::value::Value;
use parking_lot::{RwLock, RwLockWriteGuard};
use strata_addrs::{
    AbsLocalValue, AbsOutputValue, AbsResource, AbsResourceInstance, InstanceKey, ModuleCall,
    ModuleInstance, ProviderConfig,
};

/// Synchronized wrapper around [`State`] for concurrent graph walks
pub struct SyncState {
    state: RwLock<State>,
}

impl SyncState {
    /// Wrap a state tree for concurrent use
    #[must_use]
    pub fn new(state: State) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    // ---- Read accessors -------------------------------------------------
    //
    // Each returns a copy the caller may freely mutate. Module state can be
    // large; prefer the granular accessors below to bound the copy cost.

    /// Snapshot of one module's state, or `None` if untracked
    #[must_use]
    pub fn module(&self, addr: &ModuleInstance) -> Option<ModuleState> {
        self.state.read().module(addr).cloned()
    }

    /// Snapshots of the output values of every instance of one module call
    #[must_use]
    pub fn module_outputs(
        &self,
        parent: &ModuleInstance,
        call: &ModuleCall,
    ) -> Vec<(AbsOutputValue, OutputValue)> {
        self.state
            .read()
            .module_outputs(parent, call)
            .into_iter()
            .map(|(addr, output)| (addr, output.clone()))
            .collect()
    }

    /// Snapshot of one output value, or `None` if untracked
    #[must_use]
    pub fn output_value(&self, addr: &AbsOutputValue) -> Option<OutputValue> {
        self.state.read().output_value(addr).cloned()
    }

    /// One local value, or `None` if untracked
    ///
    /// [`Value`] is immutable, so no deep copy is needed here.
    #[must_use]
    pub fn local_value(&self, addr: &AbsLocalValue) -> Option<Value> {
        self.state.read().local_value(addr).cloned()
    }

    /// Snapshot of one resource's state, or `None` if untracked
    #[must_use]
    pub fn resource(&self, addr: &AbsResource) -> Option<ResourceState> {
        self.state.read().resource(addr).cloned()
    }

    /// Snapshot of one resource instance's state, or `None` if untracked
    #[must_use]
    pub fn resource_instance(&self, addr: &AbsResourceInstance) -> Option<ResourceInstance> {
        self.state.read().resource_instance(addr).cloned()
    }

    /// Snapshot of one generation object of an instance, or `None` if
    /// untracked
    #[must_use]
    pub fn resource_instance_object(
        &self,
        addr: &AbsResourceInstance,
        gen: &Generation,
    ) -> Option<ResourceInstanceObject> {
        self.state
            .read()
            .resource_instance(addr)
            .and_then(|inst| inst.object(gen))
            .cloned()
    }

    // ---- Write accessors ------------------------------------------------

    /// Write an output value, overwriting any existing value of the same
    /// name; the containing module is created if not yet tracked
    pub fn set_output_value(
        &self,
        addr: &AbsOutputValue,
        value: Value,
        sensitive: bool,
        deprecated: Option<String>,
    ) {
        let mut state = self.state.write();
        state
            .ensure_module(&addr.module)
            .set_output_value(addr.name.clone(), value, sensitive, deprecated);
    }

    /// Remove an output value, pruning the containing module if that left
    /// it empty
    pub fn remove_output_value(&self, addr: &AbsOutputValue) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return;
        };
        ms.remove_output_value(&addr.name);
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Write a local value, overwriting any existing value of the same
    /// name; the containing module is created if not yet tracked
    pub fn set_local_value(&self, addr: &AbsLocalValue, value: Value) {
        let mut state = self.state.write();
        state
            .ensure_module(&addr.module)
            .set_local_value(addr.name.clone(), value);
    }

    /// Remove a local value, pruning the containing module if that left it
    /// empty
    pub fn remove_local_value(&self, addr: &AbsLocalValue) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return;
        };
        ms.remove_local_value(&addr.name);
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Update resource-level provider metadata, creating the containing
    /// module and resource records as needed
    pub fn set_resource_provider(
        &self,
        addr: &AbsResource,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        let mut state = self.state.write();
        state.ensure_module(&addr.module).set_resource_provider(
            addr.resource.clone(),
            provider_config,
            provider_key,
        );
    }

    /// Remove a module and everything in it
    ///
    /// Callers generally do this only once the module's resources are all
    /// destroyed, but that is not enforced here.
    pub fn remove_module(&self, addr: &ModuleInstance) {
        self.state.write().remove_module(addr);
    }

    /// Remove a resource and any instances it still has
    ///
    /// Not checked against live instances; use
    /// [`Self::remove_resource_if_empty`] to remove only safely-removable
    /// resources.
    pub fn remove_resource(&self, addr: &AbsResource) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return;
        };
        ms.remove_resource(&addr.resource);
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Remove a resource only if it has no instances left
    ///
    /// Returns true when the resource is absent afterwards — either it was
    /// already untracked or it was empty and has now been removed. The
    /// check and the removal happen under one lock hold, so no concurrent
    /// writer can add an instance in between.
    pub fn remove_resource_if_empty(&self, addr: &AbsResource) -> bool {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return true;
        };
        let Some(rs) = ms.resource(&addr.resource) else {
            return true;
        };
        if !rs.is_empty() {
            // Instances that exist without objects would already have been
            // pruned by the instance-mutation methods, so any instance here
            // is live.
            return false;
        }
        ms.remove_resource(&addr.resource);
        maybe_prune_module(&mut state, &addr.module);
        true
    }

    /// Write the current generation object of one instance
    ///
    /// `Some` replaces any existing current object; `None` removes it, and
    /// an instance left with no objects is removed entirely, possibly
    /// cascading into resource removal and module pruning. The containing
    /// module and resource are created as needed.
    ///
    /// Provider attribution is resource-wide and updated as a side effect
    /// of every `Some` write: when instances of one resource are written
    /// concurrently with different provider configurations, the writes
    /// serialize under the exclusive lock and the last writer wins.
    pub fn set_resource_instance_current(
        &self,
        addr: &AbsResourceInstance,
        obj: Option<ResourceInstanceObject>,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        let mut state = self.state.write();
        state.ensure_module(&addr.module).set_resource_instance_current(
            &addr.resource,
            obj,
            provider_config,
            provider_key,
        );
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Write a deposed generation object under an explicit, known key
    ///
    /// Only for pre-existing deposed objects, e.g. reloaded from a
    /// persisted snapshot; to depose the current object use
    /// [`Self::depose_resource_instance_object`].
    ///
    /// # Panics
    /// Panics when writing a `Some` object for an untracked resource.
    pub fn set_resource_instance_deposed(
        &self,
        addr: &AbsResourceInstance,
        key: DeposedKey,
        obj: Option<ResourceInstanceObject>,
        provider_config: ProviderConfig,
        provider_key: InstanceKey,
    ) {
        let mut state = self.state.write();
        state.ensure_module(&addr.module).set_resource_instance_deposed(
            &addr.resource,
            key,
            obj,
            provider_config,
            provider_key,
        );
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Move the current object of one instance into its deposed set
    ///
    /// Returns the newly-allocated deposed key, or `None` when the
    /// instance has no current object (including when nothing at that
    /// address is tracked at all).
    pub fn depose_resource_instance_object(
        &self,
        addr: &AbsResourceInstance,
    ) -> Option<DeposedKey> {
        let mut state = self.state.write();
        let ms = state.module_mut(&addr.module)?;
        ms.depose_resource_instance_object(&addr.resource, None)
    }

    /// Like [`Self::depose_resource_instance_object`] but with a
    /// pre-allocated key
    ///
    /// It is the caller's responsibility that no other user of the key
    /// races this call.
    ///
    /// # Panics
    /// Panics if the key is already in use on the instance's deposed set.
    pub fn depose_resource_instance_object_force_key(
        &self,
        addr: &AbsResourceInstance,
        forced_key: DeposedKey,
    ) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            // Nothing to do: there can be no current object either.
            return;
        };
        ms.depose_resource_instance_object(&addr.resource, Some(forced_key));
    }

    /// Drop every record of one instance without any destroy action
    pub fn forget_resource_instance_all(&self, addr: &AbsResourceInstance) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return;
        };
        ms.forget_resource_instance_all(&addr.resource);
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Drop the record of one deposed object without any destroy action
    pub fn forget_resource_instance_deposed(
        &self,
        addr: &AbsResourceInstance,
        key: &DeposedKey,
    ) {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return;
        };
        ms.forget_resource_instance_deposed(&addr.resource, key);
        maybe_prune_module(&mut state, &addr.module);
    }

    /// Restore a deposed object as the instance's current object, if and
    /// only if that would not discard an existing current object
    ///
    /// Returns true when the object was restored, false when no change was
    /// made.
    pub fn maybe_restore_resource_instance_deposed(
        &self,
        addr: &AbsResourceInstance,
        key: &DeposedKey,
    ) -> bool {
        let mut state = self.state.write();
        let Some(ms) = state.module_mut(&addr.module) else {
            return false;
        };
        ms.maybe_restore_resource_instance_deposed(&addr.resource, key)
    }

    /// Remove every generation object with planned status from the whole
    /// tree
    ///
    /// Planned objects are transient placeholders created while preparing
    /// a speculative plan; discarding them cannot lose a real object,
    /// because a planned object only ever stands in for one that does not
    /// exist yet. Every touched module is pruned in the same critical
    /// section.
    pub fn remove_planned_resource_instance_objects(&self) {
        let mut state = self.state.write();

        let module_addrs: Vec<ModuleInstance> =
            state.modules().map(|ms| ms.addr.clone()).collect();
        for module_addr in module_addrs {
            let Some(ms) = state.module_mut(&module_addr) else {
                continue;
            };

            let mut current_removals = Vec::new();
            let mut deposed_removals = Vec::new();
            for rs in ms.resources.values() {
                for (ikey, inst) in &rs.instances {
                    let inst_addr = rs.addr.resource.instance(ikey.clone());
                    if inst
                        .current
                        .as_ref()
                        .is_some_and(|obj| obj.status == ObjectStatus::Planned)
                    {
                        current_removals.push((
                            inst_addr.clone(),
                            rs.provider_config.clone(),
                            rs.provider_key.clone(),
                        ));
                    }
                    // Deposed objects should never be planned, but sweep
                    // them too for completeness.
                    for (dkey, obj) in &inst.deposed {
                        if obj.status == ObjectStatus::Planned {
                            deposed_removals.push((inst_addr.clone(), dkey.clone()));
                        }
                    }
                }
            }

            for (inst_addr, provider_config, provider_key) in current_removals {
                ms.set_resource_instance_current(&inst_addr, None, provider_config, provider_key);
            }
            for (inst_addr, dkey) in deposed_removals {
                ms.forget_resource_instance_deposed(&inst_addr, &dkey);
            }

            maybe_prune_module(&mut state, &module_addr);
        }
    }

    // ---- Check results --------------------------------------------------

    /// Discard any recorded check results
    ///
    /// Called proactively when an update cycle starts, so results from a
    /// previous run can never be read as if they were current.
    pub fn discard_check_results(&self) {
        self.state.write().check_results = None;
    }

    /// Replace the recorded check results with a snapshot from the given
    /// source
    pub fn record_check_results(&self, source: &dyn CheckSource) {
        // Take the snapshot outside the critical section; only the swap
        // needs the lock.
        let new_results = source.check_results();
        self.state.write().check_results = Some(new_results);
    }

    // ---- Structural moves -----------------------------------------------

    /// Relocate a module instance; see [`State::move_module_instance`]
    ///
    /// # Panics
    /// Panics when either address is the root, the source is untracked, or
    /// the destination is occupied.
    pub fn move_module_instance(&self, src: &ModuleInstance, dst: &ModuleInstance) {
        self.state.write().move_module_instance(src, dst);
    }

    /// Conditional module-instance move; returns whether a move happened
    pub fn maybe_move_module_instance(&self, src: &ModuleInstance, dst: &ModuleInstance) -> bool {
        self.state.write().maybe_move_module_instance(src, dst)
    }

    /// Relocate a resource; see [`State::move_abs_resource`]
    ///
    /// # Panics
    /// Panics when the source is untracked or the destination is occupied.
    pub fn move_abs_resource(&self, src: &AbsResource, dst: &AbsResource) {
        self.state.write().move_abs_resource(src, dst);
    }

    /// Conditional resource move; returns whether a move happened
    pub fn maybe_move_abs_resource(&self, src: &AbsResource, dst: &AbsResource) -> bool {
        self.state.write().maybe_move_abs_resource(src, dst)
    }

    /// Relocate a resource instance; see
    /// [`State::move_abs_resource_instance`]
    ///
    /// # Panics
    /// Panics when the source is untracked or the destination is occupied.
    pub fn move_resource_instance(&self, src: &AbsResourceInstance, dst: &AbsResourceInstance) {
        self.state.write().move_abs_resource_instance(src, dst);
    }

    /// Conditional resource-instance move; returns whether a move happened
    pub fn maybe_move_resource_instance(
        &self,
        src: &AbsResourceInstance,
        dst: &AbsResourceInstance,
    ) -> bool {
        self.state.write().maybe_move_abs_resource_instance(src, dst)
    }

    // ---- Escape hatch ---------------------------------------------------

    /// Acquire the exclusive lock for a multi-step read-modify-write
    /// sequence not covered by a built-in operation
    ///
    /// The lock is released when the returned guard drops, on every exit
    /// path. Most callers should use the built-in operations instead; a
    /// caller holding the guard is responsible for upholding the tree's
    /// invariants itself, e.g. by finishing with [`State::prune`].
    pub fn lock(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write()
    }

    /// Extract the underlying state, consuming the facade
    ///
    /// Further synchronized use after close is impossible by construction;
    /// callers sharing the facade through an `Arc` must prove unique
    /// ownership first.
    #[must_use]
    pub fn close(self) -> State {
        self.state.into_inner()
    }
}

/// Remove the given module if it is non-root and empty
///
/// Must run while the exclusive lock is held; every mutator that can empty
/// a module calls this before releasing.
fn maybe_prune_module(state: &mut State, addr: &ModuleInstance) {
    if addr.is_root() {
        // The root is never pruned.
        return;
    }
    if state.module(addr).is_some_and(ModuleState::is_empty) {
        tracing::trace!(module = %addr, "pruning module because it is empty");
        state.remove_module(addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_addrs::Resource;

    fn aws() -> ProviderConfig {
        ProviderConfig::root("aws")
    }

    fn web(module: &ModuleInstance) -> AbsResourceInstance {
        Resource::managed("aws_instance", "web")
            .absolute(module.clone())
            .instance(InstanceKey::NoKey)
    }

    fn obj(marker: &str) -> ResourceInstanceObject {
        ResourceInstanceObject::ready(marker.as_bytes().to_vec())
    }

    #[test]
    fn reads_return_private_copies() {
        let sync = SyncState::new(State::new());
        let root = ModuleInstance::root();
        sync.set_resource_instance_current(&web(&root), Some(obj("a")), aws(), InstanceKey::NoKey);

        let mut copy = sync.resource_instance(&web(&root)).unwrap();
        copy.current = None;

        // The caller's mutation is invisible to later reads.
        assert!(sync.resource_instance(&web(&root)).unwrap().has_current());
    }

    #[test]
    fn write_creates_module_as_side_effect() {
        let sync = SyncState::new(State::new());
        let module = ModuleInstance::root().child("net", InstanceKey::NoKey);
        sync.set_output_value(
            &AbsOutputValue::new(module.clone(), "x"),
            Value::string("v"),
            false,
            None,
        );

        let ms = sync.module(&module).unwrap();
        assert_eq!(ms.outputs.len(), 1);
        assert!(ms.resources.is_empty() && ms.locals.is_empty());
    }

    #[test]
    fn removal_prunes_emptied_module() {
        let sync = SyncState::new(State::new());
        let module = ModuleInstance::root().child("net", InstanceKey::NoKey);
        let addr = AbsOutputValue::new(module.clone(), "x");
        sync.set_output_value(&addr, Value::string("v"), false, None);
        sync.remove_output_value(&addr);
        assert!(sync.module(&module).is_none());
    }

    #[test]
    fn root_is_never_pruned() {
        let sync = SyncState::new(State::new());
        let root = ModuleInstance::root();
        let addr = AbsOutputValue::new(root.clone(), "x");
        sync.set_output_value(&addr, Value::string("v"), false, None);
        sync.remove_output_value(&addr);
        assert!(sync.module(&root).is_some());
    }

    #[test]
    fn close_returns_the_tree() {
        let sync = SyncState::new(State::new());
        let root = ModuleInstance::root();
        sync.set_local_value(&AbsLocalValue::new(root.clone(), "x"), Value::null());

        let state = sync.close();
        assert!(state.local_value(&AbsLocalValue::new(root, "x")).is_some());
    }

    #[test]
    fn explicit_lock_allows_multi_step_edit() {
        let sync = SyncState::new(State::new());
        let module = ModuleInstance::root().child("net", InstanceKey::NoKey);
        {
            let mut state = sync.lock();
            let ms = state.ensure_module(&module);
            ms.set_local_value("a", Value::null());
            ms.remove_local_value("a");
            state.prune();
        }
        assert!(sync.module(&module).is_none());
    }
}
