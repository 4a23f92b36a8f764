//! Testing utilities for the Strata workspace
//!
//! Shared fixtures and address builders for state-engine tests.

#![allow(missing_docs)]

use strata_addrs::{
    AbsLocalValue, AbsOutputValue, AbsResource, AbsResourceInstance, InstanceKey, ModuleInstance,
    ProviderConfig, Resource,
};
use strata_state::{ObjectStatus, ResourceInstanceObject, State, SyncState, Value};

pub fn create_test_provider() -> ProviderConfig {
    ProviderConfig::root("test")
}

pub fn create_child_module(name: &str) -> ModuleInstance {
    ModuleInstance::root().child(name, InstanceKey::NoKey)
}

pub fn create_keyed_module(name: &str, key: &str) -> ModuleInstance {
    ModuleInstance::root().child(name, InstanceKey::key(key))
}

pub fn create_resource(name: &str) -> AbsResource {
    Resource::managed("test_thing", name).absolute(ModuleInstance::root())
}

pub fn create_resource_in(module: ModuleInstance, name: &str) -> AbsResource {
    Resource::managed("test_thing", name).absolute(module)
}

pub fn create_instance(name: &str) -> AbsResourceInstance {
    create_resource(name).instance(InstanceKey::NoKey)
}

pub fn create_instance_in(module: ModuleInstance, name: &str) -> AbsResourceInstance {
    create_resource_in(module, name).instance(InstanceKey::NoKey)
}

pub fn create_output(module: ModuleInstance, name: &str) -> AbsOutputValue {
    AbsOutputValue::new(module, name)
}

pub fn create_local(module: ModuleInstance, name: &str) -> AbsLocalValue {
    AbsLocalValue::new(module, name)
}

pub fn create_ready_object(marker: &str) -> ResourceInstanceObject {
    ResourceInstanceObject::ready(marker.as_bytes().to_vec())
}

pub fn create_planned_object() -> ResourceInstanceObject {
    ResourceInstanceObject::planned(b"{}".to_vec())
}

pub fn create_tainted_object(marker: &str) -> ResourceInstanceObject {
    let mut obj = ResourceInstanceObject::ready(marker.as_bytes().to_vec());
    obj.status = ObjectStatus::Tainted;
    obj
}

/// Synchronized state pre-seeded with one ready instance at each of the
/// given addresses.
pub fn setup_sync_state(addrs: &[AbsResourceInstance]) -> SyncState {
    let sync = SyncState::new(State::new());
    for addr in addrs {
        sync.set_resource_instance_current(
            addr,
            Some(create_ready_object("seed")),
            create_test_provider(),
            InstanceKey::NoKey,
        );
    }
    sync
}

pub fn create_test_value(text: &str) -> Value {
    Value::string(text)
}
