//! Behavioural tests for the synchronized state facade

use std::sync::Arc;

use pretty_assertions::assert_eq;
use strata_addrs::{
    AbsResourceInstance, InstanceKey, ModuleCall, ModuleInstance, ProviderConfig, Resource,
};
use strata_state::{CheckResult, CheckResults, DeposedKey, Generation, State, SyncState, Value};
use strata_test_utils::{
    create_child_module, create_instance, create_instance_in, create_keyed_module, create_local,
    create_output, create_planned_object, create_ready_object, create_resource,
    create_test_provider, setup_sync_state,
};

#[test]
fn read_copies_are_isolated_from_later_writes() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    let before = sync.resource_instance(&addr).unwrap();
    sync.set_resource_instance_current(
        &addr,
        Some(create_ready_object("updated")),
        create_test_provider(),
        InstanceKey::NoKey,
    );

    // The copy taken before the write still shows the old object.
    assert_eq!(before.current, Some(create_ready_object("seed")));
    let after = sync.resource_instance(&addr).unwrap();
    assert_eq!(after.current, Some(create_ready_object("updated")));
}

#[test]
fn depose_and_restore_round_trip() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    let key = sync.depose_resource_instance_object(&addr).unwrap();
    let inst = sync.resource_instance(&addr).unwrap();
    assert!(!inst.has_current());
    assert_eq!(inst.deposed.len(), 1);

    // The deposed object is addressable by generation.
    let deposed = sync
        .resource_instance_object(&addr, &Generation::Deposed(key.clone()))
        .unwrap();
    assert_eq!(deposed, create_ready_object("seed"));

    assert!(sync.maybe_restore_resource_instance_deposed(&addr, &key));
    let inst = sync.resource_instance(&addr).unwrap();
    assert_eq!(inst.current, Some(create_ready_object("seed")));
    assert!(inst.deposed.is_empty());
}

#[test]
fn restore_refuses_to_discard_current_object() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    let key = sync.depose_resource_instance_object(&addr).unwrap();
    sync.set_resource_instance_current(
        &addr,
        Some(create_ready_object("replacement")),
        create_test_provider(),
        InstanceKey::NoKey,
    );

    assert!(!sync.maybe_restore_resource_instance_deposed(&addr, &key));
    let inst = sync.resource_instance(&addr).unwrap();
    assert_eq!(inst.current, Some(create_ready_object("replacement")));
    assert_eq!(inst.deposed.len(), 1);
}

#[test]
fn depose_with_no_current_object_returns_none() {
    let sync = SyncState::new(State::new());
    assert_eq!(
        sync.depose_resource_instance_object(&create_instance("ghost")),
        None
    );
}

#[test]
fn repeated_deposals_allocate_distinct_keys() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    let first = sync.depose_resource_instance_object(&addr).unwrap();
    sync.set_resource_instance_current(
        &addr,
        Some(create_ready_object("second")),
        create_test_provider(),
        InstanceKey::NoKey,
    );
    let second = sync.depose_resource_instance_object(&addr).unwrap();

    assert_ne!(first, second);
    assert_eq!(sync.resource_instance(&addr).unwrap().deposed.len(), 2);
}

#[test]
fn forced_key_deposal_uses_the_given_key() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);
    let key = DeposedKey::parse("deadbeef").unwrap();

    sync.depose_resource_instance_object_force_key(&addr, key.clone());

    let inst = sync.resource_instance(&addr).unwrap();
    assert!(!inst.has_current());
    assert!(inst.deposed.contains_key(&key));
}

#[test]
fn forced_key_deposal_on_untracked_address_is_noop() {
    let sync = SyncState::new(State::new());
    sync.depose_resource_instance_object_force_key(
        &create_instance("ghost"),
        DeposedKey::parse("deadbeef").unwrap(),
    );
    assert!(sync.resource_instance(&create_instance("ghost")).is_none());
}

#[test]
fn remove_resource_if_empty_spares_live_instances() {
    let addr = create_instance("web");
    let resource = create_resource("web");
    let sync = setup_sync_state(&[addr.clone()]);

    assert!(!sync.remove_resource_if_empty(&resource));
    assert!(sync.resource(&resource).is_some());
}

#[test]
fn remove_resource_if_empty_spares_deposed_only_instances() {
    let addr = create_instance("web");
    let resource = create_resource("web");
    let sync = setup_sync_state(&[addr.clone()]);
    let key = sync.depose_resource_instance_object(&addr).unwrap();

    // A deposed object still needs a destroy action, so the resource must
    // stay tracked.
    assert!(!sync.remove_resource_if_empty(&resource));

    // Once the deposed object is forgotten too, removal succeeds.
    sync.forget_resource_instance_deposed(&addr, &key);
    assert!(sync.remove_resource_if_empty(&resource));
}

#[test]
fn remove_resource_if_empty_reports_true_for_untracked() {
    let sync = SyncState::new(State::new());
    assert!(sync.remove_resource_if_empty(&create_resource("nothing")));
}

#[test]
fn removing_last_object_prunes_instance_resource_and_module() {
    let module = create_child_module("net");
    let addr = create_instance_in(module.clone(), "web");
    let sync = setup_sync_state(&[addr.clone()]);

    sync.set_resource_instance_current(&addr, None, create_test_provider(), InstanceKey::NoKey);

    assert!(sync.resource_instance(&addr).is_none());
    assert!(sync.resource(&addr.containing_resource()).is_none());
    assert!(sync.module(&module).is_none());
}

#[test]
fn removing_current_keeps_instance_holding_deposed_objects() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);
    let key = sync.depose_resource_instance_object(&addr).unwrap();
    sync.set_resource_instance_current(
        &addr,
        Some(create_ready_object("second")),
        create_test_provider(),
        InstanceKey::NoKey,
    );

    sync.set_resource_instance_current(&addr, None, create_test_provider(), InstanceKey::NoKey);

    let inst = sync.resource_instance(&addr).unwrap();
    assert!(!inst.has_current());
    assert!(inst.deposed.contains_key(&key));
}

#[test]
fn forget_deposed_can_cascade_to_module_removal() {
    let module = create_child_module("net");
    let addr = create_instance_in(module.clone(), "web");
    let sync = setup_sync_state(&[addr.clone()]);
    let key = sync.depose_resource_instance_object(&addr).unwrap();

    sync.forget_resource_instance_deposed(&addr, &key);

    assert!(sync.module(&module).is_none());
}

#[test]
fn remove_module_drops_everything_in_it() {
    let module = create_child_module("net");
    let sync = setup_sync_state(&[create_instance_in(module.clone(), "web")]);

    sync.remove_module(&module);
    assert!(sync.module(&module).is_none());

    // Removing it again is a harmless no-op.
    sync.remove_module(&module);
}

#[test]
fn output_write_creates_module_and_removal_prunes_it() {
    let sync = SyncState::new(State::new());
    let module = create_child_module("net");
    let output = create_output(module.clone(), "vpc_id");

    sync.set_output_value(&output, Value::string("vpc-123"), false, None);
    assert!(sync.module(&module).is_some());
    assert_eq!(
        sync.output_value(&output).unwrap().value,
        Value::string("vpc-123")
    );

    sync.remove_output_value(&output);
    assert!(sync.module(&module).is_none());
}

#[test]
fn local_values_round_trip_through_facade() {
    let sync = SyncState::new(State::new());
    let local = create_local(ModuleInstance::root(), "region");

    sync.set_local_value(&local, Value::string("eu-west-1"));
    assert_eq!(sync.local_value(&local), Some(Value::string("eu-west-1")));

    sync.remove_local_value(&local);
    assert_eq!(sync.local_value(&local), None);
    // The root module survives even though it is now empty.
    assert!(sync.module(&ModuleInstance::root()).is_some());
}

#[test]
fn module_outputs_collects_every_call_instance() {
    let sync = SyncState::new(State::new());
    for region in ["eu", "us"] {
        let module = create_keyed_module("net", region);
        sync.set_output_value(
            &create_output(module, "cidr"),
            Value::string(region),
            false,
            None,
        );
    }
    sync.set_output_value(
        &create_output(create_child_module("other"), "cidr"),
        Value::string("unrelated"),
        false,
        None,
    );

    let outputs = sync.module_outputs(&ModuleInstance::root(), &ModuleCall::new("net"));
    assert_eq!(outputs.len(), 2);
    assert!(outputs.iter().all(|(addr, _)| addr.name == "cidr"));
}

#[test]
fn planned_sweep_removes_only_planned_objects() {
    let sync = SyncState::new(State::new());
    let ready = create_instance("keep");
    let planned = create_instance_in(create_child_module("scratch"), "drop");
    sync.set_resource_instance_current(
        &ready,
        Some(create_ready_object("real")),
        create_test_provider(),
        InstanceKey::NoKey,
    );
    sync.set_resource_instance_current(
        &planned,
        Some(create_planned_object()),
        create_test_provider(),
        InstanceKey::NoKey,
    );

    sync.remove_planned_resource_instance_objects();

    assert!(sync.resource_instance(&ready).is_some());
    assert!(sync.resource_instance(&planned).is_none());
    // The module that held only the planned object is pruned too.
    assert!(sync.module(&create_child_module("scratch")).is_none());
}

#[test]
fn planned_sweep_covers_deposed_objects() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);
    let key = DeposedKey::parse("0000beef").unwrap();
    sync.set_resource_instance_deposed(
        &addr,
        key.clone(),
        Some(create_planned_object()),
        create_test_provider(),
        InstanceKey::NoKey,
    );

    sync.remove_planned_resource_instance_objects();

    let inst = sync.resource_instance(&addr).unwrap();
    assert!(inst.has_current());
    assert!(!inst.deposed.contains_key(&key));
}

#[test]
fn check_results_are_replaced_wholesale() {
    let sync = SyncState::new(State::new());

    let mut first = CheckResults::new();
    first.record("check.a", CheckResult::pass());
    first.record("check.b", CheckResult::pass());
    sync.record_check_results(&first);

    let mut second = CheckResults::new();
    second.record("check.a", CheckResult::fail(vec!["boom".to_string()]));
    sync.record_check_results(&second);

    let state = sync.close();
    let results = state.check_results.as_ref().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.get("check.b").is_none());
}

#[test]
fn discard_check_results_clears_the_snapshot() {
    let sync = SyncState::new(State::new());
    let mut results = CheckResults::new();
    results.record("check.a", CheckResult::pass());
    sync.record_check_results(&results);

    sync.discard_check_results();

    assert!(sync.close().check_results.is_none());
}

#[test]
fn maybe_move_resource_instance_through_facade() {
    let src = create_instance("old");
    let dst = create_instance("new");
    let sync = setup_sync_state(&[src.clone()]);

    assert!(sync.maybe_move_resource_instance(&src, &dst));
    assert!(sync.resource_instance(&src).is_none());
    assert!(sync.resource_instance(&dst).is_some());

    // Already moved: reports false without changing anything.
    assert!(!sync.maybe_move_resource_instance(&src, &dst));
}

#[test]
fn maybe_move_module_instance_through_facade() {
    let src = create_child_module("old");
    let dst = create_child_module("new");
    let sync = setup_sync_state(&[create_instance_in(src.clone(), "web")]);

    assert!(sync.maybe_move_module_instance(&src, &dst));
    assert!(sync.module(&src).is_none());
    assert_eq!(sync.module(&dst).unwrap().addr, dst);
}

#[test]
fn provider_metadata_serialises_last_writer_wins() {
    let resource = create_resource("web");
    let sync = SyncState::new(State::new());
    let i0 = resource.instance(InstanceKey::Index(0));
    let i1 = resource.instance(InstanceKey::Index(1));

    sync.set_resource_instance_current(
        &i0,
        Some(create_ready_object("a")),
        ProviderConfig::root("test"),
        InstanceKey::NoKey,
    );
    sync.set_resource_instance_current(
        &i1,
        Some(create_ready_object("b")),
        ProviderConfig::root("test").with_alias("west"),
        InstanceKey::NoKey,
    );

    let rs = sync.resource(&resource).unwrap();
    assert_eq!(rs.provider_config, ProviderConfig::root("test").with_alias("west"));
    assert_eq!(rs.instances.len(), 2);
}

#[test]
fn concurrent_writers_on_disjoint_addresses_all_land() {
    let sync = Arc::new(SyncState::new(State::new()));
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let sync = Arc::clone(&sync);
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    let addr = Resource::managed("test_thing", format!("r{t}"))
                        .absolute(ModuleInstance::root())
                        .instance(InstanceKey::Index(i));
                    sync.set_resource_instance_current(
                        &addr,
                        Some(create_ready_object(&format!("{t}/{i}"))),
                        create_test_provider(),
                        InstanceKey::NoKey,
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let sync = Arc::try_unwrap(sync).ok().unwrap();
    let state = sync.close();
    let root = state.root_module();
    assert_eq!(root.resources.len(), threads as usize);
    for rs in root.resources.values() {
        assert_eq!(rs.instances.len(), per_thread as usize);
    }
}

#[test]
fn concurrent_depose_restore_cycles_preserve_objects() {
    let addrs: Vec<AbsResourceInstance> =
        (0..8).map(|i| create_instance(&format!("web{i}"))).collect();
    let sync = Arc::new(setup_sync_state(&addrs));

    let handles: Vec<_> = addrs
        .iter()
        .cloned()
        .map(|addr| {
            let sync = Arc::clone(&sync);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    let key = sync.depose_resource_instance_object(&addr).unwrap();
                    assert!(sync.maybe_restore_resource_instance_deposed(&addr, &key));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for addr in &addrs {
        let inst = sync.resource_instance(addr).unwrap();
        assert_eq!(inst.current, Some(create_ready_object("seed")));
        assert!(inst.deposed.is_empty());
    }
}

#[test]
fn object_lookup_by_generation() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    assert_eq!(
        sync.resource_instance_object(&addr, &Generation::Current),
        Some(create_ready_object("seed"))
    );
    let bogus = DeposedKey::parse("00000000").unwrap();
    assert_eq!(
        sync.resource_instance_object(&addr, &Generation::Deposed(bogus)),
        None
    );
}

#[test]
fn explicit_lock_bridges_multi_step_edits() {
    let addr = create_instance("web");
    let sync = setup_sync_state(&[addr.clone()]);

    {
        let mut state = sync.lock();
        // Read-modify-write that no single built-in operation covers:
        // rename an output based on a resource's presence.
        let tracked = state.resource_instance(&addr).is_some();
        state.ensure_module(&ModuleInstance::root()).set_output_value(
            "tracked",
            Value::new(serde_json::Value::Bool(tracked)),
            false,
            None,
        );
        state.prune();
    }

    let output = create_output(ModuleInstance::root(), "tracked");
    assert_eq!(
        sync.output_value(&output).unwrap().value,
        Value::new(serde_json::Value::Bool(true))
    );
}
