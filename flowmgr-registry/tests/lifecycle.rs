use std::collections::BTreeMap;
use std::sync::Arc;

use flowmgr_core::{CapacityTable, FlowResource, OffloadProfile, ResourceError, ResourceKind};
use flowmgr_registry::{DeviceRegistry, DeviceState, PortSpec, QueueId, RegistryError};

fn inline_only() -> DeviceRegistry {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        OffloadProfile::Inline,
        CapacityTable::new()
            .with(ResourceKind::CatCfn, 8)
            .with(ResourceKind::HshRcp, 4),
    );
    DeviceRegistry::new(profiles)
}

#[test]
fn unknown_profile_is_rejected() {
    let registry = inline_only();
    assert_eq!(
        registry
            .create_device(0, 1, OffloadProfile::Vswitch)
            .unwrap_err(),
        RegistryError::UnknownProfile(OffloadProfile::Vswitch)
    );
    assert!(registry.is_empty());
}

#[test]
fn destroy_waits_for_flows() {
    let registry = inline_only();
    let nic = registry.create_device(0, 2, OffloadProfile::Inline).unwrap();
    let resources = nic.resources();

    let index = resources.allocate(ResourceKind::CatCfn, 1).unwrap();
    let flow = resources
        .create_flow(0, vec![FlowResource::new(ResourceKind::CatCfn, index)])
        .unwrap();

    assert_eq!(
        registry.destroy_device(&nic).unwrap_err(),
        RegistryError::DeviceBusy {
            adapter_no: 0,
            flows: 1,
            ports: 0
        }
    );
    assert_eq!(nic.state(), DeviceState::Active);
    assert_eq!(registry.len(), 1);

    resources.delete_flow(flow).unwrap();
    registry.destroy_device(&nic).unwrap();
    assert_eq!(nic.state(), DeviceState::Destroyed);
    assert!(registry.find_device(0).is_none());
    assert_eq!(
        nic.resources().allocate(ResourceKind::CatCfn, 1),
        Err(ResourceError::Released)
    );
}

#[test]
fn destroy_waits_for_ports() {
    let registry = inline_only();
    let nic = registry.create_device(1, 2, OffloadProfile::Inline).unwrap();
    registry.create_port(&nic, PortSpec::new(0)).unwrap();
    registry.create_port(&nic, PortSpec::new(1)).unwrap();

    assert!(matches!(
        registry.destroy_device(&nic),
        Err(RegistryError::DeviceBusy { ports: 2, .. })
    ));

    registry.delete_port(&nic, 0).unwrap();
    registry.delete_port(&nic, 1).unwrap();
    assert_eq!(
        registry.delete_port(&nic, 1).unwrap_err(),
        RegistryError::PortNotFound {
            adapter_no: 1,
            port: 1
        }
    );
    registry.destroy_device(&nic).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn destroyed_device_rejects_ports_and_second_destroy() {
    let registry = inline_only();
    let nic = registry.create_device(2, 1, OffloadProfile::Inline).unwrap();
    registry.destroy_device(&nic).unwrap();

    assert!(matches!(
        registry.create_port(&nic, PortSpec::new(0)),
        Err(RegistryError::DeviceNotActive {
            state: DeviceState::Destroyed,
            ..
        })
    ));
    assert_eq!(
        registry.destroy_device(&nic).unwrap_err(),
        RegistryError::DeviceNotFound(2)
    );
    // The adapter number can be reused.
    registry.create_device(2, 1, OffloadProfile::Inline).unwrap();
}

#[test]
fn ports_reference_their_device() {
    let registry = inline_only();
    let nic = registry.create_device(0, 4, OffloadProfile::Inline).unwrap();
    let queues = vec![QueueId { id: 0, hw_id: 32 }, QueueId { id: 1, hw_id: 33 }];
    let port = registry
        .create_port(
            &nic,
            PortSpec::new(3)
                .with_port_id(17)
                .with_queues(queues.clone())
                .with_rss_target(5),
        )
        .unwrap();

    assert!(Arc::ptr_eq(&port.device().unwrap(), &nic));
    assert_eq!(port.port_id(), 17);
    assert_eq!(port.rx_queues(), queues.as_slice());
    assert_eq!(port.rss_target_id(), Some(5));
    assert!(Arc::ptr_eq(&nic.port(3).unwrap(), &port));
}

#[test]
fn traversal_follows_creation_order() {
    let registry = DeviceRegistry::new(CapacityTable::uniform(2));
    for adapter in [5u8, 1, 3] {
        registry
            .create_device(adapter, 1, OffloadProfile::Vswitch)
            .unwrap();
    }
    let order: Vec<_> = registry.devices().iter().map(|d| d.adapter_no()).collect();
    assert_eq!(order, vec![5, 1, 3]);

    let middle = registry.find_device(1).unwrap();
    registry.destroy_device(&middle).unwrap();
    let order: Vec<_> = registry.devices().iter().map(|d| d.adapter_no()).collect();
    assert_eq!(order, vec![5, 3]);
}

#[test]
fn snapshot_reports_usage_and_ports() {
    let registry = inline_only();
    let nic = registry.create_device(0, 2, OffloadProfile::Inline).unwrap();
    registry
        .create_port(&nic, PortSpec::new(1).with_rss_target(2))
        .unwrap();
    nic.resources().allocate(ResourceKind::HshRcp, 2).unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.len(), 1);
    let dev = &snapshot[0];
    assert_eq!(dev.state, DeviceState::Active);
    assert_eq!(dev.ports.len(), 1);
    assert_eq!(dev.usage.len(), 2);
    let hsh = dev
        .usage
        .iter()
        .find(|u| u.kind == ResourceKind::HshRcp)
        .unwrap();
    assert_eq!((hsh.capacity, hsh.in_use), (4, 1));

    let yaml = serde_yaml::to_string(&snapshot).unwrap();
    assert!(yaml.contains("profile: inline"));
    assert!(yaml.contains("kind: hsh_rcp"));
    assert!(yaml.contains("rss_target_id: 2"));
}

#[test]
fn devices_are_independent_under_concurrency() {
    let registry = DeviceRegistry::new(CapacityTable::uniform(64));
    let devices: Vec<_> = (0..4u8)
        .map(|a| registry.create_device(a, 1, OffloadProfile::Inline).unwrap())
        .collect();

    crossbeam::scope(|s| {
        for nic in &devices {
            s.spawn(move |_| {
                let mgr = nic.resources();
                let mut held = Vec::new();
                while let Ok(index) = mgr.allocate(ResourceKind::QslQst, 1) {
                    held.push(index);
                }
                assert_eq!(held.len(), 64);
                for index in held {
                    mgr.free(ResourceKind::QslQst, index).unwrap();
                }
            });
        }
    })
    .unwrap();

    for nic in &devices {
        registry.destroy_device(nic).unwrap();
    }
    assert!(registry.is_empty());
}
