//! Attribute read/write scenarios (spec.md §8 S6).

use std::time::Duration;

use zb_harness::{Controller, MockTransport};
use zcl_core::Value;

use crate::fixtures::load_door_lock;

fn controller_with(inbound: &[&str]) -> Controller<MockTransport> {
    let mut t = MockTransport::new();
    for line in inbound {
        t.push_inbound_line(line);
    }
    Controller::new(t)
}

// S6
#[test]
fn read_attribute_surfaces_non_zero_status_as_attribute_read_failure() {
    let loaded = load_door_lock();
    let attr = loaded.schema.cluster("Door Lock").unwrap().attribute("LockState").unwrap();

    let mut c = controller_with(&[
        "RX len 8, ep 01, clus 0x0101 (Door Lock) FC 18 seq 01 cmd 01 payload[00 00 02 ]",
    ]);
    let err = c
        .read_attribute(0xBEEF, attr, Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(
        err,
        zb_harness::HarnessError::AttributeReadFailure { status: 0x02 }
    ));
}

#[test]
fn read_attribute_decodes_declared_type_on_success() {
    let loaded = load_door_lock();
    let attr = loaded.schema.cluster("Door Lock").unwrap().attribute("LockState").unwrap();

    let mut c = controller_with(&[
        "RX len 9, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 01 payload[00 00 00 30 01 ]",
    ]);
    let value = c.read_attribute(0xBEEF, attr, Duration::from_secs(1)).unwrap();
    assert_eq!(value, Value::Unsigned(1));
}

#[test]
fn write_attribute_emits_global_write_then_send() {
    let loaded = load_door_lock();
    let attr = loaded.schema.cluster("Door Lock").unwrap().attribute("LockState").unwrap();

    let mut c = controller_with(&[]);
    c.write_attribute(0xBEEF, attr, &Value::Unsigned(1)).unwrap();

    assert_eq!(
        c.transport_mut().outbound,
        vec![
            "zcl global write 257 0 48 {01}".to_string(),
            "send 0xBEEF 1 1".to_string(),
        ]
    );
}
