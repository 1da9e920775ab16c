//! Command dispatch and expectation scenarios (spec.md §8 S4, S7),
//! driven end-to-end from a loaded schema rather than a hand-built
//! `CommandPrototype`.

use std::time::Duration;

use zb_harness::{Controller, MockTransport};
use zcl_core::{bind, bind_expectation, Expectation, Validator, Value};

use crate::fixtures::load_door_lock;

fn controller_with(inbound: &[&str]) -> Controller<MockTransport> {
    let mut t = MockTransport::new();
    for line in inbound {
        t.push_inbound_line(line);
    }
    Controller::new(t)
}

// S4
#[test]
fn send_door_lock_set_pin_emits_exact_wire_lines() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();

    let invocation = bind(
        proto,
        vec![
            Value::Unsigned(7),
            Value::Unsigned(1),
            Value::Unsigned(1),
            Value::Unsigned(4),
            Value::from("1234"),
        ],
    )
    .unwrap();

    let mut c = controller_with(&[]);
    c.send_zcl_command(0x1234, &invocation).unwrap();

    assert_eq!(
        c.transport_mut().outbound,
        vec![
            "raw 0x0101 {01 00 00 07 00 01 01 04 04 31 32 33 34}".to_string(),
            "send 0x1234 1 1".to_string(),
        ]
    );
    assert_eq!(c.state().sequence, 1);
}

#[test]
fn sequence_advances_once_per_send_across_multiple_calls() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();
    let mut c = controller_with(&[]);

    for n in 0..5u8 {
        let invocation = bind(
            proto,
            vec![
                Value::Unsigned(1),
                Value::Unsigned(1),
                Value::Unsigned(1),
                Value::Unsigned(1),
                Value::from("x"),
            ],
        )
        .unwrap();
        c.send_zcl_command(0x1234, &invocation).unwrap();
        assert_eq!(c.state().sequence, n + 1);
    }
}

// S7
#[test]
fn expect_zcl_command_with_between_validator_passes_in_range() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();

    let expectation = bind_expectation(
        proto,
        vec![
            Expectation::Validator(Validator::Between(10, 20)),
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
        ],
    )
    .unwrap();

    let mut c = controller_with(&[
        "RX len 9, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 00 payload[0F 01 01 04 04 31 32 33 34 ]",
    ]);
    c.expect_zcl_command(&expectation, Duration::from_secs(1))
        .expect("0x0F is within 10..=20");
}

#[test]
fn expect_zcl_command_with_between_validator_fails_out_of_range() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();

    let expectation = bind_expectation(
        proto,
        vec![
            Expectation::Validator(Validator::Between(10, 20)),
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
        ],
    )
    .unwrap();

    let mut c = controller_with(&[
        "RX len 9, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 00 payload[05 01 01 04 04 31 32 33 34 ]",
    ]);
    let err = c
        .expect_zcl_command(&expectation, Duration::from_secs(1))
        .unwrap_err();
    match err {
        zb_harness::HarnessError::AssertionFailure { arg_name, .. } => assert_eq!(arg_name, "user_id"),
        other => panic!("expected AssertionFailure, got {other:?}"),
    }
}

#[test]
fn expect_zcl_command_times_out_when_nothing_arrives() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();
    let expectation = bind_expectation(
        proto,
        vec![
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
            Expectation::Any,
        ],
    )
    .unwrap();

    let mut c = controller_with(&[]);
    let err = c
        .expect_zcl_command(&expectation, Duration::from_millis(5))
        .unwrap_err();
    assert!(matches!(err, zb_harness::HarnessError::Timeout(_, _)));
}
