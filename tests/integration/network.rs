//! Network lifecycle scenarios (spec.md §4.6, §8 S5).

use std::time::Duration;

use zb_harness::{Controller, MockTransport};

fn controller_with(inbound: &[&str]) -> Controller<MockTransport> {
    let mut t = MockTransport::new();
    for line in inbound {
        t.push_inbound_line(line);
    }
    Controller::new(t)
}

// S5
#[test]
fn form_network_happy_path() {
    let mut c = controller_with(&["form 0x00"]);
    c.form_network(19, 0, 0xFAFA).expect("form_network should succeed");
    assert_eq!(
        c.transport_mut().outbound,
        vec!["network form 19 0 0xfafa".to_string()]
    );
    assert!(c.state().in_network);
}

#[test]
fn form_network_already_in_network_is_success() {
    let mut c = controller_with(&["form 0x70"]);
    assert!(c.form_network(19, 0, 0xFAFA).is_ok());
}

#[test]
fn leave_network_then_rejoin_cycle() {
    let mut c = controller_with(&["form 0x00", "leave 0x00", "EMBER_NETWORK_DOWN", "form 0x00"]);
    c.form_network(19, 0, 0xFAFA).unwrap();
    assert!(c.state().in_network);
    c.leave_network().unwrap();
    assert!(!c.state().in_network);
    c.form_network(19, 0, 0xFAFA).unwrap();
    assert!(c.state().in_network);
}

#[test]
fn permit_join_enable_then_disable() {
    let mut c = controller_with(&["pJoin for 255 sec: 0x00", "pJoin for 0 sec: 0x00"]);
    c.enable_permit_join().expect("enable permit join");
    c.disable_permit_join().expect("disable permit join");
    assert_eq!(
        c.transport_mut().outbound,
        vec![
            "network pjoin 0xff".to_string(),
            "network pjoin 0x00".to_string(),
        ]
    );
}

#[test]
fn permit_join_rejected_status_is_a_network_operation_error() {
    let mut c = controller_with(&["pJoin for 255 sec: 0x01"]);
    let err = c.enable_permit_join().unwrap_err();
    assert!(matches!(
        err,
        zb_harness::HarnessError::NetworkOperationError { .. }
    ));
}

#[test]
fn wait_for_join_times_out_on_silence() {
    let mut c = controller_with(&[]);
    let err = c.wait_for_join(Duration::from_millis(5)).unwrap_err();
    assert!(matches!(err, zb_harness::HarnessError::Timeout(_, _)));
}
