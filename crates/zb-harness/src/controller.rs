//! The protocol engine (C6): network lifecycle, command dispatch,
//! attribute access, and expectation matching against a DUT over a
//! [`Transport`].
//!
//! Single-threaded, strictly blocking, not reentrant: one `Controller`
//! owns one `Transport` and one outgoing `sequence` counter. There is
//! no background thread, no callback, and no async runtime anywhere in
//! this crate — every operation writes a line, then blocks on
//! `expect`/`read_until` up to a caller-supplied timeout.

use std::time::Duration;

use regex::Regex;
use zcl_core::{decode, encode, Cursor, Invocation, Value};

use crate::error::HarnessError;
use crate::rxframe::{self, RxFrame};
use crate::transport::Transport;

const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Direction a cluster's global commands currently target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Server,
    Client,
}

/// The per-controller observed state: the outgoing sequence counter
/// and whether the last-seen network reply implied membership.
/// `in_network` is observed, never cached authoritatively against
/// anything but the coordinator's own replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub sequence: u8,
    pub in_network: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            sequence: 0,
            in_network: false,
        }
    }
}

/// Drives one DUT over one transport. Constructed fresh per test; not
/// safe to share across threads or reenter.
pub struct Controller<T: Transport> {
    transport: T,
    state: ControllerState,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ControllerState::default(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Network lifecycle ───────────────────────────────────────────

    pub fn form_network(&mut self, channel: u8, power: i8, pan_id: u16) -> Result<(), HarnessError> {
        self.transport.read_eager();
        self.transport.write_line(&format!(
            "network form {channel} {power} 0x{pan_id:04x}"
        ))?;
        let status = self.expect_status("form", DEFAULT_NETWORK_TIMEOUT)?;
        match status {
            0x00 | 0x70 => {
                self.state.in_network = true;
                Ok(())
            }
            other => Err(HarnessError::UnhandledStatus {
                command: "network form",
                status: other,
            }),
        }
    }

    pub fn leave_network(&mut self) -> Result<(), HarnessError> {
        self.transport.read_eager();
        self.transport.write_line("network leave")?;
        let status = self.expect_status("leave", DEFAULT_NETWORK_TIMEOUT)?;
        match status {
            0x70 => {
                self.state.in_network = false;
                Ok(())
            }
            0x00 => {
                let down = Regex::new(rxframe::NETWORK_DOWN_MARKER).unwrap();
                self.transport
                    .expect(&[&down], DEFAULT_NETWORK_TIMEOUT)
                    .ok_or(HarnessError::Timeout(
                        DEFAULT_NETWORK_TIMEOUT,
                        "EMBER_NETWORK_DOWN".to_string(),
                    ))?;
                self.state.in_network = false;
                Ok(())
            }
            other => Err(HarnessError::UnhandledStatus {
                command: "network leave",
                status: other,
            }),
        }
    }

    pub fn enable_permit_join(&mut self) -> Result<(), HarnessError> {
        self.permit_join(0xff, "pJoin for 255 sec:")
    }

    pub fn disable_permit_join(&mut self) -> Result<(), HarnessError> {
        self.permit_join(0x00, "pJoin for 0 sec:")
    }

    fn permit_join(&mut self, arg: u8, reply_prefix: &'static str) -> Result<(), HarnessError> {
        self.transport.read_eager();
        self.transport.write_line(&format!("network pjoin 0x{arg:02x}"))?;
        let status = self.expect_status(reply_prefix, DEFAULT_NETWORK_TIMEOUT)?;
        if status == 0x00 {
            Ok(())
        } else {
            Err(HarnessError::NetworkOperationError {
                command: "network pjoin",
                status,
            })
        }
    }

    /// Blocks until a `Device Announce: 0xNNNN` line arrives, returning
    /// the joining device's node id.
    pub fn wait_for_join(&mut self, timeout: Duration) -> Result<u16, HarnessError> {
        let pattern = rxframe::device_announce_pattern();
        let matched = self
            .transport
            .expect(&[pattern], timeout)
            .ok_or(HarnessError::Timeout(timeout, "Device Announce".to_string()))?;
        let raw = matched.captures[0]
            .as_deref()
            .expect("device announce pattern always captures group 1");
        u16::from_str_radix(raw.trim_start_matches("0x"), 16)
            .map_err(|_| HarnessError::Timeout(timeout, "Device Announce".to_string()))
    }

    fn expect_status(&mut self, prefix: &str, timeout: Duration) -> Result<u8, HarnessError> {
        let pattern = rxframe::network_status_pattern();
        let matched = self
            .transport
            .expect(&[pattern], timeout)
            .ok_or_else(|| HarnessError::Timeout(timeout, prefix.to_string()))?;
        let raw = matched.captures[1]
            .as_deref()
            .expect("network status pattern always captures group 2");
        u8::from_str_radix(raw.trim_start_matches("0x"), 16)
            .map_err(|_| HarnessError::Timeout(timeout, prefix.to_string()))
    }

    // ── Command dispatch ────────────────────────────────────────────

    /// Encodes and sends `invocation` to `destination`, advancing the
    /// sequence counter only once both lines have been written
    /// successfully.
    pub fn send_zcl_command(&mut self, destination: u16, invocation: &Invocation) -> Result<(), HarnessError> {
        let payload = encode_payload(invocation)?;
        let seq = self.state.sequence;
        tracing::debug!(
            command = %invocation.name,
            destination,
            seq,
            payload = %hex::encode(&payload),
            "sending ZCL command"
        );
        let hex_bytes = payload
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.transport.write_line(&format!(
            "raw 0x{:04X} {{01 {seq:02X} {:02X} {hex_bytes}}}",
            invocation.cluster_code, invocation.code
        ))?;
        self.transport
            .write_line(&format!("send 0x{destination:04X} 1 1"))?;
        self.state.sequence = seq.wrapping_add(1);
        Ok(())
    }

    /// `zcl ota server notify` — args are encoded as space-separated
    /// 16-bit hex, the coordinator console's idiosyncratic form for
    /// this command specifically.
    pub fn send_zcl_ota_notify(&mut self, destination: u16, invocation: &Invocation) -> Result<(), HarnessError> {
        let mut parts = Vec::with_capacity(invocation.args.len());
        for arg in &invocation.args {
            let value = arg_value(arg)?;
            let n = value
                .as_u64()
                .ok_or_else(|| zcl_core::ZclError::TypeMismatch {
                    ty: arg.r#type,
                    value: value.clone(),
                })?;
            parts.push(format!("0x{n:04X}"));
        }
        self.transport.write_line(&format!(
            "zcl ota server notify 0x{destination:04X} 01 {}",
            parts.join(" ")
        ))?;
        Ok(())
    }

    // ── Attribute access ────────────────────────────────────────────

    pub fn write_attribute(
        &mut self,
        destination: u16,
        attribute: &zcl_core::Attribute,
        value: &Value,
    ) -> Result<(), HarnessError> {
        let mut bytes = Vec::new();
        encode(attribute.r#type, value, &mut bytes)?;
        tracing::debug!(
            cluster = attribute.cluster_code,
            attribute = attribute.code,
            destination,
            value = %hex::encode(&bytes),
            "writing attribute"
        );
        let hex_bytes = bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        self.transport.write_line(&format!(
            "zcl global write {} {} {} {{{hex_bytes}}}",
            attribute.cluster_code, attribute.code, attribute.type_code
        ))?;
        self.transport
            .write_line(&format!("send 0x{destination:04X} 1 1"))?;
        Ok(())
    }

    pub fn read_attribute(
        &mut self,
        destination: u16,
        attribute: &zcl_core::Attribute,
        timeout: Duration,
    ) -> Result<Value, HarnessError> {
        self.transport.read_eager();
        self.transport.write_line(&format!(
            "zcl global read {} {}",
            attribute.cluster_code, attribute.code
        ))?;
        self.transport
            .write_line(&format!("send 0x{destination:04X} 1 1"))?;

        let frame = self.wait_for_rx(attribute.cluster_code, 0x01, timeout)?;
        let mut cur = Cursor::new(&frame.payload);
        let got_attr = decode(zcl_core::DataType::Int16u, &mut cur)?;
        let status = decode(zcl_core::DataType::Int8u, &mut cur)?
            .as_u64()
            .unwrap_or(0xFF) as u8;
        if status != 0 {
            return Err(HarnessError::AttributeReadFailure { status });
        }
        let _ = got_attr;
        let _type_code = decode(zcl_core::DataType::Int8u, &mut cur)?;
        decode(attribute.r#type, &mut cur).map_err(HarnessError::from)
    }

    // ── Expectation ─────────────────────────────────────────────────

    /// Drains stale buffered output, then waits for an RX line matching
    /// `expected.cluster_code`/`expected.code`, decodes its payload in
    /// the declared order, and validates each arg against
    /// `expected.args[i]`.
    pub fn expect_zcl_command(&mut self, expected: &Invocation, timeout: Duration) -> Result<(), HarnessError> {
        self.transport.read_eager();
        let frame = self.wait_for_rx(expected.cluster_code, expected.code, timeout)?;
        let mut cur = Cursor::new(&frame.payload);
        for arg in &expected.args {
            let received = decode(arg.r#type, &mut cur)?;
            check_expectation(&expected.name, arg, &received)?;
        }
        Ok(())
    }

    fn wait_for_rx(&mut self, cluster: u16, cmd: u8, timeout: Duration) -> Result<RxFrame, HarnessError> {
        let pattern = RxFrame::pattern();
        loop {
            let matched = self
                .transport
                .expect(&[pattern], timeout)
                .ok_or_else(|| HarnessError::Timeout(timeout, format!("cluster 0x{cluster:04X} cmd 0x{cmd:02X}")))?;
            if let Some(frame) = RxFrame::from_matched(&matched) {
                if frame.cluster == cluster && frame.cmd == cmd {
                    return Ok(frame);
                }
            }
        }
    }

    // ── Binding and reporting ───────────────────────────────────────

    pub fn bind_node(&mut self, node_id: u16, ieee_hex: &str, cluster_id: u16) -> Result<(), HarnessError> {
        self.transport.write_line(&format!(
            "zdo bind {node_id} 1 1 {cluster_id} {{{ieee_hex}}} {{}}"
        ))?;
        Ok(())
    }

    /// A thin pass-through: dispatches `invocation` exactly like
    /// `send_zcl_command`. The original source has no fixed wire shape
    /// for configure-reporting beyond "send this command", so none is
    /// invented here.
    pub fn configure_reporting(&mut self, destination: u16, invocation: &Invocation) -> Result<(), HarnessError> {
        self.send_zcl_command(destination, invocation)
    }

    // ── Direction ───────────────────────────────────────────────────

    pub fn make_server(&mut self) -> Result<(), HarnessError> {
        self.set_direction(Direction::Server)
    }

    pub fn make_client(&mut self) -> Result<(), HarnessError> {
        self.set_direction(Direction::Client)
    }

    fn set_direction(&mut self, dir: Direction) -> Result<(), HarnessError> {
        let bit = match dir {
            Direction::Server => 1,
            Direction::Client => 0,
        };
        self.transport
            .write_line(&format!("zcl global direction {bit}"))?;
        Ok(())
    }
}

fn encode_payload(invocation: &Invocation) -> Result<Vec<u8>, HarnessError> {
    let mut bytes = Vec::new();
    for arg in &invocation.args {
        let value = arg_value(arg)?;
        encode(arg.r#type, value, &mut bytes)?;
    }
    Ok(bytes)
}

fn arg_value(arg: &zcl_core::CommandArg) -> Result<&Value, HarnessError> {
    match &arg.expectation {
        zcl_core::Expectation::Value(v) => Ok(v),
        other => Err(HarnessError::AssertionFailure {
            command: String::new(),
            arg_name: arg.name.clone(),
            expected: "a concrete value to send".to_string(),
            received: format!("{other:?}"),
        }),
    }
}

fn check_expectation(
    command: &str,
    arg: &zcl_core::CommandArg,
    received: &Value,
) -> Result<(), HarnessError> {
    use zcl_core::{Expectation, Outcome, Validator};

    let outcome = match &arg.expectation {
        Expectation::Any => Outcome::Pass,
        Expectation::Value(expected) => Validator::Equal(expected.clone()).check(&arg.name, received),
        Expectation::Validator(v) => v.check(&arg.name, received),
    };

    match outcome {
        Outcome::Pass => Ok(()),
        Outcome::Fail {
            arg_name,
            expected,
            received,
        } => Err(HarnessError::AssertionFailure {
            command: command.to_string(),
            arg_name,
            expected,
            received: format!("{received:?}"),
        }),
    }
}

impl RxFrame {
    /// Reconstructs a frame from the capture groups `Transport::expect`
    /// already extracted via `RxFrame::pattern()`, avoiding a second
    /// pass over the raw line.
    fn from_matched(matched: &crate::transport::Matched) -> Option<RxFrame> {
        let ep = matched.captures.first()?.clone()?;
        let cluster = u16::from_str_radix(
            matched.captures.get(1)?.as_deref()?.trim_start_matches("0x"),
            16,
        )
        .ok()?;
        let seq = matched
            .captures
            .get(2)?
            .as_deref()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        let cmd = u8::from_str_radix(matched.captures.get(3)?.as_deref()?, 16).ok()?;
        let payload = matched
            .captures
            .get(4)?
            .as_deref()?
            .split_whitespace()
            .map(|b| u8::from_str_radix(b, 16))
            .collect::<Result<Vec<u8>, _>>()
            .ok()?;
        Some(RxFrame {
            cluster,
            ep,
            seq,
            cmd,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use zcl_core::{bind, CommandParam, CommandPrototype, DataType};

    fn controller_with(inbound: &[&str]) -> Controller<MockTransport> {
        let mut t = MockTransport::new();
        for line in inbound {
            t.push_inbound_line(line);
        }
        Controller::new(t)
    }

    #[test]
    fn form_network_emits_expected_line_and_advances_state() {
        let mut c = controller_with(&["form 0x00"]);
        c.form_network(19, 0, 0xFAFA).unwrap();
        assert_eq!(
            c.transport_mut().outbound,
            vec!["network form 19 0 0xfafa".to_string()]
        );
        assert!(c.state().in_network);
    }

    #[test]
    fn form_network_treats_already_in_network_as_success() {
        let mut c = controller_with(&["form 0x70"]);
        assert!(c.form_network(19, 0, 0xFAFA).is_ok());
    }

    #[test]
    fn form_network_rejects_unhandled_status() {
        let mut c = controller_with(&["form 0x99"]);
        let err = c.form_network(19, 0, 0xFAFA).unwrap_err();
        assert!(matches!(err, HarnessError::UnhandledStatus { .. }));
    }

    #[test]
    fn leave_network_waits_for_network_down_on_status_zero() {
        let mut c = controller_with(&["leave 0x00", "EMBER_NETWORK_DOWN"]);
        c.leave_network().unwrap();
        assert!(!c.state().in_network);
    }

    #[test]
    fn wait_for_join_returns_node_id() {
        let mut c = controller_with(&["Device Announce: 0xBEEF"]);
        let id = c.wait_for_join(Duration::from_secs(1)).unwrap();
        assert_eq!(id, 0xBEEF);
    }

    fn set_pin_proto() -> CommandPrototype {
        CommandPrototype {
            cluster_code: 0x0101,
            code: 0x0C,
            name: "SetPin".into(),
            params: vec![
                CommandParam {
                    name: "user_id".into(),
                    r#type: DataType::Int16u,
                },
                CommandParam {
                    name: "pin".into(),
                    r#type: DataType::CharString,
                },
            ],
        }
    }

    // S4
    #[test]
    fn send_zcl_command_emits_raw_and_send_lines_and_wraps_sequence() {
        let mut c = controller_with(&[]);
        let invocation = bind(&set_pin_proto(), vec![Value::Unsigned(1), Value::from("6789")]).unwrap();
        c.send_zcl_command(0x1234, &invocation).unwrap();
        assert_eq!(c.state().sequence, 1);
        assert_eq!(
            c.transport_mut().outbound,
            vec![
                "raw 0x0101 {01 00 0C 01 00 04 36 37 38 39}".to_string(),
                "send 0x1234 1 1".to_string(),
            ]
        );
    }

    #[test]
    fn sequence_wraps_modulo_256() {
        let mut c = controller_with(&[]);
        c.state.sequence = 0xFF;
        let invocation = bind(&set_pin_proto(), vec![Value::Unsigned(1), Value::from("x")]).unwrap();
        c.send_zcl_command(0x1234, &invocation).unwrap();
        assert_eq!(c.state().sequence, 0x00);
    }

    #[test]
    fn read_attribute_returns_decoded_value_on_status_zero() {
        let lock_state = zcl_core::Attribute {
            cluster_code: 0x0101,
            code: 0x0000,
            name: "LockState".into(),
            r#type: DataType::Enum8,
            type_code: 0x30,
            size: Some(1),
        };
        let mut c = controller_with(&[
            "RX len 9, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 01 payload[00 00 00 30 02 ]",
        ]);
        let value = c
            .read_attribute(0xBEEF, &lock_state, Duration::from_secs(1))
            .unwrap();
        assert_eq!(value, Value::Unsigned(2));
    }

    #[test]
    fn read_attribute_reports_non_zero_status_as_failure() {
        let lock_state = zcl_core::Attribute {
            cluster_code: 0x0101,
            code: 0x0000,
            name: "LockState".into(),
            r#type: DataType::Enum8,
            type_code: 0x30,
            size: Some(1),
        };
        let mut c = controller_with(&[
            "RX len 8, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 01 payload[00 00 02 ]",
        ]);
        let err = c
            .read_attribute(0xBEEF, &lock_state, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, HarnessError::AttributeReadFailure { status: 0x02 }));
    }

    #[test]
    fn expect_zcl_command_passes_when_args_match() {
        let mut c = controller_with(&[
            "RX len 8, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 0C payload[01 00 04 36 37 38 39 ]",
        ]);
        let invocation = bind(&set_pin_proto(), vec![Value::Unsigned(1), Value::from("6789")]).unwrap();
        c.expect_zcl_command(&invocation, Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn expect_zcl_command_fails_on_mismatched_arg() {
        let mut c = controller_with(&[
            "RX len 8, ep 01, clus 0x0101 (Door Lock) FC 18 seq 05 cmd 0C payload[02 00 04 36 37 38 39 ]",
        ]);
        let invocation = bind(&set_pin_proto(), vec![Value::Unsigned(1), Value::from("6789")]).unwrap();
        let err = c
            .expect_zcl_command(&invocation, Duration::from_secs(1))
            .unwrap_err();
        match err {
            HarnessError::AssertionFailure { arg_name, .. } => assert_eq!(arg_name, "user_id"),
            other => panic!("expected AssertionFailure, got {other:?}"),
        }
    }
}
