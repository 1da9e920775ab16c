//! A narrow, blocking, line-oriented duplex channel (C5).
//!
//! `Transport` is deliberately thin — four operations, no notion of
//! framing beyond "look for a regex match in the stream" — so the
//! controller engine can run against either a real coordinator console
//! or an in-memory script without caring which.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use regex::Regex;

/// The result of a successful `expect` call: which pattern matched and
/// the captured groups from that match.
pub struct Matched {
    pub pattern_index: usize,
    pub captures: Vec<Option<String>>,
}

pub trait Transport {
    /// Appends a newline to `line` and writes it to the channel.
    fn write_line(&mut self, line: &str) -> std::io::Result<()>;

    /// Blocks until one of `patterns` matches the accumulated incoming
    /// stream, or `timeout` elapses. On a match, consumes all bytes up
    /// to and including the match. All waits are bounded; there is no
    /// `timeout = None` form.
    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Option<Matched>;

    /// Blocks until `marker` appears in the stream or `timeout`
    /// elapses, returning everything read up to and including it.
    fn read_until(&mut self, marker: &str, timeout: Duration) -> Option<String>;

    /// Non-blocking drain of whatever is already buffered, discarding
    /// stale output before issuing a new expectation.
    fn read_eager(&mut self) -> Vec<u8>;
}

/// A blocking `TcpStream`-backed transport to the coordinator console
/// (reference implementation: TCP port 4900).
pub struct TcpTransport {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl TcpTransport {
    pub fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_read_timeout(Some(Duration::from_millis(50)))?;
        Ok(Self {
            stream,
            buf: Vec::new(),
        })
    }

    fn fill_buf_until_deadline(&mut self, deadline: Instant) {
        let mut chunk = [0u8; 4096];
        while Instant::now() < deadline {
            match self.stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(_) => break,
            }
        }
    }
}

impl Transport for TcpTransport {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()
    }

    fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Option<Matched> {
        let deadline = Instant::now() + timeout;
        loop {
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            for (i, pat) in patterns.iter().enumerate() {
                if let Some(m) = pat.captures(&text) {
                    let end = m.get(0).unwrap().end();
                    let consumed_bytes = text.as_bytes()[..end].len();
                    let captures = (1..m.len())
                        .map(|g| m.get(g).map(|c| c.as_str().to_string()))
                        .collect();
                    self.buf.drain(..consumed_bytes);
                    return Some(Matched {
                        pattern_index: i,
                        captures,
                    });
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.fill_buf_until_deadline(deadline.min(Instant::now() + Duration::from_millis(50)));
        }
    }

    fn read_until(&mut self, marker: &str, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            if let Some(pos) = text.find(marker) {
                let end = pos + marker.len();
                let consumed_bytes = text.as_bytes()[..end].len();
                let result = text[..end].to_string();
                self.buf.drain(..consumed_bytes);
                return Some(result);
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.fill_buf_until_deadline(deadline.min(Instant::now() + Duration::from_millis(50)));
        }
    }

    fn read_eager(&mut self) -> Vec<u8> {
        let deadline = Instant::now() + Duration::from_millis(10);
        self.fill_buf_until_deadline(deadline);
        std::mem::take(&mut self.buf)
    }
}

/// An in-memory transport for unit and integration tests: pre-loaded
/// with scripted inbound lines, recording every outbound line for
/// later assertion.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub inbound: String,
    pub outbound: Vec<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a line (newline appended) to be seen by subsequent
    /// `expect`/`read_until` calls.
    pub fn push_inbound_line(&mut self, line: &str) {
        self.inbound.push_str(line);
        self.inbound.push('\n');
    }
}

impl Transport for MockTransport {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.outbound.push(line.to_string());
        Ok(())
    }

    fn expect(&mut self, patterns: &[&Regex], _timeout: Duration) -> Option<Matched> {
        for (i, pat) in patterns.iter().enumerate() {
            if let Some(m) = pat.captures(&self.inbound) {
                let end = m.get(0).unwrap().end();
                let captures = (1..m.len())
                    .map(|g| m.get(g).map(|c| c.as_str().to_string()))
                    .collect();
                self.inbound.drain(..end);
                return Some(Matched {
                    pattern_index: i,
                    captures,
                });
            }
        }
        None
    }

    fn read_until(&mut self, marker: &str, _timeout: Duration) -> Option<String> {
        let pos = self.inbound.find(marker)?;
        let end = pos + marker.len();
        let result = self.inbound[..end].to_string();
        self.inbound.drain(..end);
        Some(result)
    }

    fn read_eager(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.inbound).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_transport_records_outbound_lines() {
        let mut t = MockTransport::new();
        t.write_line("network form 19 0 0xFAFA").unwrap();
        assert_eq!(t.outbound, vec!["network form 19 0 0xFAFA".to_string()]);
    }

    #[test]
    fn mock_transport_expect_matches_and_consumes() {
        let mut t = MockTransport::new();
        t.push_inbound_line("form 0x00");
        let re = Regex::new(r"form (0x[0-9A-F]{2})").unwrap();
        let m = t.expect(&[&re], Duration::from_secs(1)).unwrap();
        assert_eq!(m.pattern_index, 0);
        assert_eq!(m.captures[0].as_deref(), Some("0x00"));
        assert!(t.inbound.is_empty());
    }

    #[test]
    fn mock_transport_expect_returns_none_when_nothing_matches() {
        let mut t = MockTransport::new();
        t.push_inbound_line("unrelated noise");
        let re = Regex::new(r"form (0x[0-9A-F]{2})").unwrap();
        assert!(t.expect(&[&re], Duration::from_millis(1)).is_none());
    }

    #[test]
    fn mock_transport_read_eager_drains_without_blocking() {
        let mut t = MockTransport::new();
        t.push_inbound_line("stale output");
        let drained = t.read_eager();
        assert_eq!(drained, b"stale output\n");
        assert!(t.inbound.is_empty());
    }
}
