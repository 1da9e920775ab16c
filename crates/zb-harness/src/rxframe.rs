//! Centralised parsing of every inbound line grammar the coordinator
//! console emits (§6, §9 design note: "encapsulate RX-line parsing in
//! a single parser instead of scattering regex literals across call
//! sites").

use once_cell_like::Lazy;
use regex::Regex;

/// A decoded `RX ...` line: the frame a device sent that the
/// coordinator forwarded to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxFrame {
    pub cluster: u16,
    pub ep: String,
    pub seq: Option<u8>,
    pub cmd: u8,
    pub payload: Vec<u8>,
}

// This workspace has no existing dependency on `once_cell`/`lazy_static`;
// rather than add one just for five regexes, each parser below compiles
// its pattern on first use via a minimal local `Lazy` (a thin wrapper
// over `std::sync::OnceLock`), matching the "just use std for this one
// thing" calls the rest of the workspace makes when a crate would be
// pure overhead.
mod once_cell_like {
    use std::sync::OnceLock;

    pub struct Lazy<T> {
        cell: OnceLock<T>,
        init: fn() -> T,
    }

    impl<T> Lazy<T> {
        pub const fn new(init: fn() -> T) -> Self {
            Self {
                cell: OnceLock::new(),
                init,
            }
        }

        pub fn get(&self) -> &T {
            self.cell.get_or_init(self.init)
        }
    }
}

static RX_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"RX len \d+, ep ([0-9A-Za-z]+), clus (0x[0-9A-Fa-f]{4}) \([^)]*\) .*? seq ([0-9A-Fa-f]{2}) cmd ([0-9A-Fa-f]{2}) payload\[([0-9A-Fa-f ]*)\]",
    )
    .unwrap()
});

static NETWORK_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(form|leave|pJoin for 255 sec:|pJoin for 0 sec:) (0x[0-9A-Fa-f]{2})").unwrap()
});

static DEVICE_ANNOUNCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Device Announce: (0x[0-9A-Fa-f]{4})").unwrap());

impl RxFrame {
    /// Regex used by `Transport::expect` to recognise an RX line
    /// anywhere in the incoming stream.
    pub fn pattern() -> &'static Regex {
        RX_FRAME.get()
    }

    /// Parses one already-matched RX line into its structured fields.
    /// Returns `None` if `line` does not match the RX grammar at all
    /// (callers normally only call this after `Transport::expect`
    /// already matched `RxFrame::pattern()`).
    pub fn parse(line: &str) -> Option<RxFrame> {
        let caps = RX_FRAME.get().captures(line)?;
        let ep = caps.get(1)?.as_str().to_string();
        let cluster = u16::from_str_radix(caps.get(2)?.as_str().trim_start_matches("0x"), 16).ok()?;
        let seq = u8::from_str_radix(caps.get(3)?.as_str(), 16).ok();
        let cmd = u8::from_str_radix(caps.get(4)?.as_str(), 16).ok()?;
        let payload = caps
            .get(5)?
            .as_str()
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

/// A parsed `form 0xNN` / `leave 0xNN` / `pJoin for N sec: 0xNN` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatus {
    pub status: u8,
}

pub fn network_status_pattern() -> &'static Regex {
    NETWORK_STATUS.get()
}

pub fn parse_network_status(line: &str) -> Option<NetworkStatus> {
    let caps = NETWORK_STATUS.get().captures(line)?;
    let status = u8::from_str_radix(caps.get(2)?.as_str().trim_start_matches("0x"), 16).ok()?;
    Some(NetworkStatus { status })
}

pub fn device_announce_pattern() -> &'static Regex {
    DEVICE_ANNOUNCE.get()
}

pub fn parse_device_announce(line: &str) -> Option<u16> {
    let caps = DEVICE_ANNOUNCE.get().captures(line)?;
    u16::from_str_radix(caps.get(1)?.as_str().trim_start_matches("0x"), 16).ok()
}

pub const NETWORK_DOWN_MARKER: &str = "EMBER_NETWORK_DOWN";
