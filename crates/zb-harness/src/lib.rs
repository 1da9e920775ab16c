//! The controller protocol engine: transport, RX-line parsing,
//! network lifecycle, command dispatch, attribute access, and
//! expectation matching against a coordinator console (C5–C6).
//!
//! Built on `zcl-core` for the codec/schema layer; has no knowledge of
//! any particular CLI or persistence format beyond the `config` module,
//! which is the concrete shape of spec.md's "persisted state" contract.

pub mod config;
pub mod controller;
pub mod error;
pub mod rxframe;
pub mod transport;

pub use config::HarnessConfig;
pub use controller::{Controller, ControllerState, Direction};
pub use error::HarnessError;
pub use rxframe::RxFrame;
pub use transport::{MockTransport, TcpTransport, Transport};
