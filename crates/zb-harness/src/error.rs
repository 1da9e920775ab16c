//! Error taxonomy for the transport and controller layers (C5–C6).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// An expected inbound line did not arrive within its timeout.
    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(std::time::Duration, String),

    /// A network command replied with a status code outside the
    /// documented set for that command.
    #[error("{command} returned unhandled status 0x{status:02X}")]
    UnhandledStatus { command: &'static str, status: u8 },

    /// A network command replied with a recognised but unsuccessful
    /// status.
    #[error("{command} failed with status 0x{status:02X}")]
    NetworkOperationError { command: &'static str, status: u8 },

    /// A received command's payload did not match the expectation.
    #[error("assertion failed for {command} arg {arg_name}: expected {expected}, got {received}")]
    AssertionFailure {
        command: String,
        arg_name: String,
        expected: String,
        received: String,
    },

    /// An attribute-read response carried a non-zero ZCL status.
    #[error("attribute read failed with status 0x{status:02X}")]
    AttributeReadFailure { status: u8 },

    /// Underlying transport I/O failure.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in the schema/codec core surfaced through the controller.
    #[error(transparent)]
    Zcl(#[from] zcl_core::ZclError),
}
