//! Error taxonomy for the ZCL schema/codec core.
//!
//! One variant per failure mode named in the component design; messages
//! carry the structured data a caller needs rather than a pre-formatted
//! sentence, matching the rest of this workspace's error style.

use thiserror::Error;

use crate::types::DataType;

#[derive(Debug, Error)]
pub enum ZclError {
    /// A command prototype was called with the wrong number of positional
    /// arguments. `expected` lists each param's name and type, in order.
    #[error("{name}() takes exactly {expected_count} argument(s) ({given_count} given): {expected:?}")]
    Arity {
        name: String,
        expected_count: usize,
        given_count: usize,
        expected: Vec<(String, DataType)>,
    },

    /// A value fell outside the encodable range for its declared type.
    #[error("value {value} out of range for {ty:?} ({lo}..={hi})")]
    RangeError {
        ty: DataType,
        value: i64,
        lo: i64,
        hi: i64,
    },

    /// A length-prefixed string exceeded the one-byte length prefix.
    #[error("string of {0} bytes exceeds the 255-byte CHAR_STRING/OCTET_STRING limit")]
    StringTooLong(usize),

    /// The byte cursor ran out of data before a value of the expected
    /// width could be decoded.
    #[error("payload too short: need {need} more byte(s), have {have}")]
    PayloadTooShort { need: usize, have: usize },

    /// Failed to parse an XML schema file.
    #[error("failed to parse {path}: {reason}")]
    XmlParse { path: String, reason: String },

    /// An XML `<cluster>`/`<command>`/`<attribute>` element was missing a
    /// required child or attribute.
    #[error("{element} in {path} missing required {field}")]
    XmlMissingField {
        path: String,
        element: &'static str,
        field: &'static str,
    },

    /// Lookup of a cluster, command, attribute, or enum by normalised
    /// name failed.
    #[error("no {kind} named {name:?} in schema")]
    NotFound { kind: &'static str, name: String },

    /// A `Value`'s storage class did not match the `DataType` it was
    /// being encoded under (e.g. a `Value::Text` passed for `INT16U`).
    #[error("cannot encode {value:?} as {ty:?}")]
    TypeMismatch { ty: DataType, value: crate::types::Value },
}
