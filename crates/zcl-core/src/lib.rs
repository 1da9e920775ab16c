//! ZCL schema model, XML loader, type codec, and command binding.
//!
//! This crate has no knowledge of any transport or console grammar; it
//! is the pure data/codec layer the protocol engine builds on.

pub mod codec;
pub mod error;
pub mod invocation;
pub mod schema;
pub mod types;
pub mod validator;
pub mod xml;

pub use codec::{decode, encode, tag, type_code, Cursor};
pub use error::ZclError;
pub use invocation::{bind, bind_expectation, CommandArg, Expectation, Invocation};
pub use schema::{normalise_name, Attribute, Cluster, CommandParam, CommandPrototype, Enum, Schema};
pub use types::{DataType, StorageClass, Value};
pub use validator::{Outcome, Validator};
pub use xml::load_files;
