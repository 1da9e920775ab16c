//! Binding a `CommandPrototype` to concrete arguments (C3).

use crate::error::ZclError;
use crate::schema::{CommandParam, CommandPrototype};
use crate::types::{DataType, Value};
use crate::validator::Validator;

/// What a received argument is checked against: a concrete value, a
/// predicate, or "don't care".
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Value(Value),
    Validator(Validator),
    Any,
}

impl From<Value> for Expectation {
    fn from(v: Value) -> Self {
        Expectation::Value(v)
    }
}

impl From<Validator> for Expectation {
    fn from(v: Validator) -> Self {
        Expectation::Validator(v)
    }
}

/// One bound argument: a param's name/type, carrying either the value
/// to send or the expectation to check an incoming value against.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArg {
    pub name: String,
    pub r#type: DataType,
    pub expectation: Expectation,
}

/// A fully bound command call: identity plus its argument list.
///
/// Produced only by `bind`/`bind_expectation`, which defensively copy
/// the argument list so later mutation by the caller's own locals can't
/// reach back into an already-issued invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub cluster_code: u16,
    pub code: u8,
    pub name: String,
    pub args: Vec<CommandArg>,
}

/// Binds `proto` to `values`, one per param in order, for an outgoing
/// call. Fails with `ZclError::Arity` if the counts differ.
pub fn bind(proto: &CommandPrototype, values: Vec<Value>) -> Result<Invocation, ZclError> {
    proto.check_arity(values.len())?;
    let args = proto
        .params
        .iter()
        .zip(values)
        .map(|(param, value)| CommandArg {
            name: param.name.clone(),
            r#type: param.r#type,
            expectation: Expectation::Value(value),
        })
        .collect();
    Ok(Invocation {
        cluster_code: proto.cluster_code,
        code: proto.code,
        name: proto.name.clone(),
        args,
    })
}

/// Binds `proto` to an expectation per param, for an incoming check.
/// `expectations` must supply exactly one entry per param, in order;
/// entries may be a concrete `Value`, a `Validator`, or `Expectation::Any`
/// to ignore that argument.
pub fn bind_expectation(
    proto: &CommandPrototype,
    expectations: Vec<Expectation>,
) -> Result<Invocation, ZclError> {
    proto.check_arity(expectations.len())?;
    let args = proto
        .params
        .iter()
        .zip(expectations)
        .map(|(param, expectation)| CommandArg {
            name: param.name.clone(),
            r#type: param.r#type,
            expectation,
        })
        .collect();
    Ok(Invocation {
        cluster_code: proto.cluster_code,
        code: proto.code,
        name: proto.name.clone(),
        args,
    })
}
