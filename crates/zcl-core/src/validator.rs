//! Predicates over a decoded received value (C4).

use crate::types::Value;

/// A predicate checked against a value decoded off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    Equal(Value),
    Between(i64, i64),
}

/// The outcome of checking one argument: either it passed, or it
/// failed and carries the name of the argument plus what was expected
/// and what arrived, for the caller to fold into an assertion message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    Fail {
        arg_name: String,
        expected: String,
        received: Value,
    },
}

impl Validator {
    /// Checks `received` against this predicate, naming `arg_name` in
    /// the failure case.
    pub fn check(&self, arg_name: &str, received: &Value) -> Outcome {
        match self {
            Validator::Equal(expected) => {
                if expected == received {
                    Outcome::Pass
                } else {
                    Outcome::Fail {
                        arg_name: arg_name.to_string(),
                        expected: format!("{expected:?}"),
                        received: received.clone(),
                    }
                }
            }
            Validator::Between(lo, hi) => {
                let ok = received
                    .as_i64()
                    .map(|v| *lo <= v && v <= *hi)
                    .or_else(|| received.as_u64().map(|v| *lo <= v as i64 && v as i64 <= *hi))
                    .unwrap_or(false);
                if ok {
                    Outcome::Pass
                } else {
                    Outcome::Fail {
                        arg_name: arg_name.to_string(),
                        expected: format!("{lo}..={hi}"),
                        received: received.clone(),
                    }
                }
            }
        }
    }
}
