//! Black-box scenarios against a `Controller<MockTransport>` — the
//! concrete seed scenarios of spec.md §8 plus broader coverage of the
//! schema-to-wire path end to end.

mod attributes;
mod commands;
mod fixtures;
mod network;
mod schema_roundtrip;
