//! End-to-end schema → invocation → wire-bytes → decode coverage
//! (spec.md §8 universal properties 1, 3, 6).

use zcl_core::{bind, decode, encode, normalise_name, Cursor, Value};

use crate::fixtures::load_door_lock;

#[test]
fn schema_round_trips_every_set_pin_arg_through_its_declared_type() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();

    let values = vec![
        Value::Unsigned(42),
        Value::Unsigned(1),
        Value::Unsigned(2),
        Value::Unsigned(3),
        Value::from("9876"),
    ];
    let invocation = bind(proto, values.clone()).unwrap();

    let mut payload = Vec::new();
    for arg in &invocation.args {
        let zcl_core::Expectation::Value(v) = &arg.expectation else {
            panic!("bind() always produces concrete Values");
        };
        encode(arg.r#type, v, &mut payload).unwrap();
    }

    let mut cursor = Cursor::new(&payload);
    for (arg, expected) in invocation.args.iter().zip(&values) {
        assert_eq!(&decode(arg.r#type, &mut cursor).unwrap(), expected);
    }
    assert!(cursor.is_empty());
}

#[test]
fn invocation_built_from_schema_is_isolated_from_caller_mutation() {
    let loaded = load_door_lock();
    let proto = loaded.schema.cluster("Door Lock").unwrap().command("SetPin").unwrap();

    let mut values = vec![
        Value::Unsigned(1),
        Value::Unsigned(1),
        Value::Unsigned(1),
        Value::Unsigned(1),
        Value::from("abcd"),
    ];
    let invocation = bind(proto, values.clone()).unwrap();
    values[4] = Value::from("zzzz");

    let zcl_core::Expectation::Value(pin) = &invocation.args[4].expectation else {
        panic!("expected a concrete value");
    };
    assert_eq!(pin, &Value::from("abcd"));
}

#[test]
fn name_normalisation_is_idempotent_over_the_spec_examples() {
    for raw in ["Door Lock", "ThisIsACamelCaseName", "this-has.some Punctuation"] {
        let once = normalise_name(raw);
        let twice = normalise_name(&once);
        assert_eq!(once, twice, "normalise_name must be idempotent for {raw:?}");
    }
    assert_eq!(normalise_name("Door Lock"), "door_lock");
    assert_eq!(
        normalise_name("ThisIsACamelCaseName"),
        "this_is_a_camel_case_name"
    );
    assert_eq!(
        normalise_name("this-has.some Punctuation"),
        "thishassome_punctuation"
    );
}

#[test]
fn cluster_extension_attribute_is_reachable_after_merge() {
    use crate::fixtures::TempFile;

    let base = TempFile::new(crate::fixtures::DOOR_LOCK_XML);
    let ext = TempFile::new(
        r#"<?xml version="1.0"?>
<configurator>
  <clusterExtension code="0x0101">
    <attribute code="0x0001" type="BOOLEAN">AutoRelockTime</attribute>
  </clusterExtension>
</configurator>
"#,
    );
    let schema = zcl_core::load_files(&[&base.path, &ext.path]).unwrap();
    let cluster = schema.cluster("Door Lock").unwrap();
    assert!(cluster.attribute("LockState").is_ok());
    assert!(cluster.attribute("AutoRelockTime").is_ok());
}
