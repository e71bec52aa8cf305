//! Property-based tests over the conversion pipeline
//!
//! These use proptest to verify:
//! 1. JSON round trip: parse(write(value)) == value
//! 2. TOON tabular round trip for uniform flat-field objects
//! 3. MsgPack round trip for arbitrary values
//! 4. YAML round trip for flat objects of simple scalars

use proptest::prelude::*;

use morph::value::{Array, Object, Value};
use morph::{json, msgpack, toon, yaml};

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9f64).prop_map(Value::Float),
        "[a-zA-Z0-9 _.-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Array(items.into_iter().collect::<Array>())),
            prop::collection::vec((arb_key(), inner), 0..6).prop_map(|pairs| {
                let mut object = Object::new();
                for (key, value) in pairs {
                    object.insert(key, value);
                }
                Value::Object(object)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn json_round_trip(value in arb_value()) {
        let text = json::writer::to_string(&value);
        let parsed = json::parser::parse(&text).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn json_compact_and_pretty_agree(value in arb_value()) {
        let compact = json::parser::parse(&json::writer::to_string_compact(&value)).unwrap();
        let pretty = json::parser::parse(&json::writer::to_string_pretty(&value)).unwrap();
        prop_assert_eq!(compact, pretty);
    }

    #[test]
    fn msgpack_round_trip(value in arb_value()) {
        let packed = msgpack::to_string(&value);
        let unpacked = msgpack::parse(&packed).unwrap();
        prop_assert_eq!(unpacked, value);
    }

    #[test]
    fn toon_tabular_round_trip(
        rows in prop::collection::vec(
            (any::<i64>(), "[a-zA-Z0-9 ,.:]{0,10}", any::<bool>()),
            1..8,
        )
    ) {
        let mut array = Array::new();
        for (id, name, active) in rows {
            let mut row = Object::new();
            row.insert("active", active);
            row.insert("id", id);
            row.insert("name", name);
            array.push(Value::Object(row));
        }
        let mut root = Object::new();
        root.insert("rows", Value::Array(array));
        let original = Value::Object(root);

        let encoded = toon::to_string(&original);
        prop_assert!(encoded.starts_with("rows["));
        let decoded = toon::parse(&encoded).unwrap();
        prop_assert_eq!(decoded, original);
    }

    #[test]
    fn toon_scalar_object_round_trip(
        pairs in prop::collection::vec((arb_key(), "[a-zA-Z0-9 .]{0,10}"), 0..6)
    ) {
        let mut object = Object::new();
        for (key, value) in pairs {
            object.insert(key, value);
        }
        let original = Value::Object(object);
        let decoded = toon::parse(&toon::to_string(&original)).unwrap();
        prop_assert_eq!(decoded, original);
    }

    #[test]
    fn yaml_flat_object_round_trip(
        pairs in prop::collection::vec(
            (arb_key(), prop_oneof![
                any::<i64>().prop_map(Value::Int),
                any::<bool>().prop_map(Value::Bool),
                "[a-zA-Z][a-zA-Z0-9]{0,9}".prop_map(Value::String),
            ]),
            0..6,
        )
    ) {
        let mut object = Object::new();
        for (key, value) in pairs {
            object.insert(key, value);
        }
        let original = Value::Object(object);
        let decoded = yaml::parse(&yaml::to_string(&original)).unwrap();
        prop_assert_eq!(decoded, original);
    }
}
