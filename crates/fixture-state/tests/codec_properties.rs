//! Property tests for the value codec.
//!
//! Any plain-data value must survive encode → decode unchanged, and the
//! encoded entry must always be marked serializable.

use fixture_state::codec::{decode, encode};
use fixture_state::LiveValue;
use proptest::prelude::*;
use serde_json::Value;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1_000_000i32..1_000_000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn encode_then_decode_reproduces_value(value in json_value()) {
        let live = LiveValue::Data(value);
        let entry = encode("key", &live);

        prop_assert!(entry.serializable);
        let stringified = entry.stringified.expect("serializable entries carry content");
        prop_assert_eq!(decode(&stringified).unwrap(), live);
    }

    #[test]
    fn opaque_values_never_carry_content(name in "[a-z]{1,8}") {
        let entry = encode(&name, &LiveValue::opaque("function"));
        prop_assert!(!entry.serializable);
        prop_assert!(entry.stringified.is_none());
        prop_assert_eq!(entry.key, name);
    }
}
