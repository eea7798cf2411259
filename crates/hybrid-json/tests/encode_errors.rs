//! Values that cannot be encoded.

use hybrid_json::{encode, EncodeError, EncoderOptions, JsonEncoder, Opaque, Table, Value};

#[test]
fn opaque_member_fails_the_whole_table() {
    for reason in [Opaque::Function, Opaque::Channel, Opaque::UserData] {
        let inner: Table = [("f", Value::Opaque(reason))].into_iter().collect();
        let outer: Table = [Value::from(1), Value::Table(inner)].into_iter().collect();
        assert_eq!(
            encode(Some(&Value::Table(outer))),
            Err(EncodeError::Unconvertible(reason))
        );
    }
}

#[test]
fn error_messages() {
    assert_eq!(
        EncodeError::Unconvertible(Opaque::Channel).to_string(),
        "cannot convert channel to string"
    );
    assert_eq!(
        EncodeError::CyclicStructure.to_string(),
        "cannot encode cyclic table"
    );
}

#[test]
fn self_containing_table_is_cyclic() {
    let t = Table::new();
    t.set("me", Value::Table(t.clone()));
    assert_eq!(
        encode(Some(&Value::Table(t))),
        Err(EncodeError::CyclicStructure)
    );
}

#[test]
fn indirect_cycle_is_detected() {
    let obj: Table = [("abc", Value::from(123))].into_iter().collect();
    let obj2: Table = [("obj", Value::Table(obj.clone()))].into_iter().collect();
    obj.set("obj2", Value::Table(obj2));
    assert_eq!(
        encode(Some(&Value::Table(obj))),
        Err(EncodeError::CyclicStructure)
    );
}

#[test]
fn shared_subtable_is_not_a_cycle() {
    let shared: Table = [Value::from(1)].into_iter().collect();
    let t: Table = [
        ("a", Value::Table(shared.clone())),
        ("b", Value::Table(shared)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        encode(Some(&Value::Table(t))).unwrap(),
        r#"{"a":[1],"b":[1]}"#
    );
}

#[test]
fn depth_limit_applies_to_deep_non_cyclic_tables() {
    let mut value = Value::from(0);
    for _ in 0..10 {
        value = Value::Table([value].into_iter().collect());
    }
    let mut shallow = JsonEncoder::with_options(EncoderOptions { max_depth: 9 });
    assert_eq!(
        shallow.encode(&value),
        Err(EncodeError::DepthLimitExceeded(9))
    );
    let mut enough = JsonEncoder::with_options(EncoderOptions { max_depth: 10 });
    assert_eq!(enough.encode(&value).unwrap(), "[[[[[[[[[[0]]]]]]]]]]");
}

#[test]
fn non_finite_number_fails() {
    let t: Table = [Value::Number(f64::NEG_INFINITY)].into_iter().collect();
    assert_eq!(
        encode(Some(&Value::Table(t))),
        Err(EncodeError::NonFiniteNumber(f64::NEG_INFINITY))
    );
}
