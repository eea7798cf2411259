//! JSON encoding and decoding for dynamic-language values.
//!
//! Dynamic hosts typically have one container type, a table, that serves
//! as both list and map. [`Value`] models such a host value, and the
//! encoder decides per table whether it is a JSON array or a JSON object:
//!
//! | Table keys (in insertion order) | JSON |
//! |---|---|
//! | `1, 2, …, n` with no gaps | array |
//! | empty | object `{}` |
//! | anything else | object; positions become `"1"`, `"2"`, … |
//!
//! Decoding maps arrays back to tables keyed `1..n` and objects to tables
//! keyed by member name.
//!
//! # Example
//!
//! ```
//! use hybrid_json::{decode, encode, Key, Table, Value};
//!
//! let list: Table = (1..=5).map(Value::from).collect();
//! assert_eq!(encode(Some(&Value::Table(list))).unwrap(), "[1,2,3,4,5]");
//!
//! let mixed: Table = [Value::from("a"), Value::from("b")].into_iter().collect();
//! mixed.set(5u64, Value::from("asd"));
//! let text = encode(Some(&Value::Table(mixed))).unwrap();
//! assert_eq!(text, r#"{"1":"a","2":"b","5":"asd"}"#);
//!
//! let back = decode(&text).unwrap();
//! let table = back.as_table().unwrap();
//! assert_eq!(table.get(&Key::from("5")), Some(Value::from("asd")));
//! ```

mod convert;
mod converter;
pub mod json;
mod value;

pub use convert::to_json_value;
pub use converter::{Converter, Reply, EMPTY_ARGUMENT_JSON};
pub use json::{
    DecodeError, DecoderOptions, EncodeError, EncoderOptions, JsonDecoder, JsonEncoder,
};
pub use value::{Key, Opaque, Table, Value};

/// Encodes with default options. `None` renders as `{}`.
pub fn encode(value: Option<&Value>) -> Result<String, EncodeError> {
    Converter::new().encode(value)
}

/// Decodes with default options.
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    Converter::new().decode(text)
}
