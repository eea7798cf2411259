//! Conversions between [`Value`] and [`serde_json::Value`].
//!
//! Going to `serde_json` applies the same table classification and the same
//! failure rules as [`JsonEncoder`](crate::JsonEncoder).

use serde_json::{Map, Number};

use crate::json::encoder::{classify, EncoderOptions, Shape};
use crate::json::EncodeError;
use crate::value::{Key, Table, Value};

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // `as_f64` is `None` only under serde_json's `arbitrary_precision`
            // feature, for literals outside the `f64` range. They become
            // NaN, which `JsonEncoder` rejects with `NonFiniteNumber`.
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::Table(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Table(
                obj.into_iter()
                    .map(|(k, v)| (Key::Name(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = EncodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        to_json_value(value, EncoderOptions::default())
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = EncodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::Value::try_from(&value)
    }
}

/// Converts `value` to a `serde_json::Value` under the given options.
pub fn to_json_value(
    value: &Value,
    options: EncoderOptions,
) -> Result<serde_json::Value, EncodeError> {
    Builder {
        path: Vec::new(),
        options,
    }
    .build(value)
}

struct Builder {
    path: Vec<usize>,
    options: EncoderOptions,
}

impl Builder {
    fn build(&mut self, value: &Value) -> Result<serde_json::Value, EncodeError> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(number(*n)?),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Table(t) => self.build_table(t)?,
            Value::Opaque(o) => return Err(EncodeError::Unconvertible(*o)),
        })
    }

    fn build_table(&mut self, table: &Table) -> Result<serde_json::Value, EncodeError> {
        let id = table.id();
        if self.path.contains(&id) {
            return Err(EncodeError::CyclicStructure);
        }
        if self.path.len() >= self.options.max_depth {
            return Err(EncodeError::DepthLimitExceeded(self.options.max_depth));
        }
        self.path.push(id);
        let result = table.with_entries(|entries| match classify(entries) {
            Shape::Array => entries
                .values()
                .map(|v| self.build(v))
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            Shape::Object { members, shadowed } => {
                for v in shadowed {
                    self.build(v)?;
                }
                let mut map = Map::with_capacity(members.len());
                for (key, v) in members {
                    map.insert(key, self.build(v)?);
                }
                Ok(serde_json::Value::Object(map))
            }
        });
        self.path.pop();
        result
    }
}

fn number(n: f64) -> Result<Number, EncodeError> {
    // `-0.0` stays a float so it prints as `-0`, like the encoder.
    let negative_zero = n == 0.0 && n.is_sign_negative();
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER && !negative_zero {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or(EncodeError::NonFiniteNumber(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_serde_json_builds_tables() {
        let v = Value::from(json!({"list": [1, 2], "name": "x", "none": null}));
        let t = v.as_table().unwrap();
        let list = t.get(&Key::from("list")).unwrap();
        assert_eq!(list.as_table().unwrap().border(), 2);
        assert_eq!(t.get(&Key::from("name")), Some(Value::from("x")));
        assert_eq!(t.get(&Key::from("none")), Some(Value::Null));
    }

    #[test]
    fn to_serde_json_classifies_like_the_encoder() {
        let seq: Table = [Value::from(1), Value::from(2.5)].into_iter().collect();
        assert_eq!(
            serde_json::Value::try_from(&Value::Table(seq)).unwrap(),
            json!([1, 2.5])
        );

        let mixed: Table = [Value::from("a")].into_iter().collect();
        mixed.set("k", Value::Bool(true));
        assert_eq!(
            serde_json::Value::try_from(&Value::Table(mixed)).unwrap(),
            json!({"1": "a", "k": true})
        );

        assert_eq!(
            serde_json::Value::try_from(&Value::Table(Table::new())).unwrap(),
            json!({})
        );
    }

    #[test]
    fn to_serde_json_rejects_what_the_encoder_rejects() {
        let t = Table::new();
        t.push(Value::Table(t.clone()));
        assert_eq!(
            serde_json::Value::try_from(&Value::Table(t)),
            Err(EncodeError::CyclicStructure)
        );
        assert!(matches!(
            serde_json::Value::try_from(Value::Number(f64::NAN)),
            Err(EncodeError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn to_serde_json_checks_shadowed_members() {
        let t: Table = [
            (Key::Index(1), Value::Opaque(crate::Opaque::UserData)),
            (Key::from("1"), Value::from("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::Value::try_from(&Value::Table(t)),
            Err(EncodeError::Unconvertible(crate::Opaque::UserData))
        );
    }

    #[test]
    fn negative_zero_matches_the_encoder() {
        let v = serde_json::Value::try_from(Value::Number(-0.0)).unwrap();
        assert!(v.as_f64().unwrap().is_sign_negative());
        assert_eq!(crate::encode(Some(&Value::Number(-0.0))).unwrap(), "-0");
        assert_eq!(serde_json::Value::try_from(Value::Number(0.0)).unwrap(), json!(0));
    }
}
