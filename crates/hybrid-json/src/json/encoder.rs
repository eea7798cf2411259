//! `JsonEncoder`: renders a [`Value`] as JSON text.
//!
//! Tables are classified while their pairs are scanned in insertion order:
//! as long as the keys run `1, 2, 3, …` the table is an array candidate.
//! The first key that breaks the run turns it into an object, re-keying the
//! positional entries seen so far as `"1"`, `"2"`, ….
//!
//! Tables on the active path are tracked by identity so that a table which
//! contains itself fails with [`EncodeError::CyclicStructure`].

use indexmap::IndexMap;

use super::error::EncodeError;
use super::util::format_number;
use super::DEFAULT_MAX_DEPTH;
use crate::value::{Key, Table, Value};

/// Options controlling encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Maximum number of nested tables.
    pub max_depth: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How a table renders.
pub(crate) enum Shape<'a> {
    Array,
    Object {
        /// Member name to value, in first-seen order.
        members: IndexMap<String, &'a Value>,
        /// Values replaced by a later pair with the same member name. They
        /// are not emitted but must still be encodable.
        shadowed: Vec<&'a Value>,
    },
}

/// Decides the shape of a table from its keys.
///
/// Only the length of the array candidate is tracked: its entries are
/// always the first `len` pairs.
pub(crate) fn classify(entries: &IndexMap<Key, Value>) -> Shape<'_> {
    if entries.is_empty() {
        return Shape::Object {
            members: IndexMap::new(),
            shadowed: Vec::new(),
        };
    }
    let mut len: u64 = 0;
    let mut obj: Option<IndexMap<String, &Value>> = None;
    let mut shadowed = Vec::new();
    for (key, value) in entries {
        if let Some(map) = obj.as_mut() {
            shadowed.extend(map.insert(key.to_string(), value));
            continue;
        }
        if key.as_index() == Some(len + 1) {
            len += 1;
            continue;
        }
        // Sequence broken; everything seen so far becomes "1".."len".
        let mut map = IndexMap::with_capacity(entries.len());
        for (i, v) in entries.values().take(len as usize).enumerate() {
            map.insert((i + 1).to_string(), v);
        }
        shadowed.extend(map.insert(key.to_string(), value));
        obj = Some(map);
    }
    match obj {
        Some(members) => Shape::Object { members, shadowed },
        None => Shape::Array,
    }
}

pub struct JsonEncoder {
    out: String,
    /// Identities of the tables currently being written.
    path: Vec<usize>,
    pub options: EncoderOptions,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::with_options(EncoderOptions::default())
    }

    pub fn with_options(options: EncoderOptions) -> Self {
        Self {
            out: String::new(),
            path: Vec::new(),
            options,
        }
    }

    /// Encodes `value`. On error nothing is returned; the partial output is
    /// discarded.
    pub fn encode(&mut self, value: &Value) -> Result<String, EncodeError> {
        self.out.clear();
        self.path.clear();
        match self.write_any(value) {
            Ok(()) => Ok(std::mem::take(&mut self.out)),
            Err(e) => {
                self.out.clear();
                Err(e)
            }
        }
    }

    pub fn write_any(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_boolean(*b),
            Value::Number(n) => self.write_number(*n)?,
            Value::Str(s) => self.write_str(s),
            Value::Table(t) => self.write_table(t)?,
            Value::Opaque(o) => return Err(EncodeError::Unconvertible(*o)),
        }
        Ok(())
    }

    pub fn write_null(&mut self) {
        self.out.push_str("null");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.out.push_str(if b { "true" } else { "false" });
    }

    pub fn write_number(&mut self, n: f64) -> Result<(), EncodeError> {
        if !n.is_finite() {
            return Err(EncodeError::NonFiniteNumber(n));
        }
        self.out.push_str(&format_number(n));
        Ok(())
    }

    /// Writes a JSON string literal with escaping.
    pub fn write_str(&mut self, s: &str) {
        let plain = s
            .bytes()
            .all(|b| (32..=126).contains(&b) && b != b'"' && b != b'\\');
        if plain {
            self.out.reserve(s.len() + 2);
            self.out.push('"');
            self.out.push_str(s);
            self.out.push('"');
            return;
        }
        // serde_json's `Display` for a string value is the escaped literal.
        self.out
            .push_str(&serde_json::Value::String(s.to_owned()).to_string());
    }

    pub fn write_table(&mut self, table: &Table) -> Result<(), EncodeError> {
        let id = table.id();
        if self.path.contains(&id) {
            return Err(EncodeError::CyclicStructure);
        }
        if self.path.len() >= self.options.max_depth {
            return Err(EncodeError::DepthLimitExceeded(self.options.max_depth));
        }
        self.path.push(id);
        let result = table.with_entries(|entries| match classify(entries) {
            Shape::Array => self.write_arr(entries.values()),
            Shape::Object { members, shadowed } => {
                self.check_shadowed(&shadowed)?;
                self.write_obj(&members)
            }
        });
        self.path.pop();
        result
    }

    /// Runs shadowed values through the encoder and drops their output.
    fn check_shadowed(&mut self, values: &[&Value]) -> Result<(), EncodeError> {
        let mark = self.out.len();
        for value in values {
            let result = self.write_any(value);
            self.out.truncate(mark);
            result?;
        }
        Ok(())
    }

    fn write_arr<'a>(
        &mut self,
        items: impl Iterator<Item = &'a Value>,
    ) -> Result<(), EncodeError> {
        self.out.push('[');
        for (i, item) in items.enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_any(item)?;
        }
        self.out.push(']');
        Ok(())
    }

    fn write_obj(&mut self, members: &IndexMap<String, &Value>) -> Result<(), EncodeError> {
        self.out.push('{');
        for (i, (key, value)) in members.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_str(key);
            self.out.push(':');
            self.write_any(value)?;
        }
        self.out.push('}');
        Ok(())
    }
}
