//! [`Value`]: the dynamic host value the converter reads and produces.
//!
//! Scalars map one-to-one onto JSON literals. The interesting case is
//! [`Table`], a single hybrid container that acts as a sequence, a map, or
//! both at once; whether it becomes a JSON array or object is only decided
//! when it is encoded.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

/// Table key: a 1-based position or a string name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Positional key. Only `1, 2, 3, …` in insertion order keep a table
    /// array-shaped; `0` is accepted but always forces object shape.
    Index(u64),
    /// String key.
    Name(String),
}

impl Key {
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(s) => Some(s),
        }
    }
}

/// Member-name form of the key: decimal digits for positions.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Key {
    fn from(i: u64) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

/// Host values with no JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opaque {
    Function,
    Channel,
    UserData,
}

impl Opaque {
    /// Host type name, as it appears in error messages.
    pub fn type_name(self) -> &'static str {
        match self {
            Opaque::Function => "function",
            Opaque::Channel => "channel",
            Opaque::UserData => "userdata",
        }
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A dynamic host value.
///
/// Equality is structural: two tables are equal when they hold equal pairs
/// in the same insertion order. Cyclic tables compare equal when they have
/// the same shape. A cycle keeps its tables alive until it is broken with
/// [`Table::remove`] or [`Table::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Table(Table),
    /// Function, channel or userdata handle. Never produced by decoding.
    Opaque(Opaque),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
            Value::Opaque(o) => o.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl From<Opaque> for Value {
    fn from(o: Opaque) -> Self {
        Value::Opaque(o)
    }
}

#[derive(Default)]
struct TableData {
    entries: IndexMap<Key, Value>,
    /// Largest `n` such that `1..=n` are all present.
    border: u64,
}

impl TableData {
    fn advance_border(&mut self) {
        while self.entries.contains_key(&Key::Index(self.border + 1)) {
            self.border += 1;
        }
    }
}

/// Shared handle to a hybrid container.
///
/// Cloning a `Table` clones the handle, not the contents: both clones see
/// the same pairs, which is how a table comes to contain itself. Pairs keep
/// their insertion order and keys are unique.
#[derive(Clone, Default)]
pub struct Table {
    inner: Arc<RwLock<TableData>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TableData {
                entries: IndexMap::with_capacity(capacity),
                border: 0,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TableData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableData> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` if both handles point at the same table.
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity of the underlying table, stable while any handle is alive.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Length of the gapless `1..=n` run of positional keys.
    pub fn border(&self) -> u64 {
        self.read().border
    }

    pub fn get(&self, key: &Key) -> Option<Value> {
        self.read().entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Inserts a pair. An existing key keeps its original position and the
    /// previous value is returned.
    pub fn set(&self, key: impl Into<Key>, value: Value) -> Option<Value> {
        let key = key.into();
        let mut data = self.write();
        let next = data.border + 1;
        let prev = data.entries.insert(key.clone(), value);
        if key == Key::Index(next) {
            data.advance_border();
        }
        prev
    }

    /// Appends at position `border + 1` and returns that position.
    pub fn push(&self, value: Value) -> u64 {
        let mut data = self.write();
        let index = data.border + 1;
        data.entries.insert(Key::Index(index), value);
        data.advance_border();
        index
    }

    /// Removes a pair, preserving the order of the rest.
    pub fn remove(&self, key: &Key) -> Option<Value> {
        let mut data = self.write();
        let prev = data.entries.shift_remove(key);
        if let (Some(_), Key::Index(i)) = (&prev, key) {
            if *i >= 1 && *i <= data.border {
                data.border = i - 1;
            }
        }
        prev
    }

    /// Snapshot of the pairs in insertion order.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.read()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Runs `f` over the pairs under a read lock, without cloning them.
    pub(crate) fn with_entries<R>(&self, f: impl FnOnce(&IndexMap<Key, Value>) -> R) -> R {
        f(&self.read().entries)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        tables_eq(self, other, &mut Vec::new())
    }
}

/// `path` holds the table pairs currently being compared; meeting one again
/// means both sides loop back the same way.
fn tables_eq(a: &Table, b: &Table, path: &mut Vec<(usize, usize)>) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    let pair = (a.id(), b.id());
    if path.contains(&pair) {
        return true;
    }
    // Snapshots, so no lock is held while nested tables are compared.
    let (xs, ys) = (a.entries(), b.entries());
    if xs.len() != ys.len() {
        return false;
    }
    path.push(pair);
    let equal = xs
        .iter()
        .zip(&ys)
        .all(|((ka, va), (kb, vb))| ka == kb && values_eq(va, vb, path));
    path.pop();
    equal
}

fn values_eq(a: &Value, b: &Value, path: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Table(x), Value::Table(y)) => tables_eq(x, y, path),
        _ => a == b,
    }
}

/// Shows one level of pairs; nested tables print as their size only so
/// that cyclic tables stay printable.
impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Shallow<'a>(&'a Value);

        impl fmt::Debug for Shallow<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    Value::Table(t) => write!(f, "Table(len={})", t.len()),
                    other => fmt::Debug::fmt(other, f),
                }
            }
        }

        let entries = self.entries();
        f.debug_map()
            .entries(entries.iter().map(|(k, v)| (k, Shallow(v))))
            .finish()
    }
}

impl FromIterator<Value> for Table {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let table = Table::new();
        for value in iter {
            table.push(value);
        }
        table
    }
}

impl<K: Into<Key>> FromIterator<(K, Value)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let table = Table::new();
        for (key, value) in iter {
            table.set(key, value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_fills_the_border() {
        let t = Table::new();
        assert_eq!(t.push(Value::from("a")), 1);
        assert_eq!(t.push(Value::from("b")), 2);
        assert_eq!(t.border(), 2);
        assert_eq!(t.get(&Key::Index(2)), Some(Value::from("b")));
    }

    #[test]
    fn set_past_a_gap_does_not_move_the_border() {
        let t = Table::new();
        t.set(3u64, Value::Bool(true));
        assert_eq!(t.border(), 0);
        t.set(1u64, Value::Bool(true));
        assert_eq!(t.border(), 1);
        t.set(2u64, Value::Bool(true));
        assert_eq!(t.border(), 3);
        assert_eq!(t.push(Value::Null), 4);
    }

    #[test]
    fn set_existing_key_keeps_position() {
        let t: Table = [("a", Value::from(1)), ("b", Value::from(2))]
            .into_iter()
            .collect();
        let prev = t.set("a", Value::from(10));
        assert_eq!(prev, Some(Value::from(1)));
        let keys: Vec<Key> = t.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
    }

    #[test]
    fn remove_shrinks_the_border() {
        let t: Table = (1..=4).map(Value::from).collect();
        assert_eq!(t.border(), 4);
        assert_eq!(t.remove(&Key::Index(2)), Some(Value::from(2)));
        assert_eq!(t.border(), 1);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn clones_share_contents() {
        let a = Table::new();
        let b = a.clone();
        b.push(Value::Null);
        assert_eq!(a.len(), 1);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Table::new()));
    }

    #[test]
    fn equality_is_structural_and_ordered() {
        let a: Table = [("x", Value::from(1)), ("y", Value::from(2))]
            .into_iter()
            .collect();
        let b: Table = [("x", Value::from(1)), ("y", Value::from(2))]
            .into_iter()
            .collect();
        let c: Table = [("y", Value::from(2)), ("x", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cyclic_tables_compare_by_shape() {
        let cyclic = |n: i32| {
            let t: Table = [("v", Value::from(n))].into_iter().collect();
            t.set("me", Value::Table(t.clone()));
            t
        };
        let (a, b, c) = (cyclic(1), cyclic(1), cyclic(2));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);

        // Two-step cycle on one side, one-step on the other: same shape.
        let d: Table = [("v", Value::from(1))].into_iter().collect();
        let e: Table = [("v", Value::from(1))].into_iter().collect();
        d.set("me", Value::Table(e.clone()));
        e.set("me", Value::Table(d.clone()));
        assert_eq!(a, d);

        for t in [a, b, c, d] {
            t.remove(&Key::from("me"));
        }
    }

    #[test]
    fn accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from(1).as_bool(), None);
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert!(Value::from("s").as_table().is_none());
        assert_eq!(Value::Opaque(Opaque::Channel).type_name(), "channel");
        assert_eq!(Value::Null.type_name(), "nil");

        assert_eq!(Key::from("name").as_name(), Some("name"));
        assert_eq!(Key::Index(3).as_name(), None);
        assert_eq!(Key::Index(3).as_index(), Some(3));
        assert_eq!(Key::from("name").as_index(), None);
    }

    #[test]
    fn debug_of_cyclic_table_terminates() {
        let t = Table::new();
        t.set("self", Value::Table(t.clone()));
        let shown = format!("{t:?}");
        assert!(shown.contains("Table(len=1)"));
    }

    #[test]
    fn key_display_matches_member_names() {
        assert_eq!(Key::Index(12).to_string(), "12");
        assert_eq!(Key::from("what").to_string(), "what");
    }
}
