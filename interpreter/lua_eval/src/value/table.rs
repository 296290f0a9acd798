//! The table: a keyed mapping with an optional metatable.

use rustc_hash::FxHashMap;

use super::{Heap, Value};

/// Error produced by writing an illegal table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKeyError {
    NilIndex,
    NanIndex,
}

impl TableKeyError {
    pub fn message(self) -> &'static str {
        match self {
            TableKeyError::NilIndex => "table index is nil",
            TableKeyError::NanIndex => "table index is NaN",
        }
    }
}

/// A mapping from values to values plus one metatable slot.
///
/// Writing `nil` deletes the key; reading a missing key yields `nil`.
/// `nil` and NaN are never stored as keys, and `-0.0` normalizes to `0.0`
/// so the two zeros are one key.
pub struct Table {
    fields: FxHashMap<Value, Value>,
    metatable: Option<Heap<Table>>,
}

impl Table {
    pub fn new() -> Self {
        Table {
            fields: FxHashMap::default(),
            metatable: None,
        }
    }

    /// Read a key without consulting metatables.
    ///
    /// Illegal keys simply read as `nil`; only writes reject them.
    pub fn raw_get(&self, key: &Value) -> Value {
        match normalize_key(key.clone()) {
            Ok(key) => self.fields.get(&key).cloned().unwrap_or(Value::Nil),
            Err(_) => Value::Nil,
        }
    }

    /// Write a key without consulting metatables. A `nil` value deletes.
    pub fn raw_set(&mut self, key: Value, value: Value) -> Result<(), TableKeyError> {
        let key = normalize_key(key)?;
        if value.is_nil() {
            self.fields.remove(&key);
        } else {
            self.fields.insert(key, value);
        }
        Ok(())
    }

    /// The border: the largest `n` such that `1..=n` are all present.
    ///
    /// Zero when key `1` is absent. For sparse tables any border is a
    /// valid length; this probe returns the one reachable from 1.
    pub fn border(&self) -> f64 {
        let mut n = 0u64;
        loop {
            let next = Value::Number((n + 1) as f64);
            if self.fields.contains_key(&next) {
                n += 1;
            } else {
                return n as f64;
            }
        }
    }

    pub fn metatable(&self) -> Option<Heap<Table>> {
        self.metatable.clone()
    }

    pub fn set_metatable(&mut self, metatable: Option<Heap<Table>>) {
        self.metatable = metatable;
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate stored entries in unspecified but, absent mutation, stable
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.fields.iter()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Table({} entries)", self.fields.len())
    }
}

/// Validate and canonicalize a key: reject `nil` and NaN, fold `-0.0`
/// onto `0.0`.
fn normalize_key(key: Value) -> Result<Value, TableKeyError> {
    match key {
        Value::Nil => Err(TableKeyError::NilIndex),
        Value::Number(n) if n.is_nan() => Err(TableKeyError::NanIndex),
        Value::Number(n) if n == 0.0 => Ok(Value::Number(0.0)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::LuaStr;

    #[test]
    fn missing_key_reads_nil() {
        let t = Table::new();
        assert!(t.raw_get(&Value::Number(1.0)).is_nil());
    }

    #[test]
    fn set_then_get() {
        let mut t = Table::new();
        t.raw_set(Value::string("k"), Value::Number(7.0)).unwrap();
        assert_eq!(t.raw_get(&Value::string("k")), Value::Number(7.0));
    }

    #[test]
    fn nil_value_deletes() {
        let mut t = Table::new();
        t.raw_set(Value::string("k"), Value::Number(7.0)).unwrap();
        t.raw_set(Value::string("k"), Value::Nil).unwrap();
        assert!(t.raw_get(&Value::string("k")).is_nil());
        assert_eq!(t.entry_count(), 0);
    }

    #[test]
    fn nil_key_is_rejected() {
        let mut t = Table::new();
        assert_eq!(
            t.raw_set(Value::Nil, Value::Number(1.0)),
            Err(TableKeyError::NilIndex)
        );
    }

    #[test]
    fn nan_key_is_rejected() {
        let mut t = Table::new();
        assert_eq!(
            t.raw_set(Value::Number(f64::NAN), Value::Number(1.0)),
            Err(TableKeyError::NanIndex)
        );
    }

    #[test]
    fn negative_zero_folds_onto_zero() {
        let mut t = Table::new();
        t.raw_set(Value::Number(-0.0), Value::string("z")).unwrap();
        assert_eq!(t.raw_get(&Value::Number(0.0)), Value::string("z"));
        assert_eq!(t.entry_count(), 1);
    }

    #[test]
    fn string_keys_compare_by_content() {
        let mut t = Table::new();
        let key = String::from("ab");
        t.raw_set(Value::Str(LuaStr::from(key)), Value::Boolean(true))
            .unwrap();
        assert_eq!(
            t.raw_get(&Value::Str(LuaStr::from("ab"))),
            Value::Boolean(true)
        );
    }

    #[test]
    fn border_of_dense_array() {
        let mut t = Table::new();
        for i in 1..=4 {
            t.raw_set(Value::Number(i as f64), Value::Number(i as f64))
                .unwrap();
        }
        assert_eq!(t.border(), 4.0);
    }

    #[test]
    fn border_of_empty_table_is_zero() {
        assert_eq!(Table::new().border(), 0.0);
    }

    #[test]
    fn border_stops_at_first_gap() {
        let mut t = Table::new();
        t.raw_set(Value::Number(1.0), Value::Boolean(true)).unwrap();
        t.raw_set(Value::Number(3.0), Value::Boolean(true)).unwrap();
        assert_eq!(t.border(), 1.0);
    }

    #[test]
    fn metatable_slot_round_trips() {
        let mut t = Table::new();
        assert!(t.metatable().is_none());
        let mt = Heap::new(Table::new());
        t.set_metatable(Some(mt.clone()));
        assert!(t.metatable().unwrap().ptr_eq(&mt));
        t.set_metatable(None);
        assert!(t.metatable().is_none());
    }
}
