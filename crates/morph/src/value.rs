//! The canonical in-memory value every format reads into and writes from

use indexmap::map::{IntoIter, Iter, Keys, Values};
use indexmap::IndexMap;
use std::ops::Index;

/// A dynamically typed data value.
///
/// Integers and floats are distinct variants: the distinction is made at
/// ingest (a numeric literal without `.`/`e`/`E` that fits `i64` is an
/// `Int`) and is load-bearing for schema and struct type inference.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Array),
    /// Object (key-value pairs, insertion order preserved)
    Object(Object),
}

impl Value {
    /// Returns true if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if this value is an integer or float
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns true if this value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns true if this value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns true if this value is neither an array nor an object
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of either number variant
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Classify a numeric literal: `Int` when there is no fractional or
/// exponent marker and the digits fit `i64`, `Float` otherwise.
pub fn number_from_literal(literal: &str) -> Option<Value> {
    if literal.contains(['.', 'e', 'E']) {
        return literal.parse::<f64>().ok().map(Value::Float);
    }
    if let Ok(n) = literal.parse::<i64>() {
        return Some(Value::Int(n));
    }
    literal.parse::<f64>().ok().map(Value::Float)
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(Array(values))
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Object(Object(map))
    }
}

/// An order-preserving object (map of string keys to values)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub(crate) IndexMap<String, Value>);

impl Object {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Inserts a key-value pair, returning the previous value if present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.swap_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Keys in lexicographic order.
    ///
    /// Every serialization boundary that claims deterministic output sorts
    /// explicitly through this instead of relying on insertion order.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// `(key, value)` pairs in lexicographic key order
    pub fn sorted_iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.sorted_keys().into_iter().filter_map(|k| {
            let v = self.0.get(k)?;
            Some((k, v))
        })
    }
}

impl Index<&str> for Object {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<IndexMap<String, Value>> for Object {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// An array of values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub(crate) Vec<Value>);

impl Array {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// True when no element is an array or object
    pub fn all_primitive(&self) -> bool {
        self.0.iter().all(Value::is_primitive)
    }
}

impl Index<usize> for Array {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_variants_are_distinct() {
        assert!(Value::Int(1).is_number());
        assert!(Value::Float(1.0).is_number());
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Int(1).as_f64(), Some(1.0));
        assert_eq!(Value::Float(1.5).as_i64(), None);
    }

    #[test]
    fn test_number_from_literal() {
        assert_eq!(number_from_literal("30"), Some(Value::Int(30)));
        assert_eq!(number_from_literal("-7"), Some(Value::Int(-7)));
        assert_eq!(number_from_literal("3.5"), Some(Value::Float(3.5)));
        assert_eq!(number_from_literal("1e3"), Some(Value::Float(1000.0)));
        // Too large for i64 falls back to float
        assert!(matches!(
            number_from_literal("99999999999999999999"),
            Some(Value::Float(_))
        ));
        assert_eq!(number_from_literal("abc"), None);
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let mut obj = Object::new();
        obj.insert("zeta", 1i64);
        obj.insert("alpha", 2i64);
        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_sorted_keys() {
        let mut obj = Object::new();
        obj.insert("name", "Alice");
        obj.insert("age", 30i64);
        assert_eq!(obj.sorted_keys(), vec!["age", "name"]);
        let pairs: Vec<_> = obj.sorted_iter().map(|(k, _)| k).collect();
        assert_eq!(pairs, vec!["age", "name"]);
    }

    #[test]
    fn test_is_primitive() {
        assert!(Value::Null.is_primitive());
        assert!(Value::Int(1).is_primitive());
        assert!(Value::String("x".into()).is_primitive());
        assert!(!Value::Array(Array::new()).is_primitive());
        assert!(!Value::Object(Object::new()).is_primitive());
    }

    #[test]
    fn test_all_primitive() {
        let mut arr = Array::new();
        arr.push(1i64);
        arr.push("two");
        assert!(arr.all_primitive());
        arr.push(Object::new());
        assert!(!arr.all_primitive());
    }

    #[test]
    fn test_object_basics() {
        let mut obj = Object::new();
        assert!(obj.is_empty());
        obj.insert("key", "value");
        assert_eq!(obj.len(), 1);
        assert!(obj.contains_key("key"));
        assert_eq!(obj.get("key"), Some(&Value::String("value".into())));
        assert!(obj.remove("key").is_some());
        assert!(obj.is_empty());
    }

    #[test]
    fn test_from_impls() {
        let v: Value = 42i64.into();
        assert!(matches!(v, Value::Int(42)));
        let v: Value = 1.25f64.into();
        assert!(matches!(v, Value::Float(_)));
        let v: Value = vec![Value::Null].into();
        assert!(matches!(v, Value::Array(a) if a.len() == 1));
    }
}
