mod number;

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{TypeMismatch, ValueType};

pub use number::Number;

/// Object payload: an insertion-order-preserving map, so a parsed document
/// serializes its keys back in the order they appeared.
pub type Map = IndexMap<String, Value, ahash::RandomState>;

/// The in-memory representation of one JSON datum.
///
/// A value's tag is fixed at construction; `Array` and `Object` contents are
/// ordinary owned containers with no sharing between subtrees. Equality is
/// deep: arrays compare element-wise in order, objects compare as sets of
/// key/value pairs regardless of iteration order, and numbers compare by
/// numeric value (`1` equals `1.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// True only for the `Null` case.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, TypeMismatch> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Bool)),
        }
    }

    pub fn as_number(&self) -> Result<Number, TypeMismatch> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Number)),
        }
    }

    /// Integer narrowing; permitted from any number, truncating floats.
    pub fn as_i64(&self) -> Result<i64, TypeMismatch> {
        self.as_number().map(Number::as_i64)
    }

    pub fn as_f64(&self) -> Result<f64, TypeMismatch> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Result<&str, TypeMismatch> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::String)),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], TypeMismatch> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Array)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Value>, TypeMismatch> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Array)),
        }
    }

    pub fn as_object(&self) -> Result<&Map, TypeMismatch> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Object)),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Map, TypeMismatch> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(TypeMismatch::new(other.value_type(), ValueType::Object)),
        }
    }

    /// Object member lookup; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Array element lookup; `None` out of bounds and for non-arrays.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                2u8.hash(state);
                n.hash(state);
            }
            Value::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Array(items) => {
                4u8.hash(state);
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Value::Object(map) => {
                // Equal objects may iterate in different orders, so combine
                // per-entry hashes order-independently.
                5u8.hash(state);
                map.len().hash(state);
                let mut combined = 0u64;
                for (key, value) in map {
                    let mut entry = ahash::AHasher::default();
                    key.hash(&mut entry);
                    value.hash(&mut entry);
                    combined = combined.wrapping_add(entry.finish());
                }
                combined.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}
