//! Dynamically typed values held by attributes

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::array::{self, Array};
use crate::error::{Error, Result};

/// A single element value
///
/// Scalars are totally ordered so they can be deduplicated and sorted:
/// booleans sort before numbers, numbers before strings. Integers and floats
/// compare numerically, an integer sorting first when both are numerically
/// equal. Floats use IEEE total ordering, so `NaN` equals itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 string
    Str(String),
}

impl Scalar {
    fn rank(&self) -> u8 {
        match self {
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Float(_) => 1,
            Scalar::Str(_) => 2,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            #[allow(clippy::cast_precision_loss)]
            (Scalar::Float(a), Scalar::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v:?}"),
            Scalar::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// A value stored in an attribute
///
/// `Clone` aliases any array storage reachable from the value. Use
/// [`Value::shallow_copy`] or [`Value::deep_copy`] for independent storage.
#[derive(Debug, Clone)]
pub enum Value {
    /// A single element
    Scalar(Scalar),

    /// A heterogeneous sequence
    List(Vec<Value>),

    /// A flat array with shareable storage
    Array(Array),

    /// Named values, in insertion order
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Number of elements, or `None` for values that are not sequences
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::List(items) => Some(items.len()),
            Value::Array(array) => Some(array.len()),
            Value::Map(map) => Some(map.len()),
        }
    }

    /// Whether this value has a length at all
    pub fn is_sequence(&self) -> bool {
        self.len().is_some()
    }

    /// Whether this value can produce a storage-sharing view
    pub fn is_viewable(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Get the scalar, if this is one
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Get the list items, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the array, if this is one
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Get the map, if this is one
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Copy the top level into new storage
    ///
    /// A top-level array gets its own buffer. Arrays nested inside lists or
    /// maps remain shared with the original.
    #[must_use]
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::Array(array) => Value::Array(array.deep_copy()),
            other => other.clone(),
        }
    }

    /// Copy the whole value into independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Scalar(v) => Value::Scalar(v.clone()),
            Value::List(items) => Value::List(items.iter().map(Value::deep_copy).collect()),
            Value::Array(array) => Value::Array(array.deep_copy()),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.deep_copy()))
                    .collect(),
            ),
        }
    }

    /// Sorted distinct elements of a sequence value
    pub(crate) fn unique_elements(&self) -> Result<Vec<Scalar>> {
        match self {
            Value::Array(array) => Ok(array.unique()),
            Value::List(items) => {
                let scalars = items
                    .iter()
                    .map(|item| {
                        item.as_scalar().cloned().ok_or_else(|| {
                            Error::Coercion("unique values need a list of scalars".into())
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(array::unique(&scalars))
            }
            Value::Scalar(_) => Err(Error::Coercion("a scalar has no elements".into())),
            Value::Map(_) => Err(Error::Coercion("unique values of a map are undefined".into())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Scalar(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(v.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(|v| Value::Scalar(v.into())).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Scalar::Bool(true), Scalar::Int(-5) ; "bool before numbers")]
    #[test_case(Scalar::Int(3), Scalar::Str("a".into()) ; "numbers before strings")]
    #[test_case(Scalar::Int(1), Scalar::Float(1.5) ; "mixed numeric by value")]
    #[test_case(Scalar::Int(2), Scalar::Float(2.0) ; "int before equal float")]
    #[test_case(Scalar::Float(-0.5), Scalar::Int(0) ; "float before larger int")]
    fn test_scalar_ordering(lower: Scalar, higher: Scalar) {
        assert!(lower < higher);
        assert!(higher > lower);
        assert_ne!(lower, higher);
    }

    #[test]
    fn test_nan_equals_itself() {
        assert_eq!(Scalar::Float(f64::NAN), Scalar::Float(f64::NAN));
    }

    #[test]
    fn test_len_of_values() {
        assert_eq!(Value::from(3).len(), None);
        assert_eq!(Value::from("abc").len(), None);
        assert_eq!(Value::from(vec![1, 2, 3]).len(), Some(3));
        assert_eq!(Value::from(Array::from_iter([1, 2])).len(), Some(2));
        assert_eq!(Value::Map(IndexMap::new()).len(), Some(0));
    }

    #[test]
    fn test_copy_depths() {
        let inner = Array::from_iter([1, 2, 3]);
        let value = Value::List(vec![Value::Array(inner.view())]);

        let aliased = value.clone();
        let shallow = value.shallow_copy();
        let deep = value.deep_copy();

        let nested = |v: &Value| v.as_list().unwrap()[0].as_array().unwrap().clone();
        assert!(nested(&aliased).shares_storage(&inner));
        assert!(nested(&shallow).shares_storage(&inner));
        assert!(!nested(&deep).shares_storage(&inner));
        assert_eq!(deep, value);
    }

    #[test]
    fn test_shallow_copy_of_array_gets_new_buffer() {
        let array = Array::from_iter([1.0, 2.0]);
        let copy = Value::Array(array.view()).shallow_copy();
        assert!(!copy.as_array().unwrap().shares_storage(&array));
        assert_eq!(copy, Value::Array(array));
    }

    #[test]
    fn test_unique_elements_of_list() {
        let value = Value::from(vec![3, 1, 3, 2, 1]);
        assert_eq!(
            value.unique_elements().unwrap(),
            vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]
        );
    }

    #[test]
    fn test_unique_elements_rejects_nested_list() {
        let value = Value::List(vec![Value::from(vec![1]), Value::from(2)]);
        assert!(matches!(value.unique_elements(), Err(Error::Coercion(_))));
    }

    #[test]
    fn test_scalar_deserializes_untagged() {
        let scalars: Vec<Scalar> = serde_json::from_str(r#"[true, 4, 2.5, "x"]"#).unwrap();
        assert_eq!(
            scalars,
            vec![
                Scalar::Bool(true),
                Scalar::Int(4),
                Scalar::Float(2.5),
                Scalar::Str("x".into())
            ]
        );
    }
}
