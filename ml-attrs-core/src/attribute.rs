//! Tagged union over the collectable kinds stored in collections

use std::fmt;
use std::sync::Arc;

use crate::array::Array;
use crate::array_collectable::{ArrayCollectable, Axis};
use crate::collectable::Collectable;
use crate::error::Result;
use crate::sequence::SequenceCollectable;
use crate::value::{Scalar, Value};

/// Any collectable held by a collection
#[derive(Debug)]
pub enum Attribute {
    /// Plain collectable, any value
    Plain(Collectable),

    /// Sequence collectable with length check and unique cache
    Sequence(SequenceCollectable),

    /// Array collectable, duplicated as a view
    Array(ArrayCollectable),
}

impl Attribute {
    /// Name under which this attribute is known
    pub fn name(&self) -> Option<&str> {
        match self {
            Attribute::Plain(c) => c.name(),
            Attribute::Sequence(c) => c.name(),
            Attribute::Array(c) => c.name(),
        }
    }

    /// Rename this attribute
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        match self {
            Attribute::Plain(c) => c.set_name(name),
            Attribute::Sequence(c) => c.set_name(name),
            Attribute::Array(c) => c.set_name(name),
        }
    }

    /// Documentation about the purpose of this attribute
    pub fn doc(&self) -> Option<&str> {
        match self {
            Attribute::Plain(c) => c.doc(),
            Attribute::Sequence(c) => c.doc(),
            Attribute::Array(c) => c.doc(),
        }
    }

    /// Replace the documentation
    pub fn set_doc(&mut self, doc: Option<String>) {
        match self {
            Attribute::Plain(c) => c.set_doc(doc),
            Attribute::Sequence(c) => c.set_doc(doc),
            Attribute::Array(c) => c.set_doc(doc),
        }
    }

    /// The stored value
    pub fn value(&self) -> Option<&Value> {
        match self {
            Attribute::Plain(c) => c.value(),
            Attribute::Sequence(c) => c.value(),
            Attribute::Array(c) => c.value(),
        }
    }

    /// Validate and store a new value through the wrapper's own checks
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        match self {
            Attribute::Plain(c) => c.set_value(value),
            Attribute::Sequence(c) => c.set_value(value),
            Attribute::Array(c) => c.set_value(value),
        }
    }

    /// Length of the stored value, if it is a sequence
    pub fn len(&self) -> Option<usize> {
        self.value().and_then(Value::len)
    }

    /// Check if the stored value is unset or has no elements
    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    /// Length enforced on assignment; plain attributes never have one
    pub fn target_length(&self) -> Option<usize> {
        match self {
            Attribute::Plain(_) => None,
            Attribute::Sequence(c) => c.target_length(),
            Attribute::Array(c) => c.target_length(),
        }
    }

    /// Change the length enforced on future assignments
    ///
    /// Plain attributes carry no length check and ignore this.
    pub fn set_length_check(&mut self, length: Option<usize>) {
        match self {
            Attribute::Plain(_) => {}
            Attribute::Sequence(c) => c.set_length_check(length),
            Attribute::Array(c) => c.set_length_check(length),
        }
    }

    /// Sorted distinct elements, `None` for plain attributes or unset values
    pub fn unique(&self) -> Result<Option<Arc<[Scalar]>>> {
        match self {
            Attribute::Plain(_) => Ok(None),
            Attribute::Sequence(c) => c.unique(),
            Attribute::Array(c) => c.unique(),
        }
    }

    /// Check if this attribute enforces sequence values
    pub fn is_sequence(&self) -> bool {
        !matches!(self, Attribute::Plain(_))
    }

    /// Get the array collectable, if this is one
    pub fn as_array(&self) -> Option<&ArrayCollectable> {
        match self {
            Attribute::Array(c) => Some(c),
            _ => None,
        }
    }

    /// Get the sequence view of this attribute, if it enforces sequences
    pub fn as_sequence(&self) -> Option<&SequenceCollectable> {
        match self {
            Attribute::Plain(_) => None,
            Attribute::Sequence(c) => Some(c),
            Attribute::Array(c) => Some(c.as_sequence()),
        }
    }

    /// Copy following each kind's own duplication rule
    ///
    /// Plain and sequence attributes get a shallow copy of their value, array
    /// attributes a view of the same storage.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Attribute::Plain(c) => Attribute::Plain(c.duplicate()),
            Attribute::Sequence(c) => Attribute::Sequence(c.duplicate()),
            Attribute::Array(c) => Attribute::Array(c.alias_view()),
        }
    }

    /// Copy with fully independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Attribute::Plain(c) => Attribute::Plain(c.deep_copy()),
            Attribute::Sequence(c) => Attribute::Sequence(c.deep_copy()),
            Attribute::Array(c) => Attribute::Array(c.deep_copy()),
        }
    }

    /// Re-box as a sequence attribute unless it already is one
    pub fn into_sequence(self) -> Result<Self> {
        match self {
            Attribute::Plain(c) => Ok(Attribute::Sequence(SequenceCollectable::from_collectable(c, None)?)),
            other => Ok(other),
        }
    }

    /// Re-box as an array attribute bound to `axis` unless it already is one
    ///
    /// An existing array attribute keeps its own axis.
    pub fn into_array(self, axis: Axis) -> Result<Self> {
        match self {
            Attribute::Plain(c) => Ok(Attribute::Array(ArrayCollectable::from_collectable(c, axis, None)?)),
            Attribute::Sequence(c) => Ok(Attribute::Array(ArrayCollectable::from_sequence(c, axis)?)),
            other @ Attribute::Array(_) => Ok(other),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Plain(c) => fmt::Display::fmt(c, f),
            Attribute::Sequence(c) => fmt::Display::fmt(c, f),
            Attribute::Array(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<Collectable> for Attribute {
    fn from(c: Collectable) -> Self {
        Attribute::Plain(c)
    }
}

impl From<SequenceCollectable> for Attribute {
    fn from(c: SequenceCollectable) -> Self {
        Attribute::Sequence(c)
    }
}

impl From<ArrayCollectable> for Attribute {
    fn from(c: ArrayCollectable) -> Self {
        Attribute::Array(c)
    }
}

/// Input to a collection insert: a bare value or an already boxed attribute
#[derive(Debug)]
pub enum Entry {
    /// Bare value, boxed by the receiving collection
    Raw(Value),

    /// Pre-built wrapper, re-boxed only if the collection needs a stricter kind
    Boxed(Attribute),
}

impl From<Value> for Entry {
    fn from(v: Value) -> Self {
        Entry::Raw(v)
    }
}

impl From<Scalar> for Entry {
    fn from(v: Scalar) -> Self {
        Entry::Raw(v.into())
    }
}

impl From<Array> for Entry {
    fn from(v: Array) -> Self {
        Entry::Raw(v.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Entry {
    fn from(v: Vec<T>) -> Self {
        Entry::Raw(v.into())
    }
}

impl From<Attribute> for Entry {
    fn from(v: Attribute) -> Self {
        Entry::Boxed(v)
    }
}

impl From<Collectable> for Entry {
    fn from(v: Collectable) -> Self {
        Entry::Boxed(v.into())
    }
}

impl From<SequenceCollectable> for Entry {
    fn from(v: SequenceCollectable) -> Self {
        Entry::Boxed(v.into())
    }
}

impl From<ArrayCollectable> for Entry {
    fn from(v: ArrayCollectable) -> Self {
        Entry::Boxed(v.into())
    }
}
