//! Collectables embedding arrays
//!
//! Values assigned to an [`ArrayCollectable`] are coerced into an [`Array`].
//! Duplicating one yields a view: a new wrapper over the same storage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::array::{self, Array};
use crate::collectable::{Collectable, Validator, TRACE_TARGET};
use crate::error::Result;
use crate::sequence::SequenceCollectable;
use crate::value::{Scalar, Value};

/// Dataset axis an array attribute is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// No particular axis
    #[default]
    Unspecified,

    /// One entry per sample
    Sample,

    /// One entry per feature
    Feature,

    /// Whole-dataset value
    Dataset,
}

impl Axis {
    /// Type name of attributes bound to this axis
    pub fn attribute_name(self) -> &'static str {
        match self {
            Axis::Unspecified => "ArrayCollectable",
            Axis::Sample => "SampleAttribute",
            Axis::Feature => "FeatureAttribute",
            Axis::Dataset => "DatasetAttribute",
        }
    }
}

/// Sequence collectable whose value is always an [`Array`]
pub struct ArrayCollectable {
    inner: SequenceCollectable,
    axis: Axis,
}

impl ArrayCollectable {
    /// Create an array collectable without an axis binding
    pub fn new(value: impl Into<Value>, length: Option<usize>) -> Result<Self> {
        Self::with_axis(Axis::Unspecified, value, length)
    }

    /// Create a per-sample attribute
    pub fn sample(value: impl Into<Value>) -> Result<Self> {
        Self::with_axis(Axis::Sample, value, None)
    }

    /// Create a per-feature attribute
    pub fn feature(value: impl Into<Value>) -> Result<Self> {
        Self::with_axis(Axis::Feature, value, None)
    }

    /// Create a whole-dataset attribute
    pub fn dataset(value: impl Into<Value>) -> Result<Self> {
        Self::with_axis(Axis::Dataset, value, None)
    }

    /// Create an array collectable bound to `axis`
    pub fn with_axis(axis: Axis, value: impl Into<Value>, length: Option<usize>) -> Result<Self> {
        let mut collectable = Self::empty(axis, length);
        collectable.set_value(value)?;
        Ok(collectable)
    }

    /// Create an array collectable without a value
    pub fn empty(axis: Axis, length: Option<usize>) -> Self {
        Self::init(SequenceCollectable::bare(length), axis)
    }

    /// Promote a sequence collectable, coercing its value into an array
    ///
    /// The stored value is not checked against the sequence's target length,
    /// which is carried over for future assignments.
    pub fn from_sequence(sequence: SequenceCollectable, axis: Axis) -> Result<Self> {
        let length = sequence.target_length();
        let mut promoted = Self::from_collectable(sequence.into_collectable(), axis, None)?;
        promoted.set_length_check(length);
        Ok(promoted)
    }

    /// Promote a plain collectable, keeping its name, documentation and validator
    pub fn from_collectable(mut base: Collectable, axis: Axis, length: Option<usize>) -> Result<Self> {
        let value = base.clear_value();
        let mut collectable = Self::init(SequenceCollectable::from_parts(base, length), axis);
        if let Some(value) = value {
            collectable.set_value(value)?;
        }
        Ok(collectable)
    }

    fn init(inner: SequenceCollectable, axis: Axis) -> Self {
        trace!(target: TRACE_TARGET, kind = axis.attribute_name(), length = ?inner.target_length(), "initialized new collectable");
        Self { inner, axis }
    }

    /// Set the name, consuming and returning the collectable
    pub fn with_name(mut self, name: &str) -> Result<Self> {
        self.set_name(name)?;
        Ok(self)
    }

    /// Set the documentation, consuming and returning the collectable
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.set_doc(Some(doc.into()));
        self
    }

    /// Attach a validator; the current value, if any, must pass it
    pub fn with_validator(self, validator: Validator) -> Result<Self> {
        Ok(Self {
            inner: self.inner.with_validator(validator)?,
            axis: self.axis,
        })
    }

    /// Axis this attribute is bound to
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Name under which this collectable is known
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// Rename this collectable
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.inner.set_name(name)
    }

    /// Documentation about the purpose of this collectable
    pub fn doc(&self) -> Option<&str> {
        self.inner.doc()
    }

    /// Replace the documentation
    pub fn set_doc(&mut self, doc: Option<String>) {
        self.inner.set_doc(doc);
    }

    /// The stored value; always a [`Value::Array`] when set
    pub fn value(&self) -> Option<&Value> {
        self.inner.value()
    }

    /// The stored array
    pub fn array(&self) -> Option<&Array> {
        self.inner.value().and_then(Value::as_array)
    }

    /// Number of elements, `None` if unset
    pub fn len(&self) -> Option<usize> {
        self.inner.len()
    }

    /// Check if the stored value is unset or has no elements
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Length every assigned value must have, if set
    pub fn target_length(&self) -> Option<usize> {
        self.inner.target_length()
    }

    /// Change the length enforced on future assignments
    pub fn set_length_check(&mut self, length: Option<usize>) {
        self.inner.set_length_check(length);
    }

    /// Coerce `value` into an array, then validate and store it
    ///
    /// Arrays are stored as given, sharing storage with the caller. Lists of
    /// scalars are copied into a new array.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = match value.into() {
            Value::Array(array) => array,
            other => array::as_array(&other)?,
        };
        self.inner.set_value(value)
    }

    /// Sorted distinct elements, cached until the next assignment
    pub fn unique(&self) -> Result<Option<Arc<[Scalar]>>> {
        self.inner.unique()
    }

    /// Underlying sequence collectable
    pub fn as_sequence(&self) -> &SequenceCollectable {
        &self.inner
    }

    /// New wrapper over the same storage
    ///
    /// Name, documentation, target length and axis are copied; writes to the
    /// array through either wrapper are visible through both.
    #[must_use]
    pub fn alias_view(&self) -> Self {
        self.copy_with(|value| match value {
            Value::Array(array) => Value::Array(array.view()),
            other => other.clone(),
        })
    }

    /// Same as [`ArrayCollectable::alias_view`]
    #[must_use]
    pub fn duplicate(&self) -> Self {
        self.alias_view()
    }

    /// Copy with independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.copy_with(Value::deep_copy)
    }

    fn copy_with(&self, copy: impl Fn(&Value) -> Value) -> Self {
        Self {
            inner: self.inner.copy_with(copy),
            axis: self.axis,
        }
    }
}

impl fmt::Display for ArrayCollectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for ArrayCollectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.axis.attribute_name())
            .field("name", &self.name())
            .field("doc", &self.doc())
            .field("value", &self.value())
            .field("length", &self.target_length())
            .finish()
    }
}
