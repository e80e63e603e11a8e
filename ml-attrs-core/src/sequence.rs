//! Collectables holding sequences
//!
//! A [`SequenceCollectable`] only accepts values that have a length. It can be
//! told to enforce a target length on assignment and it caches the sorted set
//! of unique elements until the next assignment, or until the stored array is
//! written to through any view.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::array::Array;
use crate::collectable::{Collectable, Validator, TRACE_TARGET};
use crate::error::{Error, Result};
use crate::value::{Scalar, Value};

/// Documentation given to sequence collectables unless told otherwise
pub const DEFAULT_SEQUENCE_DOC: &str = "Sequence attribute";

/// Collectable for sequences with an optional length check and cached unique values
pub struct SequenceCollectable {
    /// Name, documentation, value and validator
    base: Collectable,

    /// Length every assigned value must have, if set
    target_length: Option<usize>,

    /// Sorted distinct elements of the current value with the array version
    /// they were computed at
    unique: Mutex<Option<(u64, Arc<[Scalar]>)>>,
}

impl SequenceCollectable {
    /// Create a sequence collectable holding `value`
    ///
    /// If `length` is set, `value` must have exactly that many elements.
    pub fn new(value: impl Into<Value>, length: Option<usize>) -> Result<Self> {
        let mut collectable = Self::empty(length);
        collectable.set_value(value)?;
        Ok(collectable)
    }

    /// Create a sequence collectable without a value
    pub fn empty(length: Option<usize>) -> Self {
        Self::init(Self::bare(length))
    }

    /// Promote a plain collectable, keeping its name, documentation and validator
    pub fn from_collectable(mut base: Collectable, length: Option<usize>) -> Result<Self> {
        let value = base.clear_value();
        let mut collectable = Self::init(Self::from_parts(base, length));
        if let Some(value) = value {
            collectable.set_value(value)?;
        }
        Ok(collectable)
    }

    /// Empty sequence with the default documentation, without tracing
    pub(crate) fn bare(length: Option<usize>) -> Self {
        Self::from_parts(Collectable::default().with_doc(DEFAULT_SEQUENCE_DOC), length)
    }

    pub(crate) fn from_parts(base: Collectable, target_length: Option<usize>) -> Self {
        Self {
            base,
            target_length,
            unique: Mutex::new(None),
        }
    }

    fn init(collectable: Self) -> Self {
        trace!(target: TRACE_TARGET, kind = "SequenceCollectable", length = ?collectable.target_length, "initialized new collectable");
        collectable
    }

    /// Set the name, consuming and returning the collectable
    pub fn with_name(mut self, name: &str) -> Result<Self> {
        self.set_name(name)?;
        Ok(self)
    }

    /// Set the documentation, consuming and returning the collectable
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.base.set_doc(Some(doc.into()));
        self
    }

    /// Attach a validator; the current value, if any, must pass it
    pub fn with_validator(self, validator: Validator) -> Result<Self> {
        let Self {
            base,
            target_length,
            unique,
        } = self;
        Ok(Self {
            base: base.with_validator(validator)?,
            target_length,
            unique,
        })
    }

    /// Name under which this collectable is known
    pub fn name(&self) -> Option<&str> {
        self.base.name()
    }

    /// Rename this collectable
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.base.set_name(name)
    }

    /// Documentation about the purpose of this collectable
    pub fn doc(&self) -> Option<&str> {
        self.base.doc()
    }

    /// Replace the documentation
    pub fn set_doc(&mut self, doc: Option<String>) {
        self.base.set_doc(doc);
    }

    /// The stored value
    pub fn value(&self) -> Option<&Value> {
        self.base.value()
    }

    /// Length of the stored value, `None` if unset
    pub fn len(&self) -> Option<usize> {
        self.base.value().and_then(Value::len)
    }

    /// Check if the stored value is unset or has no elements
    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    /// Length every assigned value must have, if set
    pub fn target_length(&self) -> Option<usize> {
        self.target_length
    }

    /// Change the length enforced on future assignments
    ///
    /// The currently stored value is not re-checked.
    pub fn set_length_check(&mut self, length: Option<usize>) {
        self.target_length = length;
    }

    /// Check `value` against the length constraint and the validator
    pub fn validate(&self, value: &Value) -> Result<()> {
        let got = value.len().ok_or_else(|| {
            Error::validation(self.name(), "only sequences are accepted as value")
        })?;
        if let Some(expected) = self.target_length {
            if got != expected {
                return Err(Error::LengthMismatch {
                    got,
                    expected,
                    name: self.name().map(str::to_owned),
                });
            }
        }
        self.base.validate(value)
    }

    /// Validate and store a new value, dropping the cached unique values
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.validate(&value)?;
        self.reset_unique();
        self.base.store(value);
        Ok(())
    }

    /// Remove the stored value
    pub fn clear_value(&mut self) -> Option<Value> {
        self.reset_unique();
        self.base.clear_value()
    }

    /// Sorted distinct elements of the stored value
    ///
    /// Computed on first access and cached until the next assignment or the
    /// next write to the stored array; repeated calls in between return the
    /// same allocation.
    pub fn unique(&self) -> Result<Option<Arc<[Scalar]>>> {
        let Some(value) = self.base.value() else {
            return Ok(None);
        };
        let version = value.as_array().map_or(0, Array::version);
        let mut cache = self.unique.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_version, cached)) = cache.as_ref() {
            if *cached_version == version {
                return Ok(Some(Arc::clone(cached)));
            }
        }
        let computed: Arc<[Scalar]> = value.unique_elements()?.into();
        trace!(target: TRACE_TARGET, name = ?self.name(), count = computed.len(), "computed unique values");
        *cache = Some((version, Arc::clone(&computed)));
        Ok(Some(computed))
    }

    fn reset_unique(&mut self) {
        *self.unique.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Underlying plain collectable
    pub fn as_collectable(&self) -> &Collectable {
        &self.base
    }

    /// Copy with a shallow copy of the value
    #[must_use]
    pub fn duplicate(&self) -> Self {
        self.copy_with(Value::shallow_copy)
    }

    /// Copy with fully independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.copy_with(Value::deep_copy)
    }

    pub(crate) fn copy_with(&self, copy: impl Fn(&Value) -> Value) -> Self {
        Self::from_parts(self.base.copy_with(copy), self.target_length)
    }

    pub(crate) fn into_collectable(self) -> Collectable {
        self.base
    }
}

impl fmt::Display for SequenceCollectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

impl fmt::Debug for SequenceCollectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCollectable")
            .field("name", &self.name())
            .field("doc", &self.doc())
            .field("value", &self.value())
            .field("length", &self.target_length)
            .finish()
    }
}
