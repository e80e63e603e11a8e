//! Named, documented value holders
//!
//! A [`Collectable`] is the element type of every collection: a single value
//! plus the name it is known by and a piece of documentation. Assignments go
//! through an optional [`Validator`] so callers can attach their own checks.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::value::Value;

/// Attribute names must not start with this character
pub const PRIVATE_PREFIX: char = '_';

/// Target used for attribute trace events
pub(crate) const TRACE_TARGET: &str = "COL";

/// Validation hook run on every assignment
///
/// Returning `Err(reason)` rejects the value; the stored value is left
/// untouched.
pub type Validator = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// Check that `name` may be used as an attribute name
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Naming("attribute name must not be empty".into()));
    }
    if name.starts_with(PRIVATE_PREFIX) {
        return Err(Error::Naming(format!(
            "attribute name must not start with '{PRIVATE_PREFIX}', got '{name}'"
        )));
    }
    Ok(())
}

/// A named single value container with pluggable validation
#[derive(Default)]
pub struct Collectable {
    name: Option<String>,
    doc: Option<String>,
    value: Option<Value>,
    validator: Option<Validator>,
}

impl Collectable {
    /// Create a collectable holding `value`
    pub fn new(value: impl Into<Value>) -> Self {
        let collectable = Self {
            value: Some(value.into()),
            ..Self::default()
        };
        trace!(target: TRACE_TARGET, kind = "Collectable", value = ?collectable.value, "initialized new collectable");
        collectable
    }

    /// Create a collectable without a value
    pub fn empty() -> Self {
        trace!(target: TRACE_TARGET, kind = "Collectable", "initialized new collectable");
        Self::default()
    }

    /// Set the name, consuming and returning the collectable
    pub fn with_name(mut self, name: &str) -> Result<Self> {
        self.set_name(name)?;
        Ok(self)
    }

    /// Set the documentation, consuming and returning the collectable
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Attach a validator
    ///
    /// The current value, if any, must pass it.
    pub fn with_validator(mut self, validator: Validator) -> Result<Self> {
        if let Some(value) = &self.value {
            validator(value).map_err(|reason| Error::validation(self.name(), reason))?;
        }
        self.validator = Some(validator);
        Ok(self)
    }

    /// Name under which this collectable is known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rename this collectable
    ///
    /// Collections overwrite the name with their key on insertion.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.name = Some(name.to_owned());
        Ok(())
    }

    /// Drop the name
    pub fn clear_name(&mut self) {
        self.name = None;
    }

    /// Documentation about the purpose of this collectable
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Replace the documentation
    pub fn set_doc(&mut self, doc: Option<String>) {
        self.doc = doc;
    }

    /// The stored value
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Run the validator against `value` without storing it
    pub fn validate(&self, value: &Value) -> Result<()> {
        match &self.validator {
            Some(validator) => {
                validator(value).map_err(|reason| Error::validation(self.name(), reason))
            }
            None => Ok(()),
        }
    }

    /// Validate and store a new value
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.validate(&value)?;
        self.store(value);
        Ok(())
    }

    /// Store a value that has already been validated
    pub(crate) fn store(&mut self, value: Value) {
        trace!(target: TRACE_TARGET, name = ?self.name, value = ?value, "setting collectable value");
        self.value = Some(value);
    }

    /// Remove the stored value
    pub fn clear_value(&mut self) -> Option<Value> {
        self.value.take()
    }

    /// Copy with the same name and documentation and a shallow copy of the value
    #[must_use]
    pub fn duplicate(&self) -> Self {
        self.copy_with(Value::shallow_copy)
    }

    /// Copy with the same name and documentation and fully independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.copy_with(Value::deep_copy)
    }

    pub(crate) fn copy_with(&self, copy: impl Fn(&Value) -> Value) -> Self {
        Self {
            name: self.name.clone(),
            doc: self.doc.clone(),
            value: self.value.as_ref().map(copy),
            validator: self.validator.clone(),
        }
    }
}

impl fmt::Display for Collectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("None"))
    }
}

impl fmt::Debug for Collectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collectable")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("_private" ; "private prefix")]
    #[test_case("__dunder" ; "double prefix")]
    #[test_case("" ; "empty")]
    fn test_invalid_names_are_rejected(name: &str) {
        let mut collectable = Collectable::new(1);
        assert!(matches!(collectable.set_name(name), Err(Error::Naming(_))));
        assert_eq!(collectable.name(), None);
    }

    #[test]
    fn test_rename_keeps_value() {
        let mut collectable = Collectable::new("mapper").with_name("first").unwrap();
        collectable.set_name("second").unwrap();
        assert_eq!(collectable.name(), Some("second"));
        assert_eq!(collectable.value(), Some(&Value::from("mapper")));
        assert_eq!(collectable.to_string(), "second");
    }

    #[test]
    fn test_validator_rejects_and_keeps_previous_value() {
        let positive: Validator = Arc::new(|value: &Value| match value.as_scalar() {
            Some(crate::Scalar::Int(v)) if *v > 0 => Ok(()),
            _ => Err("expected a positive integer".to_string()),
        });
        let mut collectable = Collectable::new(4)
            .with_name("count")
            .unwrap()
            .with_validator(positive)
            .unwrap();

        let err = collectable.set_value(-1).unwrap_err();
        assert_eq!(
            err,
            Error::Validation {
                name: Some("count".into()),
                reason: "expected a positive integer".into()
            }
        );
        assert_eq!(collectable.value(), Some(&Value::from(4)));

        collectable.set_value(9).unwrap();
        assert_eq!(collectable.value(), Some(&Value::from(9)));
    }

    #[test]
    fn test_validator_checks_existing_value() {
        let reject_all: Validator = Arc::new(|_: &Value| Err("never".to_string()));
        assert!(Collectable::new(1).with_validator(reject_all.clone()).is_err());
        assert!(Collectable::empty().with_validator(reject_all).is_ok());
    }

    #[test]
    fn test_duplicate_copies_array_storage() {
        let array = crate::Array::from_iter([1, 2]);
        let collectable = Collectable::new(array.view())
            .with_name("weights")
            .unwrap()
            .with_doc("per-trial weights");

        let copy = collectable.duplicate();
        assert_eq!(copy.name(), Some("weights"));
        assert_eq!(copy.doc(), Some("per-trial weights"));
        assert_eq!(copy.value(), collectable.value());
        assert!(!copy.value().unwrap().as_array().unwrap().shares_storage(&array));
    }
}
