//! Flat arrays with reference-counted, shareable storage
//!
//! An [`Array`] plays the role of a numeric buffer: cloning it or calling
//! [`Array::view`] yields a second handle onto the same storage, so writes
//! through one handle are visible through the other. [`Array::deep_copy`]
//! allocates independent storage.
//!
//! Storage counts the writes made through any handle, so caches derived from
//! an array can tell when they are stale.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::value::{Scalar, Value};

#[derive(Default)]
struct Storage {
    values: Vec<Scalar>,

    /// Bumped on every write
    version: u64,
}

/// A flat array of scalars with shareable storage
#[derive(Clone, Default)]
pub struct Array {
    /// Backing storage, shared between views
    data: Arc<RwLock<Storage>>,
}

impl Array {
    /// Create an array owning the given elements
    pub fn from_vec(values: Vec<Scalar>) -> Self {
        Self {
            data: Arc::new(RwLock::new(Storage { values, version: 0 })),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.read().values.len()
    }

    /// Check if the array has no elements
    pub fn is_empty(&self) -> bool {
        self.read().values.is_empty()
    }

    /// Get a copy of the element at `index`
    pub fn get(&self, index: usize) -> Option<Scalar> {
        self.read().values.get(index).cloned()
    }

    /// Overwrite the element at `index`
    ///
    /// The write goes to the shared storage and is seen by every view.
    pub fn set(&self, index: usize, value: impl Into<Scalar>) -> Result<()> {
        let mut storage = self.write();
        let len = storage.values.len();
        let slot = storage
            .values
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        *slot = value.into();
        storage.version = storage.version.wrapping_add(1);
        Ok(())
    }

    /// Copy the elements out into a vector
    pub fn to_vec(&self) -> Vec<Scalar> {
        self.read().values.clone()
    }

    /// Number of writes made to the storage through any handle
    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Create a new handle sharing this array's storage
    #[must_use]
    pub fn view(&self) -> Self {
        self.clone()
    }

    /// Create an array with independent storage holding the same elements
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self::from_vec(self.to_vec())
    }

    /// Check if both handles refer to the same storage
    pub fn shares_storage(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Sorted distinct elements
    pub fn unique(&self) -> Vec<Scalar> {
        unique(&self.read().values)
    }

    fn read(&self) -> RwLockReadGuard<'_, Storage> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Storage> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage(other) || self.read().values == other.read().values
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Array").field(&self.read().values).finish()
    }
}

impl<T: Into<Scalar>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().map(Into::into).collect())
    }
}

/// Sorted, deduplicated copy of `values`
pub fn unique(values: &[Scalar]) -> Vec<Scalar> {
    let mut distinct = values.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}

/// Coerce a sequence-like value into an array
///
/// Arrays come back as a view of the same storage. Lists of scalars are
/// materialised into a new array. Everything else is rejected.
pub fn as_array(value: &Value) -> Result<Array> {
    match value {
        Value::Array(array) => Ok(array.view()),
        Value::List(items) => items
            .iter()
            .map(|item| {
                item.as_scalar().cloned().ok_or_else(|| {
                    Error::Coercion("lists must hold scalars to become arrays".into())
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Array::from_vec),
        Value::Scalar(v) => Err(Error::Coercion(format!(
            "expected an array or a sequence, got scalar {v}"
        ))),
        Value::Map(_) => Err(Error::Coercion(
            "expected an array or a sequence, got a map".into(),
        )),
    }
}
