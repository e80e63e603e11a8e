//! Named containers of attributes
//!
//! A [`Collection`] maps attribute names to [`Attribute`]s in insertion order.
//! Bare values are boxed on insert by the collection's [`Boxing`] marker and
//! every stored wrapper is renamed to its key, so `attribute.name()` always
//! matches the key it is stored under.
//!
//! Member values are read and written through [`AttributeMap::value`] and
//! [`AttributeMap::assign`]. Assignment goes through the existing wrapper, so
//! its validation and length checks apply. Collection state that is not a
//! member lives in ordinary struct fields with their own accessors.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use tracing::debug;

use crate::attribute::{Attribute, Entry};
use crate::boxing::{Boxing, DatasetScope, Generic, PlainBoxing};
use crate::collectable::{PRIVATE_PREFIX, TRACE_TARGET};
use crate::copy_mode::CopyMode;
use crate::error::{Error, Result};
use crate::value::Value;

/// Collection holding whole-dataset attributes, such as mappers
pub type DatasetAttributesCollection = Collection<DatasetScope>;

/// Source for [`AttributeMap::update`]
#[derive(Debug)]
pub enum UpdateSource {
    /// Named attributes, each stored under its own name
    Attributes(Vec<Attribute>),

    /// Bare values by name, each with optional documentation
    Values(IndexMap<String, (Value, Option<String>)>),
}

impl From<Vec<Attribute>> for UpdateSource {
    fn from(attributes: Vec<Attribute>) -> Self {
        UpdateSource::Attributes(attributes)
    }
}

impl From<IndexMap<String, (Value, Option<String>)>> for UpdateSource {
    fn from(values: IndexMap<String, (Value, Option<String>)>) -> Self {
        UpdateSource::Values(values)
    }
}

impl From<IndexMap<String, Value>> for UpdateSource {
    fn from(values: IndexMap<String, Value>) -> Self {
        UpdateSource::Values(values.into_iter().map(|(k, v)| (k, (v, None))).collect())
    }
}

impl<B: Boxing> From<Collection<B>> for UpdateSource {
    fn from(collection: Collection<B>) -> Self {
        UpdateSource::Attributes(collection.items.into_values().collect())
    }
}

impl TryFrom<Value> for UpdateSource {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Map(map) => Ok(map.into()),
            Value::Scalar(v) => Err(Error::UnsupportedSource(format!("scalar {v}"))),
            Value::List(_) => Err(Error::UnsupportedSource("list of values".into())),
            Value::Array(_) => Err(Error::UnsupportedSource("array".into())),
        }
    }
}

/// Mapping interface shared by all collection kinds
pub trait AttributeMap {
    /// Get the attribute stored under `key`
    fn get(&self, key: &str) -> Option<&Attribute>;

    /// Box `entry` as this collection requires and store it under `key`
    ///
    /// The stored wrapper is renamed to `key`. On failure the collection is
    /// left unchanged.
    fn set_item<E: Into<Entry>>(&mut self, key: &str, entry: E) -> Result<()>;

    /// Replace the documentation of the member `key`
    fn set_doc(&mut self, key: &str, doc: Option<String>) -> Result<()>;

    /// Assign a new value to the existing member `key`
    ///
    /// The member keeps its wrapper and validates the value itself. Names
    /// with the private prefix are never members and fail with
    /// [`Error::Naming`]; other unknown names fail with
    /// [`Error::MissingAttribute`].
    fn assign<V: Into<Value>>(&mut self, key: &str, value: V) -> Result<()>;

    /// Check if `key` is a member
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Value of the member `key`, unwrapped
    fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(Attribute::value)
    }

    /// Insert every attribute or value from `source`
    ///
    /// Attributes are stored under their own names; values under their keys,
    /// with documentation applied when given. `mode` selects how much of
    /// each item is copied first.
    fn update<S: Into<UpdateSource>>(&mut self, source: S, mode: CopyMode) -> Result<()> {
        match source.into() {
            UpdateSource::Attributes(attributes) => {
                for attribute in attributes {
                    let key = attribute.name().map(str::to_owned).ok_or_else(|| {
                        Error::Naming("attributes passed to update must be named".into())
                    })?;
                    self.set_item(&key, mode.apply_attribute(attribute))?;
                }
            }
            UpdateSource::Values(values) => {
                for (key, (value, doc)) in values {
                    self.set_item(&key, mode.apply_value(value))?;
                    if doc.is_some() {
                        self.set_doc(&key, doc)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Insertion-ordered container of attributes keyed by name
///
/// Only collections without a length constraint expose [`AttributeMap`]
/// directly. Uniform-length collections keep their members in a private
/// `Collection` and check every insert themselves.
pub struct Collection<B = Generic> {
    items: IndexMap<String, Attribute>,
    _boxing: PhantomData<B>,
}

impl<B: PlainBoxing> Collection<B> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::empty()
    }

    /// Create a collection seeded from `source`
    pub fn from_source(source: impl Into<UpdateSource>, mode: CopyMode) -> Result<Self> {
        let mut collection = Self::new();
        collection.update(source, mode)?;
        Ok(collection)
    }
}

impl<B: Boxing> Collection<B> {
    pub(crate) fn empty() -> Self {
        Self {
            items: IndexMap::new(),
            _boxing: PhantomData,
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection has no members
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Member names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Members in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Attribute> {
        self.items.values()
    }

    /// Names and members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove and return the member `key`, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        let removed = self.items.shift_remove(key);
        if removed.is_some() {
            debug!(target: TRACE_TARGET, collection = B::NAME, key, "removed attribute");
        }
        removed
    }

    /// Copy every member following its own duplication rule
    ///
    /// Array members in the copy share storage with this collection.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        self.copy_with(Attribute::duplicate)
    }

    /// Copy every member into independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.copy_with(Attribute::deep_copy)
    }

    fn copy_with(&self, copy: impl Fn(&Attribute) -> Attribute) -> Self {
        Self {
            items: self.items.iter().map(|(k, v)| (k.clone(), copy(v))).collect(),
            _boxing: PhantomData,
        }
    }

    /// Rename `attribute` to `key` and store it, replacing any previous member
    pub(crate) fn insert_boxed(&mut self, key: &str, mut attribute: Attribute) -> Result<()> {
        attribute.set_name(key)?;
        debug!(target: TRACE_TARGET, collection = B::NAME, key, "stored attribute");
        self.items.insert(key.to_owned(), attribute);
        Ok(())
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.items.values_mut()
    }

    pub(crate) fn member(&self, key: &str) -> Option<&Attribute> {
        self.items.get(key)
    }

    pub(crate) fn set_member_doc(&mut self, key: &str, doc: Option<String>) -> Result<()> {
        self.member_mut(key)?.set_doc(doc);
        Ok(())
    }

    pub(crate) fn assign_member(&mut self, key: &str, value: Value) -> Result<()> {
        self.member_mut(key)?.set_value(value)
    }

    fn member_mut(&mut self, key: &str) -> Result<&mut Attribute> {
        if key.starts_with(PRIVATE_PREFIX) {
            return Err(Error::Naming(format!(
                "'{key}' uses the private prefix and cannot be a member"
            )));
        }
        self.items
            .get_mut(key)
            .ok_or_else(|| Error::MissingAttribute(key.to_owned()))
    }
}

impl<B: PlainBoxing> AttributeMap for Collection<B> {
    fn get(&self, key: &str) -> Option<&Attribute> {
        self.member(key)
    }

    fn set_item<E: Into<Entry>>(&mut self, key: &str, entry: E) -> Result<()> {
        let attribute = B::box_entry(entry.into())?;
        self.insert_boxed(key, attribute)
    }

    fn set_doc(&mut self, key: &str, doc: Option<String>) -> Result<()> {
        self.set_member_doc(key, doc)
    }

    fn assign<V: Into<Value>>(&mut self, key: &str, value: V) -> Result<()> {
        self.assign_member(key, value.into())
    }
}

impl<B: PlainBoxing> Default for Collection<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, B> IntoIterator for &'a Collection<B> {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = indexmap::map::Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Render member names as `[a, b, c]`
pub(crate) fn fmt_names<'a>(
    f: &mut fmt::Formatter<'_>,
    names: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, name) in names.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(name)?;
    }
    f.write_str("]")
}

impl<B: PlainBoxing> fmt::Display for Collection<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(items=", B::NAME)?;
        fmt_names(f, self.keys())?;
        f.write_str(")")
    }
}

impl<B: Boxing> fmt::Debug for Collection<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(B::NAME).field("items", &self.items).finish()
    }
}
