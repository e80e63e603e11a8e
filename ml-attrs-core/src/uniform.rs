//! Collections whose members all share one length
//!
//! The first member inserted into a [`UniformLengthCollection`] fixes the
//! uniform length unless one was configured up front. Every member is told
//! to check that length on its own future assignments.
//!
//! Changing the uniform length with
//! [`UniformLengthCollection::set_length_check`] only affects future writes.
//! Stored values are not re-checked, so members may hold values of the old
//! length until they are next assigned. Removing members never resets the
//! uniform length.

use std::fmt;

use tracing::debug;

use crate::attribute::{Attribute, Entry};
use crate::boxing::{FeatureScope, SampleScope, SequenceScope, UniformBoxing};
use crate::collectable::TRACE_TARGET;
use crate::collection::{fmt_names, AttributeMap, Collection, UpdateSource};
use crate::copy_mode::CopyMode;
use crate::error::{Error, Result};
use crate::options::CollectionOptions;
use crate::value::Value;

/// Per-sample attributes (targets, chunks, ...), stored as arrays
pub type SampleAttributesCollection = UniformLengthCollection<SampleScope>;

/// Per-feature attributes, stored as arrays
pub type FeatureAttributesCollection = UniformLengthCollection<FeatureScope>;

/// Collection of sequence attributes that all have the same length
pub struct UniformLengthCollection<B = SequenceScope> {
    /// Members, boxed by `B`
    members: Collection<B>,

    /// Length every member must have, once known
    uniform_length: Option<usize>,
}

impl<B: UniformBoxing> UniformLengthCollection<B> {
    /// Create an empty collection that adopts the length of its first member
    pub fn new() -> Self {
        Self::with_length(None)
    }

    /// Create an empty collection with a preset uniform length
    pub fn with_length(length: Option<usize>) -> Self {
        Self {
            members: Collection::empty(),
            uniform_length: length,
        }
    }

    /// Create an empty collection configured by `options`
    pub fn with_options(options: &CollectionOptions) -> Self {
        Self::with_length(options.length)
    }

    /// Create a collection seeded from `source`
    pub fn from_source(source: impl Into<UpdateSource>, mode: CopyMode) -> Result<Self> {
        let mut collection = Self::new();
        collection.update(source, mode)?;
        Ok(collection)
    }

    /// Create a collection configured by `options` and seeded from `source`
    pub fn from_source_with(
        source: impl Into<UpdateSource>,
        options: &CollectionOptions,
    ) -> Result<Self> {
        let mut collection = Self::with_options(options);
        collection.update(source, options.copy_mode)?;
        Ok(collection)
    }

    /// Length every member must have, once known
    pub fn uniform_length(&self) -> Option<usize> {
        self.uniform_length
    }

    /// Set the uniform length and pass it on to every member
    ///
    /// Members only check the new length on their next assignment.
    pub fn set_length_check(&mut self, length: Option<usize>) {
        debug!(target: TRACE_TARGET, collection = B::NAME, ?length, "propagating length check");
        self.uniform_length = length;
        for member in self.members.values_mut() {
            member.set_length_check(length);
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the collection has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys()
    }

    /// Members in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Attribute> {
        self.members.values()
    }

    /// Names and members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.members.iter()
    }

    /// Remove and return the member `key`; the uniform length stays
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        self.members.remove(key)
    }

    /// Copy every member following its own duplication rule
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            members: self.members.duplicate(),
            uniform_length: self.uniform_length,
        }
    }

    /// Copy every member into independent storage
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            members: self.members.deep_copy(),
            uniform_length: self.uniform_length,
        }
    }
}

impl<B: UniformBoxing> AttributeMap for UniformLengthCollection<B> {
    fn get(&self, key: &str) -> Option<&Attribute> {
        self.members.member(key)
    }

    fn set_item<E: Into<Entry>>(&mut self, key: &str, entry: E) -> Result<()> {
        let mut attribute = B::box_entry(entry.into())?;
        let got = attribute
            .len()
            .ok_or_else(|| Error::validation(Some(key), "uniform-length members need a value"))?;
        let length = match self.uniform_length {
            Some(expected) if got != expected => {
                return Err(Error::LengthMismatch {
                    got,
                    expected,
                    name: Some(key.to_owned()),
                });
            }
            Some(expected) => expected,
            None => got,
        };
        attribute.set_length_check(Some(length));
        self.members.insert_boxed(key, attribute)?;
        if self.uniform_length.is_none() {
            debug!(target: TRACE_TARGET, collection = B::NAME, key, length, "adopted uniform length");
            self.uniform_length = Some(length);
        }
        Ok(())
    }

    fn set_doc(&mut self, key: &str, doc: Option<String>) -> Result<()> {
        self.members.set_member_doc(key, doc)
    }

    fn assign<V: Into<Value>>(&mut self, key: &str, value: V) -> Result<()> {
        self.members.assign_member(key, value.into())
    }
}

impl<B: UniformBoxing> From<UniformLengthCollection<B>> for UpdateSource {
    fn from(collection: UniformLengthCollection<B>) -> Self {
        collection.members.into()
    }
}

impl<B: UniformBoxing> Default for UniformLengthCollection<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: UniformBoxing> fmt::Display for UniformLengthCollection<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(items=", B::NAME)?;
        fmt_names(f, self.keys())?;
        write!(f, ", length={:?})", self.uniform_length)
    }
}

impl<B: UniformBoxing> fmt::Debug for UniformLengthCollection<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(B::NAME)
            .field("items", &self.members)
            .field("length", &self.uniform_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Array;
    use crate::array_collectable::{ArrayCollectable, Axis};
    use crate::collectable::Collectable;
    use crate::sequence::SequenceCollectable;
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_first_member_sets_length() {
        init_tracing();
        let mut collection: UniformLengthCollection = UniformLengthCollection::new();
        collection.set_item("targets", vec![1, 2, 1, 2, 3]).unwrap();

        assert_eq!(collection.uniform_length(), Some(5));
        assert_eq!(collection.get("targets").unwrap().target_length(), Some(5));
        assert!(matches!(collection.get("targets"), Some(Attribute::Sequence(_))));
    }

    #[test]
    fn test_mismatched_member_is_not_added() {
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("targets", vec![1, 2, 1, 2, 3]).unwrap();

        let err = collection.set_item("chunks", vec![0, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                got: 3,
                expected: 5,
                name: Some("chunks".into())
            }
        );
        assert_eq!(collection.keys().collect::<Vec<_>>(), ["targets"]);
        assert_eq!(collection.uniform_length(), Some(5));
    }

    #[test]
    fn test_rejected_first_member_does_not_fix_length() {
        let mut collection = FeatureAttributesCollection::new();
        assert!(collection.set_item("_roi", vec![1, 2]).is_err());
        assert_eq!(collection.uniform_length(), None);

        collection.set_item("roi", vec![1, 2, 3]).unwrap();
        assert_eq!(collection.uniform_length(), Some(3));
    }

    #[test]
    fn test_members_enforce_length_on_assignment() {
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("chunks", vec![0, 0, 1, 1]).unwrap();

        assert!(matches!(
            collection.assign("chunks", vec![0, 1]),
            Err(Error::LengthMismatch { got: 2, expected: 4, .. })
        ));
        collection.assign("chunks", vec![2, 2, 3, 3]).unwrap();
        assert_eq!(
            collection.value("chunks").unwrap().as_array().unwrap().to_vec(),
            Array::from_iter([2, 2, 3, 3]).to_vec()
        );
    }

    #[test]
    fn test_sample_collection_boxes_arrays() {
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("targets", vec!["a", "b"]).unwrap();
        collection
            .set_item("chunks", SequenceCollectable::new(vec![1, 2], None).unwrap())
            .unwrap();
        collection
            .set_item("weights", Collectable::new(vec![0.5, 0.5]).with_doc("weights"))
            .unwrap();

        for attribute in collection.values() {
            let array = attribute.as_array().unwrap();
            assert_eq!(array.axis(), Axis::Sample);
            assert_eq!(array.target_length(), Some(2));
        }
        assert_eq!(collection.get("weights").unwrap().doc(), Some("weights"));
    }

    #[test]
    fn test_existing_array_keeps_its_axis() {
        let mut collection = SampleAttributesCollection::new();
        collection
            .set_item("generic", ArrayCollectable::new(vec![1, 2], None).unwrap())
            .unwrap();
        let array = collection.get("generic").unwrap().as_array().unwrap();
        assert_eq!(array.axis(), Axis::Unspecified);
    }

    #[test]
    fn test_scalar_is_rejected() {
        let mut collection: UniformLengthCollection = UniformLengthCollection::new();
        assert!(matches!(
            collection.set_item("x", Value::from(4)),
            Err(Error::Validation { .. })
        ));
        let mut samples = SampleAttributesCollection::new();
        assert!(matches!(
            samples.set_item("x", Value::from(4)),
            Err(Error::Coercion(_))
        ));
    }

    #[test]
    fn test_empty_wrapper_is_rejected() {
        let mut collection: UniformLengthCollection = UniformLengthCollection::new();
        let err = collection
            .set_item("pending", SequenceCollectable::empty(None))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_length_persists_after_removal() {
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("targets", vec![1, 2, 3]).unwrap();
        assert!(collection.remove("targets").is_some());

        assert!(collection.is_empty());
        assert_eq!(collection.uniform_length(), Some(3));
        assert!(collection.set_item("chunks", vec![1, 2]).is_err());
        collection.set_item("chunks", vec![1, 2, 3]).unwrap();
    }

    #[test]
    fn test_length_check_ratchets_on_future_writes() {
        init_tracing();
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("targets", vec![1, 2, 3]).unwrap();
        collection.set_length_check(Some(4));

        // stored value keeps its old length until reassigned
        assert_eq!(collection.get("targets").unwrap().len(), Some(3));
        assert_eq!(collection.get("targets").unwrap().target_length(), Some(4));
        assert!(collection.assign("targets", vec![1, 2, 3]).is_err());
        collection.assign("targets", vec![1, 2, 3, 4]).unwrap();
        assert!(collection.set_item("chunks", vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_clearing_length_check_adopts_next_member() {
        let mut collection = FeatureAttributesCollection::new();
        collection.set_item("roi", vec![1, 2]).unwrap();
        collection.set_length_check(None);
        collection.remove("roi");

        collection.set_item("voxel", vec![1, 2, 3, 4]).unwrap();
        assert_eq!(collection.uniform_length(), Some(4));
    }

    #[test]
    fn test_preset_length_from_options() {
        let options: CollectionOptions = serde_json::from_str(r#"{"length": 2}"#).unwrap();
        let mut collection = SampleAttributesCollection::with_options(&options);
        assert!(collection.set_item("targets", vec![1, 2, 3]).is_err());
        collection.set_item("targets", vec![1, 2]).unwrap();
    }

    #[test]
    fn test_seed_from_source_with_shallow_copy() {
        let labels = Array::from_iter([1, 1, 2]);
        let source: IndexMap<String, (Value, Option<String>)> = IndexMap::from([
            ("targets".to_owned(), (Value::Array(labels.view()), Some("labels".to_owned()))),
            ("chunks".to_owned(), (Value::from(vec![0, 1, 2]), None)),
        ]);
        let options = CollectionOptions {
            copy_mode: CopyMode::Shallow,
            ..Default::default()
        };
        let collection = SampleAttributesCollection::from_source_with(source, &options).unwrap();

        let stored = collection.value("targets").unwrap().as_array().unwrap();
        assert!(!stored.shares_storage(&labels));
        assert_eq!(collection.get("targets").unwrap().doc(), Some("labels"));
        assert_eq!(collection.uniform_length(), Some(3));
    }

    #[test]
    fn test_update_from_other_collection_shares_views() {
        let mut source = SampleAttributesCollection::new();
        source.set_item("targets", vec![1, 2]).unwrap();
        let original = source.value("targets").unwrap().as_array().unwrap().clone();

        let mut target = SampleAttributesCollection::new();
        target.update(source.duplicate(), CopyMode::Shallow).unwrap();

        let stored = target.value("targets").unwrap().as_array().unwrap();
        assert!(stored.shares_storage(&original));
        assert_eq!(target.uniform_length(), Some(2));
    }

    #[test]
    fn test_copied_members_still_checked_against_uniform_length() {
        let mut samples = SampleAttributesCollection::new();
        samples.set_item("targets", vec![1, 2, 3]).unwrap();

        let mut copy = samples.duplicate();
        let err = copy.set_item("chunks", vec![0, 1]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { got: 2, expected: 3, .. }));
        assert_eq!(copy.keys().collect::<Vec<_>>(), ["targets"]);

        let mut shorter = SampleAttributesCollection::with_length(Some(2));
        assert!(shorter.update(samples, CopyMode::Reference).is_err());
        assert!(shorter.is_empty());
    }

    #[test]
    fn test_stale_member_length_check_does_not_block_promotion() {
        let mut sequences: UniformLengthCollection = UniformLengthCollection::new();
        sequences.set_item("targets", vec![1, 2, 3]).unwrap();
        sequences.set_length_check(Some(4));

        let mut samples = SampleAttributesCollection::with_length(Some(3));
        samples.update(sequences.duplicate(), CopyMode::Reference).unwrap();

        let targets = samples.get("targets").unwrap();
        assert_eq!(targets.as_array().unwrap().axis(), Axis::Sample);
        assert_eq!(targets.len(), Some(3));
        assert_eq!(targets.target_length(), Some(3));
    }

    #[test]
    fn test_display() {
        let mut collection = SampleAttributesCollection::new();
        collection.set_item("targets", vec![1, 2]).unwrap();
        collection.set_item("chunks", vec![0, 0]).unwrap();
        assert_eq!(
            collection.to_string(),
            "SampleAttributesCollection(items=[targets, chunks], length=Some(2))"
        );
    }

    proptest! {
        #[test]
        fn prop_only_matching_lengths_join(lengths in prop::collection::vec(0usize..6, 1..12)) {
            let mut collection = SampleAttributesCollection::new();
            let expected = lengths[0];

            for (i, len) in lengths.iter().enumerate() {
                let key = format!("attr{i}");
                let result = collection.set_item(&key, vec![0i64; *len]);
                prop_assert_eq!(result.is_ok(), *len == expected);
                prop_assert_eq!(collection.contains(&key), *len == expected);
            }
            prop_assert_eq!(collection.uniform_length(), Some(expected));
            for attribute in collection.values() {
                prop_assert_eq!(attribute.len(), Some(expected));
            }
        }
    }
}
