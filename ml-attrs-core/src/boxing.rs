//! Per-collection factories turning inserted entries into stored attributes
//!
//! Every collection kind is parameterised by a [`Boxing`] marker. The marker
//! decides which wrapper kind a bare value becomes and whether a pre-built
//! wrapper has to be promoted to a stricter kind before it is stored.

use crate::array_collectable::{ArrayCollectable, Axis};
use crate::attribute::{Attribute, Entry};
use crate::collectable::Collectable;
use crate::error::Result;
use crate::sequence::SequenceCollectable;

/// Turns an [`Entry`] into the attribute kind a collection stores
pub trait Boxing: Send + Sync + 'static {
    /// Type name used when rendering the collection
    const NAME: &'static str;

    /// Box a bare value or promote a pre-built wrapper
    fn box_entry(entry: Entry) -> Result<Attribute>;
}

/// Boxing for collections whose members all carry a length
pub trait UniformBoxing: Boxing {}

/// Boxing for collections without a length constraint
pub trait PlainBoxing: Boxing {}

/// Plain collections: bare values become plain collectables
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

/// Whole-dataset attributes: boxed like [`Generic`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetScope;

/// Uniform-length collections: members are at least sequence collectables
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceScope;

/// Per-sample attributes: members are array collectables
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleScope;

/// Per-feature attributes: members are array collectables
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureScope;

fn box_plain(entry: Entry) -> Attribute {
    match entry {
        Entry::Raw(value) => Attribute::Plain(Collectable::new(value)),
        Entry::Boxed(attribute) => attribute,
    }
}

fn box_array(entry: Entry, axis: Axis) -> Result<Attribute> {
    match entry {
        Entry::Raw(value) => Ok(Attribute::Array(ArrayCollectable::with_axis(axis, value, None)?)),
        Entry::Boxed(attribute) => attribute.into_array(axis),
    }
}

impl Boxing for Generic {
    const NAME: &'static str = "Collection";

    fn box_entry(entry: Entry) -> Result<Attribute> {
        Ok(box_plain(entry))
    }
}

impl Boxing for DatasetScope {
    const NAME: &'static str = "DatasetAttributesCollection";

    fn box_entry(entry: Entry) -> Result<Attribute> {
        Ok(box_plain(entry))
    }
}

impl Boxing for SequenceScope {
    const NAME: &'static str = "UniformLengthCollection";

    fn box_entry(entry: Entry) -> Result<Attribute> {
        match entry {
            Entry::Raw(value) => Ok(Attribute::Sequence(SequenceCollectable::new(value, None)?)),
            Entry::Boxed(attribute) => attribute.into_sequence(),
        }
    }
}

impl Boxing for SampleScope {
    const NAME: &'static str = "SampleAttributesCollection";

    fn box_entry(entry: Entry) -> Result<Attribute> {
        box_array(entry, Axis::Sample)
    }
}

impl Boxing for FeatureScope {
    const NAME: &'static str = "FeatureAttributesCollection";

    fn box_entry(entry: Entry) -> Result<Attribute> {
        box_array(entry, Axis::Feature)
    }
}

impl PlainBoxing for Generic {}
impl PlainBoxing for DatasetScope {}

impl UniformBoxing for SequenceScope {}
impl UniformBoxing for SampleScope {}
impl UniformBoxing for FeatureScope {}
