//! Named, documented and validated attributes for ML datasets
//!
//! A dataset carries three kinds of attributes: per-sample values such as
//! targets or chunk ids, per-feature values such as voxel coordinates, and
//! whole-dataset values such as mappers. This crate provides the wrappers
//! that hold those values and the collections that group them.
//!
//! Wrappers come in three kinds of increasing strictness:
//! [`Collectable`] holds any value, [`SequenceCollectable`] requires a
//! sequence and can enforce its length, and [`ArrayCollectable`] stores the
//! sequence as a shared [`Array`]. Collections box bare values into the kind
//! they require, and [`UniformLengthCollection`]s keep every member at the
//! same length.
//!
//! ```
//! use ml_attrs_core::{AttributeMap, SampleAttributesCollection};
//!
//! let mut samples = SampleAttributesCollection::new();
//! samples.set_item("targets", vec![1, 2, 1, 2]).unwrap();
//! assert_eq!(samples.uniform_length(), Some(4));
//! assert!(samples.set_item("chunks", vec![0, 1]).is_err());
//! ```

#![warn(missing_docs)]

pub mod array;
pub mod array_collectable;
pub mod attribute;
pub mod boxing;
pub mod collectable;
pub mod collection;
pub mod copy_mode;
pub mod error;
pub mod options;
pub mod sequence;
pub mod uniform;
pub mod value;

// Re-export key types for convenience
pub use array::Array;
pub use array_collectable::{ArrayCollectable, Axis};
pub use attribute::{Attribute, Entry};
pub use boxing::{
    Boxing, DatasetScope, FeatureScope, Generic, PlainBoxing, SampleScope, SequenceScope, UniformBoxing,
};
pub use collectable::{Collectable, Validator, PRIVATE_PREFIX};
pub use collection::{AttributeMap, Collection, DatasetAttributesCollection, UpdateSource};
pub use copy_mode::CopyMode;
pub use error::{Error, Result};
pub use options::CollectionOptions;
pub use sequence::{SequenceCollectable, DEFAULT_SEQUENCE_DOC};
pub use uniform::{FeatureAttributesCollection, SampleAttributesCollection, UniformLengthCollection};
pub use value::{Scalar, Value};

static_assertions::assert_impl_all!(Array: Send, Sync);
static_assertions::assert_impl_all!(Attribute: Send, Sync);
static_assertions::assert_impl_all!(Collection: Send, Sync);
static_assertions::assert_impl_all!(SampleAttributesCollection: Send, Sync);
static_assertions::assert_impl_all!(Error: Send, Sync, Clone);
