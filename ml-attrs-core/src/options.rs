//! Configuration for building collections

use serde::{Deserialize, Serialize};

use crate::copy_mode::CopyMode;
use crate::error::{Error, Result};

/// Options for creating and seeding collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionOptions {
    /// Preset uniform length; adopted from the first member when unset
    pub length: Option<usize>,

    /// Copy depth used when seeding from a source
    pub copy_mode: CopyMode,
}

impl CollectionOptions {
    /// Parse options from JSON, e.g. `{"length": 10, "copy_mode": "deep"}`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}
