//! Copy depth for bulk updates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::error::{Error, Result};
use crate::value::Value;

/// How values are copied when a collection takes them over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// Store what was given, aliasing any array storage
    #[default]
    #[serde(rename = "none")]
    Reference,

    /// Store a shallow copy
    Shallow,

    /// Store a fully independent copy
    Deep,
}

impl CopyMode {
    /// Apply this copy depth to a bare value
    pub fn apply_value(self, value: Value) -> Value {
        match self {
            CopyMode::Reference => value,
            CopyMode::Shallow => value.shallow_copy(),
            CopyMode::Deep => value.deep_copy(),
        }
    }

    /// Apply this copy depth to a wrapper
    ///
    /// A shallow copy follows the wrapper's own duplication rule, so array
    /// attributes come back as views.
    pub fn apply_attribute(self, attribute: Attribute) -> Attribute {
        match self {
            CopyMode::Reference => attribute,
            CopyMode::Shallow => attribute.duplicate(),
            CopyMode::Deep => attribute.deep_copy(),
        }
    }
}

impl FromStr for CopyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(CopyMode::Reference),
            "shallow" => Ok(CopyMode::Shallow),
            "deep" => Ok(CopyMode::Deep),
            other => Err(Error::InvalidCopyMode(other.to_owned())),
        }
    }
}

impl fmt::Display for CopyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CopyMode::Reference => "none",
            CopyMode::Shallow => "shallow",
            CopyMode::Deep => "deep",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("none", CopyMode::Reference)]
    #[test_case("shallow", CopyMode::Shallow)]
    #[test_case("deep", CopyMode::Deep)]
    fn test_parse_and_display(token: &str, mode: CopyMode) {
        assert_eq!(token.parse::<CopyMode>().unwrap(), mode);
        assert_eq!(mode.to_string(), token);
    }

    #[test_case("Deep" ; "wrong case")]
    #[test_case("copy" ; "unknown word")]
    #[test_case("" ; "empty")]
    fn test_unknown_tokens_are_rejected(token: &str) {
        assert_eq!(
            token.parse::<CopyMode>(),
            Err(Error::InvalidCopyMode(token.to_owned()))
        );
    }

    #[test]
    fn test_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&CopyMode::Reference).unwrap(), "\"none\"");
        let mode: CopyMode = serde_json::from_str("\"shallow\"").unwrap();
        assert_eq!(mode, CopyMode::Shallow);
    }
}
