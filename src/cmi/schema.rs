//! SCORM schema versions and their array index notation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The SCORM data-model version a package declares.
///
/// Both versions store element paths with plain dotted indices
/// (`cmi.interactions.0.id`). They differ in how an index is written when the
/// data model is handed to the client runtime:
///
/// - SCORM 1.2 fuses the index onto the array name: `cmi.interactions_0.id`
/// - SCORM 2004 uses an `N`-prefixed segment: `cmi.interactions.N0.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "scorm_12", alias = "SCORM_1.2", alias = "SCORM_12")]
    Scorm12,
    #[default]
    #[serde(
        rename = "scorm_2004",
        alias = "SCORM_1.3",
        alias = "SCORM_13",
        alias = "SCORM_2004"
    )]
    Scorm2004,
}

impl SchemaVersion {
    /// Separator placed between an array name and its index.
    pub fn separator(self) -> char {
        match self {
            SchemaVersion::Scorm12 => '_',
            SchemaVersion::Scorm2004 => '.',
        }
    }

    /// Render `name` followed by `index` in this schema's notation.
    ///
    /// `indexed("cmi.interactions", 3)` yields `cmi.interactions_3` for 1.2
    /// and `cmi.interactions.N3` for 2004.
    pub fn indexed(self, name: &str, index: u32) -> String {
        let marker = match self {
            SchemaVersion::Scorm12 => "",
            SchemaVersion::Scorm2004 => "N",
        };
        format!("{name}{}{marker}{index}", self.separator())
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Scorm12 => write!(f, "SCORM_1.2"),
            SchemaVersion::Scorm2004 => write!(f, "SCORM_2004"),
        }
    }
}

/// Error returned when a schema version string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SCORM schema version '{0}'")]
pub struct ParseSchemaError(pub String);

impl FromStr for SchemaVersion {
    type Err = ParseSchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['.', '-', ' '], "_");
        match normalized.as_str() {
            "SCORM_1_2" | "SCORM_12" | "SCORM12" => Ok(SchemaVersion::Scorm12),
            "SCORM_1_3" | "SCORM_13" | "SCORM13" | "SCORM_2004" | "SCORM2004" => {
                Ok(SchemaVersion::Scorm2004)
            }
            _ => Err(ParseSchemaError(s.to_string())),
        }
    }
}
