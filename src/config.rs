//! Parser configuration.
//!
//! Everything has a default, so a JSON document only needs the keys it wants
//! to change.

use serde::{Deserialize, Serialize};

use crate::formats::drcov::lookup::LookupMode;
use crate::io::IOLimits;

/// Configuration for [`DrcovParser`](crate::formats::drcov::DrcovParser).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Limits applied when the log is read from a file.
    pub io: IOLimits,
    /// Matching used by name-based queries that do not take an explicit mode.
    pub lookup: LookupMode,
}

impl ParserConfig {
    /// Parse a configuration from JSON, filling missing keys with defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
