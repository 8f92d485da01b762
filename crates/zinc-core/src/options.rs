//! Configuration options for zinc-rs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for naming of managed objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Name given to the lazily created default scene filter.
    pub default_scenefilter_name: String,

    /// Prefix for auto-generated names of newly created objects.
    pub temporary_name_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_scenefilter_name: "default".to_string(),
            temporary_name_prefix: "temp".to_string(),
        }
    }
}

impl Options {
    /// Parses options from a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
