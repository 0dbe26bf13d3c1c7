//! Decoder configuration (`gt-formats.toml`)
//!
//! Bounds for count-driven loops and container decoding behavior.
//! Every field has a default, so an empty document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecodeConfig {
    /// Guards applied to counts and strings read from file data
    #[serde(default)]
    pub limits: Limits,
    /// Container decoding settings
    #[serde(default)]
    pub container: ContainerConfig,
}

/// Upper bounds for values taken from the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Largest table count any loop will honor (default: 65536)
    #[serde(default = "default_max_table_entries")]
    pub max_table_entries: u32,
    /// Longest null-terminated string that will be read (default: 4096)
    #[serde(default = "default_max_string_len")]
    pub max_string_len: usize,
}

/// Container decoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Decode model sub-blobs on the rayon pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_max_table_entries() -> u32 {
    65_536
}
fn default_max_string_len() -> usize {
    4096
}
fn default_true() -> bool {
    true
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_table_entries: default_max_table_entries(),
            max_string_len: default_max_string_len(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            parallel: default_true(),
        }
    }
}

impl Limits {
    /// Whether a count read from the file is within the configured bound.
    pub fn allows(&self, count: u32) -> bool {
        count <= self.max_table_entries
    }
}

impl DecodeConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a config file.
    ///
    /// Returns default values if the file doesn't exist or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }
}
