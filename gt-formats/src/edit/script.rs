//! Edit script documents (TOML or JSON)
//!
//! ```toml
//! [model]
//! delete = [3]
//!
//! [[model.edit]]
//! mesh = 0
//! vertices = [[0.0, 1.0, 2.0], [1.0, 1.0, 2.0]]
//!
//! [track.bounds]
//! action = "clear"
//!
//! [track.grid]
//! action = "replace"
//! data = [{ position = [0.0, 0.0, 0.0], rotation = 1.57 }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{EditScriptError, TrackEdits};
use crate::geometry::Vertex;

/// Root of an edit script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackEdits>,
}

/// `[model]` table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelScript {
    /// Mesh indices to hide
    #[serde(default)]
    pub delete: Vec<usize>,
    /// Vertex replacements
    #[serde(default, rename = "edit")]
    pub edits: Vec<MeshEdit>,
}

/// `[[model.edit]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEdit {
    pub mesh: usize,
    pub vertices: Vec<Vertex>,
}

impl EditScript {
    pub fn from_toml(toml_str: &str) -> Result<Self, EditScriptError> {
        toml::from_str(toml_str).map_err(|e| EditScriptError::Toml(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EditScriptError> {
        serde_json::from_str(json).map_err(|e| EditScriptError::Json(e.to_string()))
    }

    /// Load a script file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<Self, EditScriptError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EditScriptError::Io(e.to_string()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn to_toml(&self) -> Result<String, EditScriptError> {
        toml::to_string_pretty(self).map_err(|e| EditScriptError::Toml(e.to_string()))
    }
}
