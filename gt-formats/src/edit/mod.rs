//! Edit commands
//!
//! [`ModelEdits`] and [`TrackEdits`] are what the patch engine consumes.
//! They are usually produced from an [`EditScript`] compiled against the
//! decoded asset, which checks that every referenced mesh or record exists.

mod compile;
mod script;

pub use script::{EditScript, MeshEdit, ModelScript};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Face, Vertex, VertexRot};
use crate::track::{Checkpoint, RoadSurface};

/// Edit script errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditScriptError {
    #[error("TOML error: {0}")]
    Toml(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("mesh {mesh} does not exist (model has {count} meshes)")]
    UnknownMesh { mesh: usize, count: usize },
    #[error("mesh {0} is listed more than once")]
    DuplicateMesh(usize),
    #[error("mesh {0} has no vertex array to edit")]
    MeshWithoutVertices(usize),
    #[error("{category}: expected {expected} entries, got {actual}")]
    CountMismatch {
        category: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{category} does not support {action}")]
    UnsupportedEdit {
        category: &'static str,
        action: &'static str,
    },
}

/// Model edits: per-mesh vertex replacements and hidden meshes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelEdits {
    pub vertex_edits: BTreeMap<usize, Vec<Vertex>>,
    pub deleted: BTreeSet<usize>,
}

impl ModelEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_edits.is_empty() && self.deleted.is_empty()
    }

    pub fn replace_vertices(mut self, mesh: usize, vertices: Vec<Vertex>) -> Self {
        self.vertex_edits.insert(mesh, vertices);
        self
    }

    pub fn delete(mut self, mesh: usize) -> Self {
        self.deleted.insert(mesh);
        self
    }

    /// Every mesh index this edit set touches.
    pub fn touched_meshes(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertex_edits
            .keys()
            .chain(self.deleted.iter())
            .copied()
    }
}

/// What to do with one track category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum CategoryEdit<T> {
    #[default]
    Unchanged,
    /// Overwrite the existing records in place
    Replace(T),
    /// Neutralize the category without resizing anything
    Clear,
}

impl<T> CategoryEdit<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Replacement track bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vertex,
    pub max: Vertex,
}

/// Replacement road mesh. Accepted by scripts but never applied, since
/// the road tables cannot change shape in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoadMesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub surfaces: Vec<RoadSurface>,
}

/// Track edits, one independent action per category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackEdits {
    pub bounds: CategoryEdit<Bounds>,
    pub grid: CategoryEdit<Vec<VertexRot>>,
    pub pit_boxes: CategoryEdit<Vec<VertexRot>>,
    pub pit_unknowns: CategoryEdit<Vec<VertexRot>>,
    pub checkpoints: CategoryEdit<Vec<Checkpoint>>,
    pub checkpoint_list: CategoryEdit<Vec<u16>>,
    pub cut_track: CategoryEdit<Vec<Vertex>>,
    pub road: CategoryEdit<RoadMesh>,
    /// Replacement is one vertex list per boundary run
    pub boundaries: CategoryEdit<Vec<Vec<Vertex>>>,
    pub boundary_list: CategoryEdit<Vec<u16>>,
}

impl TrackEdits {
    pub fn is_empty(&self) -> bool {
        self.bounds.is_unchanged()
            && self.grid.is_unchanged()
            && self.pit_boxes.is_unchanged()
            && self.pit_unknowns.is_unchanged()
            && self.checkpoints.is_unchanged()
            && self.checkpoint_list.is_unchanged()
            && self.cut_track.is_unchanged()
            && self.road.is_unchanged()
            && self.boundaries.is_unchanged()
            && self.boundary_list.is_unchanged()
    }
}
