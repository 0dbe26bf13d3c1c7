//! gt-formats: decoder and in-place patcher for racing game asset formats
//!
//! This crate reads and patches three binary formats of a racing game engine:
//!
//! - **PACB** packs: a table of contents plus a 64-slot offset table whose
//!   slot positions classify each blob (model, track model, texture)
//! - **MDL3** models: FVF, mesh-info and mesh tables pointing at vertex,
//!   face and bounding box arrays
//! - **Runways** (`5WNR`): track geometry such as the starting grid,
//!   checkpoints, the road mesh and boundary polylines
//!
//! Decoders are read-only and never panic on corrupted offsets. Header-level
//! problems are [`FormatError`]s; per-record problems degrade to a partial
//! value plus [`Warning`]s in a [`Decoded`].
//!
//! Patches never resize or move anything: they overwrite existing fields,
//! hide meshes, or neutralize track categories with sentinel data.
//!
//! # Usage
//!
//! ```ignore
//! use gt_formats::{EditScript, Model, patch};
//!
//! let mut bytes = std::fs::read("car.mdl3")?;
//! let model = Model::decode(&bytes)?.value;
//! let script = EditScript::from_file("edits.toml".as_ref())?;
//! let edits = script.compile_model(&model)?;
//! let result = patch::apply_model_edits(&mut bytes, 0, &edits)?;
//! for warning in &result.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

pub mod config;
pub mod container;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod io;
pub mod model;
pub mod patch;
pub mod track;
pub mod warning;

#[cfg(test)]
mod testutil;

pub use config::{ContainerConfig, DecodeConfig, Limits};
pub use container::{Blob, Container, Pack, SlotKind, TocEntry};
pub use edit::{CategoryEdit, EditScript, EditScriptError, ModelEdits, TrackEdits};
pub use error::{FormatError, Result};
pub use geometry::{Face, Vertex, VertexRot};
pub use io::{Endian, OffsetReader, OffsetWriter};
pub use model::{Mesh, Model};
pub use patch::{apply_model_edits, apply_pack_model_edits, apply_track_edits};
pub use track::{RoadSurface, TrackGeometry, TrackVersion};
pub use warning::{Decoded, Warning};
