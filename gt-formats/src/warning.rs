//! Recoverable decode/patch diagnostics
//!
//! Malformed records degrade to warnings instead of aborting, so batch
//! decoding of many damaged assets never stops on the first bad mesh.

use std::fmt;

/// A recoverable problem found while decoding or patching.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Declared model size disagrees with the blob length
    SizeMismatch { declared: i32, actual: usize },
    /// Mesh arrays left empty because a table could not be addressed
    MeshSkipped { mesh: usize, reason: String },
    /// At least one face triple referenced a vertex past the vertex count
    InvalidFaces { mesh: usize },
    /// Bounding box offset set but unreadable
    MissingBoundingBox { mesh: usize },
    /// Closing run length disagrees with the vertex count or the opening length
    BoundaryRunMismatch {
        submesh: usize,
        expected: usize,
        actual: usize,
        initial: i16,
    },
    /// Boundary table ended inside an open run
    UnterminatedBoundaryRun {
        submesh: usize,
        actual: usize,
        initial: i16,
    },
    /// Pit-unknown table ended before pit-box-count records were read
    PitUnknownsTruncated { read: usize, expected: usize },
    /// This runway generation stores surface types differently
    SurfaceTypeCaveat { version: u32 },
    /// First road face is not tarmac; surface types are likely off
    NonTarmacFirstFace { surface: u8 },
    /// Road face references a vertex past the road vertex pool
    RoadIndexOutOfRange { face: usize, index: u16 },
    /// Container slot offset lies outside the buffer
    SlotOutOfRange { slot: usize, offset: i64 },
    /// Model texture-set offset lies outside the blob
    TextureTableOutOfRange { offset: u32 },
    /// Replacement vertices cover only a prefix of the mesh
    PartialVertexEdit {
        mesh: usize,
        supplied: usize,
        capacity: usize,
    },
    /// A container sub-blob failed to decode and was skipped
    BlobDecodeFailed { slot: usize, reason: String },
    /// Raised while decoding the blob in a container slot
    InSlot { slot: usize, warning: Box<Warning> },
}

impl Warning {
    pub fn in_slot(slot: usize, warning: Warning) -> Self {
        Self::InSlot {
            slot,
            warning: Box::new(warning),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { declared, actual } => write!(
                f,
                "declared size {} does not match actual size {}",
                declared, actual
            ),
            Self::MeshSkipped { mesh, reason } => write!(f, "mesh {} skipped: {}", mesh, reason),
            Self::InvalidFaces { mesh } => write!(
                f,
                "mesh {} has invalid faces (tristrips not supported)",
                mesh
            ),
            Self::MissingBoundingBox { mesh } => {
                write!(f, "mesh {} bounding box is unreadable", mesh)
            }
            Self::BoundaryRunMismatch {
                submesh,
                expected,
                actual,
                initial,
            } => write!(
                f,
                "boundary submesh {} sizing is erroneous: expected {}, actual {}, initial {}",
                submesh, expected, actual, initial
            ),
            Self::UnterminatedBoundaryRun {
                submesh,
                actual,
                initial,
            } => write!(
                f,
                "boundary submesh {} is unterminated: actual {}, initial {}",
                submesh, actual, initial
            ),
            Self::PitUnknownsTruncated { read, expected } => write!(
                f,
                "pit unknowns truncated: read {} of {}",
                read, expected
            ),
            Self::SurfaceTypeCaveat { version } => write!(
                f,
                "runway version 0x{:08X} will have incorrect road surface types",
                version
            ),
            Self::NonTarmacFirstFace { surface } => write!(
                f,
                "non-tarmac first road face (surface {}): surface types may be incorrect",
                surface
            ),
            Self::RoadIndexOutOfRange { face, index } => {
                write!(f, "road face {} references missing vertex {}", face, index)
            }
            Self::SlotOutOfRange { slot, offset } => {
                write!(f, "slot {} offset 0x{:X} is outside the buffer", slot, offset)
            }
            Self::TextureTableOutOfRange { offset } => {
                write!(f, "texture table offset 0x{:X} is outside the model", offset)
            }
            Self::PartialVertexEdit {
                mesh,
                supplied,
                capacity,
            } => write!(
                f,
                "mesh {} edit supplies {} of {} vertices; the rest are unchanged",
                mesh, supplied, capacity
            ),
            Self::BlobDecodeFailed { slot, reason } => {
                write!(f, "slot {} failed to decode: {}", slot, reason)
            }
            Self::InSlot { slot, warning } => write!(f, "slot {}: {}", slot, warning),
        }
    }
}

/// A best-effort value plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }
}

/// Collects warnings and mirrors each one to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct WarningSink {
    warnings: Vec<Warning>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Append warnings a nested decoder has already logged
    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        self.warnings.extend(warnings);
    }

    pub fn finish<T>(self, value: T) -> Decoded<T> {
        Decoded::new(value, self.warnings)
    }
}
