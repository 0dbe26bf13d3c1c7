//! Error types for decoding and patching

use thiserror::Error;

/// Fatal errors raised while decoding or patching a format unit.
///
/// Per-record problems never surface here; they are reported as
/// [`Warning`](crate::Warning)s alongside a best-effort value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The 4-byte signature matched none of the accepted values
    #[error("bad magic: expected {expected}, found {found:?}")]
    BadMagic {
        expected: &'static str,
        found: [u8; 4],
    },

    /// Buffer is shorter than the fixed header
    #[error("buffer too small: {len} bytes (need at least {min})")]
    TooSmall { len: usize, min: usize },

    /// TOC entry 0 is missing or is not the pack root (type 0)
    #[error("TOC entry 0 is not the pack root (found type {0:?})")]
    InvalidRoot(Option<u32>),

    /// Version word is unknown or explicitly rejected
    #[error("unsupported version: 0x{0:08X}")]
    UnsupportedVersion(u32),

    /// Requested span exceeds the buffer
    #[error("out of bounds: {len} bytes at 0x{offset:X} (buffer is {buffer_len} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    /// Patch target is not a model, or the mesh index is past the mesh table
    #[error("no addressable model mesh at 0x{offset:X}")]
    MeshNotAddressable { offset: usize },

    /// Edit would require inserting, removing or resizing records
    #[error("unsupported {category} edit: {reason}")]
    UnsupportedEdit {
        category: &'static str,
        reason: String,
    },
}

impl FormatError {
    pub(crate) fn unsupported(category: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedEdit {
            category,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
