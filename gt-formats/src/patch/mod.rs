//! In-place, size-preserving patching
//!
//! Patches re-walk the header and table offsets of the target instead of
//! trusting decoded entities: the buffer is the only source of truth for
//! positions. Every write goes to a staged copy of the target region, which
//! is committed back into the caller's buffer only after every edit
//! succeeded. A failed patch leaves the buffer untouched.

mod model;
mod track;

pub use model::{apply_model_edits, apply_model_edits_with_endian, apply_pack_model_edits};
pub use track::apply_track_edits;

use std::ops::Range;

use crate::error::{FormatError, Result};

/// Copy of `buffer[range]` to stage writes on.
fn stage(buffer: &[u8], range: Range<usize>) -> Result<Vec<u8>> {
    buffer
        .get(range.clone())
        .map(<[u8]>::to_vec)
        .ok_or(FormatError::OutOfBounds {
            offset: range.start,
            len: range.len(),
            buffer_len: buffer.len(),
        })
}

/// Write a staged region back at `offset`.
fn commit(buffer: &mut [u8], offset: usize, staged: &[u8]) {
    if let Some(target) = buffer.get_mut(offset..offset + staged.len()) {
        target.copy_from_slice(staged);
    }
}
