//! Random-access binary cursors
//!
//! Every format in this crate is addressed by absolute byte offsets, so both
//! cursors seek freely and bounds-check each access against the buffer. A
//! failed access returns [`FormatError::OutOfBounds`](crate::FormatError) and
//! leaves the cursor where it was.

mod reader;
mod writer;

pub use reader::OffsetReader;
pub use writer::OffsetWriter;

/// Byte order of a format unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// Check that `len` bytes at `offset` lie inside a buffer of `buffer_len` bytes.
pub(crate) fn check_span(offset: usize, len: usize, buffer_len: usize) -> crate::Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= buffer_len => Ok(()),
        _ => Err(crate::FormatError::OutOfBounds {
            offset,
            len,
            buffer_len,
        }),
    }
}
