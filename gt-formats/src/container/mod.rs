//! PACB pack container
//!
//! # Layout
//!
//! ```text
//! 0x00  magic        "PACB" (big-endian) or "PACL" (little-endian)
//! 0x3C  toc_count    u32
//! 0x40  toc[n]       { type: u32, flag: u32, data_start: i32, data_length: i32 }
//!
//! toc[0].data_start:
//!       offsets[64]  i32, relative to toc[0].data_start, 0 = empty slot
//! ```
//!
//! The slot index alone decides what a blob is (see [`slots`]). A blob runs
//! from its own offset up to the next larger offset in the table, or to the
//! end of the buffer.

mod pack;
pub mod slots;

pub use pack::Pack;
pub use slots::{SLOT_COUNT, SlotKind, classify};

use hashbrown::HashSet;
use std::ops::Range;

use crate::config::DecodeConfig;
use crate::error::{FormatError, Result};
use crate::io::{Endian, OffsetReader, check_span};
use crate::warning::{Decoded, Warning, WarningSink};

/// Big-endian pack signature
pub const PACB_MAGIC: &[u8; 4] = b"PACB";
/// Little-endian pack signature
pub const PACL_MAGIC: &[u8; 4] = b"PACL";
/// Smallest buffer that can hold the fixed header
pub const HEADER_SIZE: usize = 0x40;

const TOC_COUNT_OFFSET: usize = 0x3C;
const TOC_ENTRY_SIZE: usize = 0x10;

/// One table-of-contents entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocEntry {
    pub kind: u32,
    pub flag: u32,
    pub data_start: i32,
    pub data_length: i32,
}

/// A classified byte range inside the pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Offset-table slot that points here
    pub slot: usize,
    pub kind: SlotKind,
    /// Absolute byte range in the pack buffer
    pub range: Range<usize>,
}

impl Blob {
    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Borrow this blob's bytes from the buffer it was resolved from
    pub fn bytes<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        buffer.get(self.range.clone()).unwrap_or(&[])
    }
}

/// A resolved pack: TOC plus classified blobs in offset-table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub endian: Endian,
    pub toc: Vec<TocEntry>,
    /// Absolute position of the offset table (root `data_start`)
    pub root_start: usize,
    pub buffer_len: usize,
    pub blobs: Vec<Blob>,
}

impl Container {
    /// Resolve a pack with default limits.
    pub fn resolve(buffer: &[u8]) -> Result<Decoded<Container>> {
        Self::resolve_with(buffer, &DecodeConfig::default())
    }

    /// Resolve a pack.
    ///
    /// # Errors
    /// * `TooSmall` - buffer shorter than the 0x40-byte header
    /// * `BadMagic` - neither `PACB` nor `PACL`
    /// * `InvalidRoot` - TOC is empty or entry 0 is not type 0
    /// * `OutOfBounds` - TOC or offset table runs past the buffer
    pub fn resolve_with(buffer: &[u8], config: &DecodeConfig) -> Result<Decoded<Container>> {
        if buffer.len() < HEADER_SIZE {
            return Err(FormatError::TooSmall {
                len: buffer.len(),
                min: HEADER_SIZE,
            });
        }

        let mut reader = OffsetReader::new(buffer);
        let magic = reader.read_magic()?;
        let endian = if &magic == PACB_MAGIC {
            Endian::Big
        } else if &magic == PACL_MAGIC {
            Endian::Little
        } else {
            return Err(FormatError::BadMagic {
                expected: "PACB or PACL",
                found: magic,
            });
        };
        reader.set_endian(endian);

        // Table of contents
        reader.seek(TOC_COUNT_OFFSET)?;
        let toc_count = reader.read_u32()?;
        if !config.limits.allows(toc_count) {
            return Err(FormatError::OutOfBounds {
                offset: HEADER_SIZE,
                len: toc_count as usize * TOC_ENTRY_SIZE,
                buffer_len: buffer.len(),
            });
        }
        check_span(HEADER_SIZE, toc_count as usize * TOC_ENTRY_SIZE, buffer.len())?;

        let mut toc = Vec::with_capacity(toc_count as usize);
        for _ in 0..toc_count {
            toc.push(TocEntry {
                kind: reader.read_u32()?,
                flag: reader.read_u32()?,
                data_start: reader.read_i32()?,
                data_length: reader.read_i32()?,
            });
        }

        let root = toc.first().ok_or(FormatError::InvalidRoot(None))?;
        if root.kind != 0 {
            return Err(FormatError::InvalidRoot(Some(root.kind)));
        }
        let root_start = usize::try_from(root.data_start).map_err(|_| FormatError::OutOfBounds {
            offset: 0,
            len: SLOT_COUNT * 4,
            buffer_len: buffer.len(),
        })?;
        check_span(root_start, SLOT_COUNT * 4, buffer.len())?;
        tracing::debug!(
            "pack: {} TOC entries, offset table at 0x{:X}",
            toc.len(),
            root_start
        );

        // Offset table
        let mut sink = WarningSink::new();
        reader.seek(root_start)?;
        let mut starts: Vec<(usize, usize)> = Vec::new();
        for slot in 0..SLOT_COUNT {
            let raw = reader.read_i32()?;
            if raw == 0 {
                continue;
            }
            let rebased = root_start as i64 + i64::from(raw);
            if raw < 0 || rebased >= buffer.len() as i64 {
                sink.push(Warning::SlotOutOfRange {
                    slot,
                    offset: rebased,
                });
                continue;
            }
            starts.push((slot, rebased as usize));
        }

        let blobs = starts
            .iter()
            .map(|&(slot, start)| {
                let end = starts
                    .iter()
                    .map(|&(_, other)| other)
                    .filter(|&other| other > start)
                    .min()
                    .unwrap_or(buffer.len());
                let kind = classify(slot);
                tracing::debug!("pack: slot {} ({:?}) at 0x{:X}..0x{:X}", slot, kind, start, end);
                Blob {
                    slot,
                    kind,
                    range: start..end,
                }
            })
            .collect();

        Ok(sink.finish(Container {
            endian,
            toc,
            root_start,
            buffer_len: buffer.len(),
            blobs,
        }))
    }

    /// Blobs of one kind, in offset-table order.
    pub fn blobs_of(&self, kind: SlotKind) -> impl Iterator<Item = &Blob> {
        self.blobs.iter().filter(move |blob| blob.kind == kind)
    }

    /// The blob a slot points at, if any.
    pub fn slot(&self, slot: usize) -> Option<&Blob> {
        self.blobs.iter().find(|blob| blob.slot == slot)
    }

    /// Partition of `[root_start, buffer_len)`: the offset-table region
    /// followed by each distinct blob range in address order.
    ///
    /// Slots that share an offset alias the same range and appear once.
    pub fn regions(&self) -> Vec<Range<usize>> {
        let mut seen = HashSet::new();
        let mut ranges: Vec<Range<usize>> = self
            .blobs
            .iter()
            .filter(|blob| seen.insert(blob.range.start))
            .map(|blob| blob.range.clone())
            .collect();
        ranges.sort_by_key(|range| range.start);

        let table_end = ranges.first().map_or(self.buffer_len, |range| range.start);
        let mut regions = Vec::with_capacity(ranges.len() + 1);
        regions.push(self.root_start..table_end);
        regions.extend(ranges);
        regions
    }
}
