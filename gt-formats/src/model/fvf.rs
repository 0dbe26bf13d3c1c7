//! Flexible vertex format descriptors
//!
//! Record layout (0x78 bytes):
//!
//! ```text
//! 0x00  name_offset   u32   -> null-terminated name
//! 0x04  unk_index     u32
//! 0x08  unk_offset    u32
//! 0x0C  (8 bytes)
//! 0x14  unk_offset2   u32
//! 0x18  unk_flag      u8
//! 0x19  stride        u8    per-vertex byte stride
//! 0x1A  (0x5A bytes)
//! 0x74  unk_offset3   u32
//! ```

use serde::{Deserialize, Serialize};

use super::FVF_RECORD_SIZE;
use crate::config::Limits;
use crate::error::Result;
use crate::io::OffsetReader;

const STRIDE_FIELD: usize = 0x19;

/// One FVF table record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fvf {
    pub name: String,
    /// Byte stride between consecutive vertices
    pub stride: u8,
    pub name_offset: u32,
    pub unk_index: u32,
    pub unk_offset: u32,
    pub unk_offset2: u32,
    pub unk_flag: u8,
    pub unk_offset3: u32,
}

impl Fvf {
    /// Read the record at `offset`. An unreadable name is left empty.
    pub(crate) fn read(
        reader: &mut OffsetReader<'_>,
        offset: usize,
        limits: &Limits,
    ) -> Result<Self> {
        reader.seek(offset)?;
        let name_offset = reader.read_u32()?;
        let unk_index = reader.read_u32()?;
        let unk_offset = reader.read_u32()?;
        reader.skip(0x08)?;
        let unk_offset2 = reader.read_u32()?;
        let unk_flag = reader.read_u8()?;
        let stride = reader.read_u8()?;
        reader.skip(0x5A)?;
        let unk_offset3 = reader.read_u32()?;

        let name = reader
            .cstr_at(name_offset as usize, limits.max_string_len)
            .unwrap_or_default();

        Ok(Self {
            name,
            stride,
            name_offset,
            unk_index,
            unk_offset,
            unk_offset2,
            unk_flag,
            unk_offset3,
        })
    }

    /// Vertex stride alone, for callers that re-walk the table.
    pub(crate) fn stride_at(
        reader: &mut OffsetReader<'_>,
        fvf_table: usize,
        index: usize,
    ) -> Result<u8> {
        reader.seek(fvf_table + index * FVF_RECORD_SIZE + STRIDE_FIELD)?;
        reader.read_u8()
    }
}
