//! Runway header
//!
//! ```text
//! 0x00  magic              "5WNR"
//! 0x04  base_offset        u32
//! 0x08  size               u32
//! 0x0C  version            u32
//! 0x14  track_length       f32
//! 0x20  bounds_min         f32 x3
//! 0x2C  bounds_max         f32 x3
//! 0x4C  grid               count u32, offset u32
//! 0x54  checkpoints        count, offset
//! 0x5C  checkpoint_list    count, offset
//! 0x74  cut_track          count, offset
//! 0x7C  road_vertices      count, offset
//! 0x84  road_faces         count, offset
//! 0x94  unreadable         count, offset   (not decoded)
//! 0x9C  boundary_vertices  count, offset
//! 0xA4  boundary_list      count, offset
//! 0xAC  pit_boxes          count, offset
//! 0xC0  pit_unknowns       offset only; count follows pit_boxes
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};
use crate::geometry::Vertex;
use crate::io::OffsetReader;

/// Runway signature
pub const RUNWAY_MAGIC: &[u8; 4] = b"5WNR";
/// Size of the fixed header
pub const HEADER_SIZE: usize = 0xC4;

/// Header field positions
pub(crate) mod field {
    pub const VERSION: usize = 0x0C;
    pub const TRACK_LENGTH: usize = 0x14;
    pub const BOUNDS: usize = 0x20;
    pub const GRID: usize = 0x4C;
    pub const CHECKPOINTS: usize = 0x54;
    pub const CHECKPOINT_LIST: usize = 0x5C;
    pub const CUT_TRACK: usize = 0x74;
    pub const ROAD_VERTICES: usize = 0x7C;
    pub const ROAD_FACES: usize = 0x84;
    pub const UNREADABLE: usize = 0x94;
    pub const BOUNDARY_VERTICES: usize = 0x9C;
    pub const BOUNDARY_LIST: usize = 0xA4;
    pub const PIT_BOXES: usize = 0xAC;
    pub const PIT_UNKNOWNS: usize = 0xC0;
}

/// Known runway generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackVersion {
    /// v2.0, not decodable
    Legacy,
    /// v4.3
    Ps2,
    /// v4.4; road surface bytes use a different numbering
    Ps3,
}

impl TrackVersion {
    pub const LEGACY_RAW: u32 = 0x0002_0000;
    pub const PS2_RAW: u32 = 0x0004_0003;
    pub const PS3_RAW: u32 = 0x0004_0004;

    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            Self::LEGACY_RAW => Some(Self::Legacy),
            Self::PS2_RAW => Some(Self::Ps2),
            Self::PS3_RAW => Some(Self::Ps3),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Legacy => Self::LEGACY_RAW,
            Self::Ps2 => Self::PS2_RAW,
            Self::Ps3 => Self::PS3_RAW,
        }
    }

    /// Whether stored surface bytes need the caveat warning
    pub fn has_surface_caveat(self) -> bool {
        self == Self::Ps3
    }
}

/// A `count, offset` pair from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRef {
    pub count: u32,
    pub offset: u32,
}

impl TableRef {
    fn read(reader: &mut OffsetReader<'_>, position: usize) -> Result<Self> {
        reader.seek(position)?;
        Ok(Self {
            count: reader.read_u32()?,
            offset: reader.read_u32()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Decoded runway header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackHeader {
    pub base_offset: u32,
    pub size: u32,
    pub version: TrackVersion,
    pub track_length: f32,
    pub bounds_min: Vertex,
    pub bounds_max: Vertex,
    pub grid: TableRef,
    pub checkpoints: TableRef,
    pub checkpoint_list: TableRef,
    pub cut_track: TableRef,
    pub road_vertices: TableRef,
    pub road_faces: TableRef,
    pub unreadable: TableRef,
    pub boundary_vertices: TableRef,
    pub boundary_list: TableRef,
    pub pit_boxes: TableRef,
    pub pit_unknown_offset: u32,
}

impl TrackHeader {
    /// Read and validate the header at the start of `reader`.
    ///
    /// # Errors
    /// * `BadMagic` - not `5WNR`
    /// * `TooSmall` - shorter than the 0xC4-byte header
    /// * `UnsupportedVersion` - legacy or unknown version
    pub fn read(reader: &mut OffsetReader<'_>) -> Result<Self> {
        reader.seek(0)?;
        let magic = reader.read_magic()?;
        if &magic != RUNWAY_MAGIC {
            return Err(FormatError::BadMagic {
                expected: "5WNR",
                found: magic,
            });
        }
        if reader.len() < HEADER_SIZE {
            return Err(FormatError::TooSmall {
                len: reader.len(),
                min: HEADER_SIZE,
            });
        }

        let base_offset = reader.read_u32()?;
        let size = reader.read_u32()?;
        reader.seek(field::VERSION)?;
        let raw_version = reader.read_u32()?;
        let version = match TrackVersion::from_raw(raw_version) {
            Some(TrackVersion::Legacy) | None => {
                return Err(FormatError::UnsupportedVersion(raw_version));
            }
            Some(version) => version,
        };

        reader.seek(field::TRACK_LENGTH)?;
        let track_length = reader.read_f32()?;
        reader.seek(field::BOUNDS)?;
        let bounds_min = reader.read_vertex()?;
        let bounds_max = reader.read_vertex()?;

        let pit_unknown_offset = {
            reader.seek(field::PIT_UNKNOWNS)?;
            reader.read_u32()?
        };

        Ok(Self {
            base_offset,
            size,
            version,
            track_length,
            bounds_min,
            bounds_max,
            grid: TableRef::read(reader, field::GRID)?,
            checkpoints: TableRef::read(reader, field::CHECKPOINTS)?,
            checkpoint_list: TableRef::read(reader, field::CHECKPOINT_LIST)?,
            cut_track: TableRef::read(reader, field::CUT_TRACK)?,
            road_vertices: TableRef::read(reader, field::ROAD_VERTICES)?,
            road_faces: TableRef::read(reader, field::ROAD_FACES)?,
            unreadable: TableRef::read(reader, field::UNREADABLE)?,
            boundary_vertices: TableRef::read(reader, field::BOUNDARY_VERTICES)?,
            boundary_list: TableRef::read(reader, field::BOUNDARY_LIST)?,
            pit_boxes: TableRef::read(reader, field::PIT_BOXES)?,
            pit_unknown_offset,
        })
    }
}
