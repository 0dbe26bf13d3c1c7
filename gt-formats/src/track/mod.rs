//! Runway track geometry decoder
//!
//! A runway is a header of `count, offset` pairs (see [`header`]) feeding
//! fixed-stride record tables. Offsets are relative to the start of the
//! runway.

pub mod boundary;
pub mod header;
pub mod surface;

pub use boundary::{BoundaryRecord, BoundarySubmesh, split_runs};
pub use header::{RUNWAY_MAGIC, TableRef, TrackHeader, TrackVersion};
pub use surface::RoadSurface;

use serde::{Deserialize, Serialize};

use crate::config::{DecodeConfig, Limits};
use crate::error::{FormatError, Result};
use crate::geometry::{Vertex, VertexRot};
use crate::io::{Endian, OffsetReader};
use crate::warning::{Decoded, Warning, WarningSink};

pub const VERTEX_ROT_RECORD_SIZE: usize = 0x10;
pub const CHECKPOINT_RECORD_SIZE: usize = 0x38;
pub const CUT_TRACK_RECORD_SIZE: usize = 0x20;
/// Position of the vertex inside a cut-track record
pub const CUT_TRACK_VERTEX: usize = 0x08;
pub const ROAD_VERTEX_RECORD_SIZE: usize = 0x0C;
pub const ROAD_FACE_RECORD_SIZE: usize = 0x10;
pub const LIST_ENTRY_SIZE: usize = 0x02;

/// One side of a checkpoint line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckpointHalf {
    pub start: Vertex,
    pub end: Vertex,
    /// Distance along the track
    pub track_distance: f32,
}

impl CheckpointHalf {
    fn read(reader: &mut OffsetReader<'_>) -> Result<Self> {
        Ok(Self {
            start: reader.read_vertex()?,
            end: reader.read_vertex()?,
            track_distance: reader.read_f32()?,
        })
    }
}

/// A checkpoint record (0x38 bytes: left half then right half).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub left: CheckpointHalf,
    pub right: CheckpointHalf,
}

/// A road face record.
///
/// ```text
/// 0x00 pad  0x01 a: u16  0x03 surface
/// 0x04 pad  0x05 b: u16  0x07 flag
/// 0x08 pad  0x09 c: u16  0x0B flag
/// 0x0C unknown: u16      0x0E flag   0x0F pad
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoadFace {
    /// Indices into the road vertex pool
    pub indices: [u16; 3],
    /// Raw surface byte; see [`RoadSurface`]
    pub surface: u8,
    pub flags: [u8; 3],
    pub unknown: u16,
    /// Bytes at 0x00, 0x04, 0x08 and 0x0F
    pub pad: [u8; 4],
}

impl RoadFace {
    fn read(reader: &mut OffsetReader<'_>) -> Result<Self> {
        let pad0 = reader.read_u8()?;
        let a = reader.read_u16()?;
        let surface = reader.read_u8()?;
        let pad1 = reader.read_u8()?;
        let b = reader.read_u16()?;
        let flag2 = reader.read_u8()?;
        let pad2 = reader.read_u8()?;
        let c = reader.read_u16()?;
        let flag3 = reader.read_u8()?;
        let unknown = reader.read_u16()?;
        let flag4 = reader.read_u8()?;
        let pad3 = reader.read_u8()?;
        Ok(Self {
            indices: [a, b, c],
            surface,
            flags: [flag2, flag3, flag4],
            unknown,
            pad: [pad0, pad1, pad2, pad3],
        })
    }

    pub fn surface_kind(&self) -> Option<RoadSurface> {
        RoadSurface::from_raw(self.surface)
    }
}

/// Decoded runway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub header: TrackHeader,
    pub starting_grid: Vec<VertexRot>,
    pub pit_boxes: Vec<VertexRot>,
    /// Read only when the header offset is set; count follows `pit_boxes`
    pub pit_unknowns: Vec<VertexRot>,
    pub checkpoints: Vec<Checkpoint>,
    pub checkpoint_list: Vec<u16>,
    pub cut_track: Vec<Vertex>,
    pub road_vertices: Vec<Vertex>,
    pub road_faces: Vec<RoadFace>,
    pub boundaries: Vec<BoundarySubmesh>,
    pub boundary_list: Vec<u16>,
}

impl TrackGeometry {
    pub fn decode(bytes: &[u8]) -> Result<Decoded<TrackGeometry>> {
        Self::decode_with(bytes, &DecodeConfig::default())
    }

    /// Decode a runway.
    ///
    /// # Errors
    /// * `BadMagic`, `TooSmall`, `UnsupportedVersion` from the header
    /// * `OutOfBounds` if a table (other than the pit unknowns) runs past
    ///   the buffer or its count exceeds the configured limit
    pub fn decode_with(bytes: &[u8], config: &DecodeConfig) -> Result<Decoded<TrackGeometry>> {
        let mut reader = OffsetReader::with_endian(bytes, Endian::Big);
        let header = TrackHeader::read(&mut reader)?;
        let limits = &config.limits;
        let mut sink = WarningSink::new();

        if header.version.has_surface_caveat() {
            sink.push(Warning::SurfaceTypeCaveat {
                version: header.version.raw(),
            });
        }

        let starting_grid = read_table(
            &mut reader,
            header.grid,
            VERTEX_ROT_RECORD_SIZE,
            limits,
            |r| r.read_vertex_rot(),
        )?;
        let checkpoints = read_table(
            &mut reader,
            header.checkpoints,
            CHECKPOINT_RECORD_SIZE,
            limits,
            |r| {
                Ok(Checkpoint {
                    left: CheckpointHalf::read(r)?,
                    right: CheckpointHalf::read(r)?,
                })
            },
        )?;
        let checkpoint_list = read_table(
            &mut reader,
            header.checkpoint_list,
            LIST_ENTRY_SIZE,
            limits,
            |r| r.read_u16(),
        )?;
        let cut_track = read_table(
            &mut reader,
            header.cut_track,
            CUT_TRACK_RECORD_SIZE,
            limits,
            |r| {
                r.skip(CUT_TRACK_VERTEX)?;
                r.read_vertex()
            },
        )?;
        let road_vertices = read_table(
            &mut reader,
            header.road_vertices,
            ROAD_VERTEX_RECORD_SIZE,
            limits,
            |r| r.read_vertex(),
        )?;
        let road_faces = read_table(
            &mut reader,
            header.road_faces,
            ROAD_FACE_RECORD_SIZE,
            limits,
            RoadFace::read,
        )?;
        check_road(&road_faces, road_vertices.len(), &mut sink);

        let boundary_records = read_table(
            &mut reader,
            header.boundary_vertices,
            boundary::BOUNDARY_RECORD_SIZE,
            limits,
            BoundaryRecord::read,
        )?;
        let (boundaries, boundary_warnings) = split_runs(&boundary_records).into_parts();
        sink.extend(boundary_warnings);

        let boundary_list = read_table(
            &mut reader,
            header.boundary_list,
            LIST_ENTRY_SIZE,
            limits,
            |r| r.read_u16(),
        )?;
        let pit_boxes = read_table(
            &mut reader,
            header.pit_boxes,
            VERTEX_ROT_RECORD_SIZE,
            limits,
            |r| r.read_vertex_rot(),
        )?;
        let pit_unknowns = read_pit_unknowns(&mut reader, &header, limits, &mut sink);

        tracing::debug!(
            "runway: {} grid, {} checkpoints, {} road faces, {} boundaries",
            starting_grid.len(),
            checkpoints.len(),
            road_faces.len(),
            boundaries.len()
        );

        Ok(sink.finish(TrackGeometry {
            header,
            starting_grid,
            pit_boxes,
            pit_unknowns,
            checkpoints,
            checkpoint_list,
            cut_track,
            road_vertices,
            road_faces,
            boundaries,
            boundary_list,
        }))
    }

    /// Resolve a road face to its three pool vertices.
    pub fn face_vertices(&self, face: &RoadFace) -> Option<[Vertex; 3]> {
        let [a, b, c] = face.indices;
        Some([
            *self.road_vertices.get(a as usize)?,
            *self.road_vertices.get(b as usize)?,
            *self.road_vertices.get(c as usize)?,
        ])
    }

    /// Total number of boundary vertex records.
    pub fn boundary_vertex_count(&self) -> usize {
        self.boundaries.iter().map(BoundarySubmesh::len).sum()
    }
}

/// Read `table.count` records of `stride` bytes. Each record read starts
/// at its own offset, so `read` may consume less than `stride`.
fn read_table<T>(
    reader: &mut OffsetReader<'_>,
    table: TableRef,
    stride: usize,
    limits: &Limits,
    mut read: impl FnMut(&mut OffsetReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    if !limits.allows(table.count) {
        return Err(FormatError::OutOfBounds {
            offset: table.offset as usize,
            len: table.count as usize * stride,
            buffer_len: reader.len(),
        });
    }
    let base = table.offset as usize;
    (0..table.count as usize)
        .map(|i| {
            reader.seek(base + i * stride)?;
            read(reader)
        })
        .collect()
}

fn read_pit_unknowns(
    reader: &mut OffsetReader<'_>,
    header: &TrackHeader,
    limits: &Limits,
    sink: &mut WarningSink,
) -> Vec<VertexRot> {
    let mut unknowns = Vec::new();
    if header.pit_unknown_offset == 0 {
        return unknowns;
    }
    let expected = header.pit_boxes.count.min(limits.max_table_entries) as usize;
    let base = header.pit_unknown_offset as usize;
    for i in 0..expected {
        let record = reader
            .seek(base + i * VERTEX_ROT_RECORD_SIZE)
            .and_then(|()| reader.read_vertex_rot());
        match record {
            Ok(record) => unknowns.push(record),
            Err(_) => {
                sink.push(Warning::PitUnknownsTruncated {
                    read: unknowns.len(),
                    expected,
                });
                break;
            }
        }
    }
    unknowns
}

fn check_road(faces: &[RoadFace], vertex_count: usize, sink: &mut WarningSink) {
    if let Some(first) = faces.first() {
        if first.surface_kind() != Some(RoadSurface::Tarmac) {
            sink.push(Warning::NonTarmacFirstFace {
                surface: first.surface,
            });
        }
    }
    for (i, face) in faces.iter().enumerate() {
        for &index in &face.indices {
            if index as usize >= vertex_count {
                sink.push(Warning::RoadIndexOutOfRange { face: i, index });
            }
        }
    }
}
