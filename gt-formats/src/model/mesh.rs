//! Mesh records and their resolved geometry
//!
//! Record layout (0x30 bytes, offsets relative to the model start):
//!
//! ```text
//! 0x00  flags             u8 x2
//! 0x02  fvf_index         u16
//! 0x04  texture_index     u16
//! 0x06  null_word         u16
//! 0x08  vertex_count      u32
//! 0x0C  vertex_offset     u32
//! 0x10  reserved0         u32
//! 0x14  face_data_length  u32   index count (3 per face)
//! 0x18  faces_offset      u32
//! 0x1C  reserved1         u32
//! 0x20  visibility        u32   0x0000FFFF when visible, zeroed to hide
//! 0x24  face_count        u32
//! 0x28  bbox_offset       u32   8 plain xyz vertices
//! 0x2C  trailing_offset   u32
//! ```
//!
//! The count fields are hints. Every array read is bounds-checked against
//! the model, and any failure empties that mesh instead of the model.

use serde::{Deserialize, Serialize};

use super::fvf::Fvf;
use crate::config::Limits;
use crate::error::Result;
use crate::geometry::{Face, Vertex};
use crate::io::OffsetReader;
use crate::warning::{Warning, WarningSink};

/// Offset of the visibility word inside a mesh record
pub const VISIBILITY_FIELD: usize = 0x20;

/// The raw 0x30-byte mesh record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshRecord {
    pub flags: [u8; 2],
    pub fvf_index: u16,
    pub texture_index: u16,
    pub null_word: u16,
    pub vertex_count: u32,
    pub vertex_offset: u32,
    pub reserved0: u32,
    pub face_data_length: u32,
    pub faces_offset: u32,
    pub reserved1: u32,
    pub visibility: u32,
    pub face_count: u32,
    pub bbox_offset: u32,
    pub trailing_offset: u32,
}

impl MeshRecord {
    pub(crate) fn read(reader: &mut OffsetReader<'_>, offset: usize) -> Result<Self> {
        reader.seek(offset)?;
        Ok(Self {
            flags: [reader.read_u8()?, reader.read_u8()?],
            fvf_index: reader.read_u16()?,
            texture_index: reader.read_u16()?,
            null_word: reader.read_u16()?,
            vertex_count: reader.read_u32()?,
            vertex_offset: reader.read_u32()?,
            reserved0: reader.read_u32()?,
            face_data_length: reader.read_u32()?,
            faces_offset: reader.read_u32()?,
            reserved1: reader.read_u32()?,
            visibility: reader.read_u32()?,
            face_count: reader.read_u32()?,
            bbox_offset: reader.read_u32()?,
            trailing_offset: reader.read_u32()?,
        })
    }

    /// `(face_count, face_data_length)` with whichever one is zero derived
    /// from the other.
    pub fn normalized_face_counts(&self) -> (u32, u32) {
        match (self.face_count, self.face_data_length) {
            (0, len) if len > 0 => (len / 3, len),
            (count, 0) if count > 0 => (count, count.saturating_mul(3)),
            other => other,
        }
    }

    /// Whether any array offset lies at or past `len`.
    pub fn exceeds(&self, len: usize) -> bool {
        [self.vertex_offset, self.faces_offset, self.bbox_offset]
            .iter()
            .any(|&offset| offset as usize >= len)
    }

    /// Whether the record points at a vertex array inside a model of `len`
    /// bytes. A null offset means the mesh stores no vertices.
    pub fn has_vertex_array(&self, len: usize) -> bool {
        self.vertex_count > 0 && self.vertex_offset != 0 && !self.exceeds(len)
    }

    /// Whether the visibility word has been cleared.
    pub fn is_hidden(&self) -> bool {
        self.visibility == 0
    }
}

/// A mesh record plus the arrays it points at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub record: MeshRecord,
    pub vertices: Vec<Vertex>,
    /// Faces; rejected triples are left as `0, 0, 0`
    pub faces: Vec<Face>,
    pub bbox: Option<[Vertex; 8]>,
    pub has_invalid_faces: bool,
    /// Arrays were not read because the record could not be addressed
    pub skipped: bool,
}

impl Mesh {
    fn skipped(record: MeshRecord, index: usize, reason: String, sink: &mut WarningSink) -> Self {
        sink.push(Warning::MeshSkipped {
            mesh: index,
            reason,
        });
        Self {
            record,
            skipped: true,
            ..Self::default()
        }
    }
}

/// Resolve a mesh's vertex, face and bounding box arrays.
pub(crate) fn decode_mesh(
    reader: &mut OffsetReader<'_>,
    index: usize,
    record: MeshRecord,
    fvfs: &[Fvf],
    limits: &Limits,
    sink: &mut WarningSink,
) -> Mesh {
    if record.exceeds(reader.len()) {
        return Mesh::skipped(record, index, "offset past end of model".into(), sink);
    }
    let Some(fvf) = fvfs.get(record.fvf_index as usize) else {
        return Mesh::skipped(
            record,
            index,
            format!("no FVF record {}", record.fvf_index),
            sink,
        );
    };

    let vertices = if record.vertex_count > 0 && record.vertex_offset != 0 {
        if !limits.allows(record.vertex_count) {
            return Mesh::skipped(
                record,
                index,
                format!("vertex count {} over limit", record.vertex_count),
                sink,
            );
        }
        match read_vertices(reader, &record, fvf.stride as usize) {
            Ok(vertices) => vertices,
            Err(e) => return Mesh::skipped(record, index, e.to_string(), sink),
        }
    } else {
        Vec::new()
    };

    let (face_count, face_data_length) = record.normalized_face_counts();
    let (faces, has_invalid_faces) = if face_data_length > 0 && record.faces_offset != 0 {
        if !limits.allows(face_count) {
            return Mesh::skipped(
                record,
                index,
                format!("face count {} over limit", face_count),
                sink,
            );
        }
        read_faces(reader, &record, face_count as usize)
    } else {
        (Vec::new(), false)
    };
    if has_invalid_faces {
        sink.push(Warning::InvalidFaces { mesh: index });
    }

    let bbox = if record.bbox_offset > 0 {
        let bbox = read_bbox(reader, record.bbox_offset as usize).ok();
        if bbox.is_none() {
            sink.push(Warning::MissingBoundingBox { mesh: index });
        }
        bbox
    } else {
        None
    };

    Mesh {
        record,
        vertices,
        faces,
        bbox,
        has_invalid_faces,
        skipped: false,
    }
}

fn read_vertices(
    reader: &mut OffsetReader<'_>,
    record: &MeshRecord,
    stride: usize,
) -> Result<Vec<Vertex>> {
    let base = record.vertex_offset as usize;
    (0..record.vertex_count as usize)
        .map(|i| {
            reader.seek(base + i * stride)?;
            reader.read_vertex()
        })
        .collect()
}

/// Read `count` index triples. Triples referencing a vertex past
/// `vertex_count`, and any left unread at the end of the buffer, stay zero.
fn read_faces(
    reader: &mut OffsetReader<'_>,
    record: &MeshRecord,
    count: usize,
) -> (Vec<Face>, bool) {
    let mut faces = vec![Face::default(); count];
    let mut invalid = false;
    if reader.seek(record.faces_offset as usize).is_err() {
        return (faces, true);
    }

    for face in faces.iter_mut() {
        let Ok([a, b, c]) = read_triple(reader) else {
            invalid = true;
            break;
        };
        if [a, b, c].iter().all(|&i| u32::from(i) <= record.vertex_count) {
            *face = Face::new(a, b, c);
        } else {
            invalid = true;
        }
    }
    (faces, invalid)
}

fn read_triple(reader: &mut OffsetReader<'_>) -> Result<[u16; 3]> {
    Ok([reader.read_u16()?, reader.read_u16()?, reader.read_u16()?])
}

fn read_bbox(reader: &mut OffsetReader<'_>, offset: usize) -> Result<[Vertex; 8]> {
    reader.seek(offset)?;
    let mut bbox = [Vertex::ZERO; 8];
    for corner in bbox.iter_mut() {
        *corner = reader.read_vertex()?;
    }
    Ok(bbox)
}
