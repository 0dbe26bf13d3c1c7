//! Model patching: vertex replacement and mesh hiding

use std::ops::Range;

use super::{commit, stage};
use crate::container::{Container, SlotKind};
use crate::edit::ModelEdits;
use crate::error::{FormatError, Result};
use crate::io::{Endian, OffsetReader, OffsetWriter};
use crate::model::mesh::VISIBILITY_FIELD;
use crate::model::{Fvf, MDL3_MAGIC, MeshRecord, ModelHeader};
use crate::warning::{Decoded, Warning, WarningSink};

/// Patch the big-endian model starting at `model_offset` in `buffer`.
///
/// # Errors
/// * `MeshNotAddressable` - no model signature at `model_offset`, or an
///   edited mesh index is past the mesh table, has no FVF record or has no
///   vertex array
/// * `UnsupportedEdit` - more replacement vertices than the mesh holds
/// * `OutOfBounds` - a header or vertex write falls outside the buffer
pub fn apply_model_edits(
    buffer: &mut [u8],
    model_offset: usize,
    edits: &ModelEdits,
) -> Result<Decoded<()>> {
    apply_model_edits_with_endian(buffer, model_offset, edits, Endian::Big)
}

pub fn apply_model_edits_with_endian(
    buffer: &mut [u8],
    model_offset: usize,
    edits: &ModelEdits,
    endian: Endian,
) -> Result<Decoded<()>> {
    patch_model(buffer, model_offset..buffer.len(), edits, endian)
}

/// Patch the first ordinary model of a pack, using the pack's endianness.
pub fn apply_pack_model_edits(buffer: &mut [u8], edits: &ModelEdits) -> Result<Decoded<()>> {
    let (container, warnings) = Container::resolve(buffer)?.into_parts();
    let blob = container
        .blobs_of(SlotKind::Model)
        .next()
        .ok_or(FormatError::MeshNotAddressable {
            offset: container.root_start,
        })?;
    let range = blob.range.clone();

    let (value, patch_warnings) = patch_model(buffer, range, edits, container.endian)?.into_parts();
    let mut all = warnings;
    all.extend(patch_warnings);
    Ok(Decoded::new(value, all))
}

fn patch_model(
    buffer: &mut [u8],
    range: Range<usize>,
    edits: &ModelEdits,
    endian: Endian,
) -> Result<Decoded<()>> {
    let base = range.start;
    let region = buffer.get(range.clone()).unwrap_or(&[]);
    if region.get(..4) != Some(MDL3_MAGIC.as_slice()) {
        return Err(FormatError::MeshNotAddressable { offset: base });
    }
    if edits.is_empty() {
        return Ok(Decoded::clean(()));
    }

    let mut reader = OffsetReader::with_endian(region, endian);
    let header = ModelHeader::read(&mut reader)?;
    let mut staged = stage(buffer, range.clone())?;
    let mut writer = OffsetWriter::with_endian(&mut staged, endian);
    let mut sink = WarningSink::new();

    for mesh in edits.touched_meshes() {
        if mesh >= header.mesh_count as usize {
            return Err(FormatError::MeshNotAddressable {
                offset: base + header.mesh_record_offset(mesh),
            });
        }
    }

    for &mesh in &edits.deleted {
        writer.seek(header.mesh_record_offset(mesh) + VISIBILITY_FIELD)?;
        writer.write_u32(0)?;
        tracing::debug!("model patch: hid mesh {}", mesh);
    }

    for (&mesh, vertices) in &edits.vertex_edits {
        let record_offset = header.mesh_record_offset(mesh);
        let record = MeshRecord::read(&mut reader, record_offset)?;
        // Same addressability rule the decoder uses to skip a mesh
        if !record.has_vertex_array(region.len()) || record.fvf_index >= header.fvf_count {
            return Err(FormatError::MeshNotAddressable {
                offset: base + record_offset,
            });
        }
        let capacity = record.vertex_count as usize;
        if vertices.len() > capacity {
            return Err(FormatError::unsupported(
                "mesh vertices",
                format!(
                    "mesh {} holds {} vertices, {} supplied",
                    mesh,
                    capacity,
                    vertices.len()
                ),
            ));
        }
        if vertices.len() < capacity {
            sink.push(Warning::PartialVertexEdit {
                mesh,
                supplied: vertices.len(),
                capacity,
            });
        }

        let stride = Fvf::stride_at(
            &mut reader,
            header.fvf_table as usize,
            record.fvf_index as usize,
        )? as usize;
        for (i, vertex) in vertices.iter().enumerate() {
            writer.seek(record.vertex_offset as usize + i * stride)?;
            writer.write_vertex(*vertex)?;
        }
        tracing::debug!("model patch: wrote {} vertices to mesh {}", vertices.len(), mesh);
    }

    commit(buffer, base, &staged);
    Ok(sink.finish(()))
}
