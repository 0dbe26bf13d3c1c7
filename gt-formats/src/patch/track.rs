//! Runway patching, one independent action per category
//!
//! Table counts and offsets are never moved. The only count rewrites are
//! the ones that shrink a table in place: index lists reset to an identity
//! sequence, the road reduced to a single quad, and cleared tables whose
//! count and offset words are zeroed.

use super::{commit, stage};
use crate::edit::{CategoryEdit, TrackEdits};
use crate::error::{FormatError, Result};
use crate::geometry::Vertex;
use crate::io::{Endian, OffsetReader, OffsetWriter};
use crate::track::boundary::run_sentinels;
use crate::track::header::field;
use crate::track::{
    CHECKPOINT_RECORD_SIZE, CUT_TRACK_RECORD_SIZE, CUT_TRACK_VERTEX, ROAD_FACE_RECORD_SIZE,
    ROAD_VERTEX_RECORD_SIZE, RoadSurface, TableRef, TrackHeader, VERTEX_ROT_RECORD_SIZE,
};
use crate::warning::{Decoded, Warning, WarningSink};

/// Bounds written by a clear
const CLEARED_BOUNDS: f32 = 1_000_000.0;
/// Corner distance of the replacement road quad
const CLEARED_ROAD: f32 = 100_000.0;

/// Patch the runway starting at `track_offset` in `buffer`.
///
/// # Errors
/// * `BadMagic`, `TooSmall`, `UnsupportedVersion` from the runway header
/// * `UnsupportedEdit` - a category that cannot be edited in place, or a
///   replacement whose record count differs from the table
/// * `OutOfBounds` - a write falls outside the buffer
pub fn apply_track_edits(
    buffer: &mut [u8],
    track_offset: usize,
    edits: &TrackEdits,
) -> Result<Decoded<()>> {
    let region = buffer.get(track_offset..).unwrap_or(&[]);
    let mut reader = OffsetReader::with_endian(region, Endian::Big);
    let header = TrackHeader::read(&mut reader)?;

    let mut sink = WarningSink::new();
    if header.version.has_surface_caveat() {
        sink.push(Warning::SurfaceTypeCaveat {
            version: header.version.raw(),
        });
    }
    if edits.is_empty() {
        return Ok(sink.finish(()));
    }

    let mut staged = stage(buffer, track_offset..buffer.len())?;
    let mut w = OffsetWriter::with_endian(&mut staged, Endian::Big);

    match &edits.bounds {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(bounds) => write_bounds(&mut w, bounds.min, bounds.max)?,
        CategoryEdit::Clear => write_bounds(
            &mut w,
            Vertex::splat(-CLEARED_BOUNDS),
            Vertex::splat(CLEARED_BOUNDS),
        )?,
    }

    match &edits.grid {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(grid) => {
            write_records(&mut w, "grid", header.grid, VERTEX_ROT_RECORD_SIZE, grid, |w, g| {
                w.write_vertex_rot(*g)
            })?
        }
        CategoryEdit::Clear => zero_table(&mut w, field::GRID)?,
    }

    // Sized by the pit box count
    match &edits.pit_unknowns {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(unknowns) => {
            if header.pit_unknown_offset == 0 {
                return Err(FormatError::unsupported(
                    "pit unknowns",
                    "runway has no pit unknown table",
                ));
            }
            let table = TableRef {
                count: header.pit_boxes.count,
                offset: header.pit_unknown_offset,
            };
            write_records(&mut w, "pit unknowns", table, VERTEX_ROT_RECORD_SIZE, unknowns, |w, p| {
                w.write_vertex_rot(*p)
            })?
        }
        CategoryEdit::Clear => {
            w.seek(field::PIT_UNKNOWNS)?;
            w.write_u32(0)?;
        }
    }

    match &edits.pit_boxes {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(pits) => {
            write_records(
                &mut w,
                "pit boxes",
                header.pit_boxes,
                VERTEX_ROT_RECORD_SIZE,
                pits,
                |w, p| w.write_vertex_rot(*p),
            )?
        }
        CategoryEdit::Clear => zero_table(&mut w, field::PIT_BOXES)?,
    }

    match &edits.checkpoints {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(checkpoints) => write_records(
            &mut w,
            "checkpoints",
            header.checkpoints,
            CHECKPOINT_RECORD_SIZE,
            checkpoints,
            |w, c| {
                for half in [c.left, c.right] {
                    w.write_vertex(half.start)?;
                    w.write_vertex(half.end)?;
                    w.write_f32(half.track_distance)?;
                }
                Ok(())
            },
        )?,
        CategoryEdit::Clear => {
            return Err(FormatError::unsupported("checkpoints", "checkpoints cannot be cleared"));
        }
    }

    match &edits.checkpoint_list {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(_) => {
            return Err(FormatError::unsupported("checkpoint list", "only clear is supported"));
        }
        CategoryEdit::Clear => reset_list(
            &mut w,
            "checkpoint list",
            field::CHECKPOINT_LIST,
            header.checkpoint_list,
            header.checkpoints.count,
        )?,
    }

    match &edits.cut_track {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(points) => write_records(
            &mut w,
            "cut track",
            header.cut_track,
            CUT_TRACK_RECORD_SIZE,
            points,
            |w, v| {
                w.skip(CUT_TRACK_VERTEX)?;
                w.write_vertex(*v)
            },
        )?,
        CategoryEdit::Clear => zero_table(&mut w, field::CUT_TRACK)?,
    }

    match &edits.road {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(_) => {
            return Err(FormatError::unsupported("road", "only clear is supported"));
        }
        CategoryEdit::Clear => clear_road(&mut w, &header)?,
    }

    // Runs before the boundary clear, which zeroes the list again
    match &edits.boundary_list {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(_) => {
            return Err(FormatError::unsupported("boundary list", "only clear is supported"));
        }
        CategoryEdit::Clear => reset_list(
            &mut w,
            "boundary list",
            field::BOUNDARY_LIST,
            header.boundary_list,
            header.boundary_vertices.count,
        )?,
    }

    match &edits.boundaries {
        CategoryEdit::Unchanged => {}
        CategoryEdit::Replace(runs) => write_boundaries(&mut w, header.boundary_vertices, runs)?,
        CategoryEdit::Clear => {
            zero_table(&mut w, field::BOUNDARY_VERTICES)?;
            zero_table(&mut w, field::BOUNDARY_LIST)?;
        }
    }

    commit(buffer, track_offset, &staged);
    Ok(sink.finish(()))
}

fn write_bounds(w: &mut OffsetWriter<'_>, min: Vertex, max: Vertex) -> Result<()> {
    w.seek(field::BOUNDS)?;
    w.write_vertex(min)?;
    w.write_vertex(max)
}

/// Overwrite every record of `table`; the replacement must have exactly
/// `table.count` entries.
fn write_records<T>(
    w: &mut OffsetWriter<'_>,
    category: &'static str,
    table: TableRef,
    stride: usize,
    records: &[T],
    mut write: impl FnMut(&mut OffsetWriter<'_>, &T) -> Result<()>,
) -> Result<()> {
    if records.len() != table.count as usize {
        return Err(FormatError::unsupported(
            category,
            format!("table holds {} records, {} supplied", table.count, records.len()),
        ));
    }
    for (i, record) in records.iter().enumerate() {
        w.seek(table.offset as usize + i * stride)?;
        write(w, record)?;
    }
    Ok(())
}

/// Zero the count and offset words of a header table reference.
fn zero_table(w: &mut OffsetWriter<'_>, field: usize) -> Result<()> {
    w.seek(field)?;
    w.write_u32(0)?;
    w.write_u32(0)
}

/// Rewrite an index list as `0, 1, .., count - 1` within its existing
/// storage. Entries past the new count are zeroed.
fn reset_list(
    w: &mut OffsetWriter<'_>,
    category: &'static str,
    field: usize,
    list: TableRef,
    count: u32,
) -> Result<()> {
    if count > list.count {
        return Err(FormatError::unsupported(
            category,
            format!("{} entries do not fit in storage for {}", count, list.count),
        ));
    }
    if count > u32::from(u16::MAX) + 1 {
        return Err(FormatError::unsupported(
            category,
            format!("{} entries exceed the u16 index range", count),
        ));
    }

    w.seek(field)?;
    w.write_u32(count)?;
    w.seek(list.offset as usize)?;
    for i in 0..list.count {
        w.write_u16(if i < count { i as u16 } else { 0 })?;
    }
    Ok(())
}

/// Replace the road with one flat Tarmac quad spanning the whole runway.
fn clear_road(w: &mut OffsetWriter<'_>, header: &TrackHeader) -> Result<()> {
    if header.road_vertices.count < 4 || header.road_faces.count < 2 {
        return Err(FormatError::unsupported(
            "road",
            format!(
                "clearing needs storage for 4 vertices and 2 faces, runway has {} and {}",
                header.road_vertices.count, header.road_faces.count
            ),
        ));
    }

    w.seek(field::ROAD_VERTICES)?;
    w.write_u32(4)?;
    w.seek(field::ROAD_FACES)?;
    w.write_u32(2)?;

    let d = CLEARED_ROAD;
    let corners = [
        Vertex::new(-d, 0.0, -d),
        Vertex::new(d, 0.0, -d),
        Vertex::new(d, 0.0, d),
        Vertex::new(-d, 0.0, d),
    ];
    for (i, corner) in corners.iter().enumerate() {
        w.seek(header.road_vertices.offset as usize + i * ROAD_VERTEX_RECORD_SIZE)?;
        w.write_vertex(*corner)?;
    }

    let surface = RoadSurface::Tarmac.raw();
    for (i, [a, b, c]) in [[0u16, 1, 2], [0, 2, 3]].iter().enumerate() {
        w.seek(header.road_faces.offset as usize + i * ROAD_FACE_RECORD_SIZE)?;
        w.write_u8(0)?;
        w.write_u16(*a)?;
        w.write_u8(surface)?;
        w.write_u8(0)?;
        w.write_u16(*b)?;
        w.write_u8(0)?;
        w.write_u8(0)?;
        w.write_u16(*c)?;
        w.write_bytes(&[0; 5])?;
    }
    Ok(())
}

/// Rewrite the boundary table run by run with fresh sentinels.
fn write_boundaries(w: &mut OffsetWriter<'_>, table: TableRef, runs: &[Vec<Vertex>]) -> Result<()> {
    if runs.iter().any(Vec::is_empty) {
        return Err(FormatError::unsupported("boundaries", "empty boundary run"));
    }
    let total: usize = runs.iter().map(Vec::len).sum();
    if total != table.count as usize {
        return Err(FormatError::unsupported(
            "boundaries",
            format!("table holds {} records, {} supplied", table.count, total),
        ));
    }

    w.seek(table.offset as usize)?;
    for run in runs {
        let Some(sentinels) = run_sentinels(run.len()) else {
            return Err(FormatError::unsupported(
                "boundaries",
                format!("run of {} records does not fit a 16-bit sentinel", run.len()),
            ));
        };
        for (vertex, sentinel) in run.iter().zip(sentinels) {
            w.write_vertex(*vertex)?;
            w.write_i16(sentinel)?;
            w.write_u16(0)?;
        }
    }
    Ok(())
}
