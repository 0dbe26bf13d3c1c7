//! Shared buffer builders for integration tests

#![allow(dead_code)]

use glam::Vec3;
use gt_formats::io::{Endian, OffsetWriter};

pub const STRIDE: usize = 0x1C;
pub const FVF_TABLE: usize = 0x60;
pub const MESH_TABLE: usize = FVF_TABLE + 0x78;

/// Positions of one mesh inside a built model.
pub struct MeshLayout {
    pub record: usize,
    pub vertices: usize,
    pub faces: usize,
}

pub fn vertex(mesh: usize, i: usize) -> Vec3 {
    Vec3::new(mesh as f32 * 100.0 + i as f32, i as f32 * 0.5, -(i as f32))
}

/// A big-endian model with one FVF and one mesh per `(vertex_count,
/// face_count)` pair. Faces cycle through the mesh's vertices.
pub fn build_model(meshes: &[(usize, usize)]) -> (Vec<u8>, Vec<MeshLayout>) {
    let mut cursor = MESH_TABLE + meshes.len() * 0x30;
    let mut layouts = Vec::new();
    for (i, &(vertices, faces)) in meshes.iter().enumerate() {
        let vertex_offset = cursor;
        cursor += vertices * STRIDE;
        let face_offset = cursor;
        cursor = (cursor + faces * 6 + 3) & !3;
        layouts.push(MeshLayout {
            record: MESH_TABLE + i * 0x30,
            vertices: vertex_offset,
            faces: face_offset,
        });
    }

    let mut buf = vec![0xCDu8; cursor];
    let mut w = OffsetWriter::new(&mut buf);
    w.write_bytes(b"MDL3").unwrap();
    w.write_u32(cursor as u32).unwrap();
    w.write_bytes(&[0; 12]).unwrap();
    w.write_u16(meshes.len() as u16).unwrap();
    w.write_u16(0).unwrap();
    w.write_u16(1).unwrap();
    w.write_u16(0).unwrap();
    w.seek(0x38).unwrap();
    for table in [MESH_TABLE, 0, FVF_TABLE, 0, 0, 0, 0] {
        w.write_u32(table as u32).unwrap();
    }
    w.seek(FVF_TABLE).unwrap();
    w.write_bytes(&[0; 0x78]).unwrap();
    w.seek(FVF_TABLE + 0x19).unwrap();
    w.write_u8(STRIDE as u8).unwrap();

    for (i, (&(vertices, faces), layout)) in meshes.iter().zip(&layouts).enumerate() {
        w.seek(layout.record).unwrap();
        w.write_bytes(&[0; 8]).unwrap();
        w.seek(layout.record + 0x08).unwrap();
        w.write_u32(vertices as u32).unwrap();
        w.write_u32(layout.vertices as u32).unwrap();
        w.write_u32(0).unwrap();
        w.write_u32(faces as u32 * 3).unwrap();
        w.write_u32(layout.faces as u32).unwrap();
        w.write_u32(0).unwrap();
        w.write_u32(0x0000_FFFF).unwrap();
        w.write_u32(faces as u32).unwrap();
        w.write_u32(0).unwrap();
        w.write_u32(0).unwrap();

        for v in 0..vertices {
            w.seek(layout.vertices + v * STRIDE).unwrap();
            w.write_vertex(vertex(i, v)).unwrap();
        }
        w.seek(layout.faces).unwrap();
        for f in 0..faces {
            for k in 0..3 {
                w.write_u16(((f + k) % vertices.max(1)) as u16).unwrap();
            }
        }
    }
    (buf, layouts)
}

/// A pack with the offset table at 0x60 and blobs placed in the given
/// order, each aligned to 4 bytes.
pub fn build_pack(endian: Endian, blobs: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let root = 0x60;
    let mut cursor = root + 0x100;
    let mut starts = Vec::new();
    for (_, blob) in blobs {
        starts.push(cursor);
        cursor += (blob.len() + 3) & !3;
    }

    let mut buf = vec![0u8; cursor];
    let mut w = OffsetWriter::with_endian(&mut buf, endian);
    w.write_bytes(match endian {
        Endian::Big => b"PACB",
        Endian::Little => b"PACL",
    })
    .unwrap();
    w.seek(0x3C).unwrap();
    w.write_u32(1).unwrap();
    w.write_u32(0).unwrap();
    w.write_u32(0).unwrap();
    w.write_u32(root as u32).unwrap();
    w.write_u32((cursor - root) as u32).unwrap();
    for ((slot, blob), start) in blobs.iter().zip(&starts) {
        w.seek(root + slot * 4).unwrap();
        w.write_u32((start - root) as u32).unwrap();
        w.seek(*start).unwrap();
        w.write_bytes(blob).unwrap();
    }
    buf
}

/// Sentinels a run of `len` boundary records carries on disk.
pub fn sentinels(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| match i {
            _ if i + 1 == len => -(len as i16),
            0 => len as i16,
            _ => 0,
        })
        .collect()
}

/// A runway whose only populated tables are the boundary vertices and
/// one road face. `sentinels` gives the run-length field of each record.
pub fn build_track(version: u32, sentinels: &[i16]) -> Vec<u8> {
    let road_vertices = 0xD0;
    let road_faces = road_vertices + 3 * 12;
    let boundary = road_faces + 0x10;
    let total = boundary + sentinels.len() * 0x10;

    let mut buf = vec![0u8; total];
    let mut w = OffsetWriter::new(&mut buf);
    w.write_bytes(b"5WNR").unwrap();
    w.write_u32(0).unwrap();
    w.write_u32(total as u32).unwrap();
    w.write_u32(version).unwrap();
    w.seek(0x20).unwrap();
    w.write_vertex(Vec3::splat(-10.0)).unwrap();
    w.write_vertex(Vec3::splat(10.0)).unwrap();
    let tables = [
        (0x7C, 3, road_vertices),
        (0x84, 1, road_faces),
        (0x9C, sentinels.len(), boundary),
    ];
    for (field, count, offset) in tables {
        w.seek(field).unwrap();
        w.write_u32(count as u32).unwrap();
        w.write_u32(offset as u32).unwrap();
    }

    w.seek(road_vertices).unwrap();
    for i in 0..3 {
        w.write_vertex(Vec3::new(i as f32, 0.0, 0.0)).unwrap();
    }
    w.seek(road_faces + 1).unwrap();
    w.write_u16(0).unwrap();
    w.write_u8(1).unwrap();
    w.skip(1).unwrap();
    w.write_u16(1).unwrap();
    w.skip(2).unwrap();
    w.write_u16(2).unwrap();

    w.seek(boundary).unwrap();
    for (i, &sentinel) in sentinels.iter().enumerate() {
        w.write_vertex(Vec3::new(i as f32, 1.0, 2.0)).unwrap();
        w.write_i16(sentinel).unwrap();
        w.write_u16(0).unwrap();
    }
    buf
}
