//! Synthetic buffers for unit tests

use crate::geometry::VertexRot;
use crate::io::{Endian, OffsetWriter};
use crate::track::boundary::run_sentinels;
use crate::track::{Checkpoint, CheckpointHalf, TrackVersion};
use glam::Vec3;

pub(crate) const FILLER: u8 = 0xAB;

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

pub(crate) struct TestMesh {
    pub fvf: u16,
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u16; 3]>,
    pub bbox: bool,
}

impl TestMesh {
    pub fn new(fvf: u16, vertex_count: usize, faces: Vec<[u16; 3]>) -> Self {
        Self {
            fvf,
            vertices: (0..vertex_count)
                .map(|i| Vec3::new(i as f32, i as f32 * 2.0, -(i as f32)))
                .collect(),
            faces,
            bbox: true,
        }
    }
}

/// Builds a big-endian MDL3 model.
pub(crate) struct TestModel {
    pub strides: Vec<u8>,
    pub meshes: Vec<TestMesh>,
    pub names: Vec<&'static str>,
}

/// Absolute positions chosen by [`TestModel::build`].
pub(crate) struct ModelLayout {
    pub mesh_table: usize,
    pub vertex_offsets: Vec<usize>,
    pub face_offsets: Vec<usize>,
}

impl TestModel {
    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub fn build_with_layout(&self) -> (Vec<u8>, ModelLayout) {
        let fvf_table = 0x60;
        let mesh_info_table = fvf_table + self.strides.len() * 0x78;
        let mesh_table = mesh_info_table + self.names.len() * 8;
        let mut cursor = mesh_table + self.meshes.len() * 0x30;

        let fvf_names: Vec<String> = (0..self.strides.len()).map(|i| format!("fvf{}", i)).collect();
        let info_strings: Vec<String> = self
            .names
            .iter()
            .map(|name| format!("|model|{}|shape", name))
            .collect();
        let mut string_offsets = Vec::new();
        for s in fvf_names.iter().chain(info_strings.iter()) {
            string_offsets.push(cursor);
            cursor += s.len() + 1;
        }
        cursor = align4(cursor);

        let mut vertex_offsets = Vec::new();
        for mesh in &self.meshes {
            vertex_offsets.push(cursor);
            cursor += mesh.vertices.len() * self.strides[mesh.fvf as usize] as usize;
        }
        let mut face_offsets = Vec::new();
        for mesh in &self.meshes {
            face_offsets.push(cursor);
            cursor = align4(cursor + mesh.faces.len() * 6);
        }
        let mut bbox_offsets = Vec::new();
        for mesh in &self.meshes {
            bbox_offsets.push(if mesh.bbox { cursor } else { 0 });
            if mesh.bbox {
                cursor += 96;
            }
        }
        let texture_set = cursor;
        let total = texture_set + 0x10;

        let mut buf = vec![0u8; total];
        let mut w = OffsetWriter::new(&mut buf);
        w.write_bytes(b"MDL3").unwrap();
        w.write_u32(total as u32).unwrap();
        w.seek(0x14).unwrap();
        w.write_u16(self.meshes.len() as u16).unwrap();
        w.write_u16(self.names.len() as u16).unwrap();
        w.write_u16(self.strides.len() as u16).unwrap();
        w.write_u16(0).unwrap();
        w.seek(0x38).unwrap();
        for table in [mesh_table, mesh_info_table, fvf_table, 0, texture_set, 0, 0] {
            w.write_u32(table as u32).unwrap();
        }

        for (i, stride) in self.strides.iter().enumerate() {
            w.seek(fvf_table + i * 0x78).unwrap();
            w.write_u32(string_offsets[i] as u32).unwrap();
            w.seek(fvf_table + i * 0x78 + 0x19).unwrap();
            w.write_u8(*stride).unwrap();
        }
        for i in 0..self.names.len() {
            w.seek(mesh_info_table + i * 8).unwrap();
            w.write_u32(string_offsets[self.strides.len() + i] as u32).unwrap();
            w.write_u32(i as u32).unwrap();
        }
        for (s, &offset) in fvf_names.iter().chain(info_strings.iter()).zip(&string_offsets) {
            w.seek(offset).unwrap();
            w.write_bytes(s.as_bytes()).unwrap();
        }

        for (i, mesh) in self.meshes.iter().enumerate() {
            let stride = self.strides[mesh.fvf as usize] as usize;
            w.seek(mesh_table + i * 0x30).unwrap();
            w.write_u8(0).unwrap();
            w.write_u8(0).unwrap();
            w.write_u16(mesh.fvf).unwrap();
            w.write_u16(0).unwrap();
            w.write_u16(0).unwrap();
            w.write_u32(mesh.vertices.len() as u32).unwrap();
            w.write_u32(if mesh.vertices.is_empty() { 0 } else { vertex_offsets[i] as u32 })
                .unwrap();
            w.write_u32(0).unwrap();
            w.write_u32(mesh.faces.len() as u32 * 3).unwrap();
            w.write_u32(if mesh.faces.is_empty() { 0 } else { face_offsets[i] as u32 })
                .unwrap();
            w.write_u32(0).unwrap();
            w.write_u32(0x0000_FFFF).unwrap();
            w.write_u32(mesh.faces.len() as u32).unwrap();
            w.write_u32(bbox_offsets[i] as u32).unwrap();
            w.write_u32(0).unwrap();

            for (v, vertex) in mesh.vertices.iter().enumerate() {
                w.seek(vertex_offsets[i] + v * stride).unwrap();
                w.write_vertex(*vertex).unwrap();
                w.write_bytes(&vec![FILLER; stride - 12]).unwrap();
            }
            w.seek(face_offsets[i]).unwrap();
            for face in &mesh.faces {
                for index in face {
                    w.write_u16(*index).unwrap();
                }
            }
            if mesh.bbox {
                w.seek(bbox_offsets[i]).unwrap();
                for corner in 0..8 {
                    w.write_vertex(Vec3::splat(corner as f32)).unwrap();
                }
            }
        }
        w.seek(texture_set).unwrap();
        w.write_bytes(b"TXS3").unwrap();

        (
            buf,
            ModelLayout {
                mesh_table,
                vertex_offsets,
                face_offsets,
            },
        )
    }
}

/// Wrap blobs into a pack. `slots` pairs a slot index with its blob.
pub(crate) fn build_pack(endian: Endian, slots: &[(usize, Vec<u8>)]) -> Vec<u8> {
    let root_start = 0x60;
    let mut cursor = root_start + 64 * 4;
    let mut offsets = Vec::new();
    for (slot, blob) in slots {
        offsets.push((*slot, cursor));
        cursor += align4(blob.len());
    }

    let mut buf = vec![0u8; cursor];
    let mut w = OffsetWriter::with_endian(&mut buf, endian);
    w.write_bytes(if endian == Endian::Big { b"PACB" } else { b"PACL" })
        .unwrap();
    w.seek(0x3C).unwrap();
    w.write_u32(1).unwrap();
    w.write_u32(0).unwrap();
    w.write_u32(0).unwrap();
    w.write_u32(root_start as u32).unwrap();
    w.write_u32((cursor - root_start) as u32).unwrap();
    for (slot, offset) in &offsets {
        w.seek(root_start + slot * 4).unwrap();
        w.write_u32((offset - root_start) as u32).unwrap();
    }
    for ((_, blob), (_, offset)) in slots.iter().zip(&offsets) {
        w.seek(*offset).unwrap();
        w.write_bytes(blob).unwrap();
    }
    buf
}

/// Builds a big-endian runway. Boundary runs are encoded with their
/// sentinels; vertex positions are derived from the record index.
pub(crate) struct TestTrack {
    pub version: u32,
    pub grid: Vec<VertexRot>,
    pub checkpoints: Vec<Checkpoint>,
    pub checkpoint_list: Vec<u16>,
    pub cut_track: Vec<Vec3>,
    pub road_vertices: Vec<Vec3>,
    pub road_faces: Vec<([u16; 3], u8)>,
    pub boundary_runs: Vec<usize>,
    pub boundary_list: Vec<u16>,
    pub pit_boxes: Vec<VertexRot>,
    pub pit_unknowns: Option<Vec<VertexRot>>,
}

impl TestTrack {
    pub fn sample() -> Self {
        let half = |n: f32| CheckpointHalf {
            start: Vec3::new(n, 0.0, 0.0),
            end: Vec3::new(n, 0.0, 10.0),
            track_distance: n * 100.0,
        };
        Self {
            version: TrackVersion::PS2_RAW,
            grid: (0..4).map(|i| VertexRot::new(i as f32, 1.0, 2.0, 0.5)).collect(),
            checkpoints: (0..3)
                .map(|i| Checkpoint {
                    left: half(i as f32),
                    right: half(i as f32 + 0.5),
                })
                .collect(),
            checkpoint_list: vec![2, 0, 1, 7],
            cut_track: vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
            road_vertices: (0..6).map(|i| Vec3::new(i as f32, 0.0, i as f32)).collect(),
            road_faces: vec![([0, 1, 2], 1), ([2, 3, 4], 4), ([3, 4, 5], 1)],
            boundary_runs: vec![3, 1, 5],
            boundary_list: vec![5, 4, 3, 2, 1, 0, 9, 9, 9, 9],
            pit_boxes: (0..2).map(|i| VertexRot::new(0.0, i as f32, 0.0, 1.5)).collect(),
            pit_unknowns: Some((0..2).map(|i| VertexRot::new(9.0, i as f32, 9.0, 0.0)).collect()),
        }
    }

    pub fn boundary_count(&self) -> usize {
        self.boundary_runs.iter().sum()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut cursor = 0xD0;
        let mut place = |len: usize| {
            let at = cursor;
            cursor = align4(cursor + len);
            at
        };
        let grid = place(self.grid.len() * 0x10);
        let checkpoints = place(self.checkpoints.len() * 0x38);
        let checkpoint_list = place(self.checkpoint_list.len() * 2);
        let cut_track = place(self.cut_track.len() * 0x20);
        let road_vertices = place(self.road_vertices.len() * 12);
        let road_faces = place(self.road_faces.len() * 0x10);
        let boundary = place(self.boundary_count() * 0x10);
        let boundary_list = place(self.boundary_list.len() * 2);
        let pit_boxes = place(self.pit_boxes.len() * 0x10);
        let pit_unknowns = place(self.pit_unknowns.as_ref().map_or(0, |u| u.len() * 0x10));
        let total = place(0);

        let mut buf = vec![0u8; total];
        let mut w = OffsetWriter::new(&mut buf);
        w.write_bytes(b"5WNR").unwrap();
        w.write_u32(0).unwrap();
        w.write_u32(total as u32).unwrap();
        w.write_u32(self.version).unwrap();
        w.seek(0x14).unwrap();
        w.write_f32(1234.5).unwrap();
        w.seek(0x20).unwrap();
        w.write_vertex(Vec3::splat(-500.0)).unwrap();
        w.write_vertex(Vec3::splat(500.0)).unwrap();

        let tables = [
            (0x4C, self.grid.len(), grid),
            (0x54, self.checkpoints.len(), checkpoints),
            (0x5C, self.checkpoint_list.len(), checkpoint_list),
            (0x74, self.cut_track.len(), cut_track),
            (0x7C, self.road_vertices.len(), road_vertices),
            (0x84, self.road_faces.len(), road_faces),
            (0x9C, self.boundary_count(), boundary),
            (0xA4, self.boundary_list.len(), boundary_list),
            (0xAC, self.pit_boxes.len(), pit_boxes),
        ];
        for (field, count, offset) in tables {
            w.seek(field).unwrap();
            w.write_u32(count as u32).unwrap();
            w.write_u32(if count == 0 { 0 } else { offset as u32 }).unwrap();
        }
        w.seek(0xC0).unwrap();
        w.write_u32(if self.pit_unknowns.is_some() { pit_unknowns as u32 } else { 0 })
            .unwrap();

        w.seek(grid).unwrap();
        for g in &self.grid {
            w.write_vertex_rot(*g).unwrap();
        }
        w.seek(checkpoints).unwrap();
        for c in &self.checkpoints {
            for half in [c.left, c.right] {
                w.write_vertex(half.start).unwrap();
                w.write_vertex(half.end).unwrap();
                w.write_f32(half.track_distance).unwrap();
            }
        }
        w.seek(checkpoint_list).unwrap();
        for i in &self.checkpoint_list {
            w.write_u16(*i).unwrap();
        }
        for (i, v) in self.cut_track.iter().enumerate() {
            w.seek(cut_track + i * 0x20).unwrap();
            w.write_bytes(&[FILLER; 8]).unwrap();
            w.write_vertex(*v).unwrap();
            w.write_bytes(&[FILLER; 12]).unwrap();
        }
        w.seek(road_vertices).unwrap();
        for v in &self.road_vertices {
            w.write_vertex(*v).unwrap();
        }
        for (i, ([a, b, c], surface)) in self.road_faces.iter().enumerate() {
            w.seek(road_faces + i * 0x10 + 1).unwrap();
            w.write_u16(*a).unwrap();
            w.write_u8(*surface).unwrap();
            w.skip(1).unwrap();
            w.write_u16(*b).unwrap();
            w.skip(2).unwrap();
            w.write_u16(*c).unwrap();
            w.skip(1).unwrap();
            w.write_u16(0x1234).unwrap();
        }
        w.seek(boundary).unwrap();
        let mut n = 0;
        for &len in &self.boundary_runs {
            for sentinel in run_sentinels(len).unwrap() {
                w.write_vertex(Vec3::new(n as f32, 0.0, -(n as f32))).unwrap();
                w.write_i16(sentinel).unwrap();
                w.write_u16(0x00EE).unwrap();
                n += 1;
            }
        }
        w.seek(boundary_list).unwrap();
        for i in &self.boundary_list {
            w.write_u16(*i).unwrap();
        }
        w.seek(pit_boxes).unwrap();
        for p in &self.pit_boxes {
            w.write_vertex_rot(*p).unwrap();
        }
        if let Some(unknowns) = &self.pit_unknowns {
            w.seek(pit_unknowns).unwrap();
            for p in unknowns {
                w.write_vertex_rot(*p).unwrap();
            }
        }
        buf
    }
}
