//! MDL3 model decoder
//!
//! # Header layout
//!
//! ```text
//! 0x00  magic            "MDL3"
//! 0x04  declared_size    i32   unreliable inside packs
//! 0x14  mesh_count       u16
//! 0x16  mesh_info_count  u16
//! 0x18  fvf_count        u16
//! 0x1A  bone_count       u16
//! 0x38  mesh_table       u32   0x30-byte records
//! 0x3C  mesh_info_table  u32   0x08-byte records
//! 0x40  fvf_table        u32   0x78-byte records
//! 0x44  unknown_table    u32
//! 0x48  texture_set      u32   embedded TXS3
//! 0x4C  shader_table     u32
//! 0x50  bone_table       u32
//! ```
//!
//! All offsets are relative to the start of the model.

pub mod fvf;
pub mod mesh;
pub mod mesh_info;

pub use fvf::Fvf;
pub use mesh::{Mesh, MeshRecord};
pub use mesh_info::MeshInfo;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::{DecodeConfig, Limits};
use crate::error::{FormatError, Result};
use crate::io::{Endian, OffsetReader, check_span};
use crate::warning::{Decoded, Warning, WarningSink};

/// Model signature
pub const MDL3_MAGIC: &[u8; 4] = b"MDL3";
/// Size of the fixed header
pub const HEADER_SIZE: usize = 0x54;
pub const FVF_RECORD_SIZE: usize = 0x78;
pub const MESH_INFO_RECORD_SIZE: usize = 0x08;
pub const MESH_RECORD_SIZE: usize = 0x30;

const COUNTS_OFFSET: usize = 0x14;
const TABLES_OFFSET: usize = 0x38;

/// Counts and table addresses from the model header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelHeader {
    pub declared_size: i32,
    pub mesh_count: u16,
    pub mesh_info_count: u16,
    pub fvf_count: u16,
    pub bone_count: u16,
    pub mesh_table: u32,
    pub mesh_info_table: u32,
    pub fvf_table: u32,
    pub unknown_table: u32,
    pub texture_set: u32,
    pub shader_table: u32,
    pub bone_table: u32,
}

impl ModelHeader {
    /// Read the header of a model whose magic has already been checked.
    pub(crate) fn read(reader: &mut OffsetReader<'_>) -> Result<Self> {
        check_span(0, HEADER_SIZE, reader.len())?;
        reader.seek(4)?;
        let declared_size = reader.read_i32()?;

        reader.seek(COUNTS_OFFSET)?;
        let mesh_count = reader.read_u16()?;
        let mesh_info_count = reader.read_u16()?;
        let fvf_count = reader.read_u16()?;
        let bone_count = reader.read_u16()?;

        reader.seek(TABLES_OFFSET)?;
        Ok(Self {
            declared_size,
            mesh_count,
            mesh_info_count,
            fvf_count,
            bone_count,
            mesh_table: reader.read_u32()?,
            mesh_info_table: reader.read_u32()?,
            fvf_table: reader.read_u32()?,
            unknown_table: reader.read_u32()?,
            texture_set: reader.read_u32()?,
            shader_table: reader.read_u32()?,
            bone_table: reader.read_u32()?,
        })
    }

    /// Absolute position of mesh record `index`.
    pub fn mesh_record_offset(&self, index: usize) -> usize {
        self.mesh_table as usize + index * MESH_RECORD_SIZE
    }

    fn check_tables(&self, len: usize, limits: &Limits) -> Result<()> {
        let tables = [
            (self.fvf_table, self.fvf_count, FVF_RECORD_SIZE),
            (self.mesh_info_table, self.mesh_info_count, MESH_INFO_RECORD_SIZE),
            (self.mesh_table, self.mesh_count, MESH_RECORD_SIZE),
        ];
        for (offset, count, stride) in tables {
            if !limits.allows(u32::from(count)) {
                return Err(FormatError::OutOfBounds {
                    offset: offset as usize,
                    len: count as usize * stride,
                    buffer_len: len,
                });
            }
            if count > 0 {
                check_span(offset as usize, count as usize * stride, len)?;
            }
        }
        Ok(())
    }
}

/// A decoded MDL3 model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub header: ModelHeader,
    pub fvfs: Vec<Fvf>,
    /// Mesh info keyed by table position
    pub mesh_info: HashMap<u32, MeshInfo>,
    pub meshes: Vec<Mesh>,
}

impl Model {
    /// Decode a big-endian model with default limits.
    pub fn decode(blob: &[u8]) -> Result<Decoded<Model>> {
        Self::decode_with(blob, &DecodeConfig::default())
    }

    pub fn decode_with(blob: &[u8], config: &DecodeConfig) -> Result<Decoded<Model>> {
        Self::decode_with_endian(blob, Endian::Big, config)
    }

    /// Decode a model.
    ///
    /// A blob without the `MDL3` signature yields an empty model. A header
    /// or table that runs past the blob is an error; problems inside a
    /// single mesh only empty that mesh.
    pub fn decode_with_endian(
        blob: &[u8],
        endian: Endian,
        config: &DecodeConfig,
    ) -> Result<Decoded<Model>> {
        let mut reader = OffsetReader::with_endian(blob, endian);
        match reader.read_magic() {
            Ok(magic) if &magic == MDL3_MAGIC => {}
            _ => {
                tracing::debug!("model: no MDL3 signature, returning empty model");
                return Ok(Decoded::clean(Model::default()));
            }
        }

        let limits = &config.limits;
        let mut sink = WarningSink::new();
        let header = ModelHeader::read(&mut reader)?;
        if usize::try_from(header.declared_size).ok() != Some(blob.len()) {
            sink.push(Warning::SizeMismatch {
                declared: header.declared_size,
                actual: blob.len(),
            });
        }
        header.check_tables(blob.len(), limits)?;
        tracing::debug!(
            "model: {} meshes, {} mesh infos, {} FVFs",
            header.mesh_count,
            header.mesh_info_count,
            header.fvf_count
        );

        let fvfs = (0..header.fvf_count as usize)
            .map(|i| {
                Fvf::read(
                    &mut reader,
                    header.fvf_table as usize + i * FVF_RECORD_SIZE,
                    limits,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut mesh_info = HashMap::with_capacity(header.mesh_info_count as usize);
        for i in 0..header.mesh_info_count as usize {
            let offset = header.mesh_info_table as usize + i * MESH_INFO_RECORD_SIZE;
            mesh_info.insert(i as u32, MeshInfo::read(&mut reader, offset, limits)?);
        }

        let mut meshes = Vec::with_capacity(header.mesh_count as usize);
        for i in 0..header.mesh_count as usize {
            let record = MeshRecord::read(&mut reader, header.mesh_record_offset(i))?;
            meshes.push(mesh::decode_mesh(&mut reader, i, record, &fvfs, limits, &mut sink));
        }

        if header.texture_set as usize >= blob.len() {
            sink.push(Warning::TextureTableOutOfRange {
                offset: header.texture_set,
            });
        }

        Ok(sink.finish(Model {
            header,
            fvfs,
            mesh_info,
            meshes,
        }))
    }

    /// True for the soft-fail result of a blob with no signature.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.fvfs.is_empty() && self.mesh_info.is_empty()
    }

    /// Canonical name of a mesh, from the mesh-info entry that indexes it.
    pub fn mesh_name(&self, mesh: usize) -> Option<&str> {
        self.mesh_info
            .values()
            .find(|info| info.index as usize == mesh)
            .map(|info| info.name.as_str())
    }

    /// Number of meshes with at least one rejected face triple.
    pub fn invalid_mesh_count(&self) -> usize {
        self.meshes.iter().filter(|mesh| mesh.has_invalid_faces).count()
    }
}
