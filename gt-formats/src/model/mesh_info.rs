//! Mesh info records: `{ params_offset: u32, index: u32 }`

use serde::{Deserialize, Serialize};

use crate::config::Limits;
use crate::error::Result;
use crate::io::OffsetReader;

/// Named parameters attached to a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshInfo {
    pub index: u32,
    /// The parameter string split on `|`
    pub params: Vec<String>,
    /// Canonical mesh name
    pub name: String,
}

impl MeshInfo {
    pub(crate) fn read(
        reader: &mut OffsetReader<'_>,
        offset: usize,
        limits: &Limits,
    ) -> Result<Self> {
        reader.seek(offset)?;
        let params_offset = reader.read_u32()?;
        let index = reader.read_u32()?;

        let raw = reader
            .cstr_at(params_offset as usize, limits.max_string_len)
            .unwrap_or_default();
        Ok(Self::from_param_string(index, &raw))
    }

    /// Split a `|`-delimited parameter string. The name is the
    /// second-to-last element, or the only element if there is one.
    pub fn from_param_string(index: u32, raw: &str) -> Self {
        let params: Vec<String> = raw.split('|').map(str::to_string).collect();
        let name = match params.len() {
            0 | 1 => params.first().cloned().unwrap_or_default(),
            n => params[n - 2].clone(),
        };
        Self {
            index,
            params,
            name,
        }
    }
}
