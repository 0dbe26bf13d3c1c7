//! Bounds-checked offset writer
//!
//! Writes overwrite bytes in place; the buffer never grows.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{Endian, check_span};
use crate::error::Result;
use crate::geometry::{Vertex, VertexRot};

/// Mutable cursor over a byte buffer with absolute seeking.
#[derive(Debug)]
pub struct OffsetWriter<'a> {
    data: &'a mut [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> OffsetWriter<'a> {
    /// Create a big-endian writer positioned at 0
    pub fn new(data: &'a mut [u8]) -> Self {
        Self::with_endian(data, Endian::Big)
    }

    pub fn with_endian(data: &'a mut [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        check_span(pos, 0, self.data.len())?;
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        check_span(self.pos, n, self.data.len())?;
        self.pos += n;
        Ok(())
    }

    fn slot(&mut self, n: usize) -> Result<&mut [u8]> {
        check_span(self.pos, n, self.data.len())?;
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.data[start..start + n])
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.slot(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.slot(1)?[0] = value;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        let endian = self.endian;
        let buf = self.slot(2)?;
        match endian {
            Endian::Big => BigEndian::write_u16(buf, value),
            Endian::Little => LittleEndian::write_u16(buf, value),
        }
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        let endian = self.endian;
        let buf = self.slot(2)?;
        match endian {
            Endian::Big => BigEndian::write_i16(buf, value),
            Endian::Little => LittleEndian::write_i16(buf, value),
        }
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let endian = self.endian;
        let buf = self.slot(4)?;
        match endian {
            Endian::Big => BigEndian::write_u32(buf, value),
            Endian::Little => LittleEndian::write_u32(buf, value),
        }
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        let endian = self.endian;
        let buf = self.slot(4)?;
        match endian {
            Endian::Big => BigEndian::write_f32(buf, value),
            Endian::Little => LittleEndian::write_f32(buf, value),
        }
        Ok(())
    }

    pub fn write_vertex(&mut self, vertex: Vertex) -> Result<()> {
        let endian = self.endian;
        let buf = self.slot(12)?;
        let xyz = vertex.to_array();
        match endian {
            Endian::Big => BigEndian::write_f32_into(&xyz, buf),
            Endian::Little => LittleEndian::write_f32_into(&xyz, buf),
        }
        Ok(())
    }

    pub fn write_vertex_rot(&mut self, value: VertexRot) -> Result<()> {
        check_span(self.pos, 16, self.data.len())?;
        self.write_vertex(value.position)?;
        self.write_f32(value.rotation)
    }
}
