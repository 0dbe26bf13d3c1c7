//! Bounds-checked offset reader

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{Endian, check_span};
use crate::error::Result;
use crate::geometry::{Vertex, VertexRot};

/// Read-only cursor over a byte buffer with absolute seeking.
#[derive(Debug, Clone)]
pub struct OffsetReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> OffsetReader<'a> {
    /// Create a big-endian reader positioned at 0
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endian(data, Endian::Big)
    }

    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
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

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute position; seeking to the end is allowed
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

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        check_span(self.pos, n, self.data.len())?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u16(bytes),
            Endian::Little => LittleEndian::read_u16(bytes),
        })
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.take(2)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_i16(bytes),
            Endian::Little => LittleEndian::read_i16(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u32(bytes),
            Endian::Little => LittleEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_i32(bytes),
            Endian::Little => LittleEndian::read_i32(bytes),
        })
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_f32(bytes),
            Endian::Little => LittleEndian::read_f32(bytes),
        })
    }

    /// Read three floats as a position
    pub fn read_vertex(&mut self) -> Result<Vertex> {
        let bytes = self.take(12)?;
        let mut xyz = [0f32; 3];
        match self.endian {
            Endian::Big => BigEndian::read_f32_into(bytes, &mut xyz),
            Endian::Little => LittleEndian::read_f32_into(bytes, &mut xyz),
        }
        Ok(Vertex::from_array(xyz))
    }

    /// Read three floats of position followed by a rotation float
    pub fn read_vertex_rot(&mut self) -> Result<VertexRot> {
        check_span(self.pos, 16, self.data.len())?;
        let position = self.read_vertex()?;
        let rotation = self.read_f32()?;
        Ok(VertexRot { position, rotation })
    }

    /// Read a null-terminated string of at most `max_len` bytes.
    ///
    /// The cursor ends after the terminator. A string with no terminator
    /// runs to `max_len` or the end of the buffer, whichever comes first.
    pub fn read_cstr(&mut self, max_len: usize) -> Result<String> {
        check_span(self.pos, 0, self.data.len())?;
        let window = &self.data[self.pos..];
        let window = &window[..window.len().min(max_len)];
        let (len, consumed) = match window.iter().position(|&b| b == 0) {
            Some(n) => (n, n + 1),
            None => (window.len(), window.len()),
        };
        let text = String::from_utf8_lossy(&window[..len]).into_owned();
        self.pos += consumed;
        Ok(text)
    }

    /// Read a null-terminated string at an absolute offset without moving the cursor
    pub fn cstr_at(&self, offset: usize, max_len: usize) -> Result<String> {
        let mut probe = self.clone();
        probe.seek(offset)?;
        probe.read_cstr(max_len)
    }
}
