//! Sequential little-endian reader over a borrowed byte buffer.
//!
//! The cursor owns nothing; every read either returns a value and advances
//! the position by the read width, or fails with
//! [`DecodeError::OutOfBounds`] and leaves the position untouched.

use crate::chunk::FourCc;
use crate::error::DecodeError;

/// A read position into an immutable byte buffer.
///
/// Invariant: `0 <= position <= data.len()`.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the read position. Positions past the end are rejected.
    pub fn set_position(&mut self, pos: usize) -> Result<(), DecodeError> {
        if pos > self.data.len() {
            return Err(DecodeError::OutOfBounds {
                position: self.pos,
                wanted: pos.saturating_sub(self.pos),
                len: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Advances past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::OutOfBounds {
                position: self.pos,
                wanted: n,
                len: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Reads a 16.16 fixed-point value stored as a little-endian 32-bit word:
    /// the unsigned fractional half comes first, the signed integer half second.
    pub fn read_fixed16_16(&mut self) -> Result<f32, DecodeError> {
        let start = self.pos;
        let fraction = self.read_u16()?;
        let integer = self.read_i16().inspect_err(|_| self.pos = start)?;
        Ok(integer as f32 + fraction as f32 / 65536.0)
    }

    /// Borrows the next `n` bytes of the buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.take(n)
    }

    /// Reads a 4-byte chunk tag.
    pub fn read_fourcc(&mut self) -> Result<FourCc, DecodeError> {
        Ok(FourCc(self.take_array()?))
    }

    /// Reads a fixed-length ASCII field of `n` bytes, stopping at the first NUL.
    ///
    /// Non-ASCII bytes are replaced rather than rejected.
    pub fn read_fixed_str(&mut self, n: usize) -> Result<String, DecodeError> {
        let raw = self.take(n)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Splits off a cursor over the next `n` bytes and advances past them.
    ///
    /// Used to confine a section decoder to its declared byte length.
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>, DecodeError> {
        Ok(ByteCursor::new(self.take(n)?))
    }
}
