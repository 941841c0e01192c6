//! Tagged-chunk framing used by the chunked map and style formats.
//!
//! ## Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Magic tag (e.g. `GBMP`) |
//! | 4 | 2 | Format version (`u16`, little-endian) |
//! | 6 | … | Chunks: `{tag: [u8; 4], length: u32, payload: [u8; length]}` until end of buffer |

use std::fmt;

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// A four-character chunk or file tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// Builds a tag from a 4-byte ASCII literal.
    pub const fn new(tag: &[u8; 4]) -> Self {
        Self(*tag)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({self})")
    }
}

/// One framed chunk: its tag, payload, and where the payload starts in the file.
#[derive(Clone, Copy, Debug)]
pub struct Chunk<'a> {
    /// Chunk tag.
    pub tag: FourCc,
    /// Payload bytes, exactly `length` long.
    pub payload: &'a [u8],
    /// Absolute offset of the first payload byte.
    pub offset: usize,
}

impl<'a> Chunk<'a> {
    /// A cursor over this chunk's payload only.
    ///
    /// Handlers read through this, so however much they consume the outer
    /// reader resumes at `offset + length`.
    pub fn cursor(&self) -> ByteCursor<'a> {
        ByteCursor::new(self.payload)
    }
}

/// Iterates over the chunks of a chunked file after its header.
pub struct ChunkReader<'a> {
    cursor: ByteCursor<'a>,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    /// Validates the magic tag and version, then positions at the first chunk.
    ///
    /// # Errors
    ///
    /// [`DecodeError::BadMagic`] or [`DecodeError::UnsupportedVersion`] on a
    /// header mismatch; [`DecodeError::OutOfBounds`] if the header is truncated.
    pub fn open(data: &'a [u8], magic: FourCc, version: u16) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(data);
        let found = cursor.read_fourcc()?;
        if found != magic {
            return Err(DecodeError::BadMagic {
                expected: magic,
                found,
            });
        }
        let found_version = cursor.read_u16()?;
        if found_version != version {
            return Err(DecodeError::UnsupportedVersion {
                expected: version as u32,
                found: found_version as u32,
            });
        }
        Ok(Self {
            cursor,
            failed: false,
        })
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>, DecodeError> {
        let tag = self.cursor.read_fourcc()?;
        let length = self.cursor.read_u32()? as usize;
        let offset = self.cursor.position();
        let payload = self.cursor.read_bytes(length)?;
        tracing::trace!(%tag, length, offset, "chunk");
        Ok(Chunk {
            tag,
            payload,
            offset,
        })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let result = self.read_chunk();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
