//! Error taxonomy for asset decoding.

use crate::chunk::FourCc;

/// Errors that abort decoding of a map or style buffer.
///
/// Every variant is fatal: a decoder that returns one of these never hands a
/// partially built asset to its caller. Unrecognized chunk tags are not in
/// this list; they are logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A read would cross the end of the buffer (truncated or corrupt input).
    #[error("read of {wanted} bytes at offset {position} exceeds buffer length {len}")]
    OutOfBounds {
        /// Cursor position at the start of the failed read.
        position: usize,
        /// Number of bytes the read needed.
        wanted: usize,
        /// Total buffer length.
        len: usize,
    },

    /// The 4-byte magic tag of a chunked file does not match.
    #[error("bad magic tag: expected {expected}, found {found}")]
    BadMagic {
        /// Magic the decoder accepts.
        expected: FourCc,
        /// Magic found in the buffer.
        found: FourCc,
    },

    /// The header version is not the one this decoder understands.
    #[error("unsupported format version: expected {expected}, found {found}")]
    UnsupportedVersion {
        /// Version the decoder accepts.
        expected: u32,
        /// Version found in the buffer.
        found: u32,
    },

    /// A grid cell points at a column entry that does not exist.
    #[error("grid cell ({x}, {y}) references missing column at offset {offset}")]
    InvalidStackPointer {
        /// Grid column.
        x: usize,
        /// Grid row.
        y: usize,
        /// Column-table offset the cell pointed at.
        offset: u32,
    },

    /// A column references a block past the end of the block table.
    #[error("block index {index} out of range (block table holds {count})")]
    InvalidBlockIndex {
        /// Referenced block index.
        index: u32,
        /// Number of decoded blocks.
        count: usize,
    },

    /// A chunk the decoder cannot work without is absent.
    #[error("missing mandatory chunk {0}")]
    MissingChunk(FourCc),

    /// A record straddles the end of its declared section.
    #[error("record overruns the {section} section")]
    SectionOverrun {
        /// Human-readable section name.
        section: &'static str,
    },

    /// The sprite canvas has no room left for a sprite.
    #[error("sprite {index} ({width}x{height}) does not fit in the sprite atlas")]
    SpriteAtlasFull {
        /// Logical sprite index.
        index: usize,
        /// Sprite width in pixels.
        width: u32,
        /// Sprite height in pixels.
        height: u32,
    },
}
