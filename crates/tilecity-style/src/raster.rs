//! Indexed-color pixel blocks shared by both style formats.
//!
//! Tiles are stored four abreast in 256-byte-wide pages: tile `i` starts at
//! `(i / 4) * 256 * 64 + (i % 4) * 64` and each of its 64 rows is 256 bytes
//! after the previous one. Sprite sheets use the same 256-byte row stride.

use image::RgbaImage;
use tilecity_io::{ByteCursor, DecodeError};

use crate::atlas::TILE_SIZE;
use crate::palette::Palette;

/// Row stride of tile and sprite pages in bytes.
pub const PAGE_STRIDE: usize = 256;

const TILES_PER_ROW: usize = PAGE_STRIDE / TILE_SIZE as usize;
const TILE_BYTES: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Number of whole tiles in a tile section of `len` bytes.
pub fn tile_count(len: usize) -> u32 {
    (len / TILE_BYTES) as u32
}

/// Byte offset of the first row of tile `index`.
pub fn tile_offset(index: usize) -> usize {
    (index / TILES_PER_ROW) * PAGE_STRIDE * TILE_SIZE as usize
        + (index % TILES_PER_ROW) * TILE_SIZE as usize
}

/// Decodes a `width`×`height` block starting at `offset` with row stride `stride`.
pub fn decode_block(
    data: &[u8],
    offset: usize,
    width: u32,
    height: u32,
    stride: usize,
    palette: &Palette,
) -> Result<RgbaImage, DecodeError> {
    let mut cur = ByteCursor::new(data);
    let mut image = RgbaImage::new(width, height);
    for row in 0..height {
        cur.set_position(offset + row as usize * stride)?;
        let pixels = cur.read_bytes(width as usize)?;
        for (col, &pixel) in pixels.iter().enumerate() {
            image.put_pixel(col as u32, row, palette.color(pixel));
        }
    }
    Ok(image)
}

/// Decodes tile `index` of a tile section.
pub fn decode_tile(data: &[u8], index: usize, palette: &Palette) -> Result<RgbaImage, DecodeError> {
    decode_block(data, tile_offset(index), TILE_SIZE, TILE_SIZE, PAGE_STRIDE, palette)
}
