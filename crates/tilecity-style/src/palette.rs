//! 256-color palettes and the two-level palette indirection.
//!
//! Both style formats store their physical palettes in 64 KiB pages of 64
//! interleaved palettes: color `c` of palette `p` lives at
//! `page(p) + (c * 64 + p % 64) * 4`, as little-endian BGRA.

use image::Rgba;
use tilecity_io::{ByteCursor, DecodeError};

/// Colors per palette.
pub const PALETTE_COLORS: usize = 256;

/// Bytes of one palette once de-interleaved.
pub const PALETTE_BYTES: usize = PALETTE_COLORS * 4;

/// Palettes interleaved in one 64 KiB page.
pub const PALETTES_PER_PAGE: usize = 64;

/// Size of a palette page.
pub const PALETTE_PAGE_BYTES: usize = PALETTES_PER_PAGE * PALETTE_BYTES;

/// One 256-entry RGBA color table. Entry 0 is always transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(pub [[u8; 4]; PALETTE_COLORS]);

impl Default for Palette {
    fn default() -> Self {
        Self([[0; 4]; PALETTE_COLORS])
    }
}

impl Palette {
    /// The RGBA color for a pixel value. Pixel value 0 yields alpha 0.
    #[inline]
    pub fn color(&self, pixel: u8) -> Rgba<u8> {
        if pixel == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba(self.0[pixel as usize])
    }
}

/// Reads `count` palettes from the paged, interleaved layout.
///
/// Alpha is forced to 255; transparency comes from pixel value 0 alone.
pub fn read_paged_palettes(data: &[u8], count: usize) -> Result<Vec<Palette>, DecodeError> {
    let mut cur = ByteCursor::new(data);
    let mut palettes = Vec::with_capacity(count);
    for p in 0..count {
        let page = (p / PALETTES_PER_PAGE) * PALETTE_PAGE_BYTES;
        let mut palette = Palette::default();
        for (c, entry) in palette.0.iter_mut().enumerate() {
            cur.set_position(page + (c * PALETTES_PER_PAGE + p % PALETTES_PER_PAGE) * 4)?;
            let b = cur.read_u8()?;
            let g = cur.read_u8()?;
            let r = cur.read_u8()?;
            *entry = [r, g, b, 255];
        }
        palettes.push(palette);
    }
    Ok(palettes)
}

/// Maps logical tile and sprite slots to physical palettes.
///
/// `index` is the virtual palette table from the style file. Tiles occupy the
/// first `tile_count * tile_stride` slots (four light remaps per tile in the
/// legacy format, one in the chunked format); sprites start at `sprite_base`.
#[derive(Clone, Debug)]
pub struct PaletteContainer {
    palettes: Vec<Palette>,
    index: Vec<u16>,
    tile_stride: usize,
    sprite_base: usize,
}

impl PaletteContainer {
    pub fn new(palettes: Vec<Palette>, index: Vec<u16>, tile_stride: usize, sprite_base: usize) -> Self {
        Self {
            palettes,
            index,
            tile_stride: tile_stride.max(1),
            sprite_base,
        }
    }

    /// Palette for `tile` at lighting `remap` level.
    ///
    /// Formats with a single remap per tile ignore `remap`.
    ///
    /// # Panics
    ///
    /// If the tile slot or the palette it names is out of range. Callers
    /// bound `tile` by the decoded tile count.
    pub fn tile_palette(&self, tile: usize, remap: u8) -> &Palette {
        let level = (remap as usize).min(self.tile_stride - 1);
        self.slot(tile * self.tile_stride + level)
    }

    /// Palette for the sprite at `ordinal` past the sprite base.
    ///
    /// # Panics
    ///
    /// As [`Self::tile_palette`].
    pub fn sprite_palette(&self, ordinal: usize) -> &Palette {
        self.slot(self.sprite_base + ordinal)
    }

    /// Like [`Self::tile_palette`] but `None` when out of range.
    pub fn try_tile_palette(&self, tile: usize, remap: u8) -> Option<&Palette> {
        let level = (remap as usize).min(self.tile_stride - 1);
        self.try_slot(tile * self.tile_stride + level)
    }

    /// Like [`Self::sprite_palette`] but `None` when out of range.
    pub fn try_sprite_palette(&self, ordinal: usize) -> Option<&Palette> {
        self.try_slot(self.sprite_base + ordinal)
    }

    fn slot(&self, slot: usize) -> &Palette {
        &self.palettes[self.index[slot] as usize]
    }

    fn try_slot(&self, slot: usize) -> Option<&Palette> {
        let physical = *self.index.get(slot)?;
        self.palettes.get(physical as usize)
    }

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    /// Entries in the virtual palette index.
    pub fn slot_count(&self) -> usize {
        self.index.len()
    }

    /// Remap levels stored per tile.
    pub fn tile_stride(&self) -> usize {
        self.tile_stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two pages worth of palettes where palette `p` color `c` is BGRA `(c, p, 7, 0)`.
    fn paged(count: usize) -> Vec<u8> {
        let pages = count.div_ceil(PALETTES_PER_PAGE);
        let mut data = vec![0u8; pages * PALETTE_PAGE_BYTES];
        for p in 0..count {
            for c in 0..PALETTE_COLORS {
                let at = (p / 64) * PALETTE_PAGE_BYTES + (c * 64 + p % 64) * 4;
                data[at..at + 4].copy_from_slice(&[c as u8, p as u8, 7, 0]);
            }
        }
        data
    }

    #[test]
    fn test_paged_palettes_deinterleave() {
        let palettes = read_paged_palettes(&paged(70), 70).unwrap();
        assert_eq!(palettes.len(), 70);
        assert_eq!(palettes[3].0[200], [7, 3, 200, 255]);
        assert_eq!(palettes[69].0[1], [7, 69, 1, 255]);
    }

    #[test]
    fn test_paged_palettes_truncated() {
        let data = paged(64);
        assert!(matches!(
            read_paged_palettes(&data, 65),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_pixel_zero_is_transparent() {
        let mut palette = Palette::default();
        palette.0[0] = [255, 255, 255, 255];
        palette.0[9] = [1, 2, 3, 255];
        assert_eq!(palette.color(0), Rgba([0, 0, 0, 0]));
        assert_eq!(palette.color(9), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_tile_and_sprite_slots() {
        let palettes: Vec<Palette> = (0..4)
            .map(|i| {
                let mut p = Palette::default();
                p.0[1] = [i, 0, 0, 255];
                p
            })
            .collect();
        // two tiles with four remaps each, then one sprite slot
        let index = vec![0, 1, 2, 3, 3, 2, 1, 0, 2];
        let container = PaletteContainer::new(palettes, index, 4, 8);

        assert_eq!(container.tile_palette(0, 2).0[1][0], 2);
        assert_eq!(container.tile_palette(1, 0).0[1][0], 3);
        assert_eq!(container.tile_palette(1, 3).0[1][0], 0);
        assert_eq!(container.sprite_palette(0).0[1][0], 2);
        assert!(container.try_sprite_palette(1).is_none());
        assert!(container.try_tile_palette(2, 0).is_some());
        assert!(container.try_tile_palette(3, 0).is_none());
    }

    #[test]
    fn test_single_remap_ignores_level() {
        let container = PaletteContainer::new(vec![Palette::default(); 2], vec![1, 0], 1, 1);
        assert_eq!(container.tile_stride(), 1);
        assert_eq!(container.slot_count(), 2);
        assert!(std::ptr::eq(container.tile_palette(0, 3), container.tile_palette(0, 0)));
    }
}
