//! Tile and sprite atlases: decoded RGBA images packed into single textures.
//!
//! Tiles are fixed 64×64 cells laid out in a grid, each surrounded by a
//! margin whose pixels replicate the tile's outermost row and column so that
//! filtering never samples a neighbouring cell. Sprites vary in size and are
//! shelf-packed into a square canvas, tallest first.

use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilecity_io::DecodeError;

/// Width and height of one style tile in pixels.
pub const TILE_SIZE: u32 = 64;

// ---------------------------------------------------------------------------
// AtlasConfig
// ---------------------------------------------------------------------------

/// Errors returned when validating an [`AtlasConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasConfigError {
    #[error("tile atlas width {width} cannot hold a single {cell}px cell")]
    TileAtlasTooNarrow { width: u32, cell: u32 },

    #[error("sprite atlas size {0} is not a power of 2")]
    SpriteAtlasNotPowerOfTwo(u32),
}

/// Atlas layout parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Width of the tile atlas in pixels. Height grows to fit.
    pub tile_atlas_width: u32,
    /// Replicated border around each tile cell, in pixels.
    pub tile_margin: u32,
    /// Width and height of the square sprite canvas in pixels.
    pub sprite_atlas_size: u32,
    /// Gap left between packed sprites, in pixels.
    pub sprite_padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            tile_atlas_width: 4096,
            tile_margin: 1,
            sprite_atlas_size: 2048,
            sprite_padding: 1,
        }
    }
}

impl AtlasConfig {
    /// Side of one tile cell including its margins.
    pub fn cell_size(&self) -> u32 {
        TILE_SIZE + 2 * self.tile_margin
    }

    /// Number of tile cells per atlas row.
    pub fn cells_per_row(&self) -> u32 {
        self.tile_atlas_width / self.cell_size()
    }

    pub fn validate(&self) -> Result<(), AtlasConfigError> {
        if self.cells_per_row() == 0 {
            return Err(AtlasConfigError::TileAtlasTooNarrow {
                width: self.tile_atlas_width,
                cell: self.cell_size(),
            });
        }
        if !self.sprite_atlas_size.is_power_of_two() {
            return Err(AtlasConfigError::SpriteAtlasNotPowerOfTwo(
                self.sprite_atlas_size,
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TexRect
// ---------------------------------------------------------------------------

/// A normalized texture rectangle: origin plus extent in `[0, 1]` UV space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TexRect {
    /// Top-left UV.
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right UV.
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }
}

// ---------------------------------------------------------------------------
// Tile atlas
// ---------------------------------------------------------------------------

/// The packed tile atlas.
#[derive(Clone, Debug)]
pub struct TileAtlas {
    pub image: RgbaImage,
    cell_size: u32,
    margin: u32,
    cells_per_row: u32,
    cell_count: u32,
}

impl TileAtlas {
    /// Pixel origin of the tile body (inside the margin) of `cell`.
    pub fn cell_origin(&self, cell: u32) -> (u32, u32) {
        let col = cell % self.cells_per_row;
        let row = cell / self.cells_per_row;
        (
            col * self.cell_size + self.margin,
            row * self.cell_size + self.margin,
        )
    }

    /// Normalized rectangle of the tile body of `cell`, margins excluded.
    pub fn tex_rect(&self, cell: u32) -> TexRect {
        let (px, py) = self.cell_origin(cell);
        let w = self.image.width() as f32;
        let h = self.image.height() as f32;
        TexRect {
            x: px as f32 / w,
            y: py as f32 / h,
            width: TILE_SIZE as f32 / w,
            height: TILE_SIZE as f32 / h,
        }
    }

    /// Number of cells written.
    pub fn cell_count(&self) -> u32 {
        self.cell_count
    }
}

/// Assembles a [`TileAtlas`] cell by cell.
pub struct TileAtlasBuilder {
    image: RgbaImage,
    cell_size: u32,
    margin: u32,
    cells_per_row: u32,
    cell_count: u32,
}

impl TileAtlasBuilder {
    /// Sizes the atlas for `cell_count` cells.
    ///
    /// The width is fixed by the config; the height is the smallest power of
    /// two that fits every row.
    pub fn new(config: &AtlasConfig, cell_count: u32) -> Self {
        let cell_size = config.cell_size();
        let cells_per_row = config.cells_per_row().max(1);
        let rows = cell_count.div_ceil(cells_per_row).max(1);
        let width = (cells_per_row * cell_size).max(config.tile_atlas_width);
        let height = (rows * cell_size).next_power_of_two();
        Self {
            image: RgbaImage::new(width, height),
            cell_size,
            margin: config.tile_margin,
            cells_per_row,
            cell_count,
        }
    }

    /// Writes a 64×64 tile into `cell` and replicates its border outward.
    pub fn put(&mut self, cell: u32, tile: &RgbaImage) {
        debug_assert!(cell < self.cell_count);
        let col = cell % self.cells_per_row;
        let row = cell / self.cells_per_row;
        let x0 = col * self.cell_size;
        let y0 = row * self.cell_size;
        let m = self.margin;
        let last = TILE_SIZE - 1;

        for cy in 0..self.cell_size {
            let sy = cy.saturating_sub(m).min(last);
            for cx in 0..self.cell_size {
                let sx = cx.saturating_sub(m).min(last);
                self.image
                    .put_pixel(x0 + cx, y0 + cy, *tile.get_pixel(sx, sy));
            }
        }
    }

    pub fn build(self) -> TileAtlas {
        TileAtlas {
            image: self.image,
            cell_size: self.cell_size,
            margin: self.margin,
            cells_per_row: self.cells_per_row,
            cell_count: self.cell_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Sprite atlas
// ---------------------------------------------------------------------------

/// Where a sprite landed in the sprite atlas, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteLocation {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The packed sprite atlas with a location per logical sprite index.
#[derive(Clone, Debug)]
pub struct SpriteAtlas {
    pub image: RgbaImage,
    locations: Vec<Option<SpriteLocation>>,
}

impl SpriteAtlas {
    /// Texel rectangle of sprite `index`.
    pub fn location(&self, index: usize) -> Option<SpriteLocation> {
        self.locations.get(index).copied().flatten()
    }

    /// Normalized rectangle of sprite `index`.
    pub fn tex_rect(&self, index: usize) -> Option<TexRect> {
        let loc = self.location(index)?;
        let size = self.image.width() as f32;
        Some(TexRect {
            x: loc.x as f32 / size,
            y: loc.y as f32 / size,
            width: loc.width as f32 / size,
            height: loc.height as f32 / size,
        })
    }

    /// Number of logical sprite slots, packed or not.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Iterates over every packed sprite.
    pub fn locations(&self) -> impl Iterator<Item = (usize, SpriteLocation)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter_map(|(i, loc)| loc.map(|l| (i, l)))
    }
}

/// Packs decoded sprites into a square canvas.
///
/// `sprites[i]` is the image for logical sprite `i`. Sprites are placed
/// tallest first (stable for equal heights) on shelves running left to right;
/// zero-sized sprites get no location.
///
/// # Errors
///
/// [`DecodeError::SpriteAtlasFull`] when a sprite does not fit below the
/// last shelf.
pub fn pack_sprites(sprites: &[RgbaImage], config: &AtlasConfig) -> Result<SpriteAtlas, DecodeError> {
    let size = config.sprite_atlas_size;
    let padding = config.sprite_padding;
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(sprites[i].height()));

    let mut image = RgbaImage::new(size, size);
    let mut locations = vec![None; sprites.len()];
    let (mut x, mut y, mut shelf) = (0u32, 0u32, 0u32);

    for index in order {
        let sprite = &sprites[index];
        let (w, h) = sprite.dimensions();
        if w == 0 || h == 0 {
            continue;
        }
        let full = DecodeError::SpriteAtlasFull {
            index,
            width: w,
            height: h,
        };
        if w > size {
            return Err(full);
        }
        if x + w > size {
            x = 0;
            y += shelf + padding;
            shelf = 0;
        }
        if y + h > size {
            return Err(full);
        }
        image::imageops::replace(&mut image, sprite, x as i64, y as i64);
        locations[index] = Some(SpriteLocation {
            x,
            y,
            width: w,
            height: h,
        });
        x += w + padding;
        shelf = shelf.max(h);
    }

    tracing::debug!(
        sprites = sprites.len(),
        used_height = y + shelf,
        size,
        "packed sprite atlas"
    );
    Ok(SpriteAtlas { image, locations })
}
