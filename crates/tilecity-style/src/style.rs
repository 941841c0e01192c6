//! The decoded style: atlases, palettes, and per-entity metadata.

use glam::IVec2;

use crate::atlas::{SpriteAtlas, SpriteLocation, TexRect, TileAtlas};
use crate::palette::PaletteContainer;

/// Which file family a style was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleFormat {
    /// Fixed-header format: side, lid and aux tiles with four light remaps each.
    Legacy,
    /// Tagged-chunk format: one shared tile space, one palette per tile.
    Chunked,
}

/// Tile counts per family.
///
/// Chunked styles have a single tile space, reported entirely as `side`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCounts {
    pub side: u32,
    pub lid: u32,
    pub aux: u32,
}

impl TileCounts {
    pub fn total(&self) -> u32 {
        self.side + self.lid + self.aux
    }
}

/// A contiguous run of sprites belonging to one category (cars, peds, digits, …).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteRange {
    pub name: &'static str,
    /// Logical index of the first sprite.
    pub first: u32,
    pub count: u32,
}

/// Door attachment point relative to a vehicle's center, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorInfo {
    pub offset: IVec2,
}

/// Handling model carried by legacy vehicle records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehiclePhysics {
    pub max_speed: i16,
    pub min_speed: i16,
    pub acceleration: i16,
    pub braking: i16,
    pub grip: i16,
    pub handling: i16,
    pub mass: f32,
    pub thrust: f32,
    pub tyre_adhesion_x: f32,
    pub tyre_adhesion_y: f32,
    pub handbrake_friction: f32,
    pub footbrake_friction: f32,
    pub front_brake_bias: f32,
}

/// Per-model vehicle description.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleInfo {
    pub model: u8,
    /// Sprite ordinal within the car category.
    pub sprite: u16,
    pub width: i16,
    pub height: i16,
    /// Number of palette remaps the model can be painted with.
    pub remap_count: u8,
    pub passengers: u8,
    pub doors: Vec<DoorInfo>,
    /// Present for legacy styles only.
    pub physics: Option<VehiclePhysics>,
}

/// Per-model description of a map object or pickup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectInfo {
    pub model: u8,
    /// First sprite ordinal within the object category.
    pub sprite: u16,
    pub sprite_count: u8,
    /// Collision box `(width, height, depth)` (legacy only).
    pub size: Option<[u32; 3]>,
    pub weight: u16,
    pub aux: u16,
    pub status: i8,
    pub breaks_into: u8,
}

/// A bitmap font: consecutive sprites, one per character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontInfo {
    pub first_sprite: u32,
    pub char_count: u16,
}

/// Everything decoded from a style file. Immutable once built.
#[derive(Clone, Debug)]
pub struct StyleAsset {
    pub(crate) format: StyleFormat,
    pub(crate) tile_atlas: TileAtlas,
    pub(crate) sprite_atlas: SpriteAtlas,
    pub(crate) palettes: PaletteContainer,
    pub(crate) tile_counts: TileCounts,
    pub(crate) sprite_ranges: Vec<SpriteRange>,
    pub(crate) vehicles: Vec<VehicleInfo>,
    pub(crate) objects: Vec<ObjectInfo>,
    pub(crate) fonts: Vec<FontInfo>,
    pub(crate) recycled_models: Vec<u8>,
}

impl StyleAsset {
    pub fn format(&self) -> StyleFormat {
        self.format
    }

    /// Remap levels baked per tile (4 legacy, 1 chunked).
    fn remaps(&self) -> u32 {
        match self.format {
            StyleFormat::Legacy => 4,
            StyleFormat::Chunked => 1,
        }
    }

    /// Index of the first lid tile in the shared tile space.
    fn lid_offset(&self) -> u32 {
        match self.format {
            StyleFormat::Legacy => self.tile_counts.side,
            StyleFormat::Chunked => 0,
        }
    }

    fn tile_cell(&self, tile: u32, level: u8) -> u32 {
        let remaps = self.remaps();
        let cell = tile * remaps + (level as u32).min(remaps - 1);
        cell.min(self.tile_atlas.cell_count().saturating_sub(1))
    }

    /// Texture rectangle of lid tile `tile` at lighting level `light`.
    ///
    /// Chunked styles have no baked lighting and ignore `light`.
    pub fn lid_tile_tex_coords(&self, tile: u16, light: u8) -> TexRect {
        self.tile_atlas
            .tex_rect(self.tile_cell(self.lid_offset() + tile as u32, light))
    }

    /// Texture rectangle of wall tile `tile`.
    pub fn side_tile_tex_coords(&self, tile: u16) -> TexRect {
        self.tile_atlas.tex_rect(self.tile_cell(tile as u32, 0))
    }

    /// Texel rectangle of logical sprite `index` in the sprite atlas.
    pub fn sprite_position(&self, index: usize) -> Option<SpriteLocation> {
        self.sprite_atlas.location(index)
    }

    pub fn tile_atlas(&self) -> &TileAtlas {
        &self.tile_atlas
    }

    pub fn sprite_atlas(&self) -> &SpriteAtlas {
        &self.sprite_atlas
    }

    pub fn palettes(&self) -> &PaletteContainer {
        &self.palettes
    }

    pub fn tile_counts(&self) -> TileCounts {
        self.tile_counts
    }

    pub fn sprite_ranges(&self) -> &[SpriteRange] {
        &self.sprite_ranges
    }

    /// The sprite range called `name`, if the style has one.
    pub fn sprite_range(&self, name: &str) -> Option<&SpriteRange> {
        self.sprite_ranges.iter().find(|r| r.name == name)
    }

    pub fn vehicles(&self) -> &[VehicleInfo] {
        &self.vehicles
    }

    pub fn objects(&self) -> &[ObjectInfo] {
        &self.objects
    }

    pub fn fonts(&self) -> &[FontInfo] {
        &self.fonts
    }

    /// Vehicle models that may be recycled into traffic.
    pub fn recycled_models(&self) -> &[u8] {
        &self.recycled_models
    }
}

/// Lays out consecutive sprite categories from their counts.
pub(crate) fn sprite_ranges(counts: &[(&'static str, u32)]) -> Vec<SpriteRange> {
    let mut first = 0;
    counts
        .iter()
        .map(|&(name, count)| {
            let range = SpriteRange { name, first, count };
            first += count;
            range
        })
        .collect()
}
