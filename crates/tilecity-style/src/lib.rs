//! Style decoding: palettes, tile and sprite atlases, and per-entity metadata
//! for the legacy fixed-header and the tagged-chunk style formats.

pub mod atlas;
pub mod chunked;
pub mod legacy;
pub mod palette;
pub mod raster;
pub mod style;

pub use atlas::{
    AtlasConfig, AtlasConfigError, SpriteAtlas, SpriteLocation, TILE_SIZE, TexRect, TileAtlas,
};
pub use palette::{Palette, PaletteContainer};
pub use style::{
    DoorInfo, FontInfo, ObjectInfo, SpriteRange, StyleAsset, StyleFormat, TileCounts,
    VehicleInfo, VehiclePhysics,
};
pub use tilecity_io::DecodeError;

impl StyleFormat {
    /// Sniffs the format from the first bytes of a file.
    ///
    /// Chunked styles start with the `GBST` tag; legacy styles with the `u32`
    /// version 336. Anything else is `None`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let head: [u8; 4] = data.get(..4)?.try_into().ok()?;
        if head == chunked::CHUNKED_STYLE_MAGIC.0 {
            Some(StyleFormat::Chunked)
        } else if u32::from_le_bytes(head) == legacy::LEGACY_STYLE_VERSION {
            Some(StyleFormat::Legacy)
        } else {
            None
        }
    }
}

/// Decodes a style buffer of either format and bakes its atlases.
///
/// Only buffers starting with the `GBST` tag go to the chunked decoder.
/// Everything else is read as a legacy style, whose header check reports
/// [`DecodeError::UnsupportedVersion`] for an unknown version word.
pub fn load_style(data: &[u8], config: &AtlasConfig) -> Result<StyleAsset, DecodeError> {
    match StyleFormat::detect(data) {
        Some(StyleFormat::Chunked) => chunked::decode(data, config),
        Some(StyleFormat::Legacy) | None => legacy::decode(data, config),
    }
}
