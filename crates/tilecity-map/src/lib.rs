//! City map decoding: the shared block model plus decoders for the legacy
//! fixed-header and the tagged-chunk map formats.

pub mod block;
pub mod chunked;
pub mod legacy;
pub mod map;

pub use block::{Block, Collision, Lid, MAX_SLOPE, Side, TextureTransform, Wall};
pub use map::{
    Area, Light, Location, LocationKind, MAP_HEIGHT, MAP_WIDTH, Map, MapFormat, MapObject, Rgb,
    Route, TileAnimation,
};
pub use tilecity_io::DecodeError;

/// Decodes a map buffer of either format.
///
/// Only buffers starting with the `GBMP` tag go to the chunked decoder.
/// Everything else is read as a legacy map, so an unknown version word
/// surfaces as [`DecodeError::UnsupportedVersion`].
pub fn load_map(data: &[u8]) -> Result<Map, DecodeError> {
    match MapFormat::detect(data) {
        Some(MapFormat::Chunked) => chunked::decode(data),
        Some(MapFormat::Legacy) | None => legacy::decode(data),
    }
}
