//! Decoder for the tagged-chunk style format.
//!
//! A `GBST` header (version 700) followed by framed chunks. `TILE`, `SPRG`,
//! `PPAL` and `PALX` are mandatory; everything else is optional.
//!
//! Car records (`CARI`) are variable length:
//!
//! ```text
//! u8 model, sprite, width, height, num_remaps, passengers, wreck, rating
//! i8 front_wheel, rear_wheel, front_window, rear_window
//! u8 info_flags, info_flags_2
//! u8 remap[num_remaps]
//! u8 num_doors, num_doors × {i8 rx, ry}
//! ```

use glam::IVec2;
use image::RgbaImage;
use tilecity_io::{ByteCursor, Chunk, ChunkReader, DecodeError, FourCc};

use crate::atlas::{AtlasConfig, TileAtlasBuilder, pack_sprites};
use crate::palette::{PALETTE_BYTES, PaletteContainer, read_paged_palettes};
use crate::raster::{self, PAGE_STRIDE};
use crate::style::{
    DoorInfo, FontInfo, ObjectInfo, StyleAsset, StyleFormat, TileCounts, VehicleInfo,
    sprite_ranges,
};

/// File magic.
pub const CHUNKED_STYLE_MAGIC: FourCc = FourCc::new(b"GBST");

/// The only supported version.
pub const CHUNKED_STYLE_VERSION: u16 = 700;

const TAG_PALX: FourCc = FourCc::new(b"PALX");
const TAG_PPAL: FourCc = FourCc::new(b"PPAL");
const TAG_PALB: FourCc = FourCc::new(b"PALB");
const TAG_TILE: FourCc = FourCc::new(b"TILE");
const TAG_SPRG: FourCc = FourCc::new(b"SPRG");
const TAG_SPRX: FourCc = FourCc::new(b"SPRX");
const TAG_SPRB: FourCc = FourCc::new(b"SPRB");
const TAG_FONB: FourCc = FourCc::new(b"FONB");
const TAG_CARI: FourCc = FourCc::new(b"CARI");
const TAG_OBJI: FourCc = FourCc::new(b"OBJI");
const TAG_RECY: FourCc = FourCc::new(b"RECY");

/// Delta and platform chunks this decoder has no use for.
const IGNORED_TAGS: [FourCc; 4] = [
    FourCc::new(b"DELX"),
    FourCc::new(b"DELS"),
    FourCc::new(b"PSXT"),
    FourCc::new(b"SPEC"),
];

const RECYCLE_END: u8 = 255;

/// Sprite category names of the `SPRB` chunk, in file order.
pub const SPRITE_CATEGORIES: [&str; 6] = ["car", "ped", "code_obj", "map_obj", "user", "font"];

/// Palette bases from `PALB`: how many virtual palettes each category owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaletteBases {
    pub tile: u16,
    pub sprite: u16,
    pub car_remap: u16,
    pub ped_remap: u16,
    pub code_obj_remap: u16,
    pub map_obj_remap: u16,
    pub user_remap: u16,
    pub font_remap: u16,
}

impl PaletteBases {
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            tile: cur.read_u16()?,
            sprite: cur.read_u16()?,
            car_remap: cur.read_u16()?,
            ped_remap: cur.read_u16()?,
            code_obj_remap: cur.read_u16()?,
            map_obj_remap: cur.read_u16()?,
            user_remap: cur.read_u16()?,
            font_remap: cur.read_u16()?,
        })
    }
}

/// One `SPRX` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteEntry {
    /// Byte offset of the top-left pixel in `SPRG`.
    pub ptr: u32,
    pub width: u8,
    pub height: u8,
}

/// Chunk payloads gathered in one pass before anything is baked.
#[derive(Default)]
struct Sections<'a> {
    palette_index: Option<Vec<u16>>,
    physical: Option<&'a [u8]>,
    bases: Option<PaletteBases>,
    tiles: Option<&'a [u8]>,
    sprite_graphics: Option<&'a [u8]>,
    sprites: Vec<SpriteEntry>,
    sprite_counts: Vec<(&'static str, u32)>,
    font_sizes: Vec<u16>,
    vehicles: Vec<VehicleInfo>,
    objects: Vec<ObjectInfo>,
    recycled: Vec<u8>,
}

fn read_u16_table(cur: &mut ByteCursor<'_>) -> Result<Vec<u16>, DecodeError> {
    let mut table = Vec::with_capacity(cur.len() / 2);
    while cur.remaining() >= 2 {
        table.push(cur.read_u16()?);
    }
    Ok(table)
}

fn decode_sprite_entries(cur: &mut ByteCursor<'_>) -> Result<Vec<SpriteEntry>, DecodeError> {
    let mut entries = Vec::with_capacity(cur.len() / 8);
    while !cur.is_at_end() {
        let ptr = cur.read_u32()?;
        let width = cur.read_u8()?;
        let height = cur.read_u8()?;
        cur.skip(2)?;
        entries.push(SpriteEntry { ptr, width, height });
    }
    Ok(entries)
}

fn decode_sprite_counts(cur: &mut ByteCursor<'_>) -> Result<Vec<(&'static str, u32)>, DecodeError> {
    SPRITE_CATEGORIES
        .iter()
        .map(|&name| Ok((name, cur.read_u16()? as u32)))
        .collect()
}

fn decode_fonts(cur: &mut ByteCursor<'_>) -> Result<Vec<u16>, DecodeError> {
    let count = cur.read_u16()? as usize;
    (0..count).map(|_| cur.read_u16()).collect()
}

/// Reads one `CARI` record.
pub fn read_vehicle(cur: &mut ByteCursor<'_>) -> Result<VehicleInfo, DecodeError> {
    let model = cur.read_u8()?;
    let sprite = cur.read_u8()? as u16;
    let width = cur.read_u8()? as i16;
    let height = cur.read_u8()? as i16;
    let remap_count = cur.read_u8()?;
    let passengers = cur.read_u8()?;
    cur.skip(2 + 4 + 2)?; // wreck, rating, wheel and window offsets, flags
    cur.skip(remap_count as usize)?;
    let door_count = cur.read_u8()? as usize;
    let mut doors = Vec::with_capacity(door_count);
    for _ in 0..door_count {
        let x = cur.read_i8()? as i32;
        let y = cur.read_i8()? as i32;
        doors.push(DoorInfo {
            offset: IVec2::new(x, y),
        });
    }
    Ok(VehicleInfo {
        model,
        sprite,
        width,
        height,
        remap_count,
        passengers,
        doors,
        physics: None,
    })
}

fn decode_vehicles(cur: &mut ByteCursor<'_>) -> Result<Vec<VehicleInfo>, DecodeError> {
    let mut vehicles = Vec::new();
    while !cur.is_at_end() {
        vehicles.push(read_vehicle(cur)?);
    }
    Ok(vehicles)
}

fn decode_objects(cur: &mut ByteCursor<'_>) -> Result<Vec<ObjectInfo>, DecodeError> {
    let mut objects = Vec::with_capacity(cur.len() / 2);
    let mut sprite = 0u16;
    while !cur.is_at_end() {
        let model = cur.read_u8()?;
        let sprite_count = cur.read_u8()?;
        objects.push(ObjectInfo {
            model,
            sprite,
            sprite_count,
            ..ObjectInfo::default()
        });
        sprite = sprite.wrapping_add(sprite_count as u16);
    }
    Ok(objects)
}

fn decode_recycle_list(cur: &mut ByteCursor<'_>) -> Result<Vec<u8>, DecodeError> {
    let mut models = Vec::new();
    while !cur.is_at_end() {
        let model = cur.read_u8()?;
        if model == RECYCLE_END {
            break;
        }
        models.push(model);
    }
    Ok(models)
}

impl<'a> Sections<'a> {
    fn absorb(&mut self, chunk: Chunk<'a>) -> Result<(), DecodeError> {
        let mut cur = chunk.cursor();
        match chunk.tag {
            TAG_PALX => self.palette_index = Some(read_u16_table(&mut cur)?),
            TAG_PPAL => self.physical = Some(chunk.payload),
            TAG_PALB => self.bases = Some(PaletteBases::read(&mut cur)?),
            TAG_TILE => self.tiles = Some(chunk.payload),
            TAG_SPRG => self.sprite_graphics = Some(chunk.payload),
            TAG_SPRX => self.sprites = decode_sprite_entries(&mut cur)?,
            TAG_SPRB => self.sprite_counts = decode_sprite_counts(&mut cur)?,
            TAG_FONB => self.font_sizes = decode_fonts(&mut cur)?,
            TAG_CARI => self.vehicles = decode_vehicles(&mut cur)?,
            TAG_OBJI => self.objects = decode_objects(&mut cur)?,
            TAG_RECY => self.recycled = decode_recycle_list(&mut cur)?,
            tag if IGNORED_TAGS.contains(&tag) => {
                tracing::debug!(%tag, len = chunk.payload.len(), "skipping unused chunk");
            }
            tag => {
                tracing::warn!(%tag, offset = chunk.offset, "skipping unknown style chunk");
            }
        }
        Ok(())
    }
}

/// Decodes a complete chunked style buffer and bakes its atlases.
pub fn decode(data: &[u8], config: &AtlasConfig) -> Result<StyleAsset, DecodeError> {
    let mut sections = Sections::default();
    for chunk in ChunkReader::open(data, CHUNKED_STYLE_MAGIC, CHUNKED_STYLE_VERSION)? {
        sections.absorb(chunk?)?;
    }

    let tiles = sections.tiles.ok_or(DecodeError::MissingChunk(TAG_TILE))?;
    let sprite_graphics = sections
        .sprite_graphics
        .ok_or(DecodeError::MissingChunk(TAG_SPRG))?;
    let physical = sections.physical.ok_or(DecodeError::MissingChunk(TAG_PPAL))?;
    let palette_index = sections
        .palette_index
        .ok_or(DecodeError::MissingChunk(TAG_PALX))?;

    let tile_count = raster::tile_count(tiles.len());
    let sprite_base = sections
        .bases
        .map_or(tile_count as usize, |b| b.tile as usize);
    let palettes = PaletteContainer::new(
        read_paged_palettes(physical, physical.len() / PALETTE_BYTES)?,
        palette_index,
        1,
        sprite_base,
    );
    tracing::debug!(
        tiles = tile_count,
        sprites = sections.sprites.len(),
        palettes = palettes.palette_count(),
        "chunked style sections decoded"
    );

    let missing_palette = || DecodeError::SectionOverrun {
        section: "palette index",
    };
    let mut builder = TileAtlasBuilder::new(config, tile_count);
    for tile in 0..tile_count {
        let palette = palettes
            .try_tile_palette(tile as usize, 0)
            .ok_or_else(missing_palette)?;
        builder.put(tile, &raster::decode_tile(tiles, tile as usize, palette)?);
    }
    let tile_atlas = builder.build();

    let sprites = sections
        .sprites
        .iter()
        .enumerate()
        .map(|(ordinal, entry)| {
            let palette = palettes
                .try_sprite_palette(ordinal)
                .ok_or_else(missing_palette)?;
            raster::decode_block(
                sprite_graphics,
                entry.ptr as usize,
                entry.width as u32,
                entry.height as u32,
                PAGE_STRIDE,
                palette,
            )
        })
        .collect::<Result<Vec<RgbaImage>, _>>()?;
    let sprite_atlas = pack_sprites(&sprites, config)?;

    let sprite_ranges = sprite_ranges(&sections.sprite_counts);
    let font_base = sprite_ranges
        .iter()
        .find(|r| r.name == "font")
        .map_or(0, |r| r.first);
    let mut first_sprite = font_base;
    let fonts = sections
        .font_sizes
        .iter()
        .map(|&char_count| {
            let font = FontInfo {
                first_sprite,
                char_count,
            };
            first_sprite += char_count as u32;
            font
        })
        .collect();

    tracing::info!(
        tiles = tile_count,
        sprites = sprite_atlas.len(),
        vehicles = sections.vehicles.len(),
        objects = sections.objects.len(),
        "decoded chunked style"
    );

    Ok(StyleAsset {
        format: StyleFormat::Chunked,
        tile_atlas,
        sprite_atlas,
        palettes,
        tile_counts: TileCounts {
            side: tile_count,
            lid: 0,
            aux: 0,
        },
        sprite_ranges,
        vehicles: sections.vehicles,
        objects: sections.objects,
        fonts,
        recycled_models: sections.recycled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE_PAGE_BYTES;
    use image::Rgba;

    fn small_config() -> AtlasConfig {
        AtlasConfig {
            tile_atlas_width: 264,
            tile_margin: 1,
            sprite_atlas_size: 64,
            sprite_padding: 1,
        }
    }

    fn push_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
        buf.extend_from_slice(tag);
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
    }

    fn u16s(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Four palettes where palette `p` maps color `c` to RGB `(p, c, 0)`.
    fn ppal() -> Vec<u8> {
        let mut data = vec![0u8; PALETTE_PAGE_BYTES];
        for p in 0..4 {
            for c in 0..256 {
                let at = (c * 64 + p) * 4;
                data[at..at + 4].copy_from_slice(&[0, c as u8, p as u8, 0]);
            }
        }
        data
    }

    fn chunks(skip: Option<&[u8; 4]>) -> Vec<(&'static [u8; 4], Vec<u8>)> {
        // two tiles: tile 0 all 1s, tile 1 all 2s
        let mut tiles = vec![0u8; PAGE_STRIDE * 64];
        for row in 0..64 {
            tiles[row * PAGE_STRIDE..row * PAGE_STRIDE + 64].fill(1);
            tiles[row * PAGE_STRIDE + 64..row * PAGE_STRIDE + 128].fill(2);
        }
        // sprite 0: 2x1 at offset 3; sprite 1: 1x1 at offset 256
        let mut sprg = vec![0u8; 512];
        sprg[3] = 5;
        sprg[4] = 6;
        sprg[256] = 7;
        let mut sprx = Vec::new();
        sprx.extend_from_slice(&3u32.to_le_bytes());
        sprx.extend_from_slice(&[2, 1, 0, 0]);
        sprx.extend_from_slice(&256u32.to_le_bytes());
        sprx.extend_from_slice(&[1, 1, 0, 0]);

        let mut cari = vec![4, 0, 20, 40, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 9, 9, 1];
        cari.extend_from_slice(&[(-2i8) as u8, 5]);

        let all: Vec<(&'static [u8; 4], Vec<u8>)> = vec![
            (b"PALX", u16s(&[1, 2, 3, 0])),
            (b"PPAL", ppal()),
            (b"PALB", u16s(&[2, 2, 0, 0, 0, 0, 0, 0])),
            (b"TILE", tiles),
            (b"SPRG", sprg),
            (b"SPRX", sprx),
            (b"SPRB", u16s(&[1, 0, 0, 0, 0, 1])),
            (b"FONB", u16s(&[1, 1])),
            (b"CARI", cari),
            (b"OBJI", vec![0, 2, 1, 3]),
            (b"RECY", vec![4, 7, 255, 9]),
            (b"DELX", vec![0; 10]),
            (b"WHAT", vec![1, 2, 3]),
        ];
        all.into_iter().filter(|(tag, _)| Some(*tag) != skip).collect()
    }

    fn style_file(skip: Option<&[u8; 4]>) -> Vec<u8> {
        let mut data = b"GBST".to_vec();
        data.extend_from_slice(&CHUNKED_STYLE_VERSION.to_le_bytes());
        for (tag, payload) in chunks(skip) {
            push_chunk(&mut data, tag, &payload);
        }
        data
    }

    #[test]
    fn test_decode_chunked_style() {
        let style = decode(&style_file(None), &small_config()).unwrap();
        assert_eq!(style.format(), StyleFormat::Chunked);
        assert_eq!(style.tile_counts().side, 2);

        // tile 1 uses PALX[1] = palette 2; pixel 2 -> (r=2, g=2)
        let atlas = style.tile_atlas();
        let (x, y) = atlas.cell_origin(1);
        assert_eq!(atlas.image.get_pixel(x + 30, y + 30), &Rgba([2, 2, 0, 255]));
        // light level is ignored in this format
        assert_eq!(style.lid_tile_tex_coords(1, 3), atlas.tex_rect(1));
        assert_eq!(style.side_tile_tex_coords(1), atlas.tex_rect(1));
    }

    #[test]
    fn test_sprites_use_palettes_past_the_tile_base() {
        let style = decode(&style_file(None), &small_config()).unwrap();
        let image = &style.sprite_atlas().image;

        // sprite 0 uses PALX[2 + 0] = palette 3
        let first = style.sprite_position(0).unwrap();
        assert_eq!((first.width, first.height), (2, 1));
        assert_eq!(image.get_pixel(first.x + 1, first.y), &Rgba([3, 6, 0, 255]));

        // sprite 1 uses PALX[2 + 1] = palette 0
        let second = style.sprite_position(1).unwrap();
        assert_eq!(image.get_pixel(second.x, second.y), &Rgba([0, 7, 0, 255]));
        assert!(style.sprite_position(2).is_none());
    }

    #[test]
    fn test_metadata_chunks() {
        let style = decode(&style_file(None), &small_config()).unwrap();

        assert_eq!(style.sprite_range("font").map(|r| r.first), Some(1));
        assert_eq!(
            style.fonts(),
            &[FontInfo {
                first_sprite: 1,
                char_count: 1
            }]
        );

        let car = &style.vehicles()[0];
        assert_eq!(car.model, 4);
        assert_eq!((car.width, car.height), (20, 40));
        assert_eq!(car.passengers, 3);
        assert_eq!(car.remap_count, 2);
        assert_eq!(car.doors, vec![DoorInfo { offset: IVec2::new(-2, 5) }]);
        assert!(car.physics.is_none());

        let objects = style.objects();
        assert_eq!(objects.len(), 2);
        assert_eq!((objects[1].model, objects[1].sprite, objects[1].sprite_count), (1, 2, 3));

        assert_eq!(style.recycled_models(), &[4, 7]);
    }

    #[test]
    fn test_mandatory_chunks() {
        for tag in [b"TILE", b"SPRG", b"PPAL", b"PALX"] {
            assert_eq!(
                decode(&style_file(Some(tag)), &small_config()).unwrap_err(),
                DecodeError::MissingChunk(FourCc::new(tag)),
            );
        }
        // optional chunks may be absent
        assert!(decode(&style_file(Some(b"CARI")), &small_config()).is_ok());
    }

    #[test]
    fn test_bad_magic() {
        let mut data = style_file(None);
        data[..4].copy_from_slice(b"GBMP");
        assert!(matches!(
            decode(&data, &small_config()),
            Err(DecodeError::BadMagic { .. })
        ));
    }
}
