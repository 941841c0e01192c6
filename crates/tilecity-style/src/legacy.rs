//! Decoder for the legacy fixed-header style format.
//!
//! ## Binary Layout
//!
//! A header of sixteen `u32` fields, then each section in header order:
//!
//! | Field | Section contents |
//! |-------|------------------|
//! | `version` | must be 336 |
//! | `side_size`, `lid_size`, `aux_size` | 64×64 tiles, one tile space, side first |
//! | `anim_size` | tile animations (skipped) |
//! | `clut_size` | paged palettes, padded to a 64 KiB multiple |
//! | `tileclut_size`, `spriteclut_size`, `newcarclut_size`, `fontclut_size` | sub-ranges of the clut section |
//! | `palette_index_size` | `u16` virtual → physical palette table |
//! | `object_info_size` | 20-byte object records |
//! | `car_size` | variable-length vehicle records |
//! | `sprite_info_size` | variable-length sprite records |
//! | `sprite_graphics_size` | sprite pages, 256-byte rows |
//! | `sprite_numbers_size` | 21 `u16` per-category sprite counts |
//!
//! Each tile is baked four times, once per light remap: atlas cell
//! `tile * 4 + level` uses virtual palette `(tile << 2) + level`. Sprite
//! palettes are virtual slot `tileclut_size / 1024 + clut`.

use glam::IVec2;
use image::RgbaImage;
use tilecity_io::{ByteCursor, DecodeError};

use crate::atlas::{AtlasConfig, TileAtlasBuilder, pack_sprites};
use crate::palette::{PALETTE_BYTES, PALETTE_PAGE_BYTES, PaletteContainer, read_paged_palettes};
use crate::raster::{self, PAGE_STRIDE};
use crate::style::{
    DoorInfo, ObjectInfo, StyleAsset, StyleFormat, TileCounts, VehicleInfo, VehiclePhysics,
    sprite_ranges,
};

/// The only supported version.
pub const LEGACY_STYLE_VERSION: u32 = 336;

/// Light remaps baked per tile.
pub const LEGACY_REMAPS: u8 = 4;

const SPRITE_PAGE_BYTES: usize = 65536;
const OBJECT_RECORD_SIZE: usize = 20;
const REMAP_COUNT: usize = 12;

/// Category names of the sprite-numbers table, in file order.
pub const SPRITE_CATEGORIES: [&str; 21] = [
    "arrow",
    "digits",
    "boat",
    "box",
    "bus",
    "car",
    "object",
    "ped",
    "speedo",
    "tank",
    "traffic_lights",
    "train",
    "trdoors",
    "bike",
    "tram",
    "wbus",
    "wcar",
    "ex",
    "tumcar",
    "tumtruck",
    "ferry",
];

/// Section sizes from the file header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LegacyStyleHeader {
    pub version: u32,
    pub side_size: u32,
    pub lid_size: u32,
    pub aux_size: u32,
    pub anim_size: u32,
    pub clut_size: u32,
    pub tileclut_size: u32,
    pub spriteclut_size: u32,
    pub newcarclut_size: u32,
    pub fontclut_size: u32,
    pub palette_index_size: u32,
    pub object_info_size: u32,
    pub car_size: u32,
    pub sprite_info_size: u32,
    pub sprite_graphics_size: u32,
    pub sprite_numbers_size: u32,
}

impl LegacyStyleHeader {
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let version = cur.read_u32()?;
        if version != LEGACY_STYLE_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                expected: LEGACY_STYLE_VERSION,
                found: version,
            });
        }
        Ok(Self {
            version,
            side_size: cur.read_u32()?,
            lid_size: cur.read_u32()?,
            aux_size: cur.read_u32()?,
            anim_size: cur.read_u32()?,
            clut_size: cur.read_u32()?,
            tileclut_size: cur.read_u32()?,
            spriteclut_size: cur.read_u32()?,
            newcarclut_size: cur.read_u32()?,
            fontclut_size: cur.read_u32()?,
            palette_index_size: cur.read_u32()?,
            object_info_size: cur.read_u32()?,
            car_size: cur.read_u32()?,
            sprite_info_size: cur.read_u32()?,
            sprite_graphics_size: cur.read_u32()?,
            sprite_numbers_size: cur.read_u32()?,
        })
    }

    /// Bytes the clut section occupies on disk.
    pub fn padded_clut_size(&self) -> usize {
        (self.clut_size as usize).next_multiple_of(PALETTE_PAGE_BYTES)
    }
}

/// One sprite-info record. Delta patches are read past and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacySpriteInfo {
    pub width: u8,
    pub height: u8,
    pub delta_count: u8,
    pub size: u16,
    pub clut: u16,
    pub x: u8,
    pub y: u8,
    pub page: u16,
}

impl LegacySpriteInfo {
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let width = cur.read_u8()?;
        let height = cur.read_u8()?;
        let delta_count = cur.read_u8()?;
        cur.skip(1)?; // scaling flag
        let info = Self {
            width,
            height,
            delta_count,
            size: cur.read_u16()?,
            clut: cur.read_u16()?,
            x: cur.read_u8()?,
            y: cur.read_u8()?,
            page: cur.read_u16()?,
        };
        cur.skip(info.delta_count as usize * 6)?;
        Ok(info)
    }

    /// Byte offset of the sprite's top-left pixel in the graphics section.
    pub fn pixel_offset(&self) -> usize {
        self.page as usize * SPRITE_PAGE_BYTES + self.y as usize * PAGE_STRIDE + self.x as usize
    }
}

fn decode_palette_index(cur: &mut ByteCursor<'_>) -> Result<Vec<u16>, DecodeError> {
    let mut index = Vec::with_capacity(cur.len() / 2);
    while cur.remaining() >= 2 {
        index.push(cur.read_u16()?);
    }
    Ok(index)
}

fn decode_objects(cur: &mut ByteCursor<'_>) -> Result<Vec<ObjectInfo>, DecodeError> {
    if cur.len() % OBJECT_RECORD_SIZE != 0 {
        return Err(DecodeError::SectionOverrun {
            section: "object info",
        });
    }
    let mut objects = Vec::with_capacity(cur.len() / OBJECT_RECORD_SIZE);
    while !cur.is_at_end() {
        let size = [cur.read_u32()?, cur.read_u32()?, cur.read_u32()?];
        let sprite = cur.read_u16()?;
        let weight = cur.read_u16()?;
        let aux = cur.read_u16()?;
        let status = cur.read_i8()?;
        let breaks_into = cur.read_u8()?;
        objects.push(ObjectInfo {
            model: objects.len() as u8,
            sprite,
            sprite_count: 1,
            size: Some(size),
            weight,
            aux,
            status,
            breaks_into,
        });
    }
    Ok(objects)
}

/// Reads one vehicle record.
///
/// ```text
/// i16 width, height, depth, sprite, weight
/// i16 max_speed, min_speed, acceleration, braking, grip, handling
/// 12 × {i16 h, l, s}   hls remaps
/// 12 × u8              palette remaps
/// u8  vtype, model, turning, damageable
/// 4 × u16              value
/// i8  cx, cy
/// i32 moment
/// 7 × 16.16            mass, thrust, tyre_adhesion_x/y, handbrake/footbrake friction, front_brake_bias
/// i16 turn_ratio, drive_wheel_offset, back_end_slide, handbrake_slide
/// u8  convertible, engine, radio, horn, sound_function, fast_change
/// i16 door_count, door_count × {i16 rpx, rpy, object, delta}
/// ```
pub fn read_vehicle(cur: &mut ByteCursor<'_>) -> Result<VehicleInfo, DecodeError> {
    let width = cur.read_i16()?;
    let height = cur.read_i16()?;
    let _depth = cur.read_i16()?;
    let sprite = cur.read_i16()? as u16;
    let _weight = cur.read_i16()?;
    let mut physics = VehiclePhysics {
        max_speed: cur.read_i16()?,
        min_speed: cur.read_i16()?,
        acceleration: cur.read_i16()?,
        braking: cur.read_i16()?,
        grip: cur.read_i16()?,
        handling: cur.read_i16()?,
        ..VehiclePhysics::default()
    };
    cur.skip(REMAP_COUNT * 6)?;
    let remaps = cur.read_bytes(REMAP_COUNT)?;
    let remap_count = remaps.iter().filter(|&&r| r != 0).count() as u8;
    let _vtype = cur.read_u8()?;
    let model = cur.read_u8()?;
    cur.skip(2 + 4 * 2 + 2 + 4)?; // turning, damageable, value, cx, cy, moment
    physics.mass = cur.read_fixed16_16()?;
    physics.thrust = cur.read_fixed16_16()?;
    physics.tyre_adhesion_x = cur.read_fixed16_16()?;
    physics.tyre_adhesion_y = cur.read_fixed16_16()?;
    physics.handbrake_friction = cur.read_fixed16_16()?;
    physics.footbrake_friction = cur.read_fixed16_16()?;
    physics.front_brake_bias = cur.read_fixed16_16()?;
    cur.skip(4 * 2 + 6)?;
    let door_count = cur.read_i16()?.max(0) as usize;
    let mut doors = Vec::with_capacity(door_count);
    for _ in 0..door_count {
        let x = cur.read_i16()? as i32;
        let y = cur.read_i16()? as i32;
        cur.skip(4)?;
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
        passengers: 0,
        doors,
        physics: Some(physics),
    })
}

fn decode_vehicles(cur: &mut ByteCursor<'_>) -> Result<Vec<VehicleInfo>, DecodeError> {
    let mut vehicles = Vec::new();
    while !cur.is_at_end() {
        vehicles.push(read_vehicle(cur).map_err(|_| DecodeError::SectionOverrun { section: "car" })?);
    }
    Ok(vehicles)
}

fn decode_sprite_infos(cur: &mut ByteCursor<'_>) -> Result<Vec<LegacySpriteInfo>, DecodeError> {
    let mut infos = Vec::new();
    while !cur.is_at_end() {
        infos.push(LegacySpriteInfo::read(cur)?);
    }
    Ok(infos)
}

fn decode_sprite_numbers(cur: &mut ByteCursor<'_>) -> Result<Vec<(&'static str, u32)>, DecodeError> {
    let mut counts = Vec::with_capacity(SPRITE_CATEGORIES.len());
    for name in SPRITE_CATEGORIES {
        if cur.remaining() < 2 {
            break;
        }
        counts.push((name, cur.read_u16()? as u32));
    }
    Ok(counts)
}

/// Decodes a complete legacy style buffer and bakes its atlases.
pub fn decode(data: &[u8], config: &AtlasConfig) -> Result<StyleAsset, DecodeError> {
    let mut cur = ByteCursor::new(data);
    let header = LegacyStyleHeader::read(&mut cur)?;

    let tile_bytes = (header.side_size + header.lid_size + header.aux_size) as usize;
    let tiles = cur.read_bytes(tile_bytes)?;
    cur.skip(header.anim_size as usize)?;
    let clut = cur.read_bytes(header.padded_clut_size())?;
    let palette_index = decode_palette_index(&mut cur.sub_cursor(header.palette_index_size as usize)?)?;
    let objects = decode_objects(&mut cur.sub_cursor(header.object_info_size as usize)?)?;
    let vehicles = decode_vehicles(&mut cur.sub_cursor(header.car_size as usize)?)?;
    let sprite_infos = decode_sprite_infos(&mut cur.sub_cursor(header.sprite_info_size as usize)?)?;
    let sprite_graphics = cur.read_bytes(header.sprite_graphics_size as usize)?;
    let sprite_counts = decode_sprite_numbers(&mut cur.sub_cursor(header.sprite_numbers_size as usize)?)?;

    let palettes = read_paged_palettes(clut, header.clut_size as usize / PALETTE_BYTES)?;
    let palettes = PaletteContainer::new(
        palettes,
        palette_index,
        LEGACY_REMAPS as usize,
        header.tileclut_size as usize / PALETTE_BYTES,
    );
    let tile_counts = TileCounts {
        side: raster::tile_count(header.side_size as usize),
        lid: raster::tile_count(header.lid_size as usize),
        aux: raster::tile_count(header.aux_size as usize),
    };
    tracing::debug!(
        side = tile_counts.side,
        lid = tile_counts.lid,
        aux = tile_counts.aux,
        palettes = palettes.palette_count(),
        sprites = sprite_infos.len(),
        "legacy style sections decoded"
    );

    let mut builder = TileAtlasBuilder::new(config, tile_counts.total() * LEGACY_REMAPS as u32);
    for tile in 0..tile_counts.total() {
        for level in 0..LEGACY_REMAPS {
            let palette = palettes
                .try_tile_palette(tile as usize, level)
                .ok_or(DecodeError::SectionOverrun {
                    section: "palette index",
                })?;
            let image = raster::decode_tile(tiles, tile as usize, palette)?;
            builder.put(tile * LEGACY_REMAPS as u32 + level as u32, &image);
        }
    }
    let tile_atlas = builder.build();

    let sprites = sprite_infos
        .iter()
        .map(|info| {
            let palette = palettes
                .try_sprite_palette(info.clut as usize)
                .ok_or(DecodeError::SectionOverrun {
                    section: "palette index",
                })?;
            raster::decode_block(
                sprite_graphics,
                info.pixel_offset(),
                info.width as u32,
                info.height as u32,
                PAGE_STRIDE,
                palette,
            )
        })
        .collect::<Result<Vec<RgbaImage>, _>>()?;
    let sprite_atlas = pack_sprites(&sprites, config)?;

    tracing::info!(
        tiles = tile_counts.total(),
        sprites = sprite_atlas.len(),
        vehicles = vehicles.len(),
        objects = objects.len(),
        "decoded legacy style"
    );

    Ok(StyleAsset {
        format: StyleFormat::Legacy,
        tile_atlas,
        sprite_atlas,
        palettes,
        tile_counts,
        sprite_ranges: sprite_ranges(&sprite_counts),
        vehicles,
        objects,
        fonts: Vec::new(),
        recycled_models: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn small_config() -> AtlasConfig {
        AtlasConfig {
            tile_atlas_width: 264,
            tile_margin: 1,
            sprite_atlas_size: 64,
            sprite_padding: 1,
        }
    }

    /// One clut page holding `count` palettes; palette `p` maps color `c` to BGRA `(c, p, 0)`.
    fn clut(count: usize) -> Vec<u8> {
        let mut data = vec![0u8; PALETTE_PAGE_BYTES];
        for p in 0..count {
            for c in 0..256 {
                let at = (c * 64 + p) * 4;
                data[at..at + 4].copy_from_slice(&[c as u8, p as u8, 0, 0]);
            }
        }
        data
    }

    fn vehicle_record(model: u8, doors: &[(i16, i16)]) -> Vec<u8> {
        let mut r = Vec::new();
        for v in [30i16, 60, 20, 7, 1, 50, 10, 4, 3, 2, 1] {
            r.extend_from_slice(&v.to_le_bytes());
        }
        r.extend(std::iter::repeat_n(0u8, 72));
        let mut remaps = [0u8; 12];
        remaps[..3].copy_from_slice(&[1, 2, 3]);
        r.extend_from_slice(&remaps);
        r.extend_from_slice(&[0, model]);
        r.extend(std::iter::repeat_n(0u8, 16));
        // mass 2.5, then six zeros
        r.extend_from_slice(&0x8000u16.to_le_bytes());
        r.extend_from_slice(&2i16.to_le_bytes());
        r.extend(std::iter::repeat_n(0u8, 24));
        r.extend(std::iter::repeat_n(0u8, 14));
        r.extend_from_slice(&(doors.len() as i16).to_le_bytes());
        for &(x, y) in doors {
            r.extend_from_slice(&x.to_le_bytes());
            r.extend_from_slice(&y.to_le_bytes());
            r.extend_from_slice(&[0; 4]);
        }
        r
    }

    /// Two side tiles, two lid tiles, one sprite and one vehicle.
    fn style_file() -> Vec<u8> {
        // one full tile page: tile 0 filled with 3, tile 2 (first lid) filled with 4
        let mut tiles = vec![0u8; PAGE_STRIDE * 64];
        for row in 0..64 {
            tiles[row * PAGE_STRIDE..row * PAGE_STRIDE + 64].fill(3);
            tiles[row * PAGE_STRIDE + 128..row * PAGE_STRIDE + 192].fill(4);
        }
        // 16 tile slots map to palettes 0..16, the sprite slot maps to palette 19
        let mut palette_index = Vec::new();
        for v in (0u16..16).chain([19]) {
            palette_index.extend_from_slice(&v.to_le_bytes());
        }
        let mut sprite_info = vec![2, 3, 1, 0];
        sprite_info.extend_from_slice(&6u16.to_le_bytes());
        sprite_info.extend_from_slice(&0u16.to_le_bytes()); // clut
        sprite_info.extend_from_slice(&[5, 1]); // x, y
        sprite_info.extend_from_slice(&0u16.to_le_bytes()); // page
        sprite_info.extend_from_slice(&[0; 6]); // one delta
        let mut sprite_graphics = vec![0u8; PAGE_STRIDE * 4];
        for row in 1..4 {
            sprite_graphics[row * PAGE_STRIDE + 5] = 8;
        }
        let mut numbers = Vec::new();
        for i in 0..21u16 {
            numbers.extend_from_slice(&(if i == 5 { 1u16 } else { 0 }).to_le_bytes());
        }
        let cars = vehicle_record(9, &[(3, -4)]);
        let mut objects = Vec::new();
        for v in [1u32, 2, 3] {
            objects.extend_from_slice(&v.to_le_bytes());
        }
        objects.extend_from_slice(&[11, 0, 0, 0, 0, 0, 0xFF, 4]);

        let sizes = [
            LEGACY_STYLE_VERSION,
            8192,
            8192,
            0,
            0,
            20 * 1024,
            16 * 1024,
            4 * 1024,
            0,
            0,
            palette_index.len() as u32,
            objects.len() as u32,
            cars.len() as u32,
            sprite_info.len() as u32,
            sprite_graphics.len() as u32,
            numbers.len() as u32,
        ];
        let mut data = Vec::new();
        for s in sizes {
            data.extend_from_slice(&s.to_le_bytes());
        }
        data.extend_from_slice(&tiles);
        data.extend_from_slice(&clut(20));
        for section in [&palette_index, &objects, &cars, &sprite_info, &sprite_graphics, &numbers] {
            data.extend_from_slice(section);
        }
        data
    }

    #[test]
    fn test_decode_legacy_style() {
        let style = decode(&style_file(), &small_config()).unwrap();
        assert_eq!(style.format(), StyleFormat::Legacy);
        assert_eq!(
            style.tile_counts(),
            TileCounts {
                side: 2,
                lid: 2,
                aux: 0
            }
        );
        assert_eq!(style.tile_atlas().cell_count(), 16);

        // lid tile 0 is tile 2 overall; remap 2 is cell and palette 10, pixel 4 -> (g=10, b=4)
        let atlas = style.tile_atlas();
        let (x, y) = atlas.cell_origin(10);
        assert_eq!(atlas.image.get_pixel(x + 7, y + 7), &Rgba([0, 10, 4, 255]));
        assert_eq!(style.lid_tile_tex_coords(0, 2), atlas.tex_rect(10));
        assert_eq!(style.side_tile_tex_coords(0), atlas.tex_rect(0));
        let (x, y) = atlas.cell_origin(1);
        assert_eq!(atlas.image.get_pixel(x, y), &Rgba([0, 1, 3, 255]));

        let sprite = style.sprite_position(0).unwrap();
        assert_eq!((sprite.width, sprite.height), (2, 3));
        let image = &style.sprite_atlas().image;
        assert_eq!(image.get_pixel(sprite.x, sprite.y + 1), &Rgba([0, 19, 8, 255]));
        assert_eq!(image.get_pixel(sprite.x + 1, sprite.y)[3], 0);

        assert_eq!(style.sprite_range("car").map(|r| (r.first, r.count)), Some((0, 1)));
        assert_eq!(style.sprite_ranges().len(), 21);
    }

    #[test]
    fn test_vehicle_and_object_records() {
        let style = decode(&style_file(), &small_config()).unwrap();
        let car = &style.vehicles()[0];
        assert_eq!(car.model, 9);
        assert_eq!(car.sprite, 7);
        assert_eq!((car.width, car.height), (30, 60));
        assert_eq!(car.remap_count, 3);
        assert_eq!(car.doors, vec![DoorInfo { offset: IVec2::new(3, -4) }]);
        let physics = car.physics.unwrap();
        assert_eq!(physics.max_speed, 50);
        assert_eq!(physics.mass, 2.5);

        let object = style.objects()[0];
        assert_eq!(object.size, Some([1, 2, 3]));
        assert_eq!(object.sprite, 11);
        assert_eq!(object.status, -1);
        assert_eq!(object.breaks_into, 4);
    }

    #[test]
    fn test_version_mismatch() {
        let mut data = style_file();
        data[..4].copy_from_slice(&1u32.to_le_bytes());
        assert_eq!(
            decode(&data, &small_config()).unwrap_err(),
            DecodeError::UnsupportedVersion {
                expected: 336,
                found: 1
            }
        );
    }

    #[test]
    fn test_truncated_style() {
        let data = style_file();
        assert!(matches!(
            decode(&data[..data.len() - 10], &small_config()),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_sprite_pixel_offset() {
        let info = LegacySpriteInfo {
            width: 1,
            height: 1,
            delta_count: 0,
            size: 1,
            clut: 0,
            x: 3,
            y: 2,
            page: 1,
        };
        assert_eq!(info.pixel_offset(), 65536 + 512 + 3);
    }
}
