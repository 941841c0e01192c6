//! Decoder for the tagged-chunk map format.
//!
//! The file is a `GBMP` header (version 500) followed by framed chunks (see
//! [`tilecity_io::chunk`]). The block grid arrives in one of three encodings:
//!
//! * `DMAP`: 32-bit compressed grid. `u32 base[256][256]` word indices into
//!   `u32 columns[column_words]`; a column-info word carries `height` in its
//!   low byte and `offset` in the next, and is followed by `height - offset`
//!   block indices for altitudes `offset..height`. Then `u32 num_blocks` and
//!   the block records.
//! * `CMAP`: the same with 16-bit base entries, column words and indices.
//!   `column_words` and `num_blocks` stay 32-bit.
//! * `UMAP`: 256×256×8 block records, altitude-outer.
//!
//! A block record is `{u16 left, right, top, bottom, lid; u8 arrows; u8 slope_type}`.

use glam::Vec3;
use rustc_hash::FxHashMap;
use tilecity_io::{ByteCursor, ChunkReader, DecodeError, FourCc};

use crate::block::{Block, Collision, Lid, Side, TextureTransform, Wall};
use crate::map::{Area, Light, MAP_HEIGHT, MAP_WIDTH, Map, MapFormat, MapObject, Rgb, TileAnimation};

/// File magic.
pub const CHUNKED_MAP_MAGIC: FourCc = FourCc::new(b"GBMP");

/// The only supported version.
pub const CHUNKED_MAP_VERSION: u16 = 500;

/// Altitude levels per chunked column.
pub const CHUNKED_ALTITUDES: usize = 8;

/// Lid tile that turns a three-sided diagonal slope into a four-sided one.
pub const STAIRCASE_LID_TILE: u16 = 1023;

const TAG_DMAP: FourCc = FourCc::new(b"DMAP");
const TAG_CMAP: FourCc = FourCc::new(b"CMAP");
const TAG_UMAP: FourCc = FourCc::new(b"UMAP");
const TAG_ZONE: FourCc = FourCc::new(b"ZONE");
const TAG_LGHT: FourCc = FourCc::new(b"LGHT");
const TAG_MOBJ: FourCc = FourCc::new(b"MOBJ");
const TAG_ANIM: FourCc = FourCc::new(b"ANIM");

/// Chunks that exist in shipped files but carry nothing this decoder uses.
const IGNORED_TAGS: [FourCc; 4] = [
    FourCc::new(b"RGEN"),
    FourCc::new(b"PSXM"),
    FourCc::new(b"EDIT"),
    FourCc::new(b"THSR"),
];

const ZONE_NAVIGATION: u8 = 1;
const ZONE_LOCAL_NAVIGATION: u8 = 15;

const TILE_MASK: u16 = 0x3FF;

/// Fixed-point divisors for light records.
const COLOR_SCALE: f32 = 255.0;
const POSITION_SCALE: f32 = 128.0;
const INTENSITY_SCALE: f32 = 255.0;

// ---------------------------------------------------------------------------
// Block records
// ---------------------------------------------------------------------------

/// One raw 12-byte block record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockRecord {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
    pub lid: u16,
    pub arrows: u8,
    pub slope_type: u8,
}

impl BlockRecord {
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            left: cur.read_u16()?,
            right: cur.read_u16()?,
            top: cur.read_u16()?,
            bottom: cur.read_u16()?,
            lid: cur.read_u16()?,
            arrows: cur.read_u8()?,
            slope_type: cur.read_u8()?,
        })
    }

    fn raw_side(&self, side: Side) -> u16 {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Decoded slope code, including the staircase bump for lid tile 1023.
    pub fn slope(&self) -> u8 {
        let slope = (self.slope_type >> 2) & 0x3F;
        if (49..=52).contains(&slope) && self.lid & TILE_MASK == STAIRCASE_LID_TILE {
            slope + 15
        } else {
            slope
        }
    }

    /// Converts the record to the shared block model.
    pub fn to_block(&self) -> Block {
        let wall = |side: Side| {
            let mut wall = decode_wall(self.raw_side(side))?;
            if wall.transparent {
                let back = self.raw_side(side.opposite()) & TILE_MASK;
                wall.back_tile_index = (back != 0).then_some(back);
            }
            Some(wall)
        };
        Block {
            top: wall(Side::Top),
            bottom: wall(Side::Bottom),
            left: wall(Side::Left),
            right: wall(Side::Right),
            lid: decode_lid(self.lid),
            slope: self.slope(),
        }
    }
}

/// The 3-bit transform shared by walls and lids: bit 13 mirrors, bits 14-15 rotate.
fn face_transform(value: u16) -> TextureTransform {
    TextureTransform::from_bits((((value >> 11) & 4) | ((value >> 14) & 3)) as u8)
}

/// Decodes a packed wall word. Zero means no wall.
pub fn decode_wall(value: u16) -> Option<Wall> {
    if value == 0 {
        return None;
    }
    let collision = if value & (1 << 10) != 0 {
        Collision::Solid
    } else if value & (1 << 11) != 0 {
        Collision::Character
    } else {
        Collision::None
    };
    Some(Wall {
        tile_index: value & TILE_MASK,
        back_tile_index: None,
        collision,
        transparent: value & (1 << 12) != 0,
        transform: face_transform(value),
        flip: value & (1 << 13) != 0,
    })
}

/// Decodes a packed lid word. Zero means no lid.
pub fn decode_lid(value: u16) -> Option<Lid> {
    if value == 0 {
        return None;
    }
    Some(Lid {
        tile_index: value & TILE_MASK,
        light_level: ((value >> 10) & 3) as u8,
        transparent: value & (1 << 12) != 0,
        transform: face_transform(value),
        rotate: ((value >> 14) & 3) as u8,
    })
}

// ---------------------------------------------------------------------------
// Grid chunks
// ---------------------------------------------------------------------------

/// Block table shared by grid cells, with all-empty records dropped.
struct BlockTable {
    blocks: Vec<Block>,
    /// Raw record index → index into `blocks`, `None` for empty records.
    remap: Vec<Option<u32>>,
}

impl BlockTable {
    fn read(cur: &mut ByteCursor<'_>, count: usize) -> Result<Self, DecodeError> {
        let mut blocks = Vec::with_capacity(count);
        let mut remap = Vec::with_capacity(count);
        for _ in 0..count {
            let block = BlockRecord::read(cur)?.to_block();
            if block.is_empty() {
                remap.push(None);
            } else {
                remap.push(Some(blocks.len() as u32));
                blocks.push(block);
            }
        }
        Ok(Self { blocks, remap })
    }

    fn resolve(&self, index: u32) -> Result<Option<u32>, DecodeError> {
        self.remap
            .get(index as usize)
            .copied()
            .ok_or(DecodeError::InvalidBlockIndex {
                index,
                count: self.remap.len(),
            })
    }
}

/// Word width of a compressed grid chunk.
#[derive(Clone, Copy)]
enum GridWidth {
    Narrow,
    Wide,
}

fn read_word(cur: &mut ByteCursor<'_>, width: GridWidth) -> Result<u32, DecodeError> {
    match width {
        GridWidth::Narrow => cur.read_u16().map(u32::from),
        GridWidth::Wide => cur.read_u32(),
    }
}

/// Decodes a `DMAP` (wide) or `CMAP` (narrow) compressed grid into `map`.
fn decode_compressed_grid(
    map: &mut Map,
    cur: &mut ByteCursor<'_>,
    width: GridWidth,
) -> Result<(), DecodeError> {
    let mut base = Vec::with_capacity(MAP_WIDTH * MAP_HEIGHT);
    for _ in 0..MAP_WIDTH * MAP_HEIGHT {
        base.push(read_word(cur, width)?);
    }
    let column_words = cur.read_u32()? as usize;
    let mut columns = Vec::with_capacity(column_words);
    for _ in 0..column_words {
        columns.push(read_word(cur, width)?);
    }
    let num_blocks = cur.read_u32()? as usize;
    let table = BlockTable::read(cur, num_blocks)?;
    tracing::debug!(column_words, num_blocks, kept = table.blocks.len(), "compressed grid");

    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            let offset = base[y * MAP_WIDTH + x];
            let invalid = DecodeError::InvalidStackPointer { x, y, offset };
            let info = *columns.get(offset as usize).ok_or(invalid.clone())?;
            let height = (info & 0xFF) as usize;
            let start = ((info >> 8) & 0xFF) as usize;
            if height > CHUNKED_ALTITUDES {
                return Err(DecodeError::SectionOverrun { section: "column" });
            }
            let first = offset as usize + 1;
            let count = height.saturating_sub(start);
            let indices = columns.get(first..first + count).ok_or(invalid)?;
            for (i, &index) in indices.iter().enumerate() {
                if let Some(block) = table.resolve(index)? {
                    let cell = map.cell_index(x, y, start + i);
                    map.cells[cell] = Some(block);
                }
            }
        }
    }
    map.blocks = table.blocks;
    Ok(())
}

/// Decodes an uncompressed `UMAP` grid, sharing identical records.
fn decode_uncompressed_grid(map: &mut Map, cur: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
    let mut shared: FxHashMap<BlockRecord, Option<u32>> = FxHashMap::default();
    let mut blocks = Vec::new();
    for z in 0..CHUNKED_ALTITUDES {
        for y in 0..MAP_HEIGHT {
            for x in 0..MAP_WIDTH {
                let record = BlockRecord::read(cur)?;
                let index = *shared.entry(record).or_insert_with(|| {
                    let block = record.to_block();
                    (!block.is_empty()).then(|| {
                        blocks.push(block);
                        blocks.len() as u32 - 1
                    })
                });
                let cell = map.cell_index(x, y, z);
                map.cells[cell] = index;
            }
        }
    }
    tracing::debug!(distinct = blocks.len(), "uncompressed grid");
    map.blocks = blocks;
    Ok(())
}

// ---------------------------------------------------------------------------
// Auxiliary chunks
// ---------------------------------------------------------------------------

fn decode_zones(cur: &mut ByteCursor<'_>) -> Result<Vec<Area>, DecodeError> {
    let mut areas = Vec::new();
    while !cur.is_at_end() {
        let kind = cur.read_u8()?;
        let (x, y, width, height) = (cur.read_u8()?, cur.read_u8()?, cur.read_u8()?, cur.read_u8()?);
        let name_len = cur.read_u8()? as usize;
        let name = cur.read_fixed_str(name_len)?;
        if kind == ZONE_NAVIGATION || kind == ZONE_LOCAL_NAVIGATION {
            areas.push(Area {
                x,
                y,
                width,
                height,
                name,
                sample: 0,
                kind,
            });
        }
    }
    Ok(areas)
}

/// Decodes one 16-byte light record.
pub fn read_light(cur: &mut ByteCursor<'_>) -> Result<Light, DecodeError> {
    let color = Rgb {
        r: cur.read_u8()? as f32 / COLOR_SCALE,
        g: cur.read_u8()? as f32 / COLOR_SCALE,
        b: cur.read_u8()? as f32 / COLOR_SCALE,
    };
    cur.skip(1)?; // alpha, unused
    let position = Vec3::new(
        cur.read_u16()? as f32,
        cur.read_u16()? as f32,
        cur.read_u16()? as f32,
    ) / POSITION_SCALE;
    let radius = cur.read_u16()? as f32 / POSITION_SCALE;
    Ok(Light {
        color,
        position,
        radius,
        intensity: cur.read_u8()? as f32 / INTENSITY_SCALE,
        shape: cur.read_u8()?,
        on_time: cur.read_u8()?,
        off_time: cur.read_u8()?,
    })
}

fn decode_lights(cur: &mut ByteCursor<'_>) -> Result<Vec<Light>, DecodeError> {
    let mut lights = Vec::with_capacity(cur.len() / 16);
    while !cur.is_at_end() {
        lights.push(read_light(cur)?);
    }
    Ok(lights)
}

fn decode_objects(cur: &mut ByteCursor<'_>) -> Result<Vec<MapObject>, DecodeError> {
    let mut objects = Vec::with_capacity(cur.len() / 6);
    while !cur.is_at_end() {
        let x = cur.read_u16()? as f32 / POSITION_SCALE;
        let y = cur.read_u16()? as f32 / POSITION_SCALE;
        let rotation = cur.read_u8()? as f32 * 360.0 / 256.0;
        let object_type = cur.read_u8()?;
        objects.push(MapObject {
            position: Vec3::new(x, y, 0.0),
            object_type,
            remap: 0,
            rotation,
            pitch: 0.0,
            roll: 0.0,
        });
    }
    Ok(objects)
}

fn decode_animations(cur: &mut ByteCursor<'_>) -> Result<Vec<TileAnimation>, DecodeError> {
    let mut animations = Vec::new();
    while !cur.is_at_end() {
        let base_tile = cur.read_u16()?;
        let frame_rate = cur.read_u8()?;
        let repeat = cur.read_u8()?;
        let length = cur.read_u8()? as usize;
        cur.skip(1)?;
        let frames = (0..length)
            .map(|_| cur.read_u16())
            .collect::<Result<Vec<_>, _>>()?;
        animations.push(TileAnimation {
            base_tile,
            frame_rate,
            repeat,
            frames,
        });
    }
    Ok(animations)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Decodes a complete chunked map buffer.
///
/// Unknown chunks are logged and skipped. A file without any grid chunk is
/// rejected with [`DecodeError::MissingChunk`].
pub fn decode(data: &[u8]) -> Result<Map, DecodeError> {
    let reader = ChunkReader::open(data, CHUNKED_MAP_MAGIC, CHUNKED_MAP_VERSION)?;
    let mut map = Map::empty(MapFormat::Chunked);
    let mut has_grid = false;

    for chunk in reader {
        let chunk = chunk?;
        let mut cur = chunk.cursor();
        match chunk.tag {
            TAG_DMAP => {
                decode_compressed_grid(&mut map, &mut cur, GridWidth::Wide)?;
                has_grid = true;
            }
            TAG_CMAP => {
                decode_compressed_grid(&mut map, &mut cur, GridWidth::Narrow)?;
                has_grid = true;
            }
            TAG_UMAP => {
                decode_uncompressed_grid(&mut map, &mut cur)?;
                has_grid = true;
            }
            TAG_ZONE => map.areas = decode_zones(&mut cur)?,
            TAG_LGHT => map.lights = decode_lights(&mut cur)?,
            TAG_MOBJ => map.objects = decode_objects(&mut cur)?,
            TAG_ANIM => map.animations = decode_animations(&mut cur)?,
            tag if IGNORED_TAGS.contains(&tag) => {
                tracing::debug!(%tag, len = chunk.payload.len(), "skipping unused chunk");
            }
            tag => {
                tracing::warn!(%tag, offset = chunk.offset, "skipping unknown map chunk");
            }
        }
    }

    if !has_grid {
        return Err(DecodeError::MissingChunk(TAG_DMAP));
    }

    tracing::info!(
        cells = map.occupied_cells(),
        blocks = map.blocks.len(),
        areas = map.areas.len(),
        lights = map.lights.len(),
        "decoded chunked map"
    );
    Ok(map)
}
