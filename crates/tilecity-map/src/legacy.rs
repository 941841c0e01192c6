//! Decoder for the legacy fixed-header map format.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Version (`u32`, must be 331) |
//! | 4 | 1 | Style index |
//! | 5 | 1 | Sample index |
//! | 6 | 2 | Reserved |
//! | 8 | 20 | Section lengths: route, object-position, column, block, nav-data (`u32` each) |
//! | 28 | 262 144 | Grid: 256×256 `u32` byte offsets into the column section, y-outer |
//! | … | column | Column table: `{u16 start, u16 block[6 - start]}` repeated |
//! | … | block | Block table: 8-byte records |
//! | … | object-position | 14-byte object records |
//! | … | route | `{u8 count, u8 kind, count × {u8 x, y, z}}` repeated |
//! | … | 108 | 36 location triples `{u8 x, y, z}` in six groups of six |
//! | … | nav-data | 35-byte zone records `{u8 x, y, w, h, sample; char name[30]}` |
//!
//! Column slots are stored from the sky downwards; the start offset counts
//! empty levels above the first block.

use glam::Vec3;
use rustc_hash::FxHashMap;
use tilecity_io::{ByteCursor, DecodeError};

use crate::block::{Block, Collision, Lid, TextureTransform, Wall};
use crate::map::{
    Area, Location, LocationKind, MAP_HEIGHT, MAP_WIDTH, Map, MapFormat, MapObject, Route,
};

/// The only version of the legacy format that ever shipped.
pub const LEGACY_MAP_VERSION: u32 = 331;

/// Altitude levels per legacy column.
pub const LEGACY_ALTITUDES: usize = 6;

const HEADER_SIZE: usize = 28;
const BLOCK_RECORD_SIZE: usize = 8;
const OBJECT_RECORD_SIZE: usize = 14;
const LOCATION_COUNT: usize = 36;
const LOCATIONS_PER_GROUP: usize = 6;
const NAV_NAME_LEN: usize = 30;
const NAV_RECORD_SIZE: usize = 5 + NAV_NAME_LEN;

/// Object coordinates are stored in 1/64 block units.
const OBJECT_UNITS_PER_BLOCK: f32 = 64.0;

/// Object angles are stored as 1024 steps per turn.
const ANGLE_STEPS: f32 = 1024.0;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Fixed header preceding the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyHeader {
    pub version: u32,
    pub style_index: u8,
    pub sample_index: u8,
    pub route_size: u32,
    pub object_pos_size: u32,
    pub column_size: u32,
    pub block_size: u32,
    pub nav_data_size: u32,
}

impl LegacyHeader {
    /// Reads the header and rejects any version but [`LEGACY_MAP_VERSION`].
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let version = cur.read_u32()?;
        if version != LEGACY_MAP_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                expected: LEGACY_MAP_VERSION,
                found: version,
            });
        }
        let style_index = cur.read_u8()?;
        let sample_index = cur.read_u8()?;
        cur.skip(2)?;
        Ok(Self {
            version,
            style_index,
            sample_index,
            route_size: cur.read_u32()?,
            object_pos_size: cur.read_u32()?,
            column_size: cur.read_u32()?,
            block_size: cur.read_u32()?,
            nav_data_size: cur.read_u32()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Block bitfields
// ---------------------------------------------------------------------------

/// Decoded `typeMap` word of a legacy block record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeMap {
    /// Traffic direction nibble.
    pub direction: u8,
    /// Ground type (air, water, road, pavement, field, building, …).
    pub block_type: u8,
    /// Faces are drawn see-through.
    pub flat: bool,
    /// Slope code (0..=63).
    pub slope: u8,
    /// Lid quarter turns (0..=3).
    pub lid_rotation: u8,
}

impl TypeMap {
    pub fn from_raw(v: u16) -> Self {
        Self {
            direction: (v & 0xF) as u8,
            block_type: ((v >> 4) & 0x7) as u8,
            flat: (v >> 7) & 1 != 0,
            slope: ((v >> 8) & 0x3F) as u8,
            lid_rotation: ((v >> 14) & 0x3) as u8,
        }
    }
}

/// Decoded `typeMapExt` byte of a legacy block record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeMapExt {
    pub traffic_light: u8,
    /// Lid lighting remap (0..=3).
    pub remap: u8,
    pub flip_top_bottom: bool,
    pub flip_left_right: bool,
    pub railway: bool,
}

impl TypeMapExt {
    pub fn from_raw(ext: u8) -> Self {
        Self {
            traffic_light: ext & 0x7,
            remap: (ext >> 3) & 0x3,
            flip_top_bottom: (ext >> 5) & 1 != 0,
            flip_left_right: (ext >> 6) & 1 != 0,
            railway: (ext >> 7) & 1 != 0,
        }
    }
}

/// One raw 8-byte block record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyBlockRecord {
    pub type_map: u16,
    pub type_map_ext: u8,
    pub left: u8,
    pub right: u8,
    pub top: u8,
    pub bottom: u8,
    pub lid: u8,
}

impl LegacyBlockRecord {
    pub fn read(cur: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            type_map: cur.read_u16()?,
            type_map_ext: cur.read_u8()?,
            left: cur.read_u8()?,
            right: cur.read_u8()?,
            top: cur.read_u8()?,
            bottom: cur.read_u8()?,
            lid: cur.read_u8()?,
        })
    }

    /// Converts the record to the shared block model.
    ///
    /// Walls in this format always block everything; `flat` marks both lid
    /// and walls see-through.
    pub fn to_block(&self) -> Block {
        let tm = TypeMap::from_raw(self.type_map);
        let ext = TypeMapExt::from_raw(self.type_map_ext);
        let wall = |tile: u8, flip: bool| {
            (tile != 0).then(|| Wall {
                tile_index: tile as u16,
                back_tile_index: None,
                collision: Collision::Solid,
                transparent: tm.flat,
                transform: if flip {
                    TextureTransform::Mirror
                } else {
                    TextureTransform::Identity
                },
                flip,
            })
        };
        Block {
            top: wall(self.top, ext.flip_top_bottom),
            bottom: wall(self.bottom, ext.flip_top_bottom),
            left: wall(self.left, ext.flip_left_right),
            right: wall(self.right, ext.flip_left_right),
            lid: (self.lid != 0).then(|| Lid {
                tile_index: self.lid as u16,
                light_level: ext.remap,
                transparent: tm.flat,
                transform: TextureTransform::from_bits(tm.lid_rotation),
                rotate: tm.lid_rotation,
            }),
            slope: tm.slope,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Column section byte offset → six block indices, sky first. 0 = empty.
pub type ColumnTable = FxHashMap<u32, [u16; LEGACY_ALTITUDES]>;

/// Decodes the column section.
///
/// Each entry is keyed by its byte offset within the section, which is what
/// grid cells point at.
pub fn decode_column_table(cur: &mut ByteCursor<'_>) -> Result<ColumnTable, DecodeError> {
    let mut table = ColumnTable::default();
    while !cur.is_at_end() {
        let offset = cur.position() as u32;
        let mut start = cur.read_u16()? as usize;
        if start > LEGACY_ALTITUDES {
            tracing::warn!(offset, start, "column start offset past top level");
            start = LEGACY_ALTITUDES;
        }
        let mut slots = [0u16; LEGACY_ALTITUDES];
        for slot in slots.iter_mut().skip(start) {
            *slot = cur.read_u16()?;
        }
        table.insert(offset, slots);
    }
    Ok(table)
}

fn decode_block_table(cur: &mut ByteCursor<'_>) -> Result<Vec<Block>, DecodeError> {
    if cur.len() % BLOCK_RECORD_SIZE != 0 {
        return Err(DecodeError::SectionOverrun { section: "block" });
    }
    let mut blocks = Vec::with_capacity(cur.len() / BLOCK_RECORD_SIZE);
    while !cur.is_at_end() {
        blocks.push(LegacyBlockRecord::read(cur)?.to_block());
    }
    Ok(blocks)
}

fn degrees(steps: u16) -> f32 {
    steps as f32 * 360.0 / ANGLE_STEPS
}

fn decode_objects(cur: &mut ByteCursor<'_>) -> Result<Vec<MapObject>, DecodeError> {
    if cur.len() % OBJECT_RECORD_SIZE != 0 {
        return Err(DecodeError::SectionOverrun { section: "object" });
    }
    let mut objects = Vec::with_capacity(cur.len() / OBJECT_RECORD_SIZE);
    while !cur.is_at_end() {
        let (x, y, z) = (cur.read_u16()?, cur.read_u16()?, cur.read_u16()?);
        let object_type = cur.read_u8()?;
        let remap = cur.read_u8()?;
        let (rotation, pitch, roll) = (cur.read_u16()?, cur.read_u16()?, cur.read_u16()?);
        if x == 0 && y == 0 && z == 0 {
            continue;
        }
        objects.push(MapObject {
            position: Vec3::new(x as f32, y as f32, z as f32) / OBJECT_UNITS_PER_BLOCK,
            object_type,
            remap,
            rotation: degrees(rotation),
            pitch: degrees(pitch),
            roll: degrees(roll),
        });
    }
    Ok(objects)
}

fn read_triple(cur: &mut ByteCursor<'_>) -> Result<[u8; 3], DecodeError> {
    Ok([cur.read_u8()?, cur.read_u8()?, cur.read_u8()?])
}

fn decode_routes(cur: &mut ByteCursor<'_>) -> Result<Vec<Route>, DecodeError> {
    let mut routes = Vec::new();
    while !cur.is_at_end() {
        let count = cur.read_u8()? as usize;
        let kind = cur.read_u8()?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let p = read_triple(cur)?;
            if p != [0, 0, 0] {
                points.push(p);
            }
        }
        routes.push(Route { kind, points });
    }
    Ok(routes)
}

fn decode_locations(cur: &mut ByteCursor<'_>) -> Result<Vec<Location>, DecodeError> {
    const GROUPS: [LocationKind; 6] = [
        LocationKind::PoliceStation,
        LocationKind::Hospital,
        LocationKind::Unused,
        LocationKind::Unused,
        LocationKind::FireStation,
        LocationKind::Unused,
    ];
    let mut locations = Vec::new();
    for i in 0..LOCATION_COUNT {
        let [x, y, z] = read_triple(cur)?;
        if x == 0 && y == 0 && z == 0 {
            continue;
        }
        locations.push(Location {
            kind: GROUPS[i / LOCATIONS_PER_GROUP],
            x,
            y,
            z,
        });
    }
    Ok(locations)
}

fn decode_nav_areas(cur: &mut ByteCursor<'_>) -> Result<Vec<Area>, DecodeError> {
    if cur.len() % NAV_RECORD_SIZE != 0 {
        return Err(DecodeError::SectionOverrun { section: "nav-data" });
    }
    let mut areas = Vec::with_capacity(cur.len() / NAV_RECORD_SIZE);
    while !cur.is_at_end() {
        areas.push(Area {
            x: cur.read_u8()?,
            y: cur.read_u8()?,
            width: cur.read_u8()?,
            height: cur.read_u8()?,
            sample: cur.read_u8()?,
            name: cur.read_fixed_str(NAV_NAME_LEN)?,
            kind: 0,
        });
    }
    Ok(areas)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Decodes a complete legacy map buffer.
///
/// # Errors
///
/// [`DecodeError::UnsupportedVersion`] before anything else is read if the
/// version word is wrong; [`DecodeError::InvalidStackPointer`] if a grid cell
/// points outside the column table; [`DecodeError::OutOfBounds`] on
/// truncation.
pub fn decode(data: &[u8]) -> Result<Map, DecodeError> {
    let mut cur = ByteCursor::new(data);
    let header = LegacyHeader::read(&mut cur)?;
    debug_assert_eq!(cur.position(), HEADER_SIZE);

    let mut grid = cur.sub_cursor(MAP_WIDTH * MAP_HEIGHT * 4)?;
    let columns = decode_column_table(&mut cur.sub_cursor(header.column_size as usize)?)?;
    let blocks = decode_block_table(&mut cur.sub_cursor(header.block_size as usize)?)?;
    let objects = decode_objects(&mut cur.sub_cursor(header.object_pos_size as usize)?)?;
    let routes = decode_routes(&mut cur.sub_cursor(header.route_size as usize)?)?;
    let locations = decode_locations(&mut cur.sub_cursor(LOCATION_COUNT * 3)?)?;
    let areas = decode_nav_areas(&mut cur.sub_cursor(header.nav_data_size as usize)?)?;
    tracing::debug!(
        columns = columns.len(),
        blocks = blocks.len(),
        objects = objects.len(),
        routes = routes.len(),
        "legacy map sections decoded"
    );

    let mut map = Map::empty(MapFormat::Legacy);
    for y in 0..MAP_HEIGHT {
        for x in 0..MAP_WIDTH {
            let offset = grid.read_u32()?;
            let slots = columns
                .get(&offset)
                .ok_or(DecodeError::InvalidStackPointer { x, y, offset })?;
            for (slot, &index) in slots.iter().enumerate() {
                if index == 0 {
                    continue;
                }
                if index as usize >= blocks.len() {
                    return Err(DecodeError::InvalidBlockIndex {
                        index: index as u32,
                        count: blocks.len(),
                    });
                }
                let altitude = LEGACY_ALTITUDES - 1 - slot;
                let cell = map.cell_index(x, y, altitude);
                map.cells[cell] = Some(index as u32);
            }
        }
    }

    map.blocks = blocks;
    map.objects = objects;
    map.routes = routes;
    map.locations = locations;
    map.areas = areas;
    map.style_index = header.style_index;
    map.sample_index = header.sample_index;

    tracing::info!(
        cells = map.occupied_cells(),
        areas = map.areas.len(),
        "decoded legacy map"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal little-endian writer for building test maps.
    #[derive(Default)]
    struct Writer(Vec<u8>);

    impl Writer {
        fn u8(&mut self, v: u8) -> &mut Self {
            self.0.push(v);
            self
        }
        fn u16(&mut self, v: u16) -> &mut Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        fn u32(&mut self, v: u32) -> &mut Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }
        fn bytes(&mut self, v: &[u8]) -> &mut Self {
            self.0.extend_from_slice(v);
            self
        }
    }

    struct Sections {
        grid: Vec<u32>,
        columns: Vec<u8>,
        blocks: Vec<u8>,
        objects: Vec<u8>,
        routes: Vec<u8>,
        locations: [u8; LOCATION_COUNT * 3],
        nav: Vec<u8>,
    }

    impl Sections {
        /// Every cell points at one column `{start: 5, [1]}` (one block at ground level).
        fn single_block(record: [u8; 8]) -> Self {
            let mut columns = Writer::default();
            columns.u16(6); // offset 0: empty column
            columns.u16(5).u16(1); // offset 2: block 1 at the lowest slot
            let mut blocks = vec![0u8; 8];
            blocks.extend_from_slice(&record);
            Self {
                grid: vec![2; MAP_WIDTH * MAP_HEIGHT],
                columns: columns.0,
                blocks,
                objects: Vec::new(),
                routes: Vec::new(),
                locations: [0; LOCATION_COUNT * 3],
                nav: Vec::new(),
            }
        }

        fn encode(&self, version: u32) -> Vec<u8> {
            let mut w = Writer::default();
            w.u32(version).u8(3).u8(4).u16(0);
            w.u32(self.routes.len() as u32)
                .u32(self.objects.len() as u32)
                .u32(self.columns.len() as u32)
                .u32(self.blocks.len() as u32)
                .u32(self.nav.len() as u32);
            for &p in &self.grid {
                w.u32(p);
            }
            w.bytes(&self.columns)
                .bytes(&self.blocks)
                .bytes(&self.objects)
                .bytes(&self.routes)
                .bytes(&self.locations)
                .bytes(&self.nav);
            w.0
        }
    }

    #[test]
    fn test_type_map_bit_decomposition_exhaustive() {
        for v in 0..=u16::MAX {
            let tm = TypeMap::from_raw(v);
            assert_eq!(tm.direction as u16, v & 15);
            assert_eq!(tm.block_type as u16, (v >> 4) & 7);
            assert_eq!(tm.flat, (v >> 7) & 1 == 1);
            assert_eq!(tm.slope as u16, (v >> 8) & 63);
            assert_eq!(tm.lid_rotation as u16, v >> 14);
            assert!(tm.slope <= 63);
        }
    }

    #[test]
    fn test_type_map_ext_bits() {
        let ext = TypeMapExt::from_raw(0b1011_1101);
        assert_eq!(ext.traffic_light, 0b101);
        assert_eq!(ext.remap, 0b11);
        assert!(ext.flip_top_bottom);
        assert!(!ext.flip_left_right);
        assert!(ext.railway);
    }

    #[test]
    fn test_column_table_round_trip() {
        let cases: [(u16, &[u16]); 4] = [
            (0, &[1, 2, 3, 4, 5, 6]),
            (2, &[7, 0, 9, 10]),
            (5, &[11]),
            (6, &[]),
        ];
        let mut w = Writer::default();
        let mut offsets = Vec::new();
        for (start, indices) in cases {
            offsets.push(w.0.len() as u32);
            w.u16(start);
            for &i in indices {
                w.u16(i);
            }
        }
        let table = decode_column_table(&mut ByteCursor::new(&w.0)).unwrap();
        assert_eq!(table.len(), cases.len());
        for ((start, indices), offset) in cases.iter().zip(offsets) {
            let mut expected = [0u16; LEGACY_ALTITUDES];
            expected[*start as usize..].copy_from_slice(indices);
            assert_eq!(table[&offset], expected);
        }
    }

    #[test]
    fn test_wall_bytes_map_to_walls() {
        let record = LegacyBlockRecord {
            type_map: 0,
            type_map_ext: 0,
            left: 5,
            right: 0,
            top: 0,
            bottom: 0,
            lid: 0,
        };
        let block = record.to_block();
        let left = block.left.unwrap();
        assert_eq!(left.tile_index, 5);
        assert_eq!(left.back_tile_index, None);
        assert_eq!(left.collision, Collision::Solid);
        assert!(!left.transparent);
        assert!(block.right.is_none());
        assert!(block.lid.is_none());
    }

    #[test]
    fn test_lid_follows_flat_and_rotation_bits() {
        let record = LegacyBlockRecord {
            type_map: (3 << 14) | (12 << 8) | (1 << 7),
            type_map_ext: (2 << 3) | (1 << 6),
            left: 1,
            right: 2,
            top: 3,
            bottom: 0,
            lid: 40,
        };
        let block = record.to_block();
        let lid = block.lid.unwrap();
        assert_eq!(lid.tile_index, 40);
        assert_eq!(lid.light_level, 2);
        assert!(lid.transparent);
        assert_eq!(lid.rotate, 3);
        assert_eq!(lid.transform, TextureTransform::Rotate270);
        assert_eq!(block.slope, 12);
        assert!(block.left.unwrap().flip);
        assert_eq!(block.right.unwrap().transform, TextureTransform::Mirror);
        assert!(!block.top.unwrap().flip);
    }

    #[test]
    fn test_decode_resolves_every_cell() {
        let sections = Sections::single_block([0, 0, 0, 5, 0, 0, 0, 7]);
        let map = decode(&sections.encode(LEGACY_MAP_VERSION)).unwrap();
        assert_eq!(map.format(), MapFormat::Legacy);
        assert_eq!(map.max_altitude(), 6);
        assert_eq!(map.style_index(), 3);
        assert_eq!(map.sample_index(), 4);
        assert_eq!(map.occupied_cells(), MAP_WIDTH * MAP_HEIGHT);
        for (x, y) in [(0, 0), (255, 255), (17, 200)] {
            let block = map.get_block(x, y, 0).unwrap();
            assert_eq!(block.left.unwrap().tile_index, 5);
            assert_eq!(block.lid.unwrap().tile_index, 7);
            for z in 1..6 {
                assert!(map.get_block(x, y, z).is_none());
            }
        }
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let sections = Sections::single_block([0; 8]);
        let result = decode(&sections.encode(1));
        assert_eq!(
            result.unwrap_err(),
            DecodeError::UnsupportedVersion {
                expected: LEGACY_MAP_VERSION,
                found: 1
            }
        );
        // Version is checked before the grid is touched.
        let result = decode(&1u32.to_le_bytes());
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedVersion { found: 1, .. })
        ));
    }

    #[test]
    fn test_missing_column_is_invalid_stack_pointer() {
        let mut sections = Sections::single_block([0; 8]);
        sections.grid[256 * 3 + 9] = 1; // mid-entry offset, no column starts there
        let result = decode(&sections.encode(LEGACY_MAP_VERSION));
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidStackPointer {
                x: 9,
                y: 3,
                offset: 1
            }
        );
    }

    #[test]
    fn test_block_index_past_table_is_rejected() {
        let mut sections = Sections::single_block([0; 8]);
        sections.columns = {
            let mut w = Writer::default();
            w.u16(5).u16(0).u16(5).u16(9);
            w.0
        };
        sections.grid = vec![4; MAP_WIDTH * MAP_HEIGHT];
        let result = decode(&sections.encode(LEGACY_MAP_VERSION));
        assert!(matches!(
            result,
            Err(DecodeError::InvalidBlockIndex { index: 9, count: 2 })
        ));
    }

    #[test]
    fn test_truncated_buffer_is_out_of_bounds() {
        let sections = Sections::single_block([0; 8]);
        let mut bytes = sections.encode(LEGACY_MAP_VERSION);
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_auxiliary_sections_filter_sentinels() {
        let mut sections = Sections::single_block([0; 8]);

        let mut objects = Writer::default();
        objects.u16(128).u16(64).u16(0).u8(7).u8(1).u16(256).u16(0).u16(512);
        objects.u16(0).u16(0).u16(0).u8(9).u8(0).u16(0).u16(0).u16(0);
        sections.objects = objects.0;

        let mut routes = Writer::default();
        routes.u8(3).u8(2).bytes(&[1, 2, 3, 0, 0, 0, 4, 5, 6]);
        routes.u8(0).u8(1);
        sections.routes = routes.0;

        sections.locations[0..3].copy_from_slice(&[10, 11, 2]); // police #0
        sections.locations[18..21].copy_from_slice(&[20, 21, 3]); // hospital #0
        sections.locations[6 * 3 * 4..6 * 3 * 4 + 3].copy_from_slice(&[30, 31, 4]); // fire #0

        let mut nav = Writer::default();
        nav.u8(1).u8(2).u8(30).u8(40).u8(5);
        let mut name = b"SUBURBIA".to_vec();
        name.resize(NAV_NAME_LEN, 0);
        nav.bytes(&name);
        sections.nav = nav.0;

        let map = decode(&sections.encode(LEGACY_MAP_VERSION)).unwrap();

        assert_eq!(map.objects().len(), 1);
        let obj = map.objects()[0];
        assert_eq!(obj.position, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(obj.object_type, 7);
        assert_eq!(obj.rotation, 90.0);
        assert_eq!(obj.roll, 180.0);

        assert_eq!(map.routes().len(), 2);
        assert_eq!(map.routes()[0].points, vec![[1, 2, 3], [4, 5, 6]]);
        assert!(map.routes()[1].points.is_empty());

        let kinds: Vec<_> = map.locations().iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LocationKind::PoliceStation,
                LocationKind::Hospital,
                LocationKind::FireStation
            ]
        );

        assert_eq!(map.areas().len(), 1);
        assert_eq!(map.areas()[0].name, "SUBURBIA");
        assert_eq!(map.areas()[0].width, 30);
        assert_eq!(map.areas()[0].sample, 5);
    }
}
