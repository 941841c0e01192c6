//! The decoded city map: a dense 256×256 grid of block columns plus the
//! auxiliary tables shipped alongside it.

use glam::Vec3;

use crate::block::Block;
use crate::chunked::CHUNKED_MAP_MAGIC;
use crate::legacy::LEGACY_MAP_VERSION;

/// Grid width in columns.
pub const MAP_WIDTH: usize = 256;

/// Grid height in columns.
pub const MAP_HEIGHT: usize = 256;

/// Which file family a map was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapFormat {
    /// Fixed-header format with 6 altitude levels.
    Legacy,
    /// Tagged-chunk format with 8 altitude levels.
    Chunked,
}

impl MapFormat {
    /// Number of altitude levels per column.
    pub fn max_altitude(self) -> usize {
        match self {
            MapFormat::Legacy => 6,
            MapFormat::Chunked => 8,
        }
    }

    /// Sniffs the format from the first bytes of a file.
    ///
    /// Chunked maps start with the `GBMP` tag; legacy maps with the `u32`
    /// version 331. Anything else is `None`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let head: [u8; 4] = data.get(..4)?.try_into().ok()?;
        if head == CHUNKED_MAP_MAGIC.0 {
            Some(MapFormat::Chunked)
        } else if u32::from_le_bytes(head) == LEGACY_MAP_VERSION {
            Some(MapFormat::Legacy)
        } else {
            None
        }
    }
}

/// A named rectangle of the map (navigation zone).
///
/// `name` is an opaque key for the text provider in legacy maps and the raw
/// zone name in chunked maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
    pub name: String,
    /// Ambient sample played inside the zone (legacy maps only, else 0).
    pub sample: u8,
    /// Zone type byte (chunked maps only, else 0).
    pub kind: u8,
}

/// Normalized RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A static point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub color: Rgb,
    /// Position in block units.
    pub position: Vec3,
    /// Radius in block units.
    pub radius: f32,
    /// Intensity in `0.0..=1.0`.
    pub intensity: f32,
    pub shape: u8,
    /// Flicker timing in frames.
    pub on_time: u8,
    pub off_time: u8,
}

/// An object placed on the map at load time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapObject {
    /// Position in block units.
    pub position: Vec3,
    pub object_type: u8,
    /// Palette remap (legacy maps only).
    pub remap: u8,
    /// Heading in degrees.
    pub rotation: f32,
    /// Pitch in degrees (legacy maps only).
    pub pitch: f32,
    /// Roll in degrees (legacy maps only).
    pub roll: f32,
}

/// A vehicle route through the city (legacy maps only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub kind: u8,
    /// Waypoints in block coordinates, sentinel triples removed.
    pub points: Vec<[u8; 3]>,
}

/// What a location marker stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationKind {
    PoliceStation,
    Hospital,
    FireStation,
    Unused,
}

/// A fixed service location (legacy maps only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub kind: LocationKind,
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

/// A cycling lid/wall tile animation (chunked maps only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileAnimation {
    /// Tile whose appearance is animated.
    pub base_tile: u16,
    /// Game frames per animation frame.
    pub frame_rate: u8,
    /// Repeat count, 0 = forever.
    pub repeat: u8,
    pub frames: Vec<u16>,
}

/// Everything decoded from a map file. Immutable once built.
#[derive(Clone, Debug)]
pub struct Map {
    pub(crate) format: MapFormat,
    /// Distinct blocks referenced by `cells`.
    pub(crate) blocks: Vec<Block>,
    /// `(y * MAP_WIDTH + x) * max_altitude + altitude` → index into `blocks`.
    pub(crate) cells: Vec<Option<u32>>,
    pub(crate) areas: Vec<Area>,
    pub(crate) lights: Vec<Light>,
    pub(crate) objects: Vec<MapObject>,
    pub(crate) routes: Vec<Route>,
    pub(crate) locations: Vec<Location>,
    pub(crate) animations: Vec<TileAnimation>,
    pub(crate) style_index: u8,
    pub(crate) sample_index: u8,
}

impl Map {
    /// Creates a map with every cell empty.
    pub(crate) fn empty(format: MapFormat) -> Self {
        Self {
            format,
            blocks: Vec::new(),
            cells: vec![None; MAP_WIDTH * MAP_HEIGHT * format.max_altitude()],
            areas: Vec::new(),
            lights: Vec::new(),
            objects: Vec::new(),
            routes: Vec::new(),
            locations: Vec::new(),
            animations: Vec::new(),
            style_index: 0,
            sample_index: 0,
        }
    }

    /// Builds a map from already-resolved parts.
    ///
    /// `cells` lists `(x, y, altitude, block)` placements; blocks are stored
    /// once per placement. Intended for tools and tests that synthesize maps.
    pub fn from_cells(
        format: MapFormat,
        cells: impl IntoIterator<Item = (usize, usize, usize, Block)>,
    ) -> Self {
        let mut map = Self::empty(format);
        for (x, y, altitude, block) in cells {
            if x >= MAP_WIDTH || y >= MAP_HEIGHT || altitude >= format.max_altitude() {
                continue;
            }
            let index = map.blocks.len() as u32;
            map.blocks.push(block);
            let cell = map.cell_index(x, y, altitude);
            map.cells[cell] = Some(index);
        }
        map
    }

    pub(crate) fn cell_index(&self, x: usize, y: usize, altitude: usize) -> usize {
        (y * MAP_WIDTH + x) * self.format.max_altitude() + altitude
    }

    pub fn format(&self) -> MapFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        MAP_WIDTH
    }

    pub fn height(&self) -> usize {
        MAP_HEIGHT
    }

    /// Number of altitude levels per column (6 legacy, 8 chunked).
    pub fn max_altitude(&self) -> usize {
        self.format.max_altitude()
    }

    /// Returns the block at a grid position.
    ///
    /// `x` and `y` are clamped to the grid; an altitude outside the column
    /// yields `None`.
    pub fn get_block(&self, x: i32, y: i32, altitude: i32) -> Option<&Block> {
        if altitude < 0 || altitude as usize >= self.max_altitude() {
            return None;
        }
        let x = x.clamp(0, MAP_WIDTH as i32 - 1) as usize;
        let y = y.clamp(0, MAP_HEIGHT as i32 - 1) as usize;
        let index = self.cells[self.cell_index(x, y, altitude as usize)]?;
        self.blocks.get(index as usize)
    }

    /// The column at `(x, y)`, bottom level first. Coordinates are clamped.
    pub fn column(&self, x: i32, y: i32) -> impl Iterator<Item = Option<&Block>> {
        (0..self.max_altitude() as i32).map(move |z| self.get_block(x, y, z))
    }

    /// Number of distinct block records backing the grid.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of occupied grid cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn animations(&self) -> &[TileAnimation] {
        &self.animations
    }

    /// Style file the map was authored against (legacy header field).
    pub fn style_index(&self) -> u8 {
        self.style_index
    }

    /// Audio sample bank the map was authored against (legacy header field).
    pub fn sample_index(&self) -> u8 {
        self.sample_index
    }
}
