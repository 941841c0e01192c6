//! Format-independent block model shared by both map decoders.
//!
//! A [`Block`] is one voxel cell of the city: up to four vertical walls, a
//! horizontal lid, and a slope code that reshapes the cell's corners when it
//! is meshed. Map coordinates run x to the right and y downwards (towards
//! the bottom of the screen); altitude grows upwards.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TextureTransform
// ---------------------------------------------------------------------------

/// One of the eight rotate/mirror states applied to a face's texture.
///
/// The discriminant is the 3-bit value stored in the map files: bits 0-1 are
/// the quarter-turn count, bit 2 mirrors the texture horizontally before it
/// is rotated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TextureTransform {
    #[default]
    Identity = 0,
    Rotate90 = 1,
    Rotate180 = 2,
    Rotate270 = 3,
    Mirror = 4,
    MirrorRotate90 = 5,
    MirrorRotate180 = 6,
    MirrorRotate270 = 7,
}

impl TextureTransform {
    /// All eight states in discriminant order.
    pub const ALL: [TextureTransform; 8] = [
        Self::Identity,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::Mirror,
        Self::MirrorRotate90,
        Self::MirrorRotate180,
        Self::MirrorRotate270,
    ];

    /// Decodes the low three bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    /// Quarter turns applied after the optional mirror (0..=3).
    pub fn quarter_turns(self) -> u8 {
        self as u8 & 3
    }

    pub fn is_mirrored(self) -> bool {
        self as u8 & 4 != 0
    }

    /// The same rotation with the mirror bit toggled.
    pub fn toggle_mirror(self) -> Self {
        Self::from_bits(self as u8 ^ 4)
    }
}

// ---------------------------------------------------------------------------
// Faces
// ---------------------------------------------------------------------------

/// Who a wall stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collision {
    /// Nothing collides with the wall.
    #[default]
    None,
    /// Characters are blocked, vehicles and bullets pass.
    Character,
    /// Blocks everything.
    Solid,
}

/// One of the four vertical faces of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Face pointing towards -y.
    Top,
    /// Face pointing towards +y.
    Bottom,
    /// Face pointing towards -x.
    Left,
    /// Face pointing towards +x.
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A vertical face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wall {
    /// Tile drawn on the outward side.
    pub tile_index: u16,
    /// Tile drawn on the inward side of a thin transparent wall.
    pub back_tile_index: Option<u16>,
    pub collision: Collision,
    /// Drawn in the transparent pass (palette index 0 is see-through).
    pub transparent: bool,
    pub transform: TextureTransform,
    /// Raw flip flag as stored in the file.
    pub flip: bool,
}

/// The horizontal top face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lid {
    pub tile_index: u16,
    /// Lighting remap level (0..=3).
    pub light_level: u8,
    pub transparent: bool,
    pub transform: TextureTransform,
    /// Quarter turns as stored in the file (0..=3).
    pub rotate: u8,
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// Highest slope code the displacement table knows about.
pub const MAX_SLOPE: u8 = 67;

/// One decoded voxel cell. Any face may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub top: Option<Wall>,
    pub bottom: Option<Wall>,
    pub left: Option<Wall>,
    pub right: Option<Wall>,
    pub lid: Option<Lid>,
    /// Index into the slope displacement table (0 = flat cube).
    pub slope: u8,
}

impl Block {
    /// Returns the wall on `side`, if present.
    pub fn wall(&self, side: Side) -> Option<&Wall> {
        match side {
            Side::Top => self.top.as_ref(),
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Iterates over the present walls together with their side.
    pub fn walls(&self) -> impl Iterator<Item = (Side, &Wall)> {
        Side::ALL
            .into_iter()
            .filter_map(move |side| self.wall(side).map(|w| (side, w)))
    }

    /// `true` when the block has no faces and is not sloped.
    pub fn is_empty(&self) -> bool {
        self.lid.is_none()
            && self.top.is_none()
            && self.bottom.is_none()
            && self.left.is_none()
            && self.right.is_none()
            && self.slope == 0
    }
}
