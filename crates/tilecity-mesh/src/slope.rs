//! Slope displacement table: reshapes a block's eight cell corners from its
//! slope code.
//!
//! Corners are indexed [`TL`], [`TR`], [`BR`], [`BL`] as seen from above with
//! y growing downwards. Codes fall into these families:
//!
//! | Codes | Shape |
//! |-------|-------|
//! | 0 | flat cube |
//! | 1–8 | two-block ramps (up, up, down, down, left, left, right, right) |
//! | 9–40 | eight-block ramps, eight codes per direction |
//! | 41–44 | one-block ramps |
//! | 45–48 | diagonal wedges: one corner collapsed onto its x-neighbour |
//! | 49–52 | one top corner dropped to the floor |
//! | 53–60 | short-edge trims, overlapping |
//! | 64–67 | inner diagonal corners |
//!
//! Codes 61–63 and anything above 67 leave the cell unchanged.

use glam::Vec3;
use tilecity_map::Side;

pub const TL: usize = 0;
pub const TR: usize = 1;
pub const BR: usize = 2;
pub const BL: usize = 3;

/// The corner sharing an edge with each corner along x.
const X_NEIGHBOUR: [usize; 4] = [TR, TL, BL, BR];

/// Corner order of the 49–52 and 64–67 families.
const CORNER_ORDER: [usize; 4] = [TL, TR, BL, BR];

/// The eight corners of one block cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    pub top: [Vec3; 4],
    pub bottom: [Vec3; 4],
}

impl Corners {
    /// The axis-aligned cube with its minimum corner at `origin`.
    pub fn cell(origin: Vec3, size: f32) -> Self {
        let Vec3 { x: x0, y: y0, z: z0 } = origin;
        let (x1, y1, z1) = (x0 + size, y0 + size, z0 + size);
        Self {
            top: [
                Vec3::new(x0, y0, z1),
                Vec3::new(x1, y0, z1),
                Vec3::new(x1, y1, z1),
                Vec3::new(x0, y1, z1),
            ],
            bottom: [
                Vec3::new(x0, y0, z0),
                Vec3::new(x1, y0, z0),
                Vec3::new(x1, y1, z0),
                Vec3::new(x0, y1, z0),
            ],
        }
    }

    /// The lid quad, clockwise from the top-left corner.
    pub fn lid(&self) -> [Vec3; 4] {
        self.top
    }

    /// The wall quad on `side` as seen from outside the cell: upper-left,
    /// upper-right, lower-right, lower-left.
    pub fn wall(&self, side: Side) -> [Vec3; 4] {
        let (a, b) = match side {
            Side::Top => (TL, TR),
            Side::Right => (TR, BR),
            Side::Bottom => (BR, BL),
            Side::Left => (BL, TL),
        };
        [self.top[a], self.top[b], self.bottom[b], self.bottom[a]]
    }
}

/// Which edge of a ramp is high.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampDirection {
    /// Rises towards -y.
    Up,
    /// Rises towards +y.
    Down,
    /// Rises towards -x.
    Left,
    /// Rises towards +x.
    Right,
}

impl RampDirection {
    const ALL: [RampDirection; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// `(high edge, low edge)` corner pairs.
    fn edges(self) -> ([usize; 2], [usize; 2]) {
        match self {
            RampDirection::Up => ([TL, TR], [BL, BR]),
            RampDirection::Down => ([BL, BR], [TL, TR]),
            RampDirection::Left => ([TL, BL], [TR, BR]),
            RampDirection::Right => ([TR, BR], [TL, BL]),
        }
    }
}

/// The primary shape selected by a slope code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeShape {
    /// No primary displacement.
    Flat,
    /// The high edge sits at `level / parts`, the low edge at `(level - 1) / parts`.
    Ramp {
        direction: RampDirection,
        parts: u8,
        level: u8,
    },
    /// `corner` collapsed horizontally onto its x-neighbour.
    Wedge { corner: usize },
    /// `corner`'s top dropped to the floor.
    Cliff { corner: usize },
    /// `corner` collapsed onto its x-neighbour, whose top drops to the floor.
    InnerCorner { corner: usize },
}

fn ramp(code: u8, first: u8, parts: u8) -> SlopeShape {
    SlopeShape::Ramp {
        direction: RampDirection::ALL[((code - first) / parts) as usize],
        parts,
        level: parts - ((code - 1) % parts),
    }
}

/// Primary shape of `code`.
pub fn classify(code: u8) -> SlopeShape {
    match code {
        1..=8 => ramp(code, 1, 2),
        9..=40 => ramp(code, 9, 8),
        41..=44 => ramp(code, 41, 1),
        45..=48 => SlopeShape::Wedge {
            corner: CORNER_ORDER[(code - 45) as usize],
        },
        49..=52 => SlopeShape::Cliff {
            corner: CORNER_ORDER[(code - 49) as usize],
        },
        64..=67 => SlopeShape::InnerCorner {
            corner: CORNER_ORDER[(code - 64) as usize],
        },
        _ => SlopeShape::Flat,
    }
}

/// Short-edge trims of a code. Each kept edge pulls the opposite edge two
/// thirds of the way towards it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Trims {
    pub keep_left: bool,
    pub keep_right: bool,
    pub keep_top: bool,
    pub keep_bottom: bool,
}

pub fn trims(code: u8) -> Trims {
    Trims {
        keep_left: matches!(code, 53 | 57 | 60),
        keep_right: matches!(code, 54 | 58 | 59),
        keep_top: matches!(code, 55 | 57 | 58),
        keep_bottom: matches!(code, 56 | 59 | 60),
    }
}

/// The corner that makes the lid non-planar or degenerate, if any.
pub fn odd_corner(code: u8) -> Option<usize> {
    match classify(code) {
        SlopeShape::Wedge { corner }
        | SlopeShape::Cliff { corner }
        | SlopeShape::InnerCorner { corner } => Some(corner),
        SlopeShape::Flat | SlopeShape::Ramp { .. } => None,
    }
}

/// Applies slope `code` to a cell's corners.
///
/// `corners` must be an axis-aligned cell as built by [`Corners::cell`].
pub fn adjust_slope(code: u8, corners: Corners) -> Corners {
    let mut c = corners;
    let Corners { top, bottom } = corners;

    match classify(code) {
        SlopeShape::Flat => {}
        SlopeShape::Ramp {
            direction,
            parts,
            level,
        } => {
            let (high, low) = direction.edges();
            let lift = |i: usize, steps: u8| {
                bottom[i].z + (top[i].z - bottom[i].z) * steps as f32 / parts as f32
            };
            for i in high {
                c.top[i].z = lift(i, level);
            }
            for i in low {
                c.top[i].z = lift(i, level - 1);
            }
        }
        SlopeShape::Wedge { corner } => {
            let n = X_NEIGHBOUR[corner];
            c.top[corner].x = top[n].x;
            c.bottom[corner].x = bottom[n].x;
        }
        SlopeShape::Cliff { corner } => {
            c.top[corner].z = bottom[corner].z;
        }
        SlopeShape::InnerCorner { corner } => {
            let n = X_NEIGHBOUR[corner];
            c.top[n].z = bottom[n].z;
            c.top[corner] = c.top[n];
            c.bottom[corner] = c.bottom[n];
        }
    }

    let t = trims(code);
    let (x0, x1) = (bottom[TL].x, bottom[BR].x);
    let (y0, y1) = (bottom[TL].y, bottom[BR].y);
    let third_x = (x1 - x0) / 3.0;
    let third_y = (y1 - y0) / 3.0;
    for layer in [&mut c.top, &mut c.bottom] {
        if t.keep_left {
            layer[TR].x = x0 + third_x;
            layer[BR].x = x0 + third_x;
        }
        if t.keep_right {
            layer[TL].x = x1 - third_x;
            layer[BL].x = x1 - third_x;
        }
        if t.keep_top {
            layer[BL].y = y0 + third_y;
            layer[BR].y = y0 + third_y;
        }
        if t.keep_bottom {
            layer[TL].y = y1 - third_y;
            layer[TR].y = y1 - third_y;
        }
    }
    c
}

/// Lid triangulation for a slope code, as corner indices.
///
/// Splits along the diagonal that does not touch the odd corner so that a
/// dropped or collapsed corner never produces a folded quad.
pub fn lid_triangles(code: u8) -> [[usize; 3]; 2] {
    match odd_corner(code) {
        Some(TL) | Some(BR) => [[TL, TR, BL], [TR, BR, BL]],
        _ => [[TL, TR, BR], [TL, BR, BL]],
    }
}
