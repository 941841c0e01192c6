//! Texture transforms: which corner of a tile's texel rectangle each quad
//! vertex samples.

use glam::Vec2;
use tilecity_map::TextureTransform;
use tilecity_style::TexRect;

/// Rectangle corner sampled by quad vertices 0..4 (upper-left, upper-right,
/// lower-right, lower-left), indexed by [`TextureTransform`] discriminant.
///
/// Rotations turn the texture clockwise; mirrored entries flip it
/// horizontally first, then rotate.
pub const UV_TEMPLATES: [[usize; 4]; 8] = [
    [0, 1, 2, 3],
    [3, 0, 1, 2],
    [2, 3, 0, 1],
    [1, 2, 3, 0],
    [1, 0, 3, 2],
    [2, 1, 0, 3],
    [3, 2, 1, 0],
    [0, 3, 2, 1],
];

/// The four corners of `rect`, clockwise from its top-left.
pub fn rect_corners(rect: &TexRect) -> [Vec2; 4] {
    let (min, max) = (rect.min(), rect.max());
    [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
}

/// UVs for quad vertices 0..4 drawing `rect` under `transform`.
pub fn face_uvs(rect: &TexRect, transform: TextureTransform) -> [Vec2; 4] {
    let corners = rect_corners(rect);
    UV_TEMPLATES[template_index(transform)].map(|i| corners[i])
}

fn template_index(transform: TextureTransform) -> usize {
    transform.quarter_turns() as usize + if transform.is_mirrored() { 4 } else { 0 }
}
