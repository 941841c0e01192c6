//! Turns a rectangular window of map columns into textured triangles.

use glam::{Vec2, Vec3};
use tilecity_map::{Block, Map, TextureTransform};
use tilecity_style::{StyleAsset, TexRect};

use crate::region_mesh::{MeshBuffers, RegionMesh};
use crate::slope::{Corners, adjust_slope, lid_triangles};
use crate::transform::face_uvs;

/// Fixed two-triangle split for wall quads.
const WALL_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

/// Where face textures live in the tile atlas.
pub trait TileUvSource {
    /// Atlas rectangle of lid tile `tile` at lighting level `light`.
    fn lid_rect(&self, tile: u16, light: u8) -> TexRect;
    /// Atlas rectangle of wall tile `tile`.
    fn side_rect(&self, tile: u16) -> TexRect;
}

impl TileUvSource for StyleAsset {
    fn lid_rect(&self, tile: u16, light: u8) -> TexRect {
        self.lid_tile_tex_coords(tile, light)
    }

    fn side_rect(&self, tile: u16) -> TexRect {
        self.side_tile_tex_coords(tile)
    }
}

/// A window of columns, in map cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Column ranges of the region clipped to a `map_width`×`map_height` grid.
    fn clipped(&self, map_width: usize, map_height: usize) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let x_end = (self.x.saturating_add(self.width)).min(map_width as u32);
        let y_end = (self.y.saturating_add(self.height)).min(map_height as u32);
        (self.x.min(x_end)..x_end, self.y.min(y_end)..y_end)
    }
}

/// Builds region meshes from a decoded map and its tile UVs.
///
/// Holds shared references only, so any number of builders may run over
/// disjoint regions at once.
pub struct MeshBuilder<'a, S: ?Sized> {
    map: &'a Map,
    tiles: &'a S,
    block_size: f32,
}

impl<'a, S: TileUvSource + ?Sized> MeshBuilder<'a, S> {
    pub fn new(map: &'a Map, tiles: &'a S) -> Self {
        Self {
            map,
            tiles,
            block_size: 1.0,
        }
    }

    /// Edge length of one block in world units.
    pub fn with_block_size(mut self, block_size: f32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Meshes every block in `region`: opaque faces first, then transparent.
    pub fn build(&self, region: Region) -> RegionMesh {
        let mut mesh = RegionMesh::default();
        self.build_pass(region, false, &mut mesh.opaque);
        self.build_pass(region, true, &mut mesh.transparent);
        mesh
    }

    fn build_pass(&self, region: Region, transparent: bool, out: &mut MeshBuffers) {
        let (xs, ys) = region.clipped(self.map.width(), self.map.height());
        for y in ys {
            for x in xs.clone() {
                for z in 0..self.map.max_altitude() as i32 {
                    let Some(block) = self.map.get_block(x as i32, y as i32, z) else {
                        continue;
                    };
                    let origin = Vec3::new(x as f32, y as f32, z as f32) * self.block_size;
                    self.emit_block(block, origin, transparent, out);
                }
            }
        }
    }

    fn emit_block(&self, block: &Block, origin: Vec3, transparent: bool, out: &mut MeshBuffers) {
        let corners = adjust_slope(block.slope, Corners::cell(origin, self.block_size));

        if let Some(lid) = block.lid
            && lid.transparent == transparent
        {
            let rect = self.tiles.lid_rect(lid.tile_index, lid.light_level);
            out.push_face(
                corners.lid(),
                face_uvs(&rect, lid.transform),
                &lid_triangles(block.slope),
            );
        }

        for (side, wall) in block.walls() {
            if wall.transparent != transparent {
                continue;
            }
            let quad = corners.wall(side);
            self.emit_wall(quad, wall.tile_index, wall.transform, out);
            if let Some(back) = wall.back_tile_index {
                let [a, b, c, d] = quad;
                self.emit_wall([b, a, d, c], back, wall.transform.toggle_mirror(), out);
            }
        }
    }

    fn emit_wall(&self, quad: [Vec3; 4], tile: u16, transform: TextureTransform, out: &mut MeshBuffers) {
        let uvs: [Vec2; 4] = face_uvs(&self.tiles.side_rect(tile), transform);
        out.push_face(quad, uvs, &WALL_TRIANGLES);
    }
}
