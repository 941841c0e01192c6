//! Mesh output of one map region: GPU-ready vertex and index buffers split
//! into an opaque and a transparent pass.

use glam::{Vec2, Vec3};

/// A single textured vertex.
///
/// Positions are in world units with x to the east, y to the south and z up;
/// `uv` addresses the style's tile atlas.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(MeshVertex, [u8; 20]);

impl MeshVertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// Triangles whose doubled area falls below this are dropped.
const DEGENERATE_AREA: f32 = 1e-6;

/// Interleaved vertices plus a triangle-list index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<MeshVertex>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
    /// Number of faces that produced at least one triangle.
    pub faces: usize,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad face drawn as `triangles`, given as indices into
    /// `corners`. Zero-area triangles are skipped; a face left with none
    /// emits nothing.
    pub fn push_face(&mut self, corners: [Vec3; 4], uvs: [Vec2; 4], triangles: &[[usize; 3]]) {
        let kept: Vec<[usize; 3]> = triangles
            .iter()
            .copied()
            .filter(|&[a, b, c]| {
                (corners[b] - corners[a])
                    .cross(corners[c] - corners[a])
                    .length_squared()
                    > DEGENERATE_AREA * DEGENERATE_AREA
            })
            .collect();
        if kept.is_empty() {
            return;
        }

        let base = self.vertices.len() as u32;
        self.vertices.extend(
            corners
                .iter()
                .zip(uvs)
                .map(|(&position, uv)| MeshVertex::new(position, uv)),
        );
        for [a, b, c] in kept {
            self.indices
                .extend_from_slice(&[base + a as u32, base + b as u32, base + c as u32]);
        }
        self.faces += 1;
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Both passes of one region. The opaque buffers are drawn first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionMesh {
    pub opaque: MeshBuffers,
    pub transparent: MeshBuffers,
}

impl RegionMesh {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.opaque.triangle_count() + self.transparent.triangle_count()
    }
}
