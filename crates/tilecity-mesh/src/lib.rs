//! Map meshing: slope displacement, texture transforms, region mesh building
//! and the threaded region pipeline.

pub mod builder;
pub mod pipeline;
pub mod region_mesh;
pub mod slope;
pub mod transform;

pub use builder::{MeshBuilder, Region, TileUvSource};
pub use pipeline::{MeshSettings, RegionCoord, RegionPipeline, RegionResult};
pub use region_mesh::{MeshBuffers, MeshVertex, RegionMesh};
pub use slope::{Corners, adjust_slope};
pub use transform::{UV_TEMPLATES, face_uvs};
