//! Little-endian binary reading primitives shared by the map and style decoders.

pub mod chunk;
pub mod cursor;
pub mod error;

pub use chunk::{Chunk, ChunkReader, FourCc};
pub use cursor::ByteCursor;
pub use error::DecodeError;
