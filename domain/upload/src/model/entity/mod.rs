pub mod chunk;

#[rustfmt::skip]
pub use chunk::{Chunk, ChunkPayload};
