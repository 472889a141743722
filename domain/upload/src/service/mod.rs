pub mod chunk_writer;

#[rustfmt::skip]
pub use chunk_writer::ChunkWriterService;
