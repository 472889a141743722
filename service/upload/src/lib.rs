mod chunk_writer;
pub mod path;

#[rustfmt::skip]
pub use {
    chunk_writer::LocalChunkWriterServiceImpl,
    chunk_writer::DEFAULT_BUFFER_SIZE,
};
