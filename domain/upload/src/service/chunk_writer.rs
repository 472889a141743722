use std::ops::Range;

use async_trait::async_trait;

use crate::exception::UploadResult;
use crate::model::entity::Chunk;

/// # Chunk writer service
///
/// Places each chunk's payload at `index * chunk_size` of the file named by its identifier.
/// Files are created on first write and never truncated, so chunks accumulate across requests.
/// No finalization happens once every chunk has arrived.
#[async_trait]
pub trait ChunkWriterService: Send + Sync {
    /// Consume the chunk and write its payload.
    ///
    /// Returns the byte range written. Errors when the payload ends before `size` bytes,
    /// bytes written up to that point stay on disk.
    async fn write(&self, chunk: Chunk) -> UploadResult<Range<u64>>;
}
