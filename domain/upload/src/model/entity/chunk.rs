use std::fmt;
use std::ops::Range;

use tokio::io::AsyncRead;

use crate::exception::{UploadException, UploadResult};

/// Byte stream carrying one chunk's content, owned by the request that received it.
pub type ChunkPayload = Box<dyn AsyncRead + Send + Unpin>;

/// One piece of a larger file being uploaded.
///
/// Only `identifier`, `index`, `size` and `chunk_size` decide where the payload lands,
/// the rest is carried along for logging.
pub struct Chunk {
    /// Declared content type.
    pub r#type: String,
    /// Untrusted key naming the destination file.
    pub identifier: String,
    /// Zero based position of the chunk.
    pub index: i64,
    /// Bytes in this chunk's payload.
    pub size: i64,
    /// Nominal size of every chunk but the last, the offset stride.
    pub chunk_size: i64,
    /// Total chunks of the file.
    pub count: i64,
    /// Total bytes of the file.
    pub total_size: i64,
    pub filename: String,
    pub relative_path: String,
    pub payload: ChunkPayload,
}

impl Chunk {
    /// The byte range `[index * chunk_size, index * chunk_size + size)` this chunk covers.
    ///
    /// Errors when the geometry can't describe a range of the file.
    pub fn byte_range(&self) -> UploadResult<Range<u64>> {
        if self.index < 0 {
            return Err(UploadException::invalid_chunk(format!(
                "chunk number {} is not positive",
                self.index + 1
            )));
        }
        if self.size < 0 {
            return Err(UploadException::invalid_chunk(format!(
                "current chunk size {} is negative",
                self.size
            )));
        }
        // Any stride puts the first chunk at 0.
        if self.chunk_size < 0 || (self.chunk_size == 0 && self.index > 0) {
            return Err(UploadException::invalid_chunk(format!(
                "chunk size {} is not positive",
                self.chunk_size
            )));
        }
        let overflow = || UploadException::invalid_chunk("offset overflows");
        let offset = self.index.checked_mul(self.chunk_size).ok_or_else(overflow)?;
        let end_offset = offset.checked_add(self.size).ok_or_else(overflow)?;
        Ok(offset as u64..end_offset as u64)
    }

    pub fn is_last(&self) -> bool {
        self.count > 0 && self.index + 1 == self.count
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("type", &self.r#type)
            .field("identifier", &self.identifier)
            .field("index", &self.index)
            .field("size", &self.size)
            .field("chunk_size", &self.chunk_size)
            .field("count", &self.count)
            .field("total_size", &self.total_size)
            .field("filename", &self.filename)
            .field("relative_path", &self.relative_path)
            .finish_non_exhaustive()
    }
}
