use crate::exception::{UploadException, UploadResult};
use crate::model::entity::{Chunk, ChunkPayload};

pub const TYPE_KEY: &str = "resumableType";
pub const IDENTIFIER_KEY: &str = "resumableIdentifier";
pub const TOTAL_CHUNKS_KEY: &str = "resumableTotalChunks";
pub const CHUNK_NUMBER_KEY: &str = "resumableChunkNumber";
pub const CHUNK_SIZE_KEY: &str = "resumableChunkSize";
pub const TOTAL_SIZE_KEY: &str = "resumableTotalSize";
pub const FILENAME_KEY: &str = "resumableFilename";
pub const CURRENT_CHUNK_SIZE_KEY: &str = "resumableCurrentChunkSize";
pub const RELATIVE_PATH_KEY: &str = "resumableRelativePath";

/// Form values of a chunk upload, exactly as they came off the wire.
#[derive(Debug, Default, Clone)]
pub struct ChunkFields {
    pub r#type: Option<String>,
    pub identifier: Option<String>,
    pub chunk_number: Option<String>,
    pub chunk_size: Option<String>,
    pub current_chunk_size: Option<String>,
    pub total_chunks: Option<String>,
    pub total_size: Option<String>,
    pub filename: Option<String>,
    pub relative_path: Option<String>,
}

fn int_field(value: Option<&str>, field: &'static str) -> UploadResult<i64> {
    let value = value.ok_or(UploadException::MissingField { field })?;
    value.trim().parse::<i64>().map_err(|source| UploadException::InvalidField {
        field,
        value: value.to_owned(),
        source,
    })
}

impl ChunkFields {
    /// Parses the integer fields and pairs them with the payload.
    ///
    /// The wire chunk number is one based, the chunk index is not. Nothing is range checked here.
    pub fn into_chunk(self, payload: ChunkPayload) -> UploadResult<Chunk> {
        let chunk_number = int_field(self.chunk_number.as_deref(), CHUNK_NUMBER_KEY)?;
        let size = int_field(self.current_chunk_size.as_deref(), CURRENT_CHUNK_SIZE_KEY)?;
        let count = int_field(self.total_chunks.as_deref(), TOTAL_CHUNKS_KEY)?;
        let chunk_size = int_field(self.chunk_size.as_deref(), CHUNK_SIZE_KEY)?;
        let total_size = int_field(self.total_size.as_deref(), TOTAL_SIZE_KEY)?;
        Ok(Chunk {
            r#type: self.r#type.unwrap_or_default(),
            identifier: self.identifier.unwrap_or_default(),
            index: chunk_number.saturating_sub(1),
            size,
            chunk_size,
            count,
            total_size,
            filename: self.filename.unwrap_or_default(),
            relative_path: self.relative_path.unwrap_or_default(),
            payload,
        })
    }
}
