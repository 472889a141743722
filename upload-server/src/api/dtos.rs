use actix_easy_multipart::{tempfile::Tempfile, text::Text, MultipartForm};
use domain_upload::model::vo::ChunkFields;

/// A resumable.js chunk upload.
///
/// Every field is optional here so that missing ones are reported by the chunk parser.
#[derive(MultipartForm)]
pub struct ChunkUploadRequest {
    #[multipart(rename = "resumableType")]
    pub content_type: Option<Text<String>>,
    #[multipart(rename = "resumableIdentifier")]
    pub identifier: Option<Text<String>>,
    #[multipart(rename = "resumableChunkNumber")]
    pub chunk_number: Option<Text<String>>,
    #[multipart(rename = "resumableChunkSize")]
    pub chunk_size: Option<Text<String>>,
    #[multipart(rename = "resumableCurrentChunkSize")]
    pub current_chunk_size: Option<Text<String>>,
    #[multipart(rename = "resumableTotalChunks")]
    pub total_chunks: Option<Text<String>>,
    #[multipart(rename = "resumableTotalSize")]
    pub total_size: Option<Text<String>>,
    #[multipart(rename = "resumableFilename")]
    pub filename: Option<Text<String>>,
    #[multipart(rename = "resumableRelativePath")]
    pub relative_path: Option<Text<String>>,
    pub file: Option<Tempfile>,
}

fn text(field: Option<Text<String>>) -> Option<String> {
    field.map(|t| t.0)
}

impl ChunkUploadRequest {
    /// Splits the form into its raw chunk fields and the uploaded part.
    pub fn into_parts(self) -> (ChunkFields, Option<Tempfile>) {
        let fields = ChunkFields {
            r#type: text(self.content_type),
            identifier: text(self.identifier),
            chunk_number: text(self.chunk_number),
            chunk_size: text(self.chunk_size),
            current_chunk_size: text(self.current_chunk_size),
            total_chunks: text(self.total_chunks),
            total_size: text(self.total_size),
            filename: text(self.filename),
            relative_path: text(self.relative_path),
        };
        (fields, self.file)
    }
}
