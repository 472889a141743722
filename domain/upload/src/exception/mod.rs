use std::num::ParseIntError;

pub type UploadResult<T> = Result<T, UploadException>;

#[derive(Debug, thiserror::Error)]
pub enum UploadException {
    #[error("Required form field: {field} is missing.")]
    MissingField { field: &'static str },

    #[error("Form field: {field} with value: {value:?} isn't an integer: {source}")]
    InvalidField {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Missing file upload")]
    MissingPayload,

    #[error("Chunk can't be written: {reason}")]
    InvalidChunk { reason: String },

    #[error("Identifier: {identifier:?} doesn't resolve inside the upload directory.")]
    InvalidIdentifier { identifier: String },

    #[error("Chunk of {identifier:?} is truncated, expected {expected} bytes but the payload ended after {received}.")]
    Truncated {
        identifier: String,
        expected: u64,
        received: u64,
    },

    #[error("Storage error on {identifier:?}: {source}")]
    Storage {
        identifier: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl UploadException {
    /// Whether the client sent something unusable, as opposed to the server failing to write it.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::MissingPayload
                | Self::InvalidChunk { .. }
                | Self::InvalidIdentifier { .. }
        )
    }

    pub fn invalid_chunk(reason: impl Into<String>) -> Self {
        Self::InvalidChunk {
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for UploadException {
    fn from(e: anyhow::Error) -> Self {
        UploadException::InternalError { source: e }
    }
}
