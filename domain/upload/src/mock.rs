use std::ops::Range;

use async_trait::async_trait;
use mockall::mock;

use crate::{exception::UploadResult, model::entity::Chunk, service::ChunkWriterService};

mock! {
    pub ChunkWriterService {}
    #[async_trait]
    impl ChunkWriterService for ChunkWriterService {
        async fn write(&self, chunk: Chunk) -> UploadResult<Range<u64>>;
    }
}
