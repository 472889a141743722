use std::sync::Arc;

use anyhow::Context;
use domain_upload::service::ChunkWriterService;
use service_upload::LocalChunkWriterServiceImpl;
use typed_builder::TypedBuilder;

use super::UploadServerConfig;

/// Everything a request handler needs, built once from the configuration.
#[derive(TypedBuilder)]
pub struct ServiceProvider {
    config: UploadServerConfig,
    chunk_writer: Arc<dyn ChunkWriterService>,
}

impl ServiceProvider {
    pub fn build(config: UploadServerConfig) -> anyhow::Result<Self> {
        let upload = &config.upload;
        std::fs::create_dir_all(&upload.base_dir)
            .with_context(|| format!("Cannot create upload directory {}", upload.base_dir))?;
        let chunk_writer = LocalChunkWriterServiceImpl::builder()
            .base(upload.base_dir.as_str())
            .buffer_size(upload.buffer_size)
            .sync_each_write(upload.sync_each_write)
            .build();
        Ok(Self {
            config,
            chunk_writer: Arc::new(chunk_writer),
        })
    }

    pub fn config(&self) -> &UploadServerConfig {
        &self.config
    }

    pub fn chunk_writer(&self) -> Arc<dyn ChunkWriterService> {
        self.chunk_writer.clone()
    }
}
