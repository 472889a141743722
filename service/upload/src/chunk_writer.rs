use std::io::SeekFrom;
use std::ops::Range;
use std::path::PathBuf;

use async_trait::async_trait;
use domain_upload::{
    exception::{UploadException, UploadResult},
    model::entity::Chunk,
    service::ChunkWriterService,
};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use typed_builder::TypedBuilder;

use crate::path;

pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Writes chunks into files under a local directory.
///
/// Every call opens its own handle, so chunks of the same file written from concurrent
/// requests only ever touch their own ranges.
#[derive(TypedBuilder, Clone)]
pub struct LocalChunkWriterServiceImpl {
    #[builder(default = "uploads".into(), setter(into))]
    base: PathBuf,
    #[builder(default = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
    /// Flush every write to stable storage before moving on.
    #[builder(default = true)]
    sync_each_write: bool,
}

impl LocalChunkWriterServiceImpl {
    async fn open(&self, identifier: &str) -> UploadResult<File> {
        let path = path::resolve(&self.base, identifier)?;
        let storage = |source| UploadException::Storage {
            identifier: identifier.to_owned(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(storage)?;
        }
        // O_CREAT without O_TRUNC, first chunks racing on the same identifier all get the same file.
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(storage)
    }
}

#[async_trait]
impl ChunkWriterService for LocalChunkWriterServiceImpl {
    async fn write(&self, chunk: Chunk) -> UploadResult<Range<u64>> {
        let range = chunk.byte_range()?;
        let Chunk {
            identifier,
            mut payload,
            ..
        } = chunk;
        let mut file = self.open(&identifier).await?;
        let storage = |source| UploadException::Storage {
            identifier: identifier.clone(),
            source,
        };

        let mut buf = vec![0u8; self.buffer_size.max(1)];
        let mut offset = range.start;
        while offset < range.end {
            let remaining = usize::try_from(range.end - offset).unwrap_or(usize::MAX);
            let want = buf.len().min(remaining);
            let read = payload.read(&mut buf[..want]).await.map_err(storage)?;
            if read == 0 {
                return Err(UploadException::Truncated {
                    identifier: identifier.clone(),
                    expected: range.end - range.start,
                    received: offset - range.start,
                });
            }
            tracing::trace!("{read} read, currently at {offset}");
            file.seek(SeekFrom::Start(offset)).await.map_err(storage)?;
            file.write_all(&buf[..read]).await.map_err(storage)?;
            if self.sync_each_write {
                file.sync_data().await.map_err(storage)?;
            }
            offset += read as u64;
        }
        file.flush().await.map_err(storage)?;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use domain_upload::model::entity::ChunkPayload;
    use rand::{seq::SliceRandom, Rng};
    use tempfile::TempDir;
    use tokio::io::{AsyncRead, ReadBuf};

    use super::*;

    fn load() -> (TempDir, LocalChunkWriterServiceImpl) {
        let dir = tempfile::tempdir().unwrap();
        let service = LocalChunkWriterServiceImpl::builder().base(dir.path()).build();
        (dir, service)
    }

    fn chunk(identifier: &str, number: i64, chunk_size: i64, size: i64, payload: ChunkPayload) -> Chunk {
        Chunk {
            r#type: String::new(),
            identifier: identifier.to_string(),
            index: number - 1,
            size,
            chunk_size,
            count: 0,
            total_size: 0,
            filename: String::new(),
            relative_path: String::new(),
            payload,
        }
    }

    fn bytes(content: &[u8]) -> ChunkPayload {
        Box::new(std::io::Cursor::new(content.to_vec()))
    }

    /// Yields `head`, then fails.
    struct Broken {
        head: Option<Vec<u8>>,
    }

    impl AsyncRead for Broken {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            match self.head.take() {
                Some(head) => {
                    buf.put_slice(&head);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(std::io::ErrorKind::ConnectionReset.into())),
            }
        }
    }

    #[tokio::test]
    async fn two_chunks_land_at_their_offsets() {
        let (dir, service) = load();
        let range = service.write(chunk("f1", 1, 10, 10, bytes(b"AAAAAAAAAA"))).await.unwrap();
        assert_eq!(range, 0..10);
        let range = service.write(chunk("f1", 2, 10, 5, bytes(b"BBBBB"))).await.unwrap();
        assert_eq!(range, 10..15);

        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert!(content.len() >= 15);
        assert_eq!(&content[0..10], b"AAAAAAAAAA");
        assert_eq!(&content[10..15], b"BBBBB");
    }

    #[tokio::test]
    async fn reversed_arrival() {
        let (dir, service) = load();
        service.write(chunk("f1", 2, 10, 5, bytes(b"BBBBB"))).await.unwrap();
        service.write(chunk("f1", 1, 10, 10, bytes(b"AAAAAAAAAA"))).await.unwrap();
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(content, b"AAAAAAAAAABBBBB");
    }

    #[tokio::test]
    async fn resubmission_is_idempotent() {
        let (dir, service) = load();
        for _ in 0..3 {
            service.write(chunk("f1", 1, 4, 4, bytes(b"abcd"))).await.unwrap();
            service.write(chunk("f1", 2, 4, 2, bytes(b"ef"))).await.unwrap();
        }
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(content, b"abcdef");
    }

    #[tokio::test]
    async fn payload_beyond_size_is_not_written() {
        let (dir, service) = load();
        service.write(chunk("f1", 1, 4, 4, bytes(b"abcdXYZ"))).await.unwrap();
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(content, b"abcd");
    }

    #[tokio::test]
    async fn small_buffer_stops_at_size() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocalChunkWriterServiceImpl::builder()
            .base(dir.path())
            .buffer_size(3)
            .build();
        let range = service
            .write(chunk("f1", 2, 7, 7, bytes(b"0123456789")))
            .await
            .unwrap();
        assert_eq!(range, 7..14);
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(&content[7..], b"0123456");
    }

    #[tokio::test]
    async fn small_buffer_loops() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocalChunkWriterServiceImpl::builder()
            .base(dir.path())
            .buffer_size(3)
            .sync_each_write(false)
            .build();
        service.write(chunk("f1", 2, 10, 10, bytes(b"0123456789"))).await.unwrap();
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(&content[10..20], b"0123456789");
    }

    #[tokio::test]
    async fn empty_chunk_creates_file() {
        let (dir, service) = load();
        let range = service.write(chunk("empty", 1, 10, 0, bytes(b""))).await.unwrap();
        assert!(range.is_empty());
        assert!(dir.path().join("empty").exists());
    }

    #[tokio::test]
    async fn truncated_payload() {
        let (dir, service) = load();
        let err = service.write(chunk("f1", 1, 10, 10, bytes(b"AAA"))).await.unwrap_err();
        assert!(matches!(
            err,
            UploadException::Truncated {
                expected: 10,
                received: 3,
                ..
            }
        ));
        assert!(!err.is_bad_request());
        // What arrived is kept.
        let content = tokio::fs::read(dir.path().join("f1")).await.unwrap();
        assert_eq!(content, b"AAA");
    }

    #[tokio::test]
    async fn broken_stream() {
        let (_dir, service) = load();
        let payload = Box::new(Broken {
            head: Some(b"AA".to_vec()),
        });
        let err = service.write(chunk("f1", 1, 10, 10, payload)).await.unwrap_err();
        assert!(matches!(err, UploadException::Storage { .. }));
    }

    #[tokio::test]
    async fn non_positive_chunk_number() {
        let (dir, service) = load();
        let err = service.write(chunk("f1", 0, 10, 10, bytes(b"AAAAAAAAAA"))).await.unwrap_err();
        assert!(err.is_bad_request());
        assert!(!dir.path().join("f1").exists());
    }

    #[tokio::test]
    async fn escaping_identifier() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("uploads");
        let service = LocalChunkWriterServiceImpl::builder().base(&base).build();
        let err = service.write(chunk("../escape", 1, 10, 5, bytes(b"BBBBB"))).await.unwrap_err();
        assert!(matches!(err, UploadException::InvalidIdentifier { .. }));
        assert!(!root.path().join("escape").exists());
        assert!(!base.exists());
    }

    #[tokio::test]
    async fn nested_identifier() {
        let (dir, service) = load();
        service.write(chunk("a/b/f1", 1, 2, 2, bytes(b"ok"))).await.unwrap();
        let content = tokio::fs::read(dir.path().join("a/b/f1")).await.unwrap();
        assert_eq!(content, b"ok");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_chunks_reassemble() {
        let (dir, service) = load();
        let service = Arc::new(service);
        let mut rng = rand::thread_rng();
        for round in 0..16 {
            let chunk_size = rng.gen_range(1..=64 * 1024);
            let total = rng.gen_range(1..=8 * chunk_size);
            let content: Vec<u8> = (0..total).map(|_| rng.gen()).collect();
            let identifier = format!("round-{round}");

            let mut chunks: Vec<(usize, Vec<u8>)> =
                content.chunks(chunk_size).map(|c| c.to_vec()).enumerate().collect();
            chunks.shuffle(&mut rng);
            let handles = chunks
                .into_iter()
                .map(|(index, part)| {
                    let service = service.clone();
                    let identifier = identifier.clone();
                    tokio::spawn(async move {
                        let size = part.len() as i64;
                        service
                            .write(chunk(&identifier, index as i64 + 1, chunk_size as i64, size, bytes(&part)))
                            .await
                    })
                })
                .collect::<Vec<_>>();
            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let written = tokio::fs::read(dir.path().join(&identifier)).await.unwrap();
            assert_eq!(written, content, "round {round} with chunk size {chunk_size}");
        }
    }
}
