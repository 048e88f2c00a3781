use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::info;

use super::ChunkSource;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::StreamError;

/// Chunk source over any async reader (file, socket, decompressor)
pub struct ReaderSource<R> {
    reader: R,
    buf: Vec<u8>,
    total_bytes: Option<u64>,
    source_name: String,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_size.max(1)],
            total_bytes: None,
            source_name: "stream".to_string(),
        }
    }

    /// Set the expected total size, enabling progress percentages
    pub fn with_total_bytes(mut self, total: u64) -> Self {
        self.total_bytes = Some(total);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}

impl ReaderSource<File> {
    /// Open a file; its length becomes the progress total
    pub async fn from_path(path: &Path, chunk_size: usize) -> Result<Self, StreamError> {
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();

        info!("Opened {} ({} bytes)", path.display(), len);

        Ok(Self::new(file, chunk_size).with_total_bytes(len).with_name(name))
    }

    /// Open a file using the default chunk size
    pub async fn open(path: &Path) -> Result<Self, StreamError> {
        Self::from_path(path, DEFAULT_CHUNK_SIZE).await
    }
}

#[async_trait]
impl<R> ChunkSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let n = self.reader.read(&mut self.buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(self.buf[..n].to_vec()))
        }
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_until_eof() {
        let data: &[u8] = b"a,b\n1,2\n";
        let mut source = ReaderSource::new(data, 3);

        let mut collected = Vec::new();
        while let Some(chunk) = source.next_chunk().await.unwrap() {
            assert!(!chunk.is_empty() && chunk.len() <= 3);
            collected.extend(chunk);
        }
        assert_eq!(collected, data);
        assert_eq!(source.total_bytes(), None);
    }

    #[tokio::test]
    async fn test_from_path_reports_length() {
        let path = std::env::temp_dir().join(format!("ds-stream-reader-{}.csv", std::process::id()));
        tokio::fs::write(&path, b"x\n1\n").await.unwrap();

        let source = ReaderSource::from_path(&path, 2).await.unwrap();
        assert_eq!(source.total_bytes(), Some(4));
        assert!(source.source_name().starts_with("ds-stream-reader-"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = ReaderSource::open(Path::new("/definitely/not/here.csv")).await;
        assert!(matches!(result, Err(StreamError::Io(_))));
    }
}
