use std::collections::VecDeque;

use async_trait::async_trait;

use super::ChunkSource;
use crate::StreamError;

/// Chunk source over bytes already in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    chunks: VecDeque<Vec<u8>>,
    total_bytes: u64,
}

impl MemorySource {
    /// Split `data` into chunks of `chunk_size` bytes
    pub fn new(data: impl AsRef<[u8]>, chunk_size: usize) -> Self {
        Self::from_chunks(data.as_ref().chunks(chunk_size.max(1)).map(<[u8]>::to_vec))
    }

    /// Use the given chunk boundaries as-is; empty chunks are dropped
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let chunks: VecDeque<Vec<u8>> = chunks.into_iter().filter(|c| !c.is_empty()).collect();
        let total_bytes = chunks.iter().map(|c| c.len() as u64).sum();
        Self { chunks, total_bytes }
    }

    /// Chunks not yet read
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        Ok(self.chunks.pop_front())
    }

    fn total_bytes(&self) -> Option<u64> {
        Some(self.total_bytes)
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}
