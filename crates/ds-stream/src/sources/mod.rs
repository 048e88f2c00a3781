//! Byte sources the streaming parser reads from

pub mod memory_source;
pub mod reader_source;

use async_trait::async_trait;

use crate::StreamError;

pub use memory_source::MemorySource;
pub use reader_source::ReaderSource;

/// A producer of raw byte chunks
///
/// Chunks have arbitrary sizes and need not end on a line or character
/// boundary. `Ok(None)` marks the end of the source.
#[async_trait]
pub trait ChunkSource: Send {
    /// Read the next non-empty chunk
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError>;

    /// Declared or estimated total size, used for progress percentages
    fn total_bytes(&self) -> Option<u64> {
        None
    }

    /// Get the source name
    fn source_name(&self) -> &str;
}
