//! Incremental CSV ingestion with column type inference
//!
//! Bytes arrive in arbitrary chunks from a [`ChunkSource`]. The [`LineBuffer`]
//! reassembles records across chunk edges, the tokenizer splits each record into
//! fields, the inference sampler decides a type per column from a bounded
//! sample, and the materializer turns raw fields into typed rows.
//! [`StreamingParser`] drives the whole pipeline.

pub mod buffer;
pub mod config;
pub mod export;
pub mod inference;
pub mod materializer;
pub mod parser;
pub mod patterns;
pub mod sources;
pub mod tokenizer;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use buffer::LineBuffer;
pub use config::{NullConfig, ParseOptions};
pub use export::to_record_batch;
pub use inference::{classify_column, InferenceSampler};
pub use materializer::{coerce_value, materialize_row};
pub use parser::{parse_bytes, ParseRun, Phase, StreamingParser};
pub use sources::{ChunkSource, MemorySource, ReaderSource};
pub use tokenizer::tokenize_line;

/// Errors that abort a parse
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid UTF-8 in data line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Input has no header line")]
    MissingHeader,

    #[error("Parsing cancelled")]
    Cancelled,

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StreamError {
    /// True when the parse stopped because the caller asked it to
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}
