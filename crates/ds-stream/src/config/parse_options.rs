//! Options controlling a single parse

use std::collections::HashMap;
use std::path::Path;

use ds_core::ColumnType;
use serde::{Deserialize, Serialize};

use super::null_handling::NullConfig;
use crate::StreamError;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;
pub const DEFAULT_EMIT_EVERY: usize = 1000;

/// Configuration for a streaming parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Preferred read size in bytes. Advisory; results do not depend on it.
    pub chunk_size_hint: usize,

    /// Stop after this many rows have been accepted
    pub max_rows: Option<usize>,

    /// Stop reading once this many bytes have been consumed
    pub max_bytes: Option<u64>,

    /// Data rows used for type inference
    pub sample_size: usize,

    /// Rows per row-batch notification
    pub emit_every: usize,

    /// Null handling configuration
    pub null_config: NullConfig,

    /// Column type overrides, applied on top of the inferred types
    pub column_types: HashMap<String, ColumnType>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            chunk_size_hint: DEFAULT_CHUNK_SIZE,
            max_rows: None,
            max_bytes: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
            emit_every: DEFAULT_EMIT_EVERY,
            null_config: NullConfig::default(),
            column_types: HashMap::new(),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, StreamError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StreamError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.sample_size == 0 {
            return Err(StreamError::Config("sampleSize must be at least 1".to_string()));
        }
        if self.chunk_size_hint == 0 {
            return Err(StreamError::Config("chunkSizeHint must be at least 1".to_string()));
        }
        if self.emit_every == 0 {
            return Err(StreamError::Config("emitEvery must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn with_chunk_size_hint(mut self, bytes: usize) -> Self {
        self.chunk_size_hint = bytes;
        self
    }

    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = Some(bytes);
        self
    }

    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    pub fn with_emit_every(mut self, rows: usize) -> Self {
        self.emit_every = rows;
        self
    }

    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// Force a column to a type regardless of what inference decides
    pub fn with_column_type(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.column_types.insert(column.into(), column_type);
        self
    }
}
