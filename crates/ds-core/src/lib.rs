//! Core types shared by the ingestion and sampling crates
//!
//! This crate holds the row and schema model produced by the streaming parser,
//! the result envelope handed back to callers, and the notification events
//! emitted while a parse is running.

pub mod events;
pub mod result;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use events::{EventSink, ParseEvent, ProgressUpdate, RowBatch};
pub use result::{ParseError, ResultMeta, StreamingResult};
pub use schema::{ColumnType, ColumnTypeMap, Header};
pub use value::{Row, Value};
