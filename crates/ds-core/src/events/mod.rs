//! Notifications emitted while a parse is running
//!
//! Events flow over an unbounded channel so that sending never waits on the
//! receiver. A caller that stops polling, or drops the receiver, does not slow
//! down or fail the parse.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::value::Row;

/// Read progress after a chunk has been processed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub bytes_read: u64,
    pub total_bytes: Option<u64>,
    pub rows_processed: usize,
    /// Only present when the total size of the source is known
    pub percentage: Option<f64>,
}

impl ProgressUpdate {
    pub fn new(bytes_read: u64, total_bytes: Option<u64>, rows_processed: usize) -> Self {
        let percentage = total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (bytes_read as f64 / total as f64 * 100.0).min(100.0)
            }
        });

        Self {
            bytes_read,
            total_bytes,
            rows_processed,
            percentage,
        }
    }
}

/// A batch of freshly materialized rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowBatch {
    pub rows: Vec<Row>,
    /// Rows materialized so far, this batch included
    pub total_rows: usize,
    /// 0-based index of the first row of this batch
    pub current_row: usize,
    pub progress: Option<f64>,
}

/// System events for a single parse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParseEvent {
    Progress(ProgressUpdate),
    Rows(RowBatch),
}

/// Fire-and-forget sender for parse events
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<ParseEvent>>,
}

impl EventSink {
    /// Create a sink together with the receiver the caller polls
    pub fn channel() -> (Self, UnboundedReceiver<ParseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().map_or(false, |tx| !tx.is_closed())
    }

    /// Publish an event
    pub fn emit(&self, event: ParseEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Event receiver dropped, discarding event");
            }
        }
    }
}
