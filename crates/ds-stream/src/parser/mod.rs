//! Streaming orchestrator
//!
//! [`StreamingParser`] pulls chunks from a [`ChunkSource`] and hands them to a
//! [`ParseRun`]. Awaiting the next chunk is the only suspension point, and the
//! cancellation token is checked right before it.

mod run;

use std::path::Path;

use ds_core::{EventSink, StreamingResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ParseOptions;
use crate::sources::{ChunkSource, ReaderSource};
use crate::StreamError;

pub use run::{ParseRun, Phase, SamplingState, Schema};

/// Drives a parse from a chunk source to a [`StreamingResult`]
#[derive(Debug, Clone, Default)]
pub struct StreamingParser {
    options: ParseOptions,
    events: EventSink,
    cancel: CancellationToken,
}

impl StreamingParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            events: EventSink::disabled(),
            cancel: CancellationToken::new(),
        }
    }

    /// Deliver progress and row-batch events to `events`
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels parses started by this parser
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse everything the source yields, or until a configured limit.
    ///
    /// Cancellation is observed between chunk reads and returns
    /// [`StreamError::Cancelled`]; rows parsed so far are dropped.
    pub async fn parse<S>(&self, mut source: S) -> Result<StreamingResult, StreamError>
    where
        S: ChunkSource,
    {
        self.options.validate()?;
        debug!(source = source.source_name(), total = ?source.total_bytes(), "Starting parse");

        let mut run = ParseRun::new(self.options.clone(), self.events.clone(), source.total_bytes());

        loop {
            if self.cancel.is_cancelled() {
                info!(
                    source = source.source_name(),
                    bytes_read = run.bytes_read(),
                    "Parse cancelled"
                );
                return Err(StreamError::Cancelled);
            }
            if run.is_finished() {
                break;
            }

            match source.next_chunk().await? {
                Some(chunk) => run.feed(&chunk)?,
                None => break,
            }
        }

        run.finish()
    }

    /// Open and parse a file
    pub async fn parse_path(&self, path: &Path) -> Result<StreamingResult, StreamError> {
        let source = ReaderSource::from_path(path, self.options.chunk_size_hint).await?;
        self.parse(source).await
    }
}

/// Parse bytes already in memory as a single chunk
pub fn parse_bytes(data: &[u8], options: ParseOptions) -> Result<StreamingResult, StreamError> {
    options.validate()?;
    let mut run = ParseRun::new(options, EventSink::disabled(), Some(data.len() as u64));
    run.feed(data)?;
    run.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySource;
    use async_trait::async_trait;
    use ds_core::{ColumnType, ColumnTypeMap, ParseError, ParseEvent, Row, Value};

    const TRICKY: &str = "id,name,joined,active,score\r\n\
        1,\"Smith, Jane\",2024-01-05,yes,10.5\r\n\
        \r\n\
        2,\"Quote \"\"Q\"\" Person\",01/06/2024,no,11\n\
        3,Zoë Ångström,2024/01/07,Y,\n\
        4,\"multi\nline\",2024-01-08T09:30:00,n,13.25\n\
        5,broken\n\
        6,Ünïcødé ✓,2024-01-09,true,14";

    fn parse_str(text: &str, options: ParseOptions) -> StreamingResult {
        parse_bytes(text.as_bytes(), options).unwrap()
    }

    type Stable<'a> = (&'a Vec<Row>, &'a Vec<ParseError>, &'a Vec<String>, &'a ColumnTypeMap, usize, u64);

    /// Everything except elapsed time
    fn stable(result: &StreamingResult) -> Stable<'_> {
        (
            &result.rows,
            &result.errors,
            &result.meta.fields,
            &result.meta.column_types,
            result.meta.total_rows,
            result.meta.bytes_total_read,
        )
    }

    #[test]
    fn test_scenario_threshold_sensitivity() {
        let result = parse_str("id,amount\n1,100\n2,abc\n3,300\n", ParseOptions::default());

        assert_eq!(result.meta.fields, vec!["id", "amount"]);
        assert_eq!(result.meta.column_types["id"], ColumnType::Number);
        // 2 of 3 numeric is below 80%
        assert_eq!(result.meta.column_types["amount"], ColumnType::String);
        assert_eq!(result.rows[1]["amount"], Value::from("abc"));
        assert_eq!(result.rows[0]["amount"], Value::from("100"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_tricky_input() {
        let result = parse_str(TRICKY, ParseOptions::default());

        assert_eq!(result.meta.fields, vec!["id", "name", "joined", "active", "score"]);
        assert_eq!(result.meta.column_types["id"], ColumnType::Number);
        assert_eq!(result.meta.column_types["name"], ColumnType::String);
        assert_eq!(result.meta.column_types["joined"], ColumnType::Date);
        assert_eq!(result.meta.column_types["active"], ColumnType::Boolean);
        assert_eq!(result.meta.column_types["score"], ColumnType::Number);

        assert_eq!(result.rows.len(), 5);
        assert_eq!(result.rows[0]["name"], Value::from("Smith, Jane"));
        assert_eq!(result.rows[1]["name"], Value::from("Quote \"Q\" Person"));
        assert_eq!(result.rows[2]["score"], Value::Null);
        assert_eq!(result.rows[3]["name"], Value::from("multi\nline"));
        assert_eq!(result.rows[4]["name"], Value::from("Ünïcødé ✓"));

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 5);
        assert_eq!(result.errors[0].raw_line, "5,broken");
    }

    #[test]
    fn test_rows_plus_errors_equals_data_lines() {
        let text = "a,b\n1,2\n\n3\n4,5\n6,7,8\n  \n9,10\n";
        let result = parse_str(text, ParseOptions::default());

        let data_lines = text.lines().skip(1).filter(|l| !l.trim().is_empty()).count();
        assert_eq!(result.rows.len() + result.errors.len(), data_lines);
    }

    #[test]
    fn test_stray_quote_in_unquoted_field() {
        let text = "id,desc\n1,5\" screen\n2,ok\n3,ok\n4,ok\n";
        let result = parse_str(text, ParseOptions::default());

        assert_eq!(result.rows.len() + result.errors.len(), 4);
        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.rows[0]["desc"], Value::from("5 screen"));
        assert_eq!(result.rows[3]["id"], Value::Number(4.0));
    }

    #[tokio::test]
    async fn test_stray_quote_chunk_invariance() {
        let text = "id,desc\n1,5\" screen\n2,\"a\nb\"\n3,x\"y,z\n4,ok\n";
        let whole = parse_str(text, ParseOptions::default());
        assert_eq!(whole.rows.len() + whole.errors.len(), 4);

        for size in 1..=text.len() {
            let parser = StreamingParser::new(ParseOptions::default());
            let result = parser.parse(MemorySource::new(text.as_bytes(), size)).await.unwrap();
            assert_eq!(stable(&result), stable(&whole), "chunk size {}", size);
        }
    }

    #[tokio::test]
    async fn test_chunk_boundary_invariance() {
        let whole = parse_str(TRICKY, ParseOptions::default());
        let bytes = TRICKY.as_bytes();

        for size in 1..=bytes.len() {
            let parser = StreamingParser::new(ParseOptions::default());
            let result = parser.parse(MemorySource::new(bytes, size)).await.unwrap();
            assert_eq!(stable(&result), stable(&whole), "chunk size {}", size);
        }
    }

    #[tokio::test]
    async fn test_every_two_way_split() {
        let whole = parse_str(TRICKY, ParseOptions::default().with_sample_size(2));
        let bytes = TRICKY.as_bytes();

        for cut in 1..bytes.len() {
            let source = MemorySource::from_chunks(vec![bytes[..cut].to_vec(), bytes[cut..].to_vec()]);
            let parser = StreamingParser::new(ParseOptions::default().with_sample_size(2));
            let result = parser.parse(source).await.unwrap();
            assert_eq!(stable(&result), stable(&whole), "cut at {}", cut);
        }
    }

    #[tokio::test]
    async fn test_max_rows_stops_reading() {
        let text: String = std::iter::once("n\n".to_string())
            .chain((0..100).map(|i| format!("{}\n", i)))
            .collect();
        let parser = StreamingParser::new(ParseOptions::default().with_max_rows(10));
        let result = parser.parse(MemorySource::new(&text, 8)).await.unwrap();

        assert_eq!(result.meta.total_rows, 10);
        assert!(result.meta.bytes_total_read < text.len() as u64);
        assert_eq!(result.rows[9]["n"], Value::Number(9.0));
    }

    /// Cancels its token as soon as the first chunk has been handed out
    struct CancelAfterFirst {
        inner: MemorySource,
        token: CancellationToken,
        served: usize,
    }

    #[async_trait]
    impl ChunkSource for CancelAfterFirst {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
            let chunk = self.inner.next_chunk().await?;
            self.served += 1;
            if self.served == 1 {
                self.token.cancel();
            }
            Ok(chunk)
        }

        fn source_name(&self) -> &str {
            "cancel-after-first"
        }
    }

    #[tokio::test]
    async fn test_cancellation_after_first_chunk() {
        let chunks: Vec<Vec<u8>> = std::iter::once(b"a,b\n".to_vec())
            .chain((0..9).map(|i| format!("{},{}\n", i, i).into_bytes()))
            .collect();
        assert_eq!(chunks.len(), 10);

        let parser = StreamingParser::new(ParseOptions::default());
        let source = CancelAfterFirst {
            inner: MemorySource::from_chunks(chunks),
            token: parser.cancellation_token(),
            served: 0,
        };

        let err = parser.parse(source).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let parser = StreamingParser::new(ParseOptions::default()).with_cancellation(token);

        let err = parser.parse(MemorySource::new("a\n1\n", 2)).await.unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
    }

    #[tokio::test]
    async fn test_progress_events_per_chunk() {
        let (sink, mut rx) = EventSink::channel();
        let parser = StreamingParser::new(ParseOptions::default()).with_events(sink);
        parser.parse(MemorySource::new("a\n1\n2\n3\n", 4)).await.unwrap();

        let mut percentages = Vec::new();
        let mut rows = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ParseEvent::Progress(update) => percentages.push(update.percentage),
                ParseEvent::Rows(batch) => rows.extend(batch.rows),
            }
        }

        assert_eq!(percentages, vec![Some(50.0), Some(100.0)]);
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_fail_parse() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        let parser = StreamingParser::new(ParseOptions::default()).with_events(sink);
        let result = parser.parse(MemorySource::new("a\n1\n", 1)).await.unwrap();
        assert_eq!(result.meta.total_rows, 1);
    }

    #[tokio::test]
    async fn test_parse_path() {
        let path = std::env::temp_dir().join(format!("ds-stream-parse-{}.csv", std::process::id()));
        tokio::fs::write(&path, "x,y\n1,true\n2,false\n").await.unwrap();

        let parser = StreamingParser::new(ParseOptions::default().with_chunk_size_hint(5));
        let result = parser.parse_path(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(result.meta.total_rows, 2);
        assert_eq!(result.meta.bytes_total_read, 19);
        assert_eq!(result.meta.column_types["y"], ColumnType::Boolean);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let parser = StreamingParser::new(ParseOptions::default().with_sample_size(0));
        let err = parser.parse(MemorySource::new("a\n", 1)).await.unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
    }

    #[test]
    fn test_header_only() {
        let result = parse_str("a,b\n", ParseOptions::default());
        assert!(result.rows.is_empty());
        assert_eq!(result.meta.fields, vec!["a", "b"]);
        assert_eq!(result.meta.column_types["a"], ColumnType::String);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = parse_bytes(b"", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, StreamError::MissingHeader));
    }
}
