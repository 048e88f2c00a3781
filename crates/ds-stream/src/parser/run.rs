//! State machine for a single parse
//!
//! A [`ParseRun`] owns every piece of mutable parse state: the line buffer, the
//! current [`Phase`] and the row/error accumulators. Each record moves the phase
//! by value into its successor, so no state is shared with anything else.

use std::time::Instant;

use ds_core::{
    ColumnTypeMap, EventSink, Header, ParseError, ParseEvent, ProgressUpdate, ResultMeta, Row,
    RowBatch, StreamingResult,
};
use tracing::{debug, info, trace, warn};

use crate::buffer::LineBuffer;
use crate::config::ParseOptions;
use crate::inference::InferenceSampler;
use crate::materializer::materialize_row;
use crate::tokenizer::tokenize_line;
use crate::StreamError;

/// Header together with the committed column types
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub header: Header,
    pub types: ColumnTypeMap,
}

/// Rows held back until inference has run
#[derive(Debug)]
pub struct SamplingState {
    header: Header,
    sampler: InferenceSampler,
    pending: Vec<Vec<String>>,
}

/// Parse progress through the input
#[derive(Debug)]
pub enum Phase {
    /// Skipping blank lines until the header line
    AwaitingHeader,
    /// Buffering raw rows for type inference
    Sampling(SamplingState),
    /// Types are fixed; rows are materialized as they arrive
    Materializing(Schema),
    /// A row or byte limit was hit; further input is ignored
    Finished(Schema),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingHeader => "awaiting_header",
            Phase::Sampling(_) => "sampling",
            Phase::Materializing(_) => "materializing",
            Phase::Finished(_) => "finished",
        }
    }

    /// Header, once it has been read
    pub fn header(&self) -> Option<&Header> {
        match self {
            Phase::AwaitingHeader => None,
            Phase::Sampling(state) => Some(&state.header),
            Phase::Materializing(schema) | Phase::Finished(schema) => Some(&schema.header),
        }
    }

    fn on_record(self, record: &str, out: &mut Collector) -> Phase {
        match self {
            Phase::AwaitingHeader => {
                if record.trim().is_empty() {
                    return Phase::AwaitingHeader;
                }
                let header = Header::from_fields(tokenize_line(record.trim_start_matches('\u{feff}')));
                debug!(columns = header.len(), "Header parsed, sampling rows");
                Phase::Sampling(SamplingState::new(header, out.options.sample_size))
            }
            Phase::Sampling(mut state) => {
                let Some(fields) = out.accept(record, &state.header) else {
                    return Phase::Sampling(state);
                };
                let full = state.sampler.observe(&fields);
                state.pending.push(fields);

                if full {
                    Phase::Materializing(state.complete(out))
                } else {
                    Phase::Sampling(state)
                }
            }
            Phase::Materializing(schema) => {
                if let Some(fields) = out.accept(record, &schema.header) {
                    let row = materialize_row(&schema.header, fields, &schema.types, &out.options.null_config);
                    out.push_row(row);
                }
                Phase::Materializing(schema)
            }
            finished @ Phase::Finished(_) => finished,
        }
    }
}

impl SamplingState {
    fn new(header: Header, sample_size: usize) -> Self {
        Self {
            sampler: InferenceSampler::new(header.len(), sample_size),
            header,
            pending: Vec::new(),
        }
    }

    /// Run inference and materialize every held-back row with the result
    fn complete(self, out: &mut Collector) -> Schema {
        let sampled = self.sampler.rows_sampled();
        let mut types = self.sampler.infer(&self.header, &out.options.null_config);

        for (column, column_type) in &out.options.column_types {
            match types.get_mut(column) {
                Some(slot) => *slot = *column_type,
                None => warn!("Type override for unknown column '{}' ignored", column),
            }
        }
        debug!(sampled, pending = self.pending.len(), "Column types committed");

        for fields in self.pending {
            let row = materialize_row(&self.header, fields, &types, &out.options.null_config);
            out.push_row(row);
        }

        Schema {
            header: self.header,
            types,
        }
    }
}

/// Accumulators and notification state owned by a run
struct Collector {
    options: ParseOptions,
    events: EventSink,
    total_bytes: Option<u64>,
    rows: Vec<Row>,
    errors: Vec<ParseError>,
    /// Data lines seen (header and blank lines excluded)
    data_lines: usize,
    /// Data lines with the right field count
    accepted: usize,
    bytes_read: u64,
    /// Rows already delivered in row-batch events
    emitted: usize,
}

impl Collector {
    /// Tokenize a data line, recording a `ParseError` on a field-count mismatch
    fn accept(&mut self, record: &str, header: &Header) -> Option<Vec<String>> {
        if record.trim().is_empty() {
            return None;
        }
        self.data_lines += 1;

        let fields = tokenize_line(record);
        if fields.len() != header.len() {
            warn!(
                row = self.data_lines,
                expected = header.len(),
                found = fields.len(),
                "Skipping malformed row"
            );
            self.errors.push(ParseError {
                row: self.data_lines,
                message: format!("Expected {} fields but found {}", header.len(), fields.len()),
                raw_line: record.to_string(),
            });
            return None;
        }

        self.accepted += 1;
        Some(fields)
    }

    fn push_row(&mut self, row: Row) {
        self.rows.push(row);
        self.flush_batches(false);
    }

    fn row_limit_reached(&self) -> bool {
        self.options.max_rows.map_or(false, |max| self.accepted >= max)
    }

    fn byte_limit_reached(&self) -> bool {
        self.options.max_bytes.map_or(false, |max| self.bytes_read >= max)
    }

    fn progress(&self) -> ProgressUpdate {
        ProgressUpdate::new(self.bytes_read, self.total_bytes, self.accepted)
    }

    /// Send unsent rows once `emit_every` have piled up, or whatever is left when forced
    fn flush_batches(&mut self, force: bool) {
        let unsent = self.rows.len() - self.emitted;
        if unsent == 0 || (!force && unsent < self.options.emit_every) {
            return;
        }

        if self.events.is_enabled() {
            let batch = RowBatch {
                rows: self.rows[self.emitted..].to_vec(),
                total_rows: self.rows.len(),
                current_row: self.emitted,
                progress: self.progress().percentage,
            };
            self.events.emit(ParseEvent::Rows(batch));
        }
        self.emitted = self.rows.len();
    }
}

/// One parse from first chunk to result
pub struct ParseRun {
    buffer: LineBuffer,
    phase: Phase,
    out: Collector,
    /// Physical records seen, blank lines and header included
    records: usize,
    started: Instant,
}

impl ParseRun {
    pub fn new(options: ParseOptions, events: EventSink, total_bytes: Option<u64>) -> Self {
        Self {
            buffer: LineBuffer::new(),
            phase: Phase::AwaitingHeader,
            out: Collector {
                options,
                events,
                total_bytes,
                rows: Vec::new(),
                errors: Vec::new(),
                data_lines: 0,
                accepted: 0,
                bytes_read: 0,
                emitted: 0,
            },
            records: 0,
            started: Instant::now(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// True once a row or byte limit stopped the run
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn bytes_read(&self) -> u64 {
        self.out.bytes_read
    }

    pub fn rows_processed(&self) -> usize {
        self.out.accepted
    }

    /// Process one chunk of input
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.is_finished() {
            return Ok(());
        }
        self.out.bytes_read += chunk.len() as u64;

        for line in self.buffer.push(chunk) {
            self.process_line(&line)?;
            if self.is_finished() {
                break;
            }
        }
        if self.out.byte_limit_reached() {
            self.stop();
        }

        trace!(
            chunk = chunk.len(),
            bytes_read = self.out.bytes_read,
            phase = self.phase.name(),
            "Chunk processed"
        );
        self.out.events.emit(ParseEvent::Progress(self.out.progress()));
        Ok(())
    }

    /// Flush the trailing fragment and build the result
    pub fn finish(mut self) -> Result<StreamingResult, StreamError> {
        if !self.is_finished() {
            if let Some(line) = std::mem::take(&mut self.buffer).finish() {
                self.process_line(&line)?;
            }
        }

        let schema = match std::mem::replace(&mut self.phase, Phase::AwaitingHeader) {
            Phase::AwaitingHeader => return Err(StreamError::MissingHeader),
            Phase::Sampling(state) => state.complete(&mut self.out),
            Phase::Materializing(schema) | Phase::Finished(schema) => schema,
        };
        self.out.flush_batches(true);

        let parse_time_ms = self.started.elapsed().as_millis() as u64;
        info!(
            rows = self.out.rows.len(),
            errors = self.out.errors.len(),
            bytes = self.out.bytes_read,
            parse_time_ms,
            "Parse complete"
        );

        Ok(StreamingResult {
            meta: ResultMeta {
                total_rows: self.out.rows.len(),
                fields: schema.header.into_names(),
                parse_time_ms,
                bytes_total_read: self.out.bytes_read,
                column_types: schema.types,
            },
            rows: self.out.rows,
            errors: self.out.errors,
        })
    }

    fn process_line(&mut self, line: &[u8]) -> Result<(), StreamError> {
        self.records += 1;
        let record = std::str::from_utf8(line).map_err(|source| StreamError::Decode {
            line: self.records,
            source,
        })?;

        let phase = std::mem::replace(&mut self.phase, Phase::AwaitingHeader);
        self.phase = phase.on_record(record, &mut self.out);

        if self.out.row_limit_reached() {
            self.stop();
        }
        Ok(())
    }

    /// Enter `Finished`, committing types if still sampling. Limits only apply
    /// once the header is known.
    fn stop(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::AwaitingHeader);
        self.phase = match phase {
            Phase::Sampling(state) => Phase::Finished(state.complete(&mut self.out)),
            Phase::Materializing(schema) => Phase::Finished(schema),
            other => other,
        };
        if self.is_finished() {
            debug!(rows = self.out.accepted, bytes = self.out.bytes_read, "Limit reached, stopping");
        }
    }
}
