//! Command line entry point

use std::time::Duration;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use ds_core::{EventSink, ParseEvent, StreamingResult};
use ds_sampling::{optimal_sample_size, smart_sample, SamplingOptions};
use ds_stream::{to_record_batch, NullConfig, ParseOptions, StreamingParser};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

use cli::{CliArgs, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = CliArgs::parse(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let options = build_options(&args)?;
    let (events, receiver) = EventSink::channel();
    let parser = StreamingParser::new(options).with_events(events);

    let cancel = parser.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling parse");
            cancel.cancel();
        }
    });
    let progress = tokio::spawn(log_progress(receiver));

    info!(path = %args.input.display(), "Parsing");
    let result = parser
        .parse_path(&args.input)
        .await
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    // The parser owns the last sender; dropping it ends the progress task
    drop(parser);
    progress.await?;

    print_summary(&result);
    if args.preview > 0 {
        print_preview(&result, args.preview)?;
    }

    let rows = match args.chart {
        Some(chart) => {
            let target = optimal_sample_size(result.rows.len(), chart, args.width);
            let sampling = SamplingOptions::default()
                .with_preserve_first(args.keep_ends)
                .with_preserve_last(args.keep_ends)
                .with_method(args.method.clone());
            let sampled = smart_sample(&result.rows, target, &sampling);
            println!("Sampled {} of {} rows for a {} chart", sampled.len(), result.rows.len(), chart);
            sampled
        }
        None => result.rows.clone(),
    };

    if let Some(path) = &args.out {
        output::write_rows(path, &result.meta, &rows, &result.errors)?;
    }

    Ok(())
}

/// Config file first, then command line overrides
fn build_options(args: &CliArgs) -> Result<ParseOptions> {
    let mut options = match &args.config {
        Some(path) => ParseOptions::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ParseOptions::default(),
    };

    if let Some(rows) = args.max_rows {
        options = options.with_max_rows(rows);
    }
    if let Some(bytes) = args.max_bytes {
        options = options.with_max_bytes(bytes);
    }
    if let Some(size) = args.sample_size {
        options = options.with_sample_size(size);
    }
    if args.common_nulls {
        options = options.with_null_config(NullConfig::common());
    }

    options.validate()?;
    Ok(options)
}

async fn log_progress(mut receiver: UnboundedReceiver<ParseEvent>) {
    let mut batches = 0usize;
    while let Some(event) = receiver.recv().await {
        match event {
            ParseEvent::Progress(update) => debug!(
                bytes_read = update.bytes_read,
                rows = update.rows_processed,
                percentage = ?update.percentage,
                "Progress"
            ),
            ParseEvent::Rows(batch) => {
                batches += 1;
                debug!(rows = batch.rows.len(), total = batch.total_rows, "Row batch");
            }
        }
    }
    debug!(batches, "Event stream closed");
}

fn print_summary(result: &StreamingResult) {
    let meta = &result.meta;
    println!(
        "{} rows, {} bytes in {}",
        meta.total_rows,
        meta.bytes_total_read,
        humantime::format_duration(Duration::from_millis(meta.parse_time_ms))
    );
    for name in &meta.fields {
        let column_type = meta.column_types.get(name).copied().unwrap_or_default();
        println!("  {:<24} {}", name, column_type);
    }

    if let Some(warning) = result.warning_summary() {
        warn!("{}", warning);
        println!("{}", warning);
        for error in &result.errors {
            println!("  row {}: {}", error.row, error.message);
        }
    }
}

fn print_preview(result: &StreamingResult, rows: usize) -> Result<()> {
    let head = StreamingResult {
        rows: result.rows.iter().take(rows).cloned().collect(),
        meta: result.meta.clone(),
        errors: Vec::new(),
    };
    let batch = to_record_batch(&head)?;
    println!("{}", pretty_format_batches(&[batch])?);
    Ok(())
}
