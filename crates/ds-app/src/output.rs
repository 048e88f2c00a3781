//! Writing parsed rows to disk

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ds_core::{ParseError, ResultMeta, Row, Value};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct JsonOutput<'a> {
    meta: &'a ResultMeta,
    rows: &'a [Row],
    #[serde(skip_serializing_if = "no_errors")]
    errors: &'a [ParseError],
}

fn no_errors(errors: &&[ParseError]) -> bool {
    errors.is_empty()
}

/// Write `rows` as CSV or JSON depending on the file extension
pub fn write_rows(path: &Path, meta: &ResultMeta, rows: &[Row], errors: &[ParseError]) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => write_csv(path, &meta.fields, rows),
        Some("json") => write_json(path, &JsonOutput { meta, rows, errors }),
        _ => bail!("Output must end in .csv or .json: {}", path.display()),
    }?;

    info!(path = %path.display(), rows = rows.len(), "Wrote output");
    Ok(())
}

fn write_csv(path: &Path, fields: &[String], rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(fields)?;
    for row in rows {
        writer.write_record(fields.iter().map(|name| cell(row.get(name))))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, output: &JsonOutput<'_>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, output)?;
    writer.flush()?;
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
