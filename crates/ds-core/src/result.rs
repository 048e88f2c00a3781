//! Result envelope returned by a completed parse

use serde::Serialize;

use crate::schema::ColumnTypeMap;
use crate::value::Row;

/// A malformed line that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// 1-based index of the data line (header and blank lines excluded)
    pub row: usize,
    pub message: String,
    pub raw_line: String,
}

/// Summary information about a parse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMeta {
    pub total_rows: usize,
    pub fields: Vec<String>,
    pub parse_time_ms: u64,
    pub bytes_total_read: u64,
    pub column_types: ColumnTypeMap,
}

/// Everything a finished parse produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamingResult {
    pub rows: Vec<Row>,
    pub meta: ResultMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
}

impl StreamingResult {
    /// Non-fatal warning text for callers that surface skipped rows
    pub fn warning_summary(&self) -> Option<String> {
        match self.errors.len() {
            0 => None,
            1 => Some("1 row had formatting issues and was skipped".to_string()),
            n => Some(format!("{} rows had formatting issues and were skipped", n)),
        }
    }

    /// Values of one column in row order
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a crate::Value>> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }
}
