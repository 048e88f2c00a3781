use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(ColumnType::String),
            "number" | "numeric" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

/// Column name to type, in header order
pub type ColumnTypeMap = IndexMap<String, ColumnType>;

/// Column names of a parsed input, fixed once the header line is read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Build a header from raw field names.
    ///
    /// Blank names become `column_N` (1-based position) and repeated names get a
    /// `_2`, `_3`, ... suffix so every column can be used as a row key.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for (idx, field) in fields.into_iter().enumerate() {
            let raw: String = field.into();
            let base = if raw.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                raw
            };

            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            names.push(name);
        }

        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
