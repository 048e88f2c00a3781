//! Converts raw fields into typed rows

use ds_core::{ColumnType, ColumnTypeMap, Header, Row, Value};

use crate::config::NullConfig;
use crate::patterns::{parse_bool_token, parse_date, parse_number};

/// Coerce one raw field to its column type.
///
/// A value that does not fit the type keeps its string form; null tokens
/// become [`Value::Null`] for every type.
pub fn coerce_value(raw: String, column_type: ColumnType, null_config: &NullConfig) -> Value {
    if null_config.is_null(&raw) {
        return Value::Null;
    }

    let typed = match column_type {
        ColumnType::String => None,
        ColumnType::Number => parse_number(&raw).map(Value::Number),
        ColumnType::Boolean => parse_bool_token(&raw).map(Value::Boolean),
        ColumnType::Date => parse_date(&raw).map(Value::Date),
    };

    typed.unwrap_or(Value::String(raw))
}

/// Build a row from fields in header order.
///
/// Callers check the field count first; surplus fields are ignored and missing
/// ones are not added.
pub fn materialize_row(
    header: &Header,
    fields: Vec<String>,
    types: &ColumnTypeMap,
    null_config: &NullConfig,
) -> Row {
    header
        .iter()
        .zip(fields)
        .map(|(name, raw)| {
            let column_type = types.get(name).copied().unwrap_or_default();
            (name.to_string(), coerce_value(raw, column_type, null_config))
        })
        .collect()
}
