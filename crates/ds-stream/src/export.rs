//! Conversion of parsed rows into Arrow record batches

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, StringBuilder, TimestampMillisecondBuilder};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use ds_core::{ColumnType, StreamingResult, Value};

use crate::StreamError;

/// Arrow type used for a column type
pub fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::String => DataType::Utf8,
        ColumnType::Number => DataType::Float64,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Date => DataType::Timestamp(TimeUnit::Millisecond, None),
    }
}

/// Build a record batch with one column per field.
///
/// Values that kept their string form in a typed column cannot be represented
/// and are stored as nulls.
pub fn to_record_batch(result: &StreamingResult) -> Result<RecordBatch, StreamError> {
    let mut fields = Vec::with_capacity(result.meta.fields.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(result.meta.fields.len());

    for name in &result.meta.fields {
        let column_type = result.meta.column_types.get(name).copied().unwrap_or_default();
        let values = result.rows.iter().map(|row| row.get(name).unwrap_or(&Value::Null));

        let array: ArrayRef = match column_type {
            ColumnType::Number => {
                let mut builder = Float64Builder::with_capacity(result.rows.len());
                for value in values {
                    builder.append_option(value.as_f64());
                }
                Arc::new(builder.finish())
            }
            ColumnType::Boolean => {
                let mut builder = BooleanBuilder::with_capacity(result.rows.len());
                for value in values {
                    builder.append_option(value.as_bool());
                }
                Arc::new(builder.finish())
            }
            ColumnType::Date => {
                let mut builder = TimestampMillisecondBuilder::with_capacity(result.rows.len());
                for value in values {
                    builder.append_option(value.as_date().map(|d| d.and_utc().timestamp_millis()));
                }
                Arc::new(builder.finish())
            }
            ColumnType::String => {
                let mut builder = StringBuilder::new();
                for value in values {
                    match value {
                        Value::Null => builder.append_null(),
                        other => builder.append_value(other.to_string()),
                    }
                }
                Arc::new(builder.finish())
            }
        };

        fields.push(Field::new(name, arrow_type(column_type), true));
        columns.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
