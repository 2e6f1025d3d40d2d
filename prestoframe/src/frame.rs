//! Turn fetched rows into an Arrow table.
use crate::error::{PrestoframeError, PrestoframeErrorKind};

use arrow::array::{ArrayRef, BooleanArray, PrimitiveArray, StringArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Field, Float32Type, Float64Type, Int8Type,
    Int16Type, Int32Type, Int64Type, Schema, TimeUnit, TimestampMillisecondType,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use presto_connect::{Column, Row};
use serde_json::Value;
use std::sync::Arc;


/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;


/// Arrow type used for a column of the given Presto type.
///
/// Types without a lossless native mapping (decimal, varchar, time, zoned
/// timestamps, arrays, maps, rows, ...) are kept as text.
pub fn arrow_type(presto_type: &str) -> DataType {
    let normalized = presto_type.trim().to_ascii_lowercase();
    let base = normalized.split('(').next().unwrap_or_default().trim();

    match base {
        "boolean" => DataType::Boolean,
        "tinyint" => DataType::Int8,
        "smallint" => DataType::Int16,
        "integer" | "int" => DataType::Int32,
        "bigint" => DataType::Int64,
        "real" => DataType::Float32,
        "double" => DataType::Float64,
        "date" => DataType::Date32,
        "timestamp" if !normalized.contains("with time zone") => {
            DataType::Timestamp(TimeUnit::Millisecond, None)
        }
        _ => DataType::Utf8,
    }
}

/// Build a table with one field per column and one row per fetched row.
pub fn to_record_batch(columns: &[Column], rows: Vec<Row>) -> Result<RecordBatch, PrestoframeError> {
    for (index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(PrestoframeErrorKind::RowWidthMismatch {
                row: index,
                expected: columns.len(),
                found: row.len(),
            }
            .into());
        }
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|column| Field::new(&column.name, arrow_type(&column.type_name), true))
        .collect();

    let arrays = columns
        .iter()
        .zip(fields.iter())
        .enumerate()
        .map(|(index, (column, field))| build_column(column, field.data_type(), index, &rows))
        .collect::<Result<Vec<ArrayRef>, _>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    Ok(RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?)
}

fn build_column(
    column: &Column,
    data_type: &DataType,
    index: usize,
    rows: &[Row],
) -> Result<ArrayRef, PrestoframeError> {
    let cells = rows.iter().map(|row| &row[index]);

    let array: ArrayRef = match data_type {
        DataType::Boolean => {
            let values = convert(column, "Boolean", cells, Value::as_bool)?;
            Arc::new(BooleanArray::from(values))
        }
        DataType::Int8 => primitive::<Int8Type>(column, cells, |v| v.as_i64()?.try_into().ok())?,
        DataType::Int16 => primitive::<Int16Type>(column, cells, |v| v.as_i64()?.try_into().ok())?,
        DataType::Int32 => primitive::<Int32Type>(column, cells, |v| v.as_i64()?.try_into().ok())?,
        DataType::Int64 => primitive::<Int64Type>(column, cells, Value::as_i64)?,
        DataType::Float32 => primitive::<Float32Type>(column, cells, |v| as_f64(v).map(|f| f as f32))?,
        DataType::Float64 => primitive::<Float64Type>(column, cells, as_f64)?,
        DataType::Date32 => primitive::<Date32Type>(column, cells, as_date32)?,
        DataType::Timestamp(TimeUnit::Millisecond, None) => {
            primitive::<TimestampMillisecondType>(column, cells, as_timestamp_millis)?
        }
        _ => {
            let values: Vec<Option<String>> = cells.map(as_text).collect();
            Arc::new(StringArray::from(values))
        }
    };

    Ok(array)
}

fn primitive<'a, T: ArrowPrimitiveType>(
    column: &Column,
    cells: impl Iterator<Item = &'a Value>,
    extract: impl Fn(&Value) -> Option<T::Native>,
) -> Result<ArrayRef, PrestoframeError> {
    let values = convert(column, &T::DATA_TYPE.to_string(), cells, extract)?;
    Ok(Arc::new(values.into_iter().collect::<PrimitiveArray<T>>()))
}

/// Extract every non-null cell, failing on the first one that does not fit.
fn convert<'a, N>(
    column: &Column,
    expected: &str,
    cells: impl Iterator<Item = &'a Value>,
    extract: impl Fn(&Value) -> Option<N>,
) -> Result<Vec<Option<N>>, PrestoframeError> {
    cells
        .enumerate()
        .map(|(row, cell)| match cell {
            Value::Null => Ok(None),
            value => extract(value).map(Some).ok_or_else(|| {
                PrestoframeError::from(PrestoframeErrorKind::ValueTypeMismatch {
                    column: column.name.clone(),
                    row,
                    expected: expected.to_string(),
                    found: value.to_string(),
                })
            }),
        })
        .collect()
}

/// Presto encodes non-finite doubles as strings.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => match text.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn as_date32(value: &Value) -> Option<i32> {
    let date = NaiveDate::parse_from_str(value.as_str()?, "%Y-%m-%d").ok()?;
    Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

fn as_timestamp_millis(value: &Value) -> Option<i64> {
    let text = value.as_str()?;
    let timestamp = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()?;
    Some(timestamp.and_utc().timestamp_millis())
}

/// Strings as-is, everything else as compact JSON.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
