//! Tabular codecs
//!
//! Records are flat JSON objects. A [`TabularCodec`] turns a list of them into
//! text and back, so order and point history can be exported to a file and
//! imported again.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

mod csv;

pub use csv::CsvCodec;

/// One row: column name to value.
pub type Record = Map<String, Value>;

/// Errors raised while encoding or decoding tabular text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A quoted cell was never closed.
    #[error("unterminated quoted field on line {line}")]
    UnterminatedQuote {
        /// 1-based line where the quoted field started.
        line: usize,
    },

    /// A row carried more cells than there are headers.
    #[error("row {row} has {cells} cells but the header has {headers}")]
    RowTooLong {
        /// 1-based data row number.
        row: usize,
        /// Cells found on the row.
        cells: usize,
        /// Header count.
        headers: usize,
    },

    /// A value could not be converted to or from a record.
    #[error("record does not match the expected shape")]
    Shape(#[from] serde_json::Error),

    /// A value serialized to something other than a JSON object.
    #[error("only objects can be written as rows")]
    NotAnObject,
}

/// Converts between records and text.
pub trait TabularCodec {
    /// Encode `records` as text. An empty slice encodes to an empty string.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if a nested value cannot be written.
    fn encode(&self, records: &[Record]) -> Result<String, CodecError>;

    /// Decode text into records. Empty text decodes to no records.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the text is malformed.
    fn decode(&self, text: &str) -> Result<Vec<Record>, CodecError>;
}

/// Convert serializable values into records.
///
/// # Errors
///
/// Returns [`CodecError::NotAnObject`] when a value is not a struct or map.
pub fn to_records<T: Serialize>(values: &[T]) -> Result<Vec<Record>, CodecError> {
    values
        .iter()
        .map(|value| match serde_json::to_value(value)? {
            Value::Object(record) => Ok(record),
            _ => Err(CodecError::NotAnObject),
        })
        .collect()
}

/// Convert records back into typed values.
///
/// # Errors
///
/// Returns [`CodecError::Shape`] when a record does not match `T`.
pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>, CodecError> {
    records
        .into_iter()
        .map(|record| serde_json::from_value(Value::Object(record)).map_err(CodecError::from))
        .collect()
}
