use std::path::PathBuf;

use thiserror::Error;

use super::model::{Strategy, TopicId};

/// The static source could not be turned into a dataset.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': '{value}' is not an integer")]
    NotNumeric {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}, column '{column}': {value} is outside {min}..={max}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("row {row}: unknown search strategy '{value}'")]
    UnknownStrategy { row: usize, value: String },

    #[error("malformed source: {0}")]
    Malformed(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Two source rows share the same (topic, strategy, year) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("duplicate record for topic {topic}, strategy {strategy}, year {year}")]
pub struct DuplicateKeyError {
    pub topic: TopicId,
    pub strategy: Strategy,
    pub year: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid year range {start}..={end}")]
pub struct InvalidYearRange {
    pub start: u16,
    pub end: u16,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
