//! Error types for loading and querying the dataset.

use thiserror::Error;

/// A numeric cell that is not a decimal integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: column '{column}' value '{value}' is not an integer")]
pub struct ParseError {
    /// 1-based data row (the header is not counted).
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Errors that can occur while loading a dataset.
///
/// Loading is fail-fast: the first error aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Structurally wrong input, e.g. a JSON row that is not an object.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

/// Errors returned by the dimensional index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Order statistics requested on zero records.
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("too many dimensions (max {max})")]
    TooManyDimensions { max: usize },

    #[error("unknown dimension #{0}")]
    UnknownDimension(usize),

    #[error("unknown group #{0}")]
    UnknownGroup(usize),
}
