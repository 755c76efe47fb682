//! The formatter interface and format selection.

use std::io::Write;
use std::str::FromStr;

use stevenson_types::{FlagColumns, MonthlyData, StationData};
use thiserror::Error;

/// Errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error while writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow conversion failed.
    #[cfg(feature = "parquet")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet writing failed.
    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] ::parquet::errors::ParquetError),
}

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// One JSON array of records.
    Json,
    /// Newline-delimited JSON records.
    Ndjson,
    /// Apache Parquet.
    Parquet,
}

impl OutputFormat {
    /// Returns the conventional file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }

    /// Returns all supported formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Tsv, Self::Json, Self::Ndjson, Self::Parquet]
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            "parquet" => Ok(Self::Parquet),
            _ => Err(format!("unknown output format: {s}")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes result tables to an output stream.
///
/// Formatters join station metadata onto each row through the table's
/// side-table. Rows without a metadata match keep empty metadata
/// fields; flag columns appear only when the row schema carries them.
pub trait Formatter: Send + Sync {
    /// Writes a daily result table.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails.
    fn write_daily<W: Write + Send, F: FlagColumns>(
        &self,
        data: &StationData<F>,
        writer: W,
    ) -> Result<(), FormatError>;

    /// Writes a monthly result table.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails.
    fn write_monthly<W: Write + Send, F: FlagColumns>(
        &self,
        data: &MonthlyData<F>,
        writer: W,
    ) -> Result<(), FormatError>;

    /// Returns the file extension this formatter writes.
    fn extension(&self) -> &'static str;
}
