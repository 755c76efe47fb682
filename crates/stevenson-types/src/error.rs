//! Error types for stevenson operations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::monthly::MonthlyFileError;

/// Result type alias for stevenson operations.
pub type Result<T> = std::result::Result<T, StevensonError>;

/// Errors that can occur while retrieving and processing station data.
#[derive(Error, Debug)]
pub enum StevensonError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid data in a fixed-width source file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Station not present in the loaded metadata.
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    /// Invalid date range or date argument.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// GHCN-M filename failed the sanity checks.
    #[error(transparent)]
    MonthlyFile(#[from] MonthlyFileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output format error.
    #[error("Format error: {0}")]
    Format(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors for invalid date ranges and date arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// A date argument did not parse as `YYYY-MM-DD`.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
}
