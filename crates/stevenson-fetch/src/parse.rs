//! Shared pieces of the fixed-width observation parsers.

use thiserror::Error;

/// Raw sentinel the archives write for a missing value.
pub(crate) const MISSING_SENTINEL: &str = "-9999";

/// Errors from decoding fixed-width observation files.
///
/// Any of these is fatal for the file being parsed; the caller decides
/// whether that sinks the whole run or just one station's batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line was too short to carry the header fields.
    #[error("line too short for a header: '{0}'")]
    ShortHeader(String),

    /// The year or month header field was not numeric.
    #[error("invalid {field} field '{value}' in line header")]
    InvalidHeader {
        /// Header field name.
        field: &'static str,
        /// Offending raw text.
        value: String,
    },

    /// A value sub-field held something other than an integer or the
    /// missing sentinel.
    #[error("invalid value field '{field}' for {station} {element} at slot {slot}")]
    InvalidValue {
        /// Offending raw text.
        field: String,
        /// Station the line belongs to.
        station: String,
        /// Element code of the line.
        element: String,
        /// Zero-based slot index within the line.
        slot: usize,
    },

    /// A single-station file contained more than one station ID.
    #[error("more than one station ID in file: {first}, {second}")]
    MultipleStations {
        /// First station ID seen.
        first: String,
        /// Conflicting station ID.
        second: String,
    },
}
