//! Output formatting for daily and monthly station data.
//!
//! - [`Formatter`] - The writing interface all formatters implement
//! - [`CsvFormatter`] - Delimited text with optional header
//! - [`JsonFormatter`] - A JSON array or newline-delimited records
//! - [`ParquetFormatter`] - Apache Parquet with Snappy compression
//! - [`OutputFormat`] - Format selection by name or file extension

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stevenson-rs/stevenson/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

#[cfg(feature = "parquet")]
mod parquet;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetFormatter;
