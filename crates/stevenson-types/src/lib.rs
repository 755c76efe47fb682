//! Core types for the stevenson GHCN station-data toolkit.
//!
//! This crate provides the fundamental data structures used throughout
//! stevenson:
//!
//! - [`Station`] / [`StationId`] - An observing station and its identifier
//! - [`Element`] - A measured climate variable code and its unit registry
//! - [`Observation`] / [`MonthlyObservation`] - One decoded daily or monthly value
//! - [`Flags`] / [`NoFlags`] - Row schemas with and without flag columns
//! - [`StationData`] / [`MonthlyData`] - Result tables with a metadata side-table
//! - [`DateRange`] / [`YearMonth`] - Date handling for retrieval and monthly keys

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stevenson-rs/stevenson/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod element;
mod error;
pub mod fixed;
mod monthly;
mod observation;
mod station;
mod table;

pub use date_range::{DateRange, parse_date};
pub use element::{Element, ElementParseError};
pub use error::{DateRangeError, Result, StevensonError};
pub use monthly::{GHCNM_VERSION, MonthlyFileError, MonthlyFileKind, MonthlyFilename};
pub use observation::{FlagColumns, Flags, MonthlyObservation, NoFlags, Observation, YearMonth};
pub use station::{Station, StationId};
pub use table::{MonthlyData, StationData};
