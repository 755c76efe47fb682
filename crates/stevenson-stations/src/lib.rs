//! Station reference metadata parsing and lookup.
//!
//! - [`parse_stations`] / [`parse_inventory`] - Fixed-width reference file parsers
//! - [`CountryTable`] - The monthly archive's country-code table
//! - [`StationIndex`] - In-memory lookup, search, and nearest-station queries
//! - [`load_monthly_metadata`] - Reads a GHCN-M `.inv` file into an index

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stevenson-rs/stevenson/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod index;
mod parse;

pub use index::{IndexError, StationIndex};
pub use parse::{
    CountryTable, load_countries, load_monthly_metadata, parse_inventory, parse_stations,
};
