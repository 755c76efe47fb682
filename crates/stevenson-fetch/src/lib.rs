//! Data retrieval and decoding for the GHCN daily and monthly archives.
//!
//! - [`DownloadClient`] - HTTP client with retry and exponential backoff
//! - [`parse_daily`] - Decodes one station's `.dly` file into observation rows
//! - [`read_monthly`] / [`parse_monthly`] - GHCN-M v4 `.dat` reading
//! - [`daily_stream`] / [`fetch_daily`] - Concurrent per-station retrieval
//! - [`fetch_station_index`] - Downloads and joins the station reference files
//! - [`DiskCache`] / [`fetch_daily_cached`] - Result caching keyed by arguments

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stevenson-rs/stevenson/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod client;
mod daily;
mod metadata;
mod monthly;
mod parse;
mod stream;
pub mod url;

pub use cache::{CacheKey, DiskCache, ResultCache, fetch_daily_cached};
pub use client::{ClientConfig, DownloadClient, DownloadError, RetryPolicy};
pub use daily::parse_daily;
pub use metadata::{fetch_country_table, fetch_station_index};
pub use monthly::{parse_monthly, read_monthly};
pub use parse::ParseError;
pub use stream::{
    FetchConfig, FetchOutcome, FetchSummary, StationBatch, daily_stream, default_workers,
    fetch_daily,
};
