//! Rust library for downloading GHCN daily and monthly climate station data.
//!
//! This is a facade crate that re-exports functionality from the stevenson
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use stevenson_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DownloadClient::with_defaults()?;
//!     let index = fetch_station_index(&client).await?;
//!     let station = index.require("UKE00105915")?.clone();
//!
//!     let config = FetchConfig::default();
//!     let (data, summary) = fetch_daily::<NoFlags>(&client, &[station], &config).await;
//!     println!("{summary}: {} rows", data.len());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stevenson-rs/stevenson/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use stevenson_types::*;

// Re-export station metadata parsing and lookup
pub use stevenson_stations::{
    CountryTable, IndexError, StationIndex, load_countries, load_monthly_metadata,
    parse_inventory, parse_stations,
};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use stevenson_fetch::{
    CacheKey, ClientConfig, DiskCache, DownloadClient, DownloadError, FetchConfig, FetchOutcome,
    FetchSummary, ParseError, ResultCache, RetryPolicy, StationBatch, daily_stream,
    default_workers, fetch_country_table, fetch_daily, fetch_daily_cached, fetch_station_index,
    parse_daily, parse_monthly, read_monthly, url,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use stevenson_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use stevenson_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use stevenson_lib::prelude::*;
/// ```
pub mod prelude {
    pub use stevenson_types::{
        DateRange, DateRangeError, Element, FlagColumns, Flags, MonthlyData, MonthlyObservation,
        NoFlags, Observation, Result, Station, StationData, StationId, StevensonError, YearMonth,
    };

    pub use stevenson_stations::{CountryTable, StationIndex};

    #[cfg(feature = "fetch")]
    pub use stevenson_fetch::{
        ClientConfig, DiskCache, DownloadClient, FetchConfig, FetchSummary, StationBatch,
        daily_stream, fetch_daily, fetch_daily_cached, fetch_station_index, read_monthly,
    };

    #[cfg(feature = "format")]
    pub use stevenson_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use stevenson_format::ParquetFormatter;
}
