//! Display utilities and output writing for the stevenson CLI.

use anyhow::{Result, bail};
use clap::ValueEnum;
use stevenson_lib::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output format for converted data.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Tsv,
    Json,
    Ndjson,
    Parquet,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Write a daily table to a file in the specified format.
pub(crate) fn write_daily<F: FlagColumns>(
    data: &StationData<F>,
    output: &Path,
    format: Format,
) -> Result<()> {
    let file = File::create(output)?;
    let writer = BufWriter::new(file);

    match format {
        Format::Csv => {
            CsvFormatter::new().write_daily(data, writer)?;
        }
        Format::Tsv => {
            CsvFormatter::tsv().write_daily(data, writer)?;
        }
        Format::Json => {
            JsonFormatter::new().write_daily(data, writer)?;
        }
        Format::Ndjson => {
            JsonFormatter::ndjson().write_daily(data, writer)?;
        }
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_daily(data, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}

/// Write a monthly table to a file in the specified format.
pub(crate) fn write_monthly<F: FlagColumns>(
    data: &MonthlyData<F>,
    output: &Path,
    format: Format,
) -> Result<()> {
    let file = File::create(output)?;
    let writer = BufWriter::new(file);

    match format {
        Format::Csv => {
            CsvFormatter::new().write_monthly(data, writer)?;
        }
        Format::Tsv => {
            CsvFormatter::tsv().write_monthly(data, writer)?;
        }
        Format::Json => {
            JsonFormatter::new().write_monthly(data, writer)?;
        }
        Format::Ndjson => {
            JsonFormatter::ndjson().write_monthly(data, writer)?;
        }
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_monthly(data, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                bail!("Parquet support not compiled in");
            }
        }
    }

    Ok(())
}

/// Parse a "LON,LAT" coordinate pair.
pub(crate) fn parse_lon_lat(s: &str) -> Result<(f64, f64)> {
    let Some((lon, lat)) = s.split_once(',') else {
        bail!("Expected LON,LAT (e.g. -0.12,51.53), got: {s}");
    };
    match (lon.trim().parse::<f64>(), lat.trim().parse::<f64>()) {
        (Ok(lon), Ok(lat)) => Ok((lon, lat)),
        _ => bail!("Expected numeric LON,LAT, got: {s}"),
    }
}
