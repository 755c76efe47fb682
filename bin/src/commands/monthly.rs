//! Monthly conversion command implementation.
//!
//! Reads a GHCN-M v4 archive from disk, optionally joins station metadata
//! and country names, and writes the table in the chosen format.

use crate::display::{Format, write_monthly};
use anyhow::{Result, bail};
use stevenson_lib::prelude::*;
use stevenson_lib::{fetch_country_table, load_countries, load_monthly_metadata};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Convert a GHCN-M v4 data file.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn monthly(
    data_path: &Path,
    metadata: Option<&Path>,
    countries: Option<&Path>,
    station_ids: &[String],
    country: Option<&str>,
    output: Option<PathBuf>,
    format: Format,
    no_flags: bool,
    quiet: bool,
) -> Result<()> {
    let index = match metadata {
        Some(path) => Some(load_metadata(path, countries, quiet).await?),
        None => None,
    };

    let mut wanted: BTreeSet<StationId> = station_ids.iter().map(StationId::new).collect();
    if let Some(country) = country {
        let Some(index) = index.as_ref() else {
            bail!("--country needs --metadata to resolve station countries");
        };
        for station in index.by_country(country) {
            wanted.insert(station.id.clone());
        }
    }
    let filtering = !station_ids.is_empty() || country.is_some();
    if filtering && wanted.is_empty() {
        bail!("No stations match the requested filters");
    }
    let filter = filtering.then_some(&wanted);

    let output = output.unwrap_or_else(|| default_output(data_path, format));

    let rows = if no_flags {
        convert::<NoFlags>(data_path, index.as_ref(), filter, &output, format)?
    } else {
        convert::<Flags>(data_path, index.as_ref(), filter, &output, format)?
    };

    if !quiet {
        println!("{rows} rows written to: {}", output.display());
    }
    Ok(())
}

/// Load the station metadata index, resolving country names from a local
/// file or from the published country table.
async fn load_metadata(path: &Path, countries: Option<&Path>, quiet: bool) -> Result<StationIndex> {
    let table = match countries {
        Some(path) => load_countries(path)?,
        None => {
            if !quiet {
                println!("Downloading country table...");
            }
            let client = DownloadClient::with_defaults()?;
            fetch_country_table(&client).await?
        }
    };
    Ok(load_monthly_metadata(path, Some(&table))?)
}

fn convert<F: FlagColumns>(
    data_path: &Path,
    index: Option<&StationIndex>,
    stations: Option<&BTreeSet<StationId>>,
    output: &Path,
    format: Format,
) -> Result<usize> {
    let data = read_monthly::<F>(data_path, index, stations)?;
    write_monthly(&data, output, format)?;
    Ok(data.len())
}

fn default_output(data_path: &Path, format: Format) -> PathBuf {
    let stem = data_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ghcnm");
    PathBuf::from(format!("{stem}.{}", format.extension()))
}
