//! Daily download command implementation.
//!
//! Resolves the requested stations against the GHCN metadata index, fetches
//! their daily files concurrently, and writes the combined table.

use crate::display::{Format, parse_lon_lat, write_daily};
use anyhow::{Context, Result, bail};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use stevenson_lib::parse_date;
use stevenson_lib::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Download daily observations for the selected stations.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn daily(
    station_ids: &[String],
    name: Option<&str>,
    near: Option<&str>,
    count: usize,
    start: Option<&str>,
    end: Option<&str>,
    element_codes: &[String],
    output: Option<PathBuf>,
    format: Format,
    no_flags: bool,
    workers: Option<usize>,
    cache: bool,
    cache_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let date_range = resolve_range(start, end)?;
    let elements = resolve_elements(element_codes)?;

    let client = DownloadClient::with_defaults()?;
    if !quiet {
        println!("Downloading station metadata...");
    }
    let index = fetch_station_index(&client).await?;
    let stations = select_stations(&index, station_ids, name, near, count, quiet)?;

    let config = FetchConfig {
        elements,
        date_range,
        workers,
    };
    let output = output.unwrap_or_else(|| default_output(&stations, format));

    if no_flags {
        run::<NoFlags>(&client, &stations, &config, &output, format, cache, cache_dir, quiet).await
    } else {
        run::<Flags>(&client, &stations, &config, &output, format, cache, cache_dir, quiet).await
    }
}

/// Build the optional date filter from the CLI arguments.
fn resolve_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), end) => {
            let start = parse_date(start)?;
            let end = match end {
                Some(end) => parse_date(end)?,
                None => chrono::Utc::now().date_naive(),
            };
            Ok(Some(DateRange::new(start, end)?))
        }
        (None, Some(_)) => bail!("--end requires --start"),
    }
}

fn resolve_elements(codes: &[String]) -> Result<Option<Vec<Element>>> {
    if codes.is_empty() {
        return Ok(None);
    }
    let elements = codes
        .iter()
        .map(|code| code.parse::<Element>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(elements))
}

/// Resolve explicit IDs, name matches, and nearest-point picks into one
/// deduplicated station list.
fn select_stations(
    index: &StationIndex,
    ids: &[String],
    name: Option<&str>,
    near: Option<&str>,
    count: usize,
    quiet: bool,
) -> Result<Vec<Station>> {
    let mut selected: BTreeMap<StationId, Station> = BTreeMap::new();

    for id in ids {
        let station = index.require(id)?;
        selected.insert(station.id.clone(), station.clone());
    }

    if let Some(pattern) = name {
        let matches = index.search(pattern);
        if matches.is_empty() {
            bail!("No station matches '{pattern}'");
        }
        let chosen: Vec<Station> = if matches.len() == 1 || quiet {
            matches.into_iter().cloned().collect()
        } else {
            inquire::MultiSelect::new(
                "Multiple stations match; pick the ones to download",
                matches.into_iter().cloned().collect(),
            )
            .prompt()
            .context("Station selection cancelled")?
        };
        for station in chosen {
            selected.insert(station.id.clone(), station);
        }
    }

    if let Some(coords) = near {
        let (lon, lat) = parse_lon_lat(coords)?;
        for station in index.nearest(lon, lat, count)? {
            selected.insert(station.id.clone(), station.clone());
        }
    }

    if selected.is_empty() {
        bail!("No stations selected; pass station IDs, --name, or --near");
    }
    Ok(selected.into_values().collect())
}

fn default_output(stations: &[Station], format: Format) -> PathBuf {
    let stem = match stations {
        [only] => only.id.as_str(),
        _ => "ghcnd",
    };
    PathBuf::from(format!("{stem}.{}", format.extension()))
}

#[allow(clippy::too_many_arguments)]
async fn run<F: FlagColumns>(
    client: &DownloadClient,
    stations: &[Station],
    config: &FetchConfig,
    output: &Path,
    format: Format,
    cache: bool,
    cache_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let (data, summary) = if cache || cache_dir.is_some() {
        let store = match cache_dir {
            Some(dir) => DiskCache::new(dir)?,
            None => DiskCache::with_default_path()?,
        };
        fetch_daily_cached::<F, _>(client, stations, config, &store).await?
    } else {
        stream_daily::<F>(client, stations, config, quiet).await
    };

    if summary.failed > 0 {
        eprintln!("Warning: {} station(s) failed after retries", summary.failed);
    }

    write_daily(&data, output, format)?;
    if !quiet {
        println!("{summary}");
        println!("Output written to: {}", output.display());
    }
    Ok(())
}

/// Drain the concurrent per-station stream with a progress bar.
async fn stream_daily<F: FlagColumns>(
    client: &DownloadClient,
    stations: &[Station],
    config: &FetchConfig,
    quiet: bool,
) -> (StationData<F>, FetchSummary) {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(stations.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} stations {msg}",
                )
                .expect("Invalid progress template")
                .progress_chars("=>-"),
        );
        pb
    };

    let mut data = StationData::new();
    let mut summary = FetchSummary::new(stations.len());
    let mut stream = daily_stream::<F>(client, stations, config);
    while let Some(batch) = stream.next().await {
        summary.record(batch.outcome, batch.len());
        progress.set_message(batch.station.id.to_string());
        data.add_station(batch.station, batch.rows);
        progress.inc(1);
    }
    data.sort_rows();
    progress.finish_and_clear();

    (data, summary)
}
