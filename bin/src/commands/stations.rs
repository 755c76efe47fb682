//! Station listing command implementation.

use crate::display::parse_lon_lat;
use anyhow::Result;
use stevenson_lib::prelude::*;

/// List stations from the GHCN metadata index with optional filters.
pub(crate) async fn stations(
    search: Option<&str>,
    country: Option<&str>,
    near: Option<&str>,
    limit: usize,
    quiet: bool,
) -> Result<()> {
    let client = DownloadClient::with_defaults()?;
    if !quiet {
        println!("Downloading station metadata...");
    }
    let index = fetch_station_index(&client).await?;

    let matches: Vec<&Station> = if let Some(coords) = near {
        let (lon, lat) = parse_lon_lat(coords)?;
        index.nearest(lon, lat, limit)?
    } else if let Some(pattern) = search {
        index.search(pattern)
    } else if let Some(country) = country {
        index.by_country(country)
    } else {
        index.all().collect()
    };

    if matches.is_empty() {
        println!("No stations found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<31} {:>9} {:>10} {:>8} {:<9}",
        "ID", "NAME", "LAT", "LON", "ELEV", "YEARS"
    );
    println!("{}", "-".repeat(84));

    for station in matches.iter().take(limit) {
        let years = match (station.first_year, station.last_year) {
            (Some(first), Some(last)) => format!("{first}-{last}"),
            _ => String::from("-"),
        };
        println!(
            "{:<12} {:<31} {:>9.4} {:>10.4} {:>8.1} {:<9}",
            station.id.as_str(),
            station.name,
            station.latitude,
            station.longitude,
            station.elevation,
            years
        );
    }

    if matches.len() > limit {
        println!("\nShowing {limit} of {} stations", matches.len());
    } else {
        println!("\nTotal: {} stations", matches.len());
    }
    Ok(())
}
