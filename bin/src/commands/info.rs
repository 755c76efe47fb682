//! Station info command implementation.

use anyhow::Result;
use stevenson_lib::prelude::*;
use stevenson_lib::url;

/// Show detailed metadata for one station.
pub(crate) async fn info(station_id: &str, quiet: bool) -> Result<()> {
    let client = DownloadClient::with_defaults()?;
    if !quiet {
        println!("Downloading station metadata...");
    }
    let index = fetch_station_index(&client).await?;
    let station = index.require(station_id)?;

    println!("Station:    {}", station.name);
    println!("ID:         {}", station.id);
    println!("Latitude:   {:.4}", station.latitude);
    println!("Longitude:  {:.4}", station.longitude);
    if station.elevation <= -999.0 {
        println!("Elevation:  unknown");
    } else {
        println!("Elevation:  {:.1} m", station.elevation);
    }
    match (station.first_year, station.last_year) {
        (Some(first), Some(last)) => println!("Records:    {first}-{last}"),
        _ => println!("Records:    unknown"),
    }
    if let Some(country) = &station.country {
        println!("Country:    {country}");
    }
    println!("Daily file: {}", url::daily_station_url(&station.id));
    Ok(())
}
