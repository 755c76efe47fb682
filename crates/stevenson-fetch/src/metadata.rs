//! Station reference metadata retrieval.

use stevenson_stations::{CountryTable, StationIndex, parse_inventory, parse_stations};
use stevenson_types::{Result, StevensonError};

use crate::client::DownloadClient;
use crate::url;

/// Downloads the daily station list and inventory into an index.
///
/// The station list carries coordinates and names; the inventory adds
/// each station's first and last year of records, which drives the
/// overlap check that lets fetches skip stations outright.
///
/// # Errors
///
/// Returns an error if either reference file cannot be downloaded.
pub async fn fetch_station_index(client: &DownloadClient) -> Result<StationIndex> {
    tracing::debug!("downloading station reference list");
    let stations_text = download_required(client, &url::stations_url()).await?;
    tracing::debug!("downloading station inventory");
    let inventory_text = download_required(client, &url::inventory_url()).await?;

    let mut index = StationIndex::new(parse_stations(&stations_text));
    index.apply_inventory(&parse_inventory(&inventory_text));
    tracing::debug!(stations = index.len(), "station index ready");
    Ok(index)
}

/// Downloads the monthly archive's country-code table.
///
/// # Errors
///
/// Returns an error if the table cannot be downloaded.
pub async fn fetch_country_table(client: &DownloadClient) -> Result<CountryTable> {
    let text = download_required(client, &url::countries_url()).await?;
    Ok(CountryTable::parse(&text))
}

async fn download_required(client: &DownloadClient, url: &str) -> Result<String> {
    match client.download(url).await {
        Ok(Some(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Ok(None) => Err(StevensonError::Http(format!("{url} returned 404"))),
        Err(e) => Err(StevensonError::Http(e.to_string())),
    }
}
