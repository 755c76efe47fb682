//! NCEI URL construction for the GHCN archives.

use stevenson_types::StationId;

/// Base URL of the NCEI GHCN archive.
pub const BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn";

/// Builds the URL of one station's daily `.dly` file.
#[must_use]
pub fn daily_station_url(id: &StationId) -> String {
    format!("{BASE_URL}/daily/all/{id}.dly")
}

/// URL of the daily station reference list.
#[must_use]
pub fn stations_url() -> String {
    format!("{BASE_URL}/daily/ghcnd-stations.txt")
}

/// URL of the daily station inventory.
#[must_use]
pub fn inventory_url() -> String {
    format!("{BASE_URL}/daily/ghcnd-inventory.txt")
}

/// URL of the monthly archive's country-code table.
#[must_use]
pub fn countries_url() -> String {
    format!("{BASE_URL}/v4/ghcnm-countries.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_station_url() {
        let url = daily_station_url(&StationId::new("UKE00105915"));
        assert_eq!(
            url,
            "https://www.ncei.noaa.gov/pub/data/ghcn/daily/all/UKE00105915.dly"
        );
    }

    #[test]
    fn test_reference_urls() {
        assert_eq!(
            stations_url(),
            "https://www.ncei.noaa.gov/pub/data/ghcn/daily/ghcnd-stations.txt"
        );
        assert_eq!(
            inventory_url(),
            "https://www.ncei.noaa.gov/pub/data/ghcn/daily/ghcnd-inventory.txt"
        );
        assert_eq!(
            countries_url(),
            "https://www.ncei.noaa.gov/pub/data/ghcn/v4/ghcnm-countries.txt"
        );
    }
}
