//! In-memory station lookup and queries.

use std::collections::BTreeMap;

use stevenson_types::{Station, StationId, StevensonError};
use thiserror::Error;

use crate::parse::CountryTable;

/// An in-memory index over station metadata.
///
/// Built from the parsed reference files, optionally enriched with
/// inventory years and country names. Lookups are by ID; searches scan
/// IDs and names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationIndex {
    stations: BTreeMap<StationId, Station>,
}

impl StationIndex {
    /// Builds an index from station metadata.
    #[must_use]
    pub fn new(stations: impl IntoIterator<Item = Station>) -> Self {
        Self {
            stations: stations
                .into_iter()
                .map(|station| (station.id.clone(), station))
                .collect(),
        }
    }

    /// Joins inventory record years onto the indexed stations.
    ///
    /// Stations absent from the inventory keep unset years, so the
    /// overlap check never skips them.
    pub fn apply_inventory(&mut self, years: &BTreeMap<StationId, (i32, i32)>) {
        for (id, station) in &mut self.stations {
            if let Some(&(first, last)) = years.get(id) {
                station.first_year = Some(first);
                station.last_year = Some(last);
            }
        }
    }

    /// Resolves each station's country name from its ID prefix.
    pub fn apply_countries(&mut self, countries: &CountryTable) {
        for station in self.stations.values_mut() {
            station.country = countries.for_station(&station.id).map(str::to_string);
        }
    }

    /// Returns the station with the given ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.get(&StationId::new(id))
    }

    /// Returns the station with the given ID, erroring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StevensonError::UnknownStation`] if the ID is not in
    /// the index.
    pub fn require(&self, id: &str) -> Result<&Station, StevensonError> {
        self.get(id)
            .ok_or_else(|| StevensonError::UnknownStation(id.to_string()))
    }

    /// Returns all stations, ordered by ID.
    pub fn all(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// Returns all station IDs, ordered.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(StationId::as_str)
    }

    /// Searches stations whose ID or name contains the pattern,
    /// case-insensitively.
    #[must_use]
    pub fn search(&self, pattern: &str) -> Vec<&Station> {
        let pattern = pattern.to_ascii_uppercase();
        self.stations
            .values()
            .filter(|station| {
                station.id.as_str().to_ascii_uppercase().contains(&pattern)
                    || station.name.to_ascii_uppercase().contains(&pattern)
            })
            .collect()
    }

    /// Returns stations in the given country.
    ///
    /// Matches the resolved country name when present; a two-character
    /// argument also matches the ID prefix, which covers daily indexes
    /// where no country table was applied.
    #[must_use]
    pub fn by_country(&self, country: &str) -> Vec<&Station> {
        let prefix = (country.len() == 2).then(|| country.to_ascii_uppercase());
        self.stations
            .values()
            .filter(|station| {
                station
                    .country
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(country))
                    || prefix
                        .as_deref()
                        .is_some_and(|p| station.id.as_str().starts_with(p))
            })
            .collect()
    }

    /// Returns the `n` stations nearest to a point, closest first.
    ///
    /// Distance is planar over (longitude, latitude) degrees, which is
    /// adequate for ranking neighbours. The query point must fall
    /// inside the bounding box of the indexed stations.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is empty or the point lies outside
    /// the bounding box.
    pub fn nearest(
        &self,
        longitude: f64,
        latitude: f64,
        n: usize,
    ) -> Result<Vec<&Station>, IndexError> {
        if self.stations.is_empty() {
            return Err(IndexError::Empty);
        }

        let mut lon_bounds = (f64::INFINITY, f64::NEG_INFINITY);
        let mut lat_bounds = (f64::INFINITY, f64::NEG_INFINITY);
        for station in self.stations.values() {
            lon_bounds.0 = lon_bounds.0.min(station.longitude);
            lon_bounds.1 = lon_bounds.1.max(station.longitude);
            lat_bounds.0 = lat_bounds.0.min(station.latitude);
            lat_bounds.1 = lat_bounds.1.max(station.latitude);
        }
        if longitude < lon_bounds.0 || longitude > lon_bounds.1 {
            return Err(IndexError::LongitudeOutOfRange(longitude));
        }
        if latitude < lat_bounds.0 || latitude > lat_bounds.1 {
            return Err(IndexError::LatitudeOutOfRange(latitude));
        }

        let mut by_distance: Vec<(f64, &Station)> = self
            .stations
            .values()
            .map(|station| {
                let dx = station.longitude - longitude;
                let dy = station.latitude - latitude;
                (dx * dx + dy * dy, station)
            })
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(by_distance.into_iter().take(n).map(|(_, s)| s).collect())
    }

    /// Returns the number of indexed stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the index holds no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Errors from station index queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// The index holds no stations.
    #[error("no stations loaded")]
    Empty,

    /// The query longitude is outside the indexed stations.
    #[error("longitude {0} is not within range of the loaded stations")]
    LongitudeOutOfRange(f64),

    /// The query latitude is outside the indexed stations.
    #[error("latitude {0} is not within range of the loaded stations")]
    LatitudeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, name: &str, lon: f64, lat: f64) -> Station {
        Station {
            id: StationId::new(id),
            latitude: lat,
            longitude: lon,
            elevation: 100.0,
            name: name.to_string(),
            first_year: None,
            last_year: None,
            country: None,
        }
    }

    fn london_index() -> StationIndex {
        StationIndex::new(vec![
            station("UKE00105900", "ROTHAMSTED", -0.3581, 51.8067),
            station("UKE00105915", "HAMPSTEAD", -0.1789, 51.5608),
            station("UKM00003772", "HEATHROW", -0.4610, 51.4780),
            station("UKW00035054", "WEST MALLING", 0.4000, 51.2833),
            station("SWE00100003", "STOCKHOLM", 18.0538, 59.3414),
        ])
    }

    #[test]
    fn test_get_and_require() {
        let index = london_index();
        assert_eq!(index.get("UKE00105915").unwrap().name, "HAMPSTEAD");
        assert!(index.get("UKE99999999").is_none());
        assert!(matches!(
            index.require("UKE99999999"),
            Err(StevensonError::UnknownStation(_))
        ));
    }

    #[test]
    fn test_apply_inventory_is_a_left_join() {
        let mut index = london_index();
        let mut years = BTreeMap::new();
        years.insert(StationId::new("UKE00105915"), (1959, 2023));
        years.insert(StationId::new("UKZZ9999999"), (1900, 1910));
        index.apply_inventory(&years);

        assert_eq!(index.get("UKE00105915").unwrap().first_year, Some(1959));
        assert_eq!(index.get("UKM00003772").unwrap().first_year, None);
        assert!(index.get("UKZZ9999999").is_none());
    }

    #[test]
    fn test_search_matches_id_and_name() {
        let index = london_index();
        let by_name = index.search("heath");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id.as_str(), "UKM00003772");

        let by_id = index.search("UKE001059");
        assert_eq!(by_id.len(), 2);
    }

    #[test]
    fn test_by_country_prefix() {
        let index = london_index();
        assert_eq!(index.by_country("UK").len(), 4);
        assert_eq!(index.by_country("SW").len(), 1);
        assert!(index.by_country("ZZ").is_empty());
    }

    #[test]
    fn test_by_country_name() {
        let mut index = london_index();
        let countries = CountryTable::parse("UK United Kingdom\nSW Sweden\n");
        index.apply_countries(&countries);
        assert_eq!(index.by_country("United Kingdom").len(), 4);
        assert_eq!(index.by_country("sweden").len(), 1);
    }

    #[test]
    fn test_nearest_ranks_by_distance() {
        let index = london_index();
        // A point in central London: Hampstead first, then Heathrow.
        let nearest = index.nearest(-0.1278, 51.5074, 2).unwrap();
        assert_eq!(nearest[0].id.as_str(), "UKE00105915");
        assert_eq!(nearest[1].id.as_str(), "UKM00003772");
    }

    #[test]
    fn test_nearest_outside_bounding_box() {
        let index = london_index();
        assert!(matches!(
            index.nearest(-120.0, 51.5, 1),
            Err(IndexError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            index.nearest(-0.1278, 10.0, 1),
            Err(IndexError::LatitudeOutOfRange(_))
        ));
        let empty = StationIndex::default();
        assert!(matches!(empty.nearest(0.0, 0.0, 1), Err(IndexError::Empty)));
    }
}
