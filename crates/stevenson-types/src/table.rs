//! Result tables pairing observation rows with station metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FlagColumns, MonthlyObservation, Observation, Station, StationId};

/// The result of a daily retrieval: observation rows for one or more
/// stations plus the metadata of each contributing station.
///
/// Rows reference their station by ID; metadata lookups go through the
/// side-table, so rows without a metadata match are kept rather than
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StationData<F: FlagColumns> {
    stations: BTreeMap<StationId, Station>,
    rows: Vec<Observation<F>>,
}

impl<F: FlagColumns> StationData<F> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stations: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    /// Adds one station's metadata and observation rows.
    pub fn add_station(&mut self, station: Station, rows: Vec<Observation<F>>) {
        self.stations.insert(station.id.clone(), station);
        self.rows.extend(rows);
    }

    /// Adds station metadata without rows.
    pub fn insert_station(&mut self, station: Station) {
        self.stations.insert(station.id.clone(), station);
    }

    /// Appends observation rows.
    pub fn append(&mut self, rows: impl IntoIterator<Item = Observation<F>>) {
        self.rows.extend(rows);
    }

    /// Sorts rows by station, date, and element with a stable sort.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| {
            a.station
                .cmp(&b.station)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.element.cmp(&b.element))
        });
    }

    /// Returns the observation rows.
    #[must_use]
    pub fn rows(&self) -> &[Observation<F>] {
        &self.rows
    }

    /// Returns the metadata for a station, if present.
    #[must_use]
    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    /// Returns all station metadata entries, ordered by ID.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// Returns the rows belonging to one station, in table order.
    pub fn rows_for(&self, id: &StationId) -> impl Iterator<Item = &Observation<F>> {
        self.rows.iter().filter(move |row| &row.station == id)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<F: FlagColumns> Default for StationData<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of a monthly read, shaped like [`StationData`] but keyed
/// by year-month instead of calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MonthlyData<F: FlagColumns> {
    stations: BTreeMap<StationId, Station>,
    rows: Vec<MonthlyObservation<F>>,
}

impl<F: FlagColumns> MonthlyData<F> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stations: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    /// Adds station metadata without rows.
    pub fn insert_station(&mut self, station: Station) {
        self.stations.insert(station.id.clone(), station);
    }

    /// Appends observation rows.
    pub fn append(&mut self, rows: impl IntoIterator<Item = MonthlyObservation<F>>) {
        self.rows.extend(rows);
    }

    /// Sorts rows by station, date, and element with a stable sort.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| {
            a.station
                .cmp(&b.station)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.element.cmp(&b.element))
        });
    }

    /// Returns the observation rows.
    #[must_use]
    pub fn rows(&self) -> &[MonthlyObservation<F>] {
        &self.rows
    }

    /// Returns the metadata for a station, if present.
    #[must_use]
    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    /// Returns all station metadata entries, ordered by ID.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<F: FlagColumns> Default for MonthlyData<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Element, NoFlags};

    fn station(id: &str) -> Station {
        Station {
            id: StationId::new(id),
            latitude: 51.5,
            longitude: -0.1,
            elevation: 25.0,
            name: format!("STATION {id}"),
            first_year: None,
            last_year: None,
            country: None,
        }
    }

    fn row(id: &str, day: u32, element: &str) -> Observation<NoFlags> {
        Observation {
            station: StationId::new(id),
            date: NaiveDate::from_ymd_opt(2016, 7, day).unwrap(),
            element: Element::new(element),
            value: Some(1.0),
            flags: NoFlags,
        }
    }

    #[test]
    fn test_sort_orders_by_station_date_element() {
        let mut data = StationData::new();
        data.add_station(
            station("UKM00003772"),
            vec![row("UKM00003772", 2, "TMAX"), row("UKM00003772", 1, "TMAX")],
        );
        data.add_station(
            station("UKE00105915"),
            vec![row("UKE00105915", 1, "TMIN"), row("UKE00105915", 1, "PRCP")],
        );
        data.sort_rows();

        let keys: Vec<(String, u32, String)> = data
            .rows()
            .iter()
            .map(|r| {
                (
                    r.station.to_string(),
                    chrono::Datelike::day(&r.date),
                    r.element.to_string(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("UKE00105915".to_string(), 1, "PRCP".to_string()),
                ("UKE00105915".to_string(), 1, "TMIN".to_string()),
                ("UKM00003772".to_string(), 1, "TMAX".to_string()),
                ("UKM00003772".to_string(), 2, "TMAX".to_string()),
            ]
        );
    }

    #[test]
    fn test_rows_without_metadata_are_kept() {
        let mut data: StationData<NoFlags> = StationData::new();
        data.append(vec![row("UKW00035054", 1, "TMAX")]);
        assert_eq!(data.len(), 1);
        assert!(data.station(&StationId::new("UKW00035054")).is_none());
    }

    #[test]
    fn test_rows_for_filters_by_station() {
        let mut data = StationData::new();
        data.add_station(
            station("UKE00105915"),
            vec![row("UKE00105915", 1, "TMAX"), row("UKE00105915", 2, "TMAX")],
        );
        data.add_station(station("UKM00003772"), vec![row("UKM00003772", 1, "TMAX")]);
        data.sort_rows();

        let count = data.rows_for(&StationId::new("UKE00105915")).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_metadata_lookup() {
        let mut data: StationData<NoFlags> = StationData::new();
        data.insert_station(station("UKE00105915"));
        let found = data.station(&StationId::new("UKE00105915")).unwrap();
        assert_eq!(found.name, "STATION UKE00105915");
        assert_eq!(data.stations().count(), 1);
    }
}
