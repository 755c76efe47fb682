//! Fixed-width parsers for the GHCN reference files.
//!
//! The station list and the monthly `.inv` metadata share one layout:
//!
//! ```text
//! [0:12]  station    [12:21] latitude    [21:31] longitude
//! [31:38] elevation  [38:69] name
//! ```
//!
//! The inventory file carries per-element record years at `[35:41]` and
//! `[41:46]`; the country table is a code followed by a free-form name.

use std::collections::BTreeMap;
use std::path::Path;

use stevenson_types::{
    MonthlyFileError, MonthlyFilename, Station, StationId, StevensonError, fixed,
};

use crate::StationIndex;

/// Elevation recorded when the reference file has none for a station.
const UNKNOWN_ELEVATION: f64 = -999.9;

/// Parses a station reference file into station metadata.
///
/// Lines with unparseable coordinates are skipped with a warning, since
/// a station that cannot be placed cannot be queried either. Inventory
/// years and country names start out unset; join them with
/// [`StationIndex::apply_inventory`] and [`StationIndex::apply_countries`].
#[must_use]
pub fn parse_stations(text: &str) -> Vec<Station> {
    let mut stations = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_station_line(line) {
            Some(station) => stations.push(station),
            None => tracing::warn!("skipping malformed station line: {line}"),
        }
    }
    stations
}

fn parse_station_line(line: &str) -> Option<Station> {
    let id = fixed::field(line, 0, 12);
    if id.is_empty() {
        return None;
    }
    let latitude = fixed::field(line, 12, 21).parse().ok()?;
    let longitude = fixed::field(line, 21, 31).parse().ok()?;
    let elevation = fixed::field(line, 31, 38).parse().unwrap_or(UNKNOWN_ELEVATION);

    Some(Station {
        id: StationId::new(id),
        latitude,
        longitude,
        elevation,
        name: fixed::field(line, 38, 69).to_string(),
        first_year: None,
        last_year: None,
        country: None,
    })
}

/// Parses the daily inventory file into first and last record years.
///
/// The inventory holds one line per station and element; the first line
/// per station wins, matching the order the archive publishes them in.
#[must_use]
pub fn parse_inventory(text: &str) -> BTreeMap<StationId, (i32, i32)> {
    let mut years = BTreeMap::new();
    for line in text.lines() {
        let id = fixed::field(line, 0, 12);
        if id.is_empty() {
            continue;
        }
        let first = fixed::field(line, 35, 41).parse::<i32>();
        let last = fixed::field(line, 41, 46).parse::<i32>();
        if let (Ok(first), Ok(last)) = (first, last) {
            years.entry(StationId::new(id)).or_insert((first, last));
        }
    }
    years
}

/// The monthly archive's country-code table.
///
/// v4 codes are the two-letter prefixes of station IDs; the v3 table
/// used three-digit numeric codes. Both parse, since the layout is just
/// a code followed by the country name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryTable {
    codes: BTreeMap<String, String>,
}

impl CountryTable {
    /// Parses a country-code file.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut codes = BTreeMap::new();
        for line in text.lines() {
            let Some((code, name)) = line.split_once(' ') else {
                continue;
            };
            let (code, name) = (code.trim(), name.trim());
            if code.is_empty() || name.is_empty() {
                continue;
            }
            codes.insert(code.to_string(), name.to_string());
        }
        Self { codes }
    }

    /// Returns the country name for a code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Resolves the country for a station from its ID prefix, trying
    /// the two-character code first and the three-character one second.
    #[must_use]
    pub fn for_station(&self, id: &StationId) -> Option<&str> {
        let raw = id.as_str();
        raw.get(0..2)
            .and_then(|prefix| self.codes.get(prefix))
            .or_else(|| raw.get(0..3).and_then(|prefix| self.codes.get(prefix)))
            .map(String::as_str)
    }

    /// Returns the number of known codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Reads a country-code file from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_countries(path: &Path) -> Result<CountryTable, StevensonError> {
    Ok(CountryTable::parse(&std::fs::read_to_string(path)?))
}

/// Reads a GHCN-M `.inv` metadata file into a station index.
///
/// The filename version token is checked before the file is opened.
/// When a country table is given, each station's country is resolved
/// from its ID prefix.
///
/// # Errors
///
/// Returns an error if the filename fails the version checks or the
/// file cannot be read.
pub fn load_monthly_metadata(
    path: &Path,
    countries: Option<&CountryTable>,
) -> Result<StationIndex, StevensonError> {
    let fname = MonthlyFilename::parse(path)?;
    if !fname.is_metadata() {
        return Err(MonthlyFileError::UnrecognizedName(fname.name().to_string()).into());
    }
    tracing::debug!(dataset = fname.dataset(), "reading monthly station metadata");

    let text = std::fs::read_to_string(path)?;
    let mut index = StationIndex::new(parse_stations(&text));
    if let Some(countries) = countries {
        index.apply_countries(countries);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn stations_fixture() -> String {
        [
            "UKE00105900  51.8067   -0.3581  128.0    ROTHAMSTED",
            "UKE00105915  51.5608   -0.1789  137.0    HAMPSTEAD",
            "UKM00003772  51.4780   -0.4610   25.3    HEATHROW",
            "UKW00035054  51.2833    0.4000  100.0    WEST MALLING",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_stations_reads_all_fields() {
        let stations = parse_stations(&stations_fixture());
        assert_eq!(stations.len(), 4);

        let hampstead = &stations[1];
        assert_eq!(hampstead.id.as_str(), "UKE00105915");
        assert!((hampstead.latitude - 51.5608).abs() < 1e-9);
        assert!((hampstead.longitude + 0.1789).abs() < 1e-9);
        assert!((hampstead.elevation - 137.0).abs() < 1e-9);
        assert_eq!(hampstead.name, "HAMPSTEAD");
        assert_eq!(hampstead.first_year, None);
        assert_eq!(hampstead.country, None);
    }

    #[test]
    fn test_parse_stations_skips_malformed_coordinates() {
        let text = "UKE00105915  xx.xxxx   -0.1789  137.0    HAMPSTEAD\n\
                    UKM00003772  51.4780   -0.4610   25.3    HEATHROW";
        let stations = parse_stations(text);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "UKM00003772");
    }

    #[test]
    fn test_parse_stations_defaults_missing_elevation() {
        let text = "UKE00105915  51.5608   -0.1789           HAMPSTEAD";
        let stations = parse_stations(text);
        assert!((stations[0].elevation - UNKNOWN_ELEVATION).abs() < 1e-9);
    }

    #[test]
    fn test_parse_inventory_first_line_per_station_wins() {
        let text = "UKE00105915  51.5608   -0.1789 TMAX 1959 2023\n\
                    UKE00105915  51.5608   -0.1789 PRCP 1910 2020\n\
                    UKM00003772  51.4780   -0.4610 TMIN 1948 2024";
        let years = parse_inventory(text);
        assert_eq!(years[&StationId::new("UKE00105915")], (1959, 2023));
        assert_eq!(years[&StationId::new("UKM00003772")], (1948, 2024));
    }

    #[test]
    fn test_country_table_resolves_prefixes() {
        let table = CountryTable::parse(
            "AC Antigua and Barbuda\nUK United Kingdom of Great Britain and Northern Ireland\n",
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("AC"), Some("Antigua and Barbuda"));
        assert_eq!(
            table.for_station(&StationId::new("UKE00105915")),
            Some("United Kingdom of Great Britain and Northern Ireland")
        );
        assert_eq!(table.for_station(&StationId::new("XXE00000001")), None);
    }

    #[test]
    fn test_country_table_accepts_numeric_codes() {
        let table = CountryTable::parse("101 ALGERIA\n103 ANGOLA\n");
        assert_eq!(table.get("101"), Some("ALGERIA"));
        assert_eq!(table.for_station(&StationId::new("10160355000")), Some("ALGERIA"));
    }

    #[test]
    fn test_load_monthly_metadata_checks_filename() {
        let dir = tempfile::tempdir().unwrap();

        let v3 = dir.path().join("ghcnm.tavg.v3.3.0.2019.qca.inv");
        std::fs::File::create(&v3).unwrap();
        let err = load_monthly_metadata(&v3, None).unwrap_err();
        assert!(matches!(err, StevensonError::MonthlyFile(_)));

        let dat = dir.path().join("ghcnm.tavg.v4.0.1.2024.qcu.dat");
        std::fs::File::create(&dat).unwrap();
        let err = load_monthly_metadata(&dat, None).unwrap_err();
        assert!(matches!(err, StevensonError::MonthlyFile(_)));
    }

    #[test]
    fn test_load_monthly_metadata_resolves_countries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghcnm.tavg.v4.0.1.2024.qcu.inv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", stations_fixture()).unwrap();

        let countries = CountryTable::parse("UK United Kingdom\n");
        let index = load_monthly_metadata(&path, Some(&countries)).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(
            index.get("UKE00105915").unwrap().country.as_deref(),
            Some("United Kingdom")
        );
    }
}
