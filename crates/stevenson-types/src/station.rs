//! Station identity and metadata.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::DateRange;

/// Identifier of one observing station, e.g. `UKE00105915`.
///
/// Daily identifiers are eleven characters: a two-character country
/// code, a network code, and the station number. Monthly identifiers
/// share the layout but may start with a three-character numeric
/// country code in older archives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Creates a station ID, trimming surrounding whitespace.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StationId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for StationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metadata for one observing station, as loaded from the reference files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station identifier.
    pub id: StationId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in metres; `-999.9` marks an unknown elevation.
    pub elevation: f64,
    /// Station name.
    pub name: String,
    /// First year with records in the inventory, when known.
    pub first_year: Option<i32>,
    /// Last year with records in the inventory, when known.
    pub last_year: Option<i32>,
    /// Country name, when resolved from the country-code table.
    pub country: Option<String>,
}

impl Station {
    /// Returns true if the station's inventory years overlap the range.
    ///
    /// Stations without inventory years are assumed to overlap, so they
    /// are never skipped on incomplete information.
    #[must_use]
    pub fn records_overlap(&self, range: &DateRange) -> bool {
        match (self.first_year, self.last_year) {
            (Some(first), Some(last)) => range.start.year() <= last && range.end.year() >= first,
            _ => true,
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
