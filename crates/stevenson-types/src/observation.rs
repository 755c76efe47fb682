//! Observation rows and the flag-column schemas.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Element, StationId};

/// Schema marker deciding whether observation rows carry flag columns.
///
/// The daily and monthly readers are generic over this trait, so the
/// no-flags path skips flag decoding entirely instead of decoding and
/// discarding afterwards. Use [`Flags`] to keep the flag characters and
/// [`NoFlags`] to drop them.
pub trait FlagColumns:
    std::fmt::Debug + Copy + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Whether rows of this schema carry flag columns.
    const INCLUDED: bool;

    /// Flag set for a slot with no recorded flags.
    fn empty() -> Self;

    /// Builds the flag set from the three decoded flag characters.
    fn from_chars(measurement: char, quality: char, source: char) -> Self;

    /// The three flag characters, when the schema carries them.
    fn as_chars(&self) -> Option<(char, char, char)>;
}

/// The three per-observation flag characters.
///
/// A flag the source file leaves blank is stored as a space, matching
/// the raw fixed-width layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// Measurement flag (daily `MFLAG`, monthly `DMFLAG`).
    pub measurement: char,
    /// Quality flag (daily `QFLAG`, monthly `QCFLAG`).
    pub quality: char,
    /// Source flag (daily `SFLAG`, monthly `DSFLAG`).
    pub source: char,
}

impl FlagColumns for Flags {
    const INCLUDED: bool = true;

    fn empty() -> Self {
        Self {
            measurement: ' ',
            quality: ' ',
            source: ' ',
        }
    }

    fn from_chars(measurement: char, quality: char, source: char) -> Self {
        Self {
            measurement,
            quality,
            source,
        }
    }

    fn as_chars(&self) -> Option<(char, char, char)> {
        Some((self.measurement, self.quality, self.source))
    }
}

/// Zero-sized schema for rows without flag columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoFlags;

impl FlagColumns for NoFlags {
    const INCLUDED: bool = false;

    fn empty() -> Self {
        Self
    }

    fn from_chars(_: char, _: char, _: char) -> Self {
        Self
    }

    fn as_chars(&self) -> Option<(char, char, char)> {
        None
    }
}

/// A single daily observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Observation<F: FlagColumns> {
    /// Station the observation belongs to.
    pub station: StationId,
    /// Calendar day of the observation.
    pub date: NaiveDate,
    /// Measured element code.
    pub element: Element,
    /// Value in physical units; `None` marks a missing value.
    pub value: Option<f64>,
    /// Flag columns, if the schema carries them.
    pub flags: F,
}

impl<F: FlagColumns> Observation<F> {
    /// Returns true if the value is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// A single monthly observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct MonthlyObservation<F: FlagColumns> {
    /// Station the observation belongs to.
    pub station: StationId,
    /// Year and month of the observation.
    pub date: YearMonth,
    /// Measured element code.
    pub element: Element,
    /// Value in physical units; `None` marks a missing value.
    pub value: Option<f64>,
    /// Flag columns, if the schema carries them.
    pub flags: F,
}

impl<F: FlagColumns> MonthlyObservation<F> {
    /// Returns true if the value is missing.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// A year-month key for monthly observations.
///
/// Displays and orders as the `year * 100 + month` integer used by the
/// monthly tabular layout, so April 1982 reads as `198204`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month key; `month` must be 1 through 12.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the month, 1 through 12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Returns the combined `year * 100 + month` integer key.
    #[must_use]
    pub const fn as_key(self) -> i32 {
        self.year * 100 + self.month as i32
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags_are_spaces() {
        let flags = Flags::empty();
        assert_eq!(flags.measurement, ' ');
        assert_eq!(flags.quality, ' ');
        assert_eq!(flags.source, ' ');
    }

    #[test]
    fn test_flags_round_trip_chars() {
        let flags = Flags::from_chars(' ', 'I', 'E');
        assert_eq!(flags.as_chars(), Some((' ', 'I', 'E')));
    }

    #[test]
    fn test_no_flags_is_zero_sized() {
        assert_eq!(std::mem::size_of::<NoFlags>(), 0);
        assert_eq!(NoFlags::from_chars('a', 'b', 'c'), NoFlags);
        assert_eq!(NoFlags.as_chars(), None);
    }

    #[test]
    fn test_year_month_key() {
        let date = YearMonth::new(1982, 4).unwrap();
        assert_eq!(date.as_key(), 198204);
        assert_eq!(date.to_string(), "198204");
    }

    #[test]
    fn test_year_month_rejects_invalid_months() {
        assert!(YearMonth::new(1982, 0).is_none());
        assert!(YearMonth::new(1982, 13).is_none());
    }

    #[test]
    fn test_year_month_orders_chronologically() {
        let earlier = YearMonth::new(1999, 12).unwrap();
        let later = YearMonth::new(2000, 1).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_missing_observation() {
        let row: Observation<NoFlags> = Observation {
            station: StationId::new("UKE00105915"),
            date: NaiveDate::from_ymd_opt(2016, 7, 26).unwrap(),
            element: Element::new("TMAX"),
            value: None,
            flags: NoFlags,
        };
        assert!(row.is_missing());
    }
}
