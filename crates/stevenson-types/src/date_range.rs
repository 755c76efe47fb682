//! Date ranges for data retrieval.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::DateRangeError;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the start date is after the end date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> std::result::Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a date range from two `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either date is malformed or start > end.
    pub fn from_strs(start: &str, end: &str) -> std::result::Result<Self, DateRangeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Creates a range covering a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Parses one `YYYY-MM-DD` date argument.
///
/// # Errors
///
/// Returns an error if the input does not parse as a calendar date.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DateRangeError::Malformed(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        let range = DateRange::from_strs("2016-07-01", "2016-07-31").unwrap();
        assert_eq!(range.total_days(), 31);
        assert_eq!(range.to_string(), "2016-07-01 to 2016-07-31");
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let result = DateRange::from_strs("2016-07-31", "2016-07-01");
        assert!(matches!(result, Err(DateRangeError::InvalidRange { .. })));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let result = DateRange::from_strs("2016-07-XX", "2016-07-31");
        assert!(matches!(result, Err(DateRangeError::Malformed(_))));
        let result = DateRange::from_strs("2016-02-30", "2016-07-31");
        assert!(matches!(result, Err(DateRangeError::Malformed(_))));
    }

    #[test]
    fn test_single_day() {
        let date = parse_date("1960-01-01").unwrap();
        let range = DateRange::single_day(date);
        assert_eq!(range.total_days(), 1);
        assert!(range.contains(date));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::from_strs("2016-07-04", "2016-07-26").unwrap();
        assert!(range.contains(parse_date("2016-07-04").unwrap()));
        assert!(range.contains(parse_date("2016-07-26").unwrap()));
        assert!(!range.contains(parse_date("2016-07-03").unwrap()));
        assert!(!range.contains(parse_date("2016-07-27").unwrap()));
    }

    #[test]
    fn test_parse_date_trims_whitespace() {
        assert!(parse_date(" 2016-07-04 ").is_ok());
    }
}
