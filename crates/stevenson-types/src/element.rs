//! Climate element codes and the unit registry.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Element codes whose raw daily values are stored in tenths of the
/// physical unit and must be divided by ten.
///
/// The `SN*#` and `SX*#` soil temperature families are matched by
/// pattern instead, the two trailing digits encoding ground cover and
/// depth.
const TENTHS_ELEMENTS: &[&str] = &[
    "PRCP", "TMAX", "TMIN", "TAXN", "TAVG", "TOBS", "AWND", "EVAP", "MDEV", "MDPR", "MDTN", "MDTX",
    "MNPN", "MXPN", "ADPT", "THIC", "WESD", "WESF", "WSF1", "WSF2", "WSF5", "WSFG", "WSFI", "WSFM",
];

/// A measured climate variable code, e.g. `TMAX` or `PRCP`.
///
/// Codes are stored uppercased. The set of codes is open; the unit
/// registry only decides how raw integer values are rescaled, unknown
/// codes pass through unscaled.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element(String);

impl Element {
    /// Creates an element code, trimming whitespace and uppercasing.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if raw daily values of this element are stored in
    /// tenths of the physical unit.
    #[must_use]
    pub fn is_tenths(&self) -> bool {
        if TENTHS_ELEMENTS.contains(&self.0.as_str()) {
            return true;
        }
        let code = self.0.as_bytes();
        code.len() == 4
            && (code.starts_with(b"SN") || code.starts_with(b"SX"))
            && code[2].is_ascii_digit()
            && code[3].is_ascii_digit()
    }

    /// Returns the divisor converting a raw daily integer value to the
    /// physical unit.
    #[must_use]
    pub fn unit_divisor(&self) -> f64 {
        if self.is_tenths() { 10.0 } else { 1.0 }
    }

    /// Returns true for the temperature codes stored in hundredths of a
    /// degree by the monthly archive.
    #[must_use]
    pub fn is_monthly_temperature(&self) -> bool {
        matches!(self.0.as_str(), "TAVG" | "TMAX" | "TMIN")
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Element {
    type Err = ElementParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let element = Self::new(s);
        if element.0.is_empty() {
            return Err(ElementParseError(s.to_string()));
        }
        Ok(element)
    }
}

/// Error returned when parsing a blank element code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementParseError(String);

impl std::fmt::Display for ElementParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid element code '{}', expected a code like TMAX or PRCP",
            self.0
        )
    }
}

impl std::error::Error for ElementParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_elements_are_tenths() {
        for code in ["PRCP", "TMAX", "TMIN", "TAVG", "AWND", "WESD", "WSF2"] {
            assert_eq!(Element::new(code).unit_divisor(), 10.0, "{code}");
        }
    }

    #[test]
    fn test_soil_temperature_wildcards_are_tenths() {
        for code in ["SN01", "SN32", "SX03", "SX57"] {
            assert!(Element::new(code).is_tenths(), "{code}");
        }
    }

    #[test]
    fn test_non_tenths_elements_pass_through() {
        // Snow depth and snowfall are reported in whole millimetres.
        for code in ["SNOW", "SNWD", "DAPR", "WT01", "FRGT"] {
            assert_eq!(Element::new(code).unit_divisor(), 1.0, "{code}");
        }
    }

    #[test]
    fn test_malformed_soil_codes_are_not_tenths() {
        for code in ["SN1", "SNAB", "SX0A", "SNOWX"] {
            assert!(!Element::new(code).is_tenths(), "{code}");
        }
    }

    #[test]
    fn test_new_normalizes_case_and_whitespace() {
        assert_eq!(Element::new(" tmax "), Element::new("TMAX"));
    }

    #[test]
    fn test_monthly_temperature_codes() {
        assert!(Element::new("TAVG").is_monthly_temperature());
        assert!(Element::new("TMAX").is_monthly_temperature());
        assert!(Element::new("TMIN").is_monthly_temperature());
        assert!(!Element::new("PRCP").is_monthly_temperature());
    }

    #[test]
    fn test_from_str_rejects_blank() {
        assert!("   ".parse::<Element>().is_err());
        assert_eq!("tmin".parse::<Element>().unwrap(), Element::new("TMIN"));
    }
}
