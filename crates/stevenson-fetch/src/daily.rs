//! Daily `.dly` decoding.
//!
//! One line holds a station-year-month-element combination with 31 day
//! slots of 8 bytes each:
//!
//! ```text
//! [0:11]  station    [11:15] year    [15:17] month    [17:21] element
//! [21+8d : 26+8d]    value for day d, then one byte each of the
//!                    measurement, quality, and source flags
//! ```
//!
//! Values are integers in archive units; the unit registry on
//! [`Element`] decides which codes are tenths of the physical unit.
//! Blank, `-`, and `-9999` sub-fields are missing values and stay in
//! the output as rows with no value.

use chrono::NaiveDate;
use stevenson_types::{DateRange, Element, FlagColumns, Observation, StationId, fixed};

use crate::parse::{MISSING_SENTINEL, ParseError};

const DAYS_PER_LINE: usize = 31;
const HEADER_WIDTH: usize = 21;
const SLOT_BASE: usize = 21;
const SLOT_STRIDE: usize = 8;
const VALUE_WIDTH: usize = 5;

/// Decodes one station's `.dly` file into observation rows.
///
/// Every real calendar day of every line becomes a row; slots for days
/// the month does not have are dropped. Optional element and date
/// filters keep only matching rows. The result is sorted by station,
/// date, and element.
///
/// # Errors
///
/// Returns an error on malformed headers, non-numeric value fields, or
/// when the file mixes more than one station ID. The station check
/// runs across all lines, including ones the filters would drop.
pub fn parse_daily<F: FlagColumns>(
    text: &str,
    elements: Option<&[Element]>,
    date_range: Option<&DateRange>,
) -> Result<Vec<Observation<F>>, ParseError> {
    let mut rows = Vec::new();
    let mut file_station: Option<StationId> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        parse_line(line, elements, date_range, &mut file_station, &mut rows)?;
    }

    rows.sort_by(|a, b| {
        a.station
            .cmp(&b.station)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.element.cmp(&b.element))
    });
    Ok(rows)
}

fn parse_line<F: FlagColumns>(
    line: &str,
    elements: Option<&[Element]>,
    date_range: Option<&DateRange>,
    file_station: &mut Option<StationId>,
    rows: &mut Vec<Observation<F>>,
) -> Result<(), ParseError> {
    if line.len() < HEADER_WIDTH {
        return Err(ParseError::ShortHeader(line.to_string()));
    }

    let station = StationId::new(fixed::field(line, 0, 11));
    match file_station {
        Some(first) if *first != station => {
            return Err(ParseError::MultipleStations {
                first: first.to_string(),
                second: station.to_string(),
            });
        }
        None => *file_station = Some(station.clone()),
        Some(_) => {}
    }

    let year: i32 = parse_header(fixed::field(line, 11, 15), "year")?;
    let month: u32 = parse_header(fixed::field(line, 15, 17), "month")?;
    let element = Element::new(fixed::field(line, 17, 21));

    if let Some(wanted) = elements {
        if !wanted.contains(&element) {
            return Ok(());
        }
    }
    let divisor = element.unit_divisor();

    for day in 0..DAYS_PER_LINE {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day as u32 + 1) else {
            // The month has no such day; the slot is padding.
            continue;
        };
        if let Some(range) = date_range {
            if !range.contains(date) {
                continue;
            }
        }

        let start = SLOT_BASE + SLOT_STRIDE * day;
        let raw = fixed::field(line, start, start + VALUE_WIDTH);
        let value = match raw {
            "" | "-" | MISSING_SENTINEL => None,
            _ => match raw.parse::<i32>() {
                Ok(v) => Some(f64::from(v) / divisor),
                Err(_) => {
                    return Err(ParseError::InvalidValue {
                        field: raw.to_string(),
                        station: station.to_string(),
                        element: element.to_string(),
                        slot: day,
                    });
                }
            },
        };

        let flags = if F::INCLUDED {
            F::from_chars(
                fixed::flag_char(line, start + VALUE_WIDTH),
                fixed::flag_char(line, start + VALUE_WIDTH + 1),
                fixed::flag_char(line, start + VALUE_WIDTH + 2),
            )
        } else {
            F::empty()
        };

        rows.push(Observation {
            station: station.clone(),
            date,
            element: element.clone(),
            value,
            flags,
        });
    }

    Ok(())
}

pub(crate) fn parse_header<T: std::str::FromStr>(
    raw: &str,
    field: &'static str,
) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidHeader {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use stevenson_types::{Flags, NoFlags};

    use super::*;

    /// Builds one `.dly` line; `values` are (raw value, flag triple).
    fn dly_line(
        station: &str,
        year: i32,
        month: u32,
        element: &str,
        values: &[(&str, &str)],
    ) -> String {
        let mut line = format!("{station:<11}{year:04}{month:02}{element:<4}");
        for (value, flags) in values {
            line.push_str(&format!("{value:>5}{flags:<3}"));
        }
        line
    }

    fn full_month(day_one: &str) -> Vec<(&str, &str)> {
        let mut values = vec![("-9999", "   "); 31];
        values[0] = (day_one, "   ");
        values
    }

    #[test]
    fn test_tenths_value_is_rescaled() {
        // Hampstead's first recorded day: 1960-01-01, TMAX 7.8 C.
        let line = dly_line("UKE00105915", 1960, 1, "TMAX", &full_month("78"));
        let rows = parse_daily::<NoFlags>(&line, None, None).unwrap();

        assert_eq!(rows.len(), 31);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(1960, 1, 1).unwrap());
        assert_relative_eq!(rows[0].value.unwrap(), 7.8);
        assert!(rows[1].is_missing());
    }

    #[test]
    fn test_snow_depth_is_not_rescaled() {
        let line = dly_line("UKE00105915", 2016, 1, "SNWD", &full_month("120"));
        let rows = parse_daily::<NoFlags>(&line, None, None).unwrap();
        assert_relative_eq!(rows[0].value.unwrap(), 120.0);
    }

    #[test]
    fn test_date_filter_keeps_single_day() {
        let mut values = vec![("-9999", "   "); 31];
        values[3] = ("104", "   ");
        let line = dly_line("UKE00105915", 2016, 7, "TMIN", &values);

        let range = DateRange::from_strs("2016-07-04", "2016-07-04").unwrap();
        let rows = parse_daily::<NoFlags>(&line, None, Some(&range)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2016, 7, 4).unwrap());
        assert_relative_eq!(rows[0].value.unwrap(), 10.4);
    }

    #[test]
    fn test_missing_sentinel_row_is_kept() {
        let line = dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("-9999"));
        let range = DateRange::from_strs("2016-07-26", "2016-07-26").unwrap();
        let rows = parse_daily::<Flags>(&line, None, Some(&range)).unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_missing());
        assert_eq!(rows[0].flags, Flags::empty());
    }

    #[test]
    fn test_dash_and_blank_are_missing() {
        let mut values = vec![("-9999", "   "); 31];
        values[0] = ("-", "   ");
        values[1] = ("", "   ");
        values[2] = ("6", "  E");
        let line = dly_line("UKE00107650", 2023, 6, "PRCP", &values);
        let rows = parse_daily::<Flags>(&line, None, None).unwrap();

        assert!(rows[0].is_missing());
        assert!(rows[1].is_missing());
        assert_relative_eq!(rows[2].value.unwrap(), 0.6);
        assert_eq!(rows[2].flags.source, 'E');
    }

    #[test]
    fn test_impossible_dates_are_dropped() {
        let line = dly_line("UKE00105915", 1930, 4, "TMAX", &[("10", "   "); 31]);
        let rows = parse_daily::<NoFlags>(&line, None, None).unwrap();
        assert_eq!(rows.len(), 30);

        // 1900 was not a leap year.
        let line = dly_line("UKE00105915", 1900, 2, "TMAX", &[("10", "   "); 31]);
        let rows = parse_daily::<NoFlags>(&line, None, None).unwrap();
        assert_eq!(rows.len(), 28);

        let line = dly_line("UKE00105915", 2000, 2, "TMAX", &[("10", "   "); 31]);
        let rows = parse_daily::<NoFlags>(&line, None, None).unwrap();
        assert_eq!(rows.len(), 29);
    }

    #[test]
    fn test_element_filter() {
        let text = [
            dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("250")),
            dly_line("UKE00105915", 2016, 7, "PRCP", &full_month("6")),
        ]
        .join("\n");

        let wanted = [Element::new("TMAX")];
        let rows = parse_daily::<NoFlags>(&text, Some(&wanted), None).unwrap();
        assert_eq!(rows.len(), 31);
        assert!(rows.iter().all(|r| r.element == Element::new("TMAX")));
    }

    #[test]
    fn test_flags_decoded_per_slot() {
        let mut values = vec![("-9999", "   "); 31];
        values[28] = ("150", "  E");
        values[29] = ("118", "T E");
        let line = dly_line("UKE00107650", 2023, 6, "TMIN", &values);
        let rows = parse_daily::<Flags>(&line, None, None).unwrap();

        let day29 = &rows[28];
        assert_eq!(day29.flags, Flags::from_chars(' ', ' ', 'E'));
        let day30 = &rows[29];
        assert_eq!(day30.flags, Flags::from_chars('T', ' ', 'E'));
    }

    #[test]
    fn test_no_flags_matches_flagged_values() {
        let line = dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("215"));
        let with: Vec<Option<f64>> = parse_daily::<Flags>(&line, None, None)
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        let without: Vec<Option<f64>> = parse_daily::<NoFlags>(&line, None, None)
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(with, without);
    }

    #[test]
    fn test_short_line_right_pads() {
        // Only the first two slots are present; the rest of the month
        // reads as blank, which is missing.
        let line = dly_line("UKE00105915", 2016, 7, "TMAX", &[("215", "   "), ("221", "   ")]);
        let rows = parse_daily::<Flags>(&line, None, None).unwrap();
        assert_eq!(rows.len(), 31);
        assert_relative_eq!(rows[1].value.unwrap(), 22.1);
        assert!(rows[2].is_missing());
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let text = [
            dly_line("UKE00105915", 2016, 8, "TMAX", &full_month("200")),
            dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("250")),
        ]
        .join("\n");
        let rows = parse_daily::<NoFlags>(&text, None, None).unwrap();
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2016, 7, 1).unwrap());
        assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_multiple_stations_are_rejected() {
        let text = [
            dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("250")),
            dly_line("UKM00003772", 2016, 7, "TMAX", &full_month("250")),
        ]
        .join("\n");
        let err = parse_daily::<NoFlags>(&text, None, None).unwrap_err();
        assert!(matches!(err, ParseError::MultipleStations { .. }));
    }

    #[test]
    fn test_station_check_ignores_filters() {
        // The second line's element is filtered out, but its foreign
        // station ID still fails the file.
        let text = [
            dly_line("UKE00105915", 2016, 7, "TMAX", &full_month("250")),
            dly_line("UKM00003772", 2016, 7, "PRCP", &full_month("6")),
        ]
        .join("\n");
        let wanted = [Element::new("TMAX")];
        let err = parse_daily::<NoFlags>(&text, Some(&wanted), None).unwrap_err();
        assert!(matches!(err, ParseError::MultipleStations { .. }));
    }

    #[test]
    fn test_empty_file_is_fine() {
        let rows = parse_daily::<NoFlags>("", None, None).unwrap();
        assert!(rows.is_empty());
        let rows = parse_daily::<NoFlags>("\n  \n", None, None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_invalid_value_field_is_fatal() {
        let mut values = vec![("-9999", "   "); 31];
        values[4] = ("12x34", "   ");
        let line = dly_line("UKE00105915", 2016, 7, "TMAX", &values);
        let err = parse_daily::<NoFlags>(&line, None, None).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { slot: 4, .. }));
    }

    #[test]
    fn test_invalid_header_is_fatal() {
        let line = format!("UKE00105915XXXX07TMAX{}", "-9999   ".repeat(3));
        let err = parse_daily::<NoFlags>(&line, None, None).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidHeader { field: "year", .. }
        ));
    }

    #[test]
    fn test_short_header_is_fatal() {
        let err = parse_daily::<NoFlags>("UKE00105915 2016", None, None).unwrap_err();
        assert!(matches!(err, ParseError::ShortHeader(_)));
    }
}
