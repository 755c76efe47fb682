//! Monthly GHCN-M v4 `.dat` decoding.
//!
//! The monthly archive is one multi-station file with a year per line
//! and twelve month slots of 8 bytes each:
//!
//! ```text
//! [0:11]  station    [11:15] year    [15:19] element
//! [19+8m : 24+8m]    value for month m, then one byte each of the
//!                    measurement, quality-control, and source flags
//! ```
//!
//! Temperature values are hundredths of a degree; blank, `-`, and
//! `-9999` sub-fields are missing. Unlike the daily archive, mixing
//! stations in one file is the normal case here.

use std::collections::BTreeSet;
use std::path::Path;

use stevenson_types::{
    Element, FlagColumns, MonthlyData, MonthlyFileError, MonthlyFilename, MonthlyObservation,
    StationId, StevensonError, YearMonth, fixed,
};

use stevenson_stations::StationIndex;

use crate::daily::parse_header;
use crate::parse::{MISSING_SENTINEL, ParseError};

const MONTHS_PER_LINE: usize = 12;
const HEADER_WIDTH: usize = 19;
const SLOT_BASE: usize = 19;
const SLOT_STRIDE: usize = 8;
const VALUE_WIDTH: usize = 5;

/// Divisor for the hundredths-of-a-degree monthly temperature codes.
const TEMPERATURE_DIVISOR: f64 = 100.0;

/// Decodes GHCN-M v4 data lines into monthly observation rows.
///
/// When `stations` is given, only lines for those stations are kept.
/// The result is sorted by station, date, and element.
///
/// # Errors
///
/// Returns an error on malformed headers or non-numeric value fields.
pub fn parse_monthly<F: FlagColumns>(
    text: &str,
    stations: Option<&BTreeSet<StationId>>,
) -> Result<Vec<MonthlyObservation<F>>, ParseError> {
    let mut rows = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.len() < HEADER_WIDTH {
            return Err(ParseError::ShortHeader(line.to_string()));
        }

        let station = StationId::new(fixed::field(line, 0, 11));
        if let Some(wanted) = stations {
            if !wanted.contains(&station) {
                continue;
            }
        }

        let year: i32 = parse_header(fixed::field(line, 11, 15), "year")?;
        let element = Element::new(fixed::field(line, 15, 19));
        let divisor = if element.is_monthly_temperature() {
            TEMPERATURE_DIVISOR
        } else {
            1.0
        };

        for slot in 0..MONTHS_PER_LINE {
            let Some(date) = YearMonth::new(year, slot as u32 + 1) else {
                continue;
            };

            let start = SLOT_BASE + SLOT_STRIDE * slot;
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
                            slot,
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

            rows.push(MonthlyObservation {
                station: station.clone(),
                date,
                element: element.clone(),
                value,
                flags,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.station
            .cmp(&b.station)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.element.cmp(&b.element))
    });
    Ok(rows)
}

/// Reads a GHCN-M v4 `.dat` file from disk into a monthly table.
///
/// The filename version token is checked before the file is opened, so
/// an archive from another format version refuses to parse at all.
/// When an index is given, metadata for the contributing stations is
/// attached to the table; rows for stations the index does not know
/// are kept without metadata.
///
/// # Errors
///
/// Returns an error if the filename fails the version checks, the file
/// cannot be read, or the rows fail to parse.
pub fn read_monthly<F: FlagColumns>(
    path: &Path,
    index: Option<&StationIndex>,
    stations: Option<&BTreeSet<StationId>>,
) -> Result<MonthlyData<F>, StevensonError> {
    let fname = MonthlyFilename::parse(path)?;
    if !fname.is_data() {
        return Err(MonthlyFileError::UnrecognizedName(fname.name().to_string()).into());
    }
    tracing::debug!(dataset = fname.dataset(), "reading monthly data file");

    let text = std::fs::read_to_string(path)?;
    let rows =
        parse_monthly::<F>(&text, stations).map_err(|e| StevensonError::Parse(e.to_string()))?;

    let mut data = MonthlyData::new();
    data.append(rows);

    if let Some(index) = index {
        let ids: BTreeSet<StationId> = data.rows().iter().map(|row| row.station.clone()).collect();
        for id in &ids {
            if let Some(station) = index.get(id.as_str()) {
                data.insert_station(station.clone());
            }
        }
    }

    Ok(data)
}
