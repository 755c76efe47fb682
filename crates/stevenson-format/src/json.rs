//! JSON output.

use std::io::Write;

use serde::Serialize;

use stevenson_types::{FlagColumns, MonthlyData, MonthlyObservation, Observation, StationData};

use crate::formatter::{FormatError, Formatter};

/// How records are laid out in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// One JSON array holding all records.
    #[default]
    Array,
    /// One JSON record per line.
    Ndjson,
}

/// Writes tables as JSON records.
///
/// Records carry the same fields as the CSV columns. Missing values
/// and missing metadata serialize as `null`; flag fields appear only
/// when the rows carry them.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    style: JsonStyle,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates an array-style formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates a newline-delimited formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Enables pretty-printing; ignored for newline-delimited output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn write_records<W: Write + Send, T: Serialize>(
        &self,
        records: &[T],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, records)?;
                } else {
                    serde_json::to_writer(&mut writer, records)?;
                }
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for record in records {
                    serde_json::to_writer(&mut writer, record)?;
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl Formatter for JsonFormatter {
    fn write_daily<W: Write + Send, F: FlagColumns>(
        &self,
        data: &StationData<F>,
        writer: W,
    ) -> Result<(), FormatError> {
        let records: Vec<DailyRecord<'_>> = data
            .rows()
            .iter()
            .map(|row| DailyRecord::new(data, row))
            .collect();
        self.write_records(&records, writer)
    }

    fn write_monthly<W: Write + Send, F: FlagColumns>(
        &self,
        data: &MonthlyData<F>,
        writer: W,
    ) -> Result<(), FormatError> {
        let records: Vec<MonthlyRecord<'_>> = data
            .rows()
            .iter()
            .map(|row| MonthlyRecord::new(data, row))
            .collect();
        self.write_records(&records, writer)
    }

    fn extension(&self) -> &'static str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[derive(Serialize)]
struct DailyRecord<'a> {
    station: &'a str,
    element: &'a str,
    value: Option<f64>,
    date: String,
    lon: Option<f64>,
    lat: Option<f64>,
    elev: Option<f64>,
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mflag: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qflag: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sflag: Option<char>,
}

impl<'a> DailyRecord<'a> {
    fn new<F: FlagColumns>(data: &'a StationData<F>, row: &'a Observation<F>) -> Self {
        let station = data.station(&row.station);
        let flags = row.flags.as_chars();
        Self {
            station: row.station.as_str(),
            element: row.element.as_str(),
            value: row.value,
            date: row.date.format("%Y-%m-%d").to_string(),
            lon: station.map(|s| s.longitude),
            lat: station.map(|s| s.latitude),
            elev: station.map(|s| s.elevation),
            name: station.map(|s| s.name.as_str()),
            mflag: flags.map(|(m, _, _)| m),
            qflag: flags.map(|(_, q, _)| q),
            sflag: flags.map(|(_, _, s)| s),
        }
    }
}

#[derive(Serialize)]
struct MonthlyRecord<'a> {
    station: &'a str,
    lat: Option<f64>,
    lon: Option<f64>,
    elev: Option<f64>,
    name: Option<&'a str>,
    country: Option<&'a str>,
    date: i32,
    variable: &'a str,
    value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dmflag: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    qcflag: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dsflag: Option<char>,
}

impl<'a> MonthlyRecord<'a> {
    fn new<F: FlagColumns>(data: &'a MonthlyData<F>, row: &'a MonthlyObservation<F>) -> Self {
        let station = data.station(&row.station);
        let flags = row.flags.as_chars();
        Self {
            station: row.station.as_str(),
            lat: station.map(|s| s.latitude),
            lon: station.map(|s| s.longitude),
            elev: station.map(|s| s.elevation),
            name: station.map(|s| s.name.as_str()),
            country: station.and_then(|s| s.country.as_deref()),
            date: row.date.as_key(),
            variable: row.element.as_str(),
            value: row.value,
            dmflag: flags.map(|(m, _, _)| m),
            qcflag: flags.map(|(_, q, _)| q),
            dsflag: flags.map(|(_, _, s)| s),
        }
    }
}
