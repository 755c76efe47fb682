//! Delimited text output.

use std::borrow::Cow;
use std::io::Write;

use stevenson_types::{FlagColumns, MonthlyData, StationData};

use crate::formatter::{FormatError, Formatter};

/// Writes tables as delimited text.
///
/// Daily columns are `station, element, value, date, lon, lat, elev,
/// name` and monthly columns `station, lat, lon, elev, name, country,
/// date, variable, value`, each followed by the three flag columns
/// when the rows carry them. Missing values and missing metadata write
/// as empty fields.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    delimiter: char,
    include_header: bool,
}

impl CsvFormatter {
    /// Creates a comma-separated formatter with a header row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Creates a tab-separated formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to write the header row.
    #[must_use]
    pub const fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvFormatter {
    fn write_daily<W: Write + Send, F: FlagColumns>(
        &self,
        data: &StationData<F>,
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;
        if self.include_header {
            write!(writer, "station{d}element{d}value{d}date{d}lon{d}lat{d}elev{d}name")?;
            if F::INCLUDED {
                write!(writer, "{d}mflag{d}qflag{d}sflag")?;
            }
            writeln!(writer)?;
        }

        for row in data.rows() {
            write!(writer, "{}{d}{}{d}", row.station, row.element)?;
            if let Some(value) = row.value {
                write!(writer, "{value}")?;
            }
            write!(writer, "{d}{}", row.date.format("%Y-%m-%d"))?;

            match data.station(&row.station) {
                Some(station) => write!(
                    writer,
                    "{d}{}{d}{}{d}{}{d}{}",
                    station.longitude,
                    station.latitude,
                    station.elevation,
                    quoted(&station.name, d)
                )?,
                None => write!(writer, "{d}{d}{d}{d}")?,
            }

            if let Some((m, q, s)) = row.flags.as_chars() {
                write!(writer, "{d}{m}{d}{q}{d}{s}")?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_monthly<W: Write + Send, F: FlagColumns>(
        &self,
        data: &MonthlyData<F>,
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;
        if self.include_header {
            write!(
                writer,
                "station{d}lat{d}lon{d}elev{d}name{d}country{d}date{d}variable{d}value"
            )?;
            if F::INCLUDED {
                write!(writer, "{d}dmflag{d}qcflag{d}dsflag")?;
            }
            writeln!(writer)?;
        }

        for row in data.rows() {
            write!(writer, "{}", row.station)?;
            match data.station(&row.station) {
                Some(station) => {
                    write!(
                        writer,
                        "{d}{}{d}{}{d}{}{d}{}{d}",
                        station.latitude,
                        station.longitude,
                        station.elevation,
                        quoted(&station.name, d)
                    )?;
                    if let Some(country) = &station.country {
                        write!(writer, "{}", quoted(country, d))?;
                    }
                }
                None => write!(writer, "{d}{d}{d}{d}{d}")?,
            }

            write!(writer, "{d}{}{d}{}{d}", row.date, row.element)?;
            if let Some(value) = row.value {
                write!(writer, "{value}")?;
            }

            if let Some((m, q, s)) = row.flags.as_chars() {
                write!(writer, "{d}{m}{d}{q}{d}{s}")?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}

/// Quotes a text field when it contains the delimiter, a quote, or a
/// line break.
fn quoted(value: &str, delimiter: char) -> Cow<'_, str> {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
