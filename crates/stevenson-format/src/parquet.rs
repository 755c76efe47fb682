//! Apache Parquet output format.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use stevenson_types::{FlagColumns, MonthlyData, MonthlyObservation, Observation, StationData};

use crate::formatter::{FormatError, Formatter};

/// Days from 0001-01-01 to the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parquet formatter.
///
/// Daily dates are written as `Date32` and monthly dates as `Int32`
/// keys in `YYYYMM` form. Flag columns are emitted only when the rows
/// carry flags.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Creates the Arrow schema for daily observations.
    fn daily_schema(with_flags: bool) -> Schema {
        let mut fields = vec![
            Field::new("station", DataType::Utf8, false),
            Field::new("element", DataType::Utf8, false),
            Field::new("value", DataType::Float64, true),
            Field::new("date", DataType::Date32, false),
            Field::new("lon", DataType::Float64, true),
            Field::new("lat", DataType::Float64, true),
            Field::new("elev", DataType::Float64, true),
            Field::new("name", DataType::Utf8, true),
        ];
        if with_flags {
            fields.push(Field::new("mflag", DataType::Utf8, false));
            fields.push(Field::new("qflag", DataType::Utf8, false));
            fields.push(Field::new("sflag", DataType::Utf8, false));
        }
        Schema::new(fields)
    }

    /// Creates the Arrow schema for monthly observations.
    fn monthly_schema(with_flags: bool) -> Schema {
        let mut fields = vec![
            Field::new("station", DataType::Utf8, false),
            Field::new("lat", DataType::Float64, true),
            Field::new("lon", DataType::Float64, true),
            Field::new("elev", DataType::Float64, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("country", DataType::Utf8, true),
            Field::new("date", DataType::Int32, false),
            Field::new("variable", DataType::Utf8, false),
            Field::new("value", DataType::Float64, true),
        ];
        if with_flags {
            fields.push(Field::new("dmflag", DataType::Utf8, false));
            fields.push(Field::new("qcflag", DataType::Utf8, false));
            fields.push(Field::new("dsflag", DataType::Utf8, false));
        }
        Schema::new(fields)
    }

    /// Converts daily rows to an Arrow `RecordBatch`, joining station
    /// metadata where it is known.
    fn daily_batch<F: FlagColumns>(
        data: &StationData<F>,
        rows: &[Observation<F>],
    ) -> Result<RecordBatch, FormatError> {
        let stations: Vec<&str> = rows.iter().map(|r| r.station.as_str()).collect();
        let elements: Vec<&str> = rows.iter().map(|r| r.element.as_str()).collect();
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();
        let dates: Vec<i32> = rows.iter().map(|r| date32(r.date)).collect();

        let meta: Vec<_> = rows.iter().map(|r| data.station(&r.station)).collect();
        let lons: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.longitude)).collect();
        let lats: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.latitude)).collect();
        let elevs: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.elevation)).collect();
        let names: Vec<Option<&str>> = meta.iter().map(|m| m.map(|s| s.name.as_str())).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(stations)),
            Arc::new(StringArray::from(elements)),
            Arc::new(Float64Array::from(values)),
            Arc::new(Date32Array::from(dates)),
            Arc::new(Float64Array::from(lons)),
            Arc::new(Float64Array::from(lats)),
            Arc::new(Float64Array::from(elevs)),
            Arc::new(StringArray::from(names)),
        ];
        if F::INCLUDED {
            let mut mflags = Vec::with_capacity(rows.len());
            let mut qflags = Vec::with_capacity(rows.len());
            let mut sflags = Vec::with_capacity(rows.len());
            for row in rows {
                let (m, q, s) = row.flags.as_chars().unwrap_or((' ', ' ', ' '));
                mflags.push(m.to_string());
                qflags.push(q.to_string());
                sflags.push(s.to_string());
            }
            columns.push(Arc::new(StringArray::from(mflags)));
            columns.push(Arc::new(StringArray::from(qflags)));
            columns.push(Arc::new(StringArray::from(sflags)));
        }

        Ok(RecordBatch::try_new(
            Arc::new(Self::daily_schema(F::INCLUDED)),
            columns,
        )?)
    }

    /// Converts monthly rows to an Arrow `RecordBatch`.
    fn monthly_batch<F: FlagColumns>(
        data: &MonthlyData<F>,
        rows: &[MonthlyObservation<F>],
    ) -> Result<RecordBatch, FormatError> {
        let stations: Vec<&str> = rows.iter().map(|r| r.station.as_str()).collect();
        let dates: Vec<i32> = rows.iter().map(|r| r.date.as_key()).collect();
        let variables: Vec<&str> = rows.iter().map(|r| r.element.as_str()).collect();
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value).collect();

        let meta: Vec<_> = rows.iter().map(|r| data.station(&r.station)).collect();
        let lats: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.latitude)).collect();
        let lons: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.longitude)).collect();
        let elevs: Vec<Option<f64>> = meta.iter().map(|m| m.map(|s| s.elevation)).collect();
        let names: Vec<Option<&str>> = meta.iter().map(|m| m.map(|s| s.name.as_str())).collect();
        let countries: Vec<Option<&str>> = meta
            .iter()
            .map(|m| m.and_then(|s| s.country.as_deref()))
            .collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(stations)),
            Arc::new(Float64Array::from(lats)),
            Arc::new(Float64Array::from(lons)),
            Arc::new(Float64Array::from(elevs)),
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(countries)),
            Arc::new(Int32Array::from(dates)),
            Arc::new(StringArray::from(variables)),
            Arc::new(Float64Array::from(values)),
        ];
        if F::INCLUDED {
            let mut dmflags = Vec::with_capacity(rows.len());
            let mut qcflags = Vec::with_capacity(rows.len());
            let mut dsflags = Vec::with_capacity(rows.len());
            for row in rows {
                let (m, q, s) = row.flags.as_chars().unwrap_or((' ', ' ', ' '));
                dmflags.push(m.to_string());
                qcflags.push(q.to_string());
                dsflags.push(s.to_string());
            }
            columns.push(Arc::new(StringArray::from(dmflags)));
            columns.push(Arc::new(StringArray::from(qcflags)));
            columns.push(Arc::new(StringArray::from(dsflags)));
        }

        Ok(RecordBatch::try_new(
            Arc::new(Self::monthly_schema(F::INCLUDED)),
            columns,
        )?)
    }
}

/// Days since the Unix epoch, the unit Arrow's `Date32` expects.
fn date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

impl Formatter for ParquetFormatter {
    fn write_daily<W: Write + Send, F: FlagColumns>(
        &self,
        data: &StationData<F>,
        writer: W,
    ) -> Result<(), FormatError> {
        let schema = Arc::new(Self::daily_schema(F::INCLUDED));
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))?;
        for chunk in data.rows().chunks(self.row_group_size) {
            let batch = Self::daily_batch(data, chunk)?;
            arrow_writer.write(&batch)?;
        }
        arrow_writer.close()?;
        Ok(())
    }

    fn write_monthly<W: Write + Send, F: FlagColumns>(
        &self,
        data: &MonthlyData<F>,
        writer: W,
    ) -> Result<(), FormatError> {
        let schema = Arc::new(Self::monthly_schema(F::INCLUDED));
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))?;
        for chunk in data.rows().chunks(self.row_group_size) {
            let batch = Self::monthly_batch(data, chunk)?;
            arrow_writer.write(&batch)?;
        }
        arrow_writer.close()?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "parquet"
    }
}
