//! Concurrent per-station retrieval.

use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use stevenson_types::{DateRange, Element, FlagColumns, Observation, Station, StationData};

use crate::client::DownloadClient;
use crate::daily::parse_daily;
use crate::url;

/// Configuration for a daily fetch run.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Element codes to keep; `None` keeps all.
    pub elements: Option<Vec<Element>>,
    /// Inclusive date range to keep; `None` keeps all.
    pub date_range: Option<DateRange>,
    /// Concurrent workers; `None` uses [`default_workers`].
    pub workers: Option<usize>,
}

impl FetchConfig {
    /// Returns the effective worker count.
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

/// Default worker count: three quarters of the available CPUs, and at
/// least one.
#[must_use]
pub fn default_workers() -> usize {
    (num_cpus::get() * 3 / 4).max(1)
}

/// How one station's fetch concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The station's file was requested and parsed.
    Fetched,
    /// The station's inventory years do not overlap the requested
    /// range; no request was made.
    Skipped,
    /// The download or parse failed after retries; the station
    /// contributes no rows.
    Failed,
}

/// One station's contribution to a fetch run.
#[derive(Debug, Clone)]
pub struct StationBatch<F: FlagColumns> {
    /// Station metadata the batch belongs to.
    pub station: Station,
    /// Parsed observation rows; empty when skipped or failed.
    pub rows: Vec<Observation<F>>,
    /// How the fetch concluded.
    pub outcome: FetchOutcome,
}

impl<F: FlagColumns> StationBatch<F> {
    fn fetched(station: Station, rows: Vec<Observation<F>>) -> Self {
        Self {
            station,
            rows,
            outcome: FetchOutcome::Fetched,
        }
    }

    fn skipped(station: Station) -> Self {
        Self {
            station,
            rows: Vec::new(),
            outcome: FetchOutcome::Skipped,
        }
    }

    fn failed(station: Station) -> Self {
        Self {
            station,
            rows: Vec::new(),
            outcome: FetchOutcome::Failed,
        }
    }

    /// Returns the number of rows in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the batch carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-station accounting for one fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Stations requested.
    pub requested: usize,
    /// Stations fetched over the network.
    pub fetched: usize,
    /// Stations skipped by the inventory-overlap check.
    pub skipped: usize,
    /// Stations that failed after retries.
    pub failed: usize,
    /// Stations contributing zero rows for any reason.
    pub empty: usize,
}

impl FetchSummary {
    /// Creates a summary for a run over `requested` stations.
    #[must_use]
    pub const fn new(requested: usize) -> Self {
        Self {
            requested,
            fetched: 0,
            skipped: 0,
            failed: 0,
            empty: 0,
        }
    }

    /// Records one station's outcome and row count.
    pub const fn record(&mut self, outcome: FetchOutcome, rows: usize) {
        match outcome {
            FetchOutcome::Fetched => self.fetched += 1,
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Failed => self.failed += 1,
        }
        if rows == 0 {
            self.empty += 1;
        }
    }
}

impl std::fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} stations: {} fetched, {} skipped, {} failed, {} empty",
            self.requested, self.fetched, self.skipped, self.failed, self.empty
        )
    }
}

/// Creates a stream of per-station daily batches.
///
/// Stations run concurrently over the configured worker pool and
/// complete in whatever order the network answers. A station that
/// fails after all retries degrades to an empty batch with a warning;
/// the stream itself never errors.
pub fn daily_stream<'a, F: FlagColumns>(
    client: &'a DownloadClient,
    stations: &'a [Station],
    config: &'a FetchConfig,
) -> impl Stream<Item = StationBatch<F>> + 'a {
    let workers = config.effective_workers();
    tracing::debug!(stations = stations.len(), workers, "starting daily fetch");

    futures::stream::iter(stations.iter().cloned())
        .map(move |station| fetch_station::<F>(client, station, config))
        .buffer_unordered(workers)
}

/// Downloads daily data for the given stations into one table.
///
/// The table ends up sorted by station, date, and element. Failed and
/// skipped stations contribute no rows; the run always completes, with
/// per-station accounting in the summary.
pub async fn fetch_daily<F: FlagColumns>(
    client: &DownloadClient,
    stations: &[Station],
    config: &FetchConfig,
) -> (StationData<F>, FetchSummary) {
    let mut data = StationData::new();
    let mut summary = FetchSummary::new(stations.len());

    let mut stream = daily_stream::<F>(client, stations, config);
    while let Some(batch) = stream.next().await {
        summary.record(batch.outcome, batch.len());
        data.add_station(batch.station, batch.rows);
    }

    data.sort_rows();
    (data, summary)
}

async fn fetch_station<F: FlagColumns>(
    client: &DownloadClient,
    station: Station,
    config: &FetchConfig,
) -> StationBatch<F> {
    if let Some(range) = &config.date_range {
        if !station.records_overlap(range) {
            tracing::debug!(station = %station.id, "inventory years outside requested range, skipping");
            return StationBatch::skipped(station);
        }
    }

    let request_url = url::daily_station_url(&station.id);
    let body = match client.download(&request_url).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            tracing::warn!(station = %station.id, "no daily file published for station");
            return StationBatch::fetched(station, Vec::new());
        }
        Err(e) => {
            tracing::warn!(station = %station.id, error = %e, "download failed after retries");
            return StationBatch::failed(station);
        }
    };

    // Decode off the async workers; a long-lived station's file runs to
    // tens of megabytes.
    let elements = config.elements.clone();
    let date_range = config.date_range;
    let parsed = tokio::task::spawn_blocking(move || {
        let text = String::from_utf8_lossy(&body);
        parse_daily::<F>(&text, elements.as_deref(), date_range.as_ref())
    })
    .await;

    match parsed {
        Ok(Ok(rows)) => {
            tracing::debug!(station = %station.id, rows = rows.len(), "parsed daily file");
            StationBatch::fetched(station, rows)
        }
        Ok(Err(e)) => {
            tracing::warn!(station = %station.id, error = %e, "failed to parse daily file");
            StationBatch::failed(station)
        }
        Err(e) => {
            tracing::warn!(station = %station.id, error = %e, "decode task failed");
            StationBatch::failed(station)
        }
    }
}
