//! On-disk result caching keyed by fetch arguments.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use stevenson_types::{Element, FlagColumns, Result, Station, StationData};

use crate::client::DownloadClient;
use crate::stream::{FetchConfig, FetchSummary, fetch_daily};

/// Bumped when the stored row layout changes, so older entries miss
/// instead of deserializing wrongly.
const FORMAT_VERSION: u32 = 1;

/// A cache key derived from the canonical serialization of the fetch
/// arguments.
///
/// Station order does not affect the key; everything else that changes
/// the result does, including the flag schema and the cache format
/// version. Keys are not stable across compiler releases; stale
/// entries just miss and get recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a daily fetch call.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments fail to serialize.
    pub fn daily<F: FlagColumns>(stations: &[Station], config: &FetchConfig) -> Result<Self> {
        #[derive(Serialize)]
        struct KeyParts<'a> {
            version: u32,
            stations: Vec<&'a str>,
            elements: Option<Vec<&'a str>>,
            start: Option<chrono::NaiveDate>,
            end: Option<chrono::NaiveDate>,
            flags: bool,
        }

        let mut ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();

        let canonical = serde_json::to_string(&KeyParts {
            version: FORMAT_VERSION,
            stations: ids,
            elements: config
                .elements
                .as_ref()
                .map(|e| e.iter().map(Element::as_str).collect()),
            start: config.date_range.map(|r| r.start),
            end: config.date_range.map(|r| r.end),
            flags: F::INCLUDED,
        })?;

        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Ok(Self(format!("{:016x}", hasher.finish())))
    }

    /// Returns the key as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A store for results keyed by fetch arguments.
///
/// Implementations must tolerate concurrent writers of the same key:
/// redundant recomputation is fine, a torn entry is not.
pub trait ResultCache {
    /// Loads the value stored under `key`, if any.
    ///
    /// An unreadable entry reads as absent, so corruption degrades to
    /// a recompute.
    fn load<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T>;

    /// Stores a value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn store<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()>;
}

/// Disk-backed cache storing one JSON file per key.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at the given directory, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Creates a cache at the platform default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the platform default cache directory.
    ///
    /// Linux uses `~/.local/share/stevenson/cache`, macOS
    /// `~/Library/Application Support/stevenson/cache`, with a
    /// `./.stevenson/cache` fallback when no home is known.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "stevenson").map_or_else(
            || PathBuf::from(".stevenson"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
        .join("cache")
    }

    /// Returns the cache root directory.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl ResultCache for DiskCache {
    fn load<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let path = self.entry_path(key);
        // Write-then-rename keeps readers from ever seeing a torn entry.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(value)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct CachedFetch<F: FlagColumns> {
    summary: FetchSummary,
    data: StationData<F>,
}

/// Fetches daily data through a cache: a repeat call with the same
/// arguments reuses the stored table instead of hitting the network.
///
/// # Errors
///
/// Returns an error if the key cannot be derived or a fresh result
/// cannot be stored.
pub async fn fetch_daily_cached<F: FlagColumns, C: ResultCache>(
    client: &DownloadClient,
    stations: &[Station],
    config: &FetchConfig,
    cache: &C,
) -> Result<(StationData<F>, FetchSummary)> {
    let key = CacheKey::daily::<F>(stations, config)?;
    if let Some(entry) = cache.load::<CachedFetch<F>>(&key) {
        tracing::debug!(%key, rows = entry.data.len(), "cache hit");
        return Ok((entry.data, entry.summary));
    }

    tracing::debug!(%key, "cache miss");
    let (data, summary) = fetch_daily::<F>(client, stations, config).await;
    let entry = CachedFetch { summary, data };
    cache.store(&key, &entry)?;
    Ok((entry.data, entry.summary))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use stevenson_types::{DateRange, Flags, NoFlags, Observation, StationId};

    use super::*;

    fn station(id: &str) -> Station {
        Station {
            id: StationId::new(id),
            latitude: 51.5608,
            longitude: -0.1789,
            elevation: 137.0,
            name: "HAMPSTEAD".to_string(),
            first_year: Some(1959),
            last_year: Some(2023),
            country: None,
        }
    }

    fn config(elements: &[&str]) -> FetchConfig {
        FetchConfig {
            elements: Some(elements.iter().map(Element::new).collect()),
            date_range: Some(DateRange::from_strs("2016-07-01", "2016-07-31").unwrap()),
            workers: None,
        }
    }

    #[test]
    fn test_key_ignores_station_order() {
        let forward = [station("UKE00105915"), station("UKM00003772")];
        let backward = [station("UKM00003772"), station("UKE00105915")];
        let config = config(&["TMAX"]);

        let a = CacheKey::daily::<Flags>(&forward, &config).unwrap();
        let b = CacheKey::daily::<Flags>(&backward, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_changes_with_arguments() {
        let stations = [station("UKE00105915")];
        let base = CacheKey::daily::<Flags>(&stations, &config(&["TMAX"])).unwrap();

        let other_element = CacheKey::daily::<Flags>(&stations, &config(&["TMIN"])).unwrap();
        assert_ne!(base, other_element);

        let no_flags = CacheKey::daily::<NoFlags>(&stations, &config(&["TMAX"])).unwrap();
        assert_ne!(base, no_flags);

        let other_station = CacheKey::daily::<Flags>(&[station("UKM00003772")], &config(&["TMAX"]))
            .unwrap();
        assert_ne!(base, other_station);
    }

    #[test]
    fn test_key_ignores_worker_count() {
        let stations = [station("UKE00105915")];
        let mut few = config(&["TMAX"]);
        few.workers = Some(1);
        let mut many = config(&["TMAX"]);
        many.workers = Some(16);

        let a = CacheKey::daily::<Flags>(&stations, &few).unwrap();
        let b = CacheKey::daily::<Flags>(&stations, &many).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disk_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache")).unwrap();
        let key = CacheKey::daily::<Flags>(&[station("UKE00105915")], &config(&["TMAX"])).unwrap();

        assert!(cache.load::<StationData<Flags>>(&key).is_none());

        let mut data: StationData<Flags> = StationData::new();
        data.add_station(
            station("UKE00105915"),
            vec![Observation {
                station: StationId::new("UKE00105915"),
                date: NaiveDate::from_ymd_opt(2016, 7, 4).unwrap(),
                element: Element::new("TMIN"),
                value: Some(10.4),
                flags: Flags::empty(),
            }],
        );
        cache.store(&key, &data).unwrap();

        let loaded = cache.load::<StationData<Flags>>(&key).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_corrupt_entry_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().to_path_buf()).unwrap();
        let key = CacheKey::daily::<Flags>(&[station("UKE00105915")], &config(&["TMAX"])).unwrap();

        std::fs::write(dir.path().join(format!("{key}.json")), "not json").unwrap();
        assert!(cache.load::<StationData<Flags>>(&key).is_none());
    }

    #[test]
    fn test_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().to_path_buf()).unwrap();
        let key = CacheKey::daily::<NoFlags>(&[station("UKE00105915")], &config(&["TMAX"])).unwrap();

        let data: StationData<NoFlags> = StationData::new();
        cache.store(&key, &data).unwrap();

        let entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec![format!("{key}.json")]);
    }
}
