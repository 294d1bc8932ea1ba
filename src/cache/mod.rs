//! In-process cache for LOD responses and derived values
//!
//! Entries are keyed by `(namespace, key)`. The namespace isolates unrelated
//! consumers (typically a deployment or build tag); keys are plain strings
//! built by callers, the cache never parses them:
//! - `<id>` / `<id>:<lang>` - raw place query results
//! - `person.<id>[:<langs>]` - raw person query results
//! - `pos.<id>` - raw position query results
//! - `geo.<id>` - derived points
//!
//! A key can also hold the negative marker ([`Cached::NotFound`]), meaning
//! "looked up, nothing there". It short-circuits the network just like a
//! stored value. Positive entries never expire; negative ones expire after
//! the configured TTL.
//!
//! # Example
//!
//! ```rust
//! use lodgeo::cache::{Cached, CacheConfig, LodCache};
//! use lodgeo::geo::GeoPoint;
//!
//! let cache = LodCache::new(&CacheConfig::default());
//! let ns = cache.namespace().to_string();
//!
//! cache.add(&ns, "geo.Q220", &GeoPoint::new(41.9, 12.5)).unwrap();
//! assert!(matches!(cache.get::<GeoPoint>(&ns, "geo.Q220"), Some(Cached::Found(_))));
//! assert!(cache.get::<GeoPoint>(&ns, "geo.Q1").is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;

use crate::metrics::{default_observer, LodEvent, LodObserver};

/// Snapshot format version
const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised by cache writes and snapshots
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be serialized
    #[error("Failed to serialize cache value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot file could not be read or written
    #[error("Cache snapshot I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not a valid snapshot
    #[error("Invalid cache snapshot {path:?}: {reason}")]
    InvalidSnapshot { path: PathBuf, reason: String },
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace used by the services for all their keys
    pub namespace: String,

    /// Lifetime of negative entries in seconds (None: never expire)
    pub negative_ttl_secs: Option<u64>,

    /// Snapshot file loaded at startup and written at exit
    pub persist_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: format!("lodgeo-{}", env!("CARGO_PKG_VERSION")),
            negative_ttl_secs: Some(86400), // 24 hours
            persist_path: None,
        }
    }
}

impl CacheConfig {
    /// Negative TTL as a Duration
    pub fn negative_ttl(&self) -> Option<Duration> {
        self.negative_ttl_secs.map(Duration::from_secs)
    }
}

/// Result of a cache lookup that found the key
#[derive(Debug, Clone, PartialEq)]
pub enum Cached<T> {
    /// A stored value
    Found(T),

    /// The key was looked up before and nothing was found
    NotFound,
}

impl<T> Cached<T> {
    /// Convert into an `Option`, mapping the negative marker to `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }
}

/// One stored entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Serialized payload, `None` for the negative marker
    value: Option<serde_json::Value>,

    /// Timestamp when cached
    cached_at: DateTime<Utc>,
}

/// On-disk form of the whole store
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    namespaces: HashMap<String, HashMap<String, CacheEntry>>,
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups returning a stored value
    pub hits: u64,
    /// Lookups returning the negative marker
    pub negative_hits: u64,
    /// Lookups finding nothing
    pub misses: u64,
    /// Writes of either kind
    pub stores: u64,
}

impl CacheStats {
    /// Calculate hit rate, negative hits included
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits + self.negative_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct StatCounters {
    hits: AtomicU64,
    negative_hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

/// Namespaced key-value cache
#[derive(Debug)]
pub struct LodCache {
    entries: RwLock<HashMap<String, HashMap<String, CacheEntry>>>,
    namespace: String,
    negative_ttl: Option<Duration>,
    observer: Arc<dyn LodObserver>,
    stats: StatCounters,
}

impl LodCache {
    /// Create an empty cache
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_observer(config, default_observer())
    }

    /// Create an empty cache reporting to `observer`
    pub fn with_observer(config: &CacheConfig, observer: Arc<dyn LodObserver>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            namespace: config.namespace.clone(),
            negative_ttl: config.negative_ttl(),
            observer,
            stats: StatCounters::default(),
        }
    }

    /// Namespace configured for this deployment
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Look up `key` in `namespace`
    ///
    /// Returns `None` when the key was never written (or its negative marker
    /// expired), `Some(Cached::NotFound)` for the negative marker and
    /// `Some(Cached::Found(value))` otherwise. A payload that no longer
    /// deserializes into `T` reads as absent.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<Cached<T>> {
        let entry = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries.get(namespace).and_then(|ns| ns.get(key)).cloned()
        };

        let cached = match entry {
            None => None,
            Some(CacheEntry { value: None, cached_at }) => {
                if self.is_expired(cached_at) {
                    None
                } else {
                    Some(Cached::NotFound)
                }
            }
            Some(CacheEntry {
                value: Some(value), ..
            }) => match serde_json::from_value::<T>(value) {
                Ok(v) => Some(Cached::Found(v)),
                Err(e) => {
                    tracing::warn!(namespace = %namespace, key = %key, error = %e, "Cached value has unexpected shape");
                    None
                }
            },
        };

        let event = match &cached {
            Some(Cached::Found(_)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                LodEvent::CacheHit { namespace, key }
            }
            Some(Cached::NotFound) => {
                self.stats.negative_hits.fetch_add(1, Ordering::Relaxed);
                LodEvent::CacheNegativeHit { namespace, key }
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                LodEvent::CacheMiss { namespace, key }
            }
        };
        self.observer.record(&event);

        cached
    }

    /// Store `value` under `key`, overwriting any previous entry
    pub fn add<T: Serialize>(&self, namespace: &str, key: &str, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.insert(namespace, key, Some(value));
        Ok(())
    }

    /// Store the negative marker under `key`
    pub fn add_not_found(&self, namespace: &str, key: &str) {
        self.insert(namespace, key, None);
    }

    fn insert(&self, namespace: &str, key: &str, value: Option<serde_json::Value>) {
        let negative = value.is_none();
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.entry(namespace.to_string()).or_default().insert(
                key.to_string(),
                CacheEntry {
                    value,
                    cached_at: Utc::now(),
                },
            );
        }

        self.stats.stores.fetch_add(1, Ordering::Relaxed);
        self.observer.record(&LodEvent::CacheStore {
            namespace,
            key,
            negative,
        });
    }

    fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
        let Some(ttl) = self.negative_ttl else {
            return false;
        };
        let age = Utc::now().signed_duration_since(cached_at);
        // Clock skew yields a negative age, which never expires
        age.to_std().map(|age| age >= ttl).unwrap_or(false)
    }

    /// Number of entries across all namespaces
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(HashMap::len).sum()
    }

    /// True when no entry is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Snapshot of the lookup counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            negative_hits: self.stats.negative_hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            stores: self.stats.stores.load(Ordering::Relaxed),
        }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Write every entry to `path` as JSON
    pub fn save_to(&self, path: &Path) -> Result<(), CacheError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            namespaces: self
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        };

        let json = serde_json::to_vec(&snapshot).map_err(|e| CacheError::InvalidSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, json).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), entries = self.len(), "Cache snapshot saved");
        Ok(())
    }

    /// Merge the entries of the snapshot at `path` into this cache
    ///
    /// A missing file is not an error. Returns the number of entries loaded.
    pub fn load_from(&self, path: &Path) -> Result<usize, CacheError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::InvalidSnapshot {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CacheError::InvalidSnapshot {
                path: path.to_path_buf(),
                reason: format!("unsupported version {}", snapshot.version),
            });
        }

        let mut count = 0;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (namespace, loaded) in snapshot.namespaces {
            count += loaded.len();
            entries.entry(namespace).or_default().extend(loaded);
        }
        drop(entries);

        tracing::info!(path = %path.display(), entries = count, "Cache snapshot loaded");
        Ok(count)
    }
}
