//! Observability hook and Prometheus metrics for lodgeo
//!
//! Components never log cache traffic or malformed data directly. They
//! report [`LodEvent`]s to an injected [`LodObserver`]:
//! - [`TracingObserver`] - structured `tracing` events (the default)
//! - [`PrometheusObserver`] - Prometheus counters and histograms
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup before using
//! [`PrometheusObserver`]. If initialization fails, metric operations become
//! no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::geo::CoordinateTier;

// ============================================================================
// Events and observers
// ============================================================================

/// Something worth counting or logging
#[derive(Debug, Clone)]
pub enum LodEvent<'a> {
    /// Cache returned a stored value
    CacheHit { namespace: &'a str, key: &'a str },

    /// Cache returned the "looked up, nothing found" marker
    CacheNegativeHit { namespace: &'a str, key: &'a str },

    /// Key never looked up (or its negative marker expired)
    CacheMiss { namespace: &'a str, key: &'a str },

    /// Value written to the cache
    CacheStore {
        namespace: &'a str,
        key: &'a str,
        negative: bool,
    },

    /// A coordinate tier held unparseable data
    MalformedCoordinate {
        tier: CoordinateTier,
        value: &'a str,
    },

    /// One SPARQL round-trip finished
    RequestCompleted {
        endpoint: &'a str,
        status: Option<u16>,
        elapsed: Duration,
    },

    /// A lookup for one identifier failed and was contained
    LookupFailed {
        source: &'a str,
        id: &'a str,
        error: &'a str,
    },

    /// An entity got a point
    EntityResolved { id: &'a str, source: &'a str },

    /// No identifier of an entity produced a point
    EntityUnresolved { ids: &'a [String] },
}

/// Receiver of [`LodEvent`]s
pub trait LodObserver: Send + Sync + fmt::Debug {
    fn record(&self, event: &LodEvent<'_>);
}

/// Observer emitting `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LodObserver for TracingObserver {
    fn record(&self, event: &LodEvent<'_>) {
        match event {
            LodEvent::CacheHit { namespace, key } => {
                tracing::debug!(namespace = %namespace, key = %key, "Cache hit");
            }
            LodEvent::CacheNegativeHit { namespace, key } => {
                tracing::debug!(namespace = %namespace, key = %key, "Cache hit (not found)");
            }
            LodEvent::CacheMiss { namespace, key } => {
                tracing::debug!(namespace = %namespace, key = %key, "Cache miss");
            }
            LodEvent::CacheStore {
                namespace,
                key,
                negative,
            } => {
                tracing::trace!(namespace = %namespace, key = %key, negative = %negative, "Cache store");
            }
            LodEvent::MalformedCoordinate { tier, value } => {
                tracing::debug!(tier = tier.as_str(), value = %value, "Malformed coordinate data");
            }
            LodEvent::RequestCompleted {
                endpoint,
                status,
                elapsed,
            } => {
                tracing::debug!(
                    endpoint = %endpoint,
                    status = ?status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "SPARQL request completed"
                );
            }
            LodEvent::LookupFailed { source, id, error } => {
                tracing::warn!(source = %source, id = %id, error = %error, "Lookup failed");
            }
            LodEvent::EntityResolved { id, source } => {
                tracing::info!(id = %id, source = %source, "Entity resolved");
            }
            LodEvent::EntityUnresolved { ids } => {
                tracing::info!(ids = ?ids, "Entity unresolved");
            }
        }
    }
}

/// Observer feeding Prometheus metrics
///
/// Events are also forwarded to [`TracingObserver`] so logs are not lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusObserver;

impl LodObserver for PrometheusObserver {
    fn record(&self, event: &LodEvent<'_>) {
        TracingObserver.record(event);

        let Some(m) = LOD_METRICS.get() else {
            return;
        };

        match event {
            LodEvent::CacheHit { .. } => {
                m.cache_lookups.with_label_values(&["hit"]).inc();
            }
            LodEvent::CacheNegativeHit { .. } => {
                m.cache_lookups.with_label_values(&["negative_hit"]).inc();
            }
            LodEvent::CacheMiss { .. } => {
                m.cache_lookups.with_label_values(&["miss"]).inc();
            }
            LodEvent::CacheStore { negative, .. } => {
                let kind = if *negative { "negative" } else { "positive" };
                m.cache_stores.with_label_values(&[kind]).inc();
            }
            LodEvent::MalformedCoordinate { tier, .. } => {
                m.malformed_coordinates
                    .with_label_values(&[tier.as_str()])
                    .inc();
            }
            LodEvent::RequestCompleted {
                endpoint,
                status,
                elapsed,
            } => {
                let status_str = status.map_or_else(|| "error".to_string(), |s| s.to_string());
                m.requests
                    .with_label_values(&[*endpoint, status_str.as_str()])
                    .inc();
                m.request_duration
                    .with_label_values(&[*endpoint])
                    .observe(elapsed.as_secs_f64());
            }
            LodEvent::LookupFailed { source, .. } => {
                m.lookup_failures.with_label_values(&[*source]).inc();
            }
            LodEvent::EntityResolved { .. } => {
                m.entities.with_label_values(&["resolved"]).inc();
            }
            LodEvent::EntityUnresolved { .. } => {
                m.entities.with_label_values(&["unresolved"]).inc();
            }
        }
    }
}

/// Observer used when none is configured
pub fn default_observer() -> Arc<dyn LodObserver> {
    Arc::new(TracingObserver)
}

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all engine metrics
struct LodMetrics {
    cache_lookups: CounterVec,
    cache_stores: CounterVec,
    malformed_coordinates: CounterVec,
    requests: CounterVec,
    request_duration: HistogramVec,
    lookup_failures: CounterVec,
    entities: CounterVec,
}

/// Global storage for engine metrics
static LOD_METRICS: OnceLock<LodMetrics> = OnceLock::new();

/// Serializes registration so concurrent callers never observe a half-initialized state
static METRICS_INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// Subsequent calls return `Ok(())` without registering anything.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = METRICS_INIT_LOCK
        .lock()
        .map_err(|_| "Metrics initialization lock poisoned")?;

    // Prevent double initialization
    if LOD_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = LodMetrics {
        cache_lookups: register_counter_vec!(
            "lodgeo_cache_lookups_total",
            "Cache lookups by outcome",
            &["outcome"]
        )?,
        cache_stores: register_counter_vec!(
            "lodgeo_cache_stores_total",
            "Cache writes by kind (positive, negative)",
            &["kind"]
        )?,
        malformed_coordinates: register_counter_vec!(
            "lodgeo_malformed_coordinates_total",
            "Coordinate values that could not be parsed, by encoding tier",
            &["tier"]
        )?,
        requests: register_counter_vec!(
            "lodgeo_sparql_requests_total",
            "SPARQL requests by endpoint and HTTP status",
            &["endpoint", "status"]
        )?,
        request_duration: register_histogram_vec!(
            "lodgeo_sparql_request_duration_seconds",
            "SPARQL request duration in seconds",
            &["endpoint"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
        )?,
        lookup_failures: register_counter_vec!(
            "lodgeo_lookup_failures_total",
            "Contained lookup failures by data source",
            &["source"]
        )?,
        entities: register_counter_vec!(
            "lodgeo_enriched_entities_total",
            "Place entities processed by enrichment outcome",
            &["outcome"]
        )?,
    };

    LOD_METRICS
        .set(metrics)
        .map_err(|_| "Metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    LOD_METRICS.get().is_some()
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_metrics_initialized() {
        let _ = init_metrics();
    }

    #[test]
    fn test_init_metrics_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
        assert!(metrics_initialized());
    }

    #[test]
    fn test_prometheus_observer_counts() {
        ensure_metrics_initialized();
        let observer = PrometheusObserver;

        observer.record(&LodEvent::CacheHit {
            namespace: "test",
            key: "geo.Q220",
        });
        observer.record(&LodEvent::MalformedCoordinate {
            tier: CoordinateTier::Wkt,
            value: "POINT()",
        });
        observer.record(&LodEvent::RequestCompleted {
            endpoint: "dbpedia",
            status: Some(200),
            elapsed: Duration::from_millis(120),
        });

        let text = encode_metrics().unwrap();
        assert!(text.contains("lodgeo_cache_lookups_total"));
        assert!(text.contains("lodgeo_malformed_coordinates_total"));
        assert!(text.contains("lodgeo_sparql_request_duration_seconds"));
    }

    #[test]
    fn test_tracing_observer_accepts_all_events() {
        let observer = TracingObserver;
        let ids = vec!["Q220".to_string()];

        observer.record(&LodEvent::CacheMiss {
            namespace: "test",
            key: "k",
        });
        observer.record(&LodEvent::LookupFailed {
            source: "wikidata",
            id: "Q220",
            error: "HTTP status 503",
        });
        observer.record(&LodEvent::EntityUnresolved { ids: &ids });
    }
}
