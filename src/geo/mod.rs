//! Geographic points and coordinate extraction
//!
//! LOD sources encode a place position in several ways. The resolver tries,
//! in strict priority order, first success wins:
//!
//! 1. separate `lat` / `long` terms (`geo:lat`, `geo:long`)
//! 2. a `point` term `"<lat> <long>"` (`georss:point`)
//! 3. a `wkt` term `"POINT(<long> <lat>)"` (`geo:geometry`, Wikidata `P625`)
//!
//! A tier with malformed data fails as a whole and the next one is tried;
//! values are never mixed across tiers. No tier matching is a normal outcome.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::metrics::{default_observer, LodEvent, LodObserver};
use crate::sparql::Binding;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
}

impl GeoPoint {
    /// Create a point without altitude
    pub fn new(lat: f64, long: f64) -> Self {
        Self {
            lat,
            long,
            alt: None,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lat, self.long)
    }
}

/// Coordinate encoding tiers, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateTier {
    LatLong,
    GeoRssPoint,
    Wkt,
}

impl CoordinateTier {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatLong => "lat_long",
            Self::GeoRssPoint => "georss_point",
            Self::Wkt => "wkt",
        }
    }
}

/// Extracts a point from one result row
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    observer: Arc<dyn LodObserver>,
}

impl Default for CoordinateResolver {
    fn default() -> Self {
        Self::new(default_observer())
    }
}

impl CoordinateResolver {
    /// Create a resolver reporting malformed data to `observer`
    pub fn new(observer: Arc<dyn LodObserver>) -> Self {
        Self { observer }
    }

    /// Extract coordinates from `binding`, trying each tier in order
    pub fn extract(&self, binding: &Binding) -> Option<GeoPoint> {
        self.from_lat_long(binding)
            .or_else(|| self.from_georss_point(binding))
            .or_else(|| self.from_wkt(binding))
    }

    /// Extract from the first row that yields a point
    pub fn extract_first<'a, I>(&self, bindings: I) -> Option<GeoPoint>
    where
        I: IntoIterator<Item = &'a Binding>,
    {
        bindings.into_iter().find_map(|b| self.extract(b))
    }

    fn from_lat_long(&self, binding: &Binding) -> Option<GeoPoint> {
        let (lat, long) = match (binding.get("lat"), binding.get("long")) {
            (Some(lat), Some(long)) => (lat, long),
            _ => return None,
        };

        match (parse_coordinate(&lat.value), parse_coordinate(&long.value)) {
            (Some(lat), Some(long)) => Some(GeoPoint::new(lat, long)),
            _ => {
                let value = format!("{} {}", lat.value, long.value);
                self.malformed(CoordinateTier::LatLong, &value);
                None
            }
        }
    }

    fn from_georss_point(&self, binding: &Binding) -> Option<GeoPoint> {
        let term = binding.get("point")?;
        let parsed = parse_georss_point(&term.value);
        if parsed.is_none() {
            self.malformed(CoordinateTier::GeoRssPoint, &term.value);
        }
        parsed
    }

    fn from_wkt(&self, binding: &Binding) -> Option<GeoPoint> {
        let term = binding.get("wkt")?;
        let parsed = parse_wkt_point(&term.value);
        if parsed.is_none() {
            self.malformed(CoordinateTier::Wkt, &term.value);
        }
        parsed
    }

    fn malformed(&self, tier: CoordinateTier, value: &str) {
        self.observer
            .record(&LodEvent::MalformedCoordinate { tier, value });
    }
}

/// Extract coordinates from `binding` using the default observer
pub fn extract_coordinates(binding: &Binding) -> Option<GeoPoint> {
    CoordinateResolver::default().extract(binding)
}

/// Parse one decimal coordinate, rejecting `NaN` and infinities
fn parse_coordinate(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a georss point `"<lat> <long>"`
///
/// Exactly two whitespace-separated tokens are required.
pub fn parse_georss_point(value: &str) -> Option<GeoPoint> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }

    Some(GeoPoint::new(
        parse_coordinate(parts[0])?,
        parse_coordinate(parts[1])?,
    ))
}

/// Parse a WKT `POINT(<long> <lat>)`, case-insensitive
///
/// Note the axis order: WKT puts longitude first.
pub fn parse_wkt_point(value: &str) -> Option<GeoPoint> {
    static WKT_POINT_RE: OnceLock<Regex> = OnceLock::new();

    let re = WKT_POINT_RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*POINT\s*\(\s*([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)\s+([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)\s*\)\s*$")
            .expect("Invalid regex pattern")
    });

    let caps = re.captures(value)?;
    let long = parse_coordinate(caps.get(1)?.as_str())?;
    let lat = parse_coordinate(caps.get(2)?.as_str())?;

    Some(GeoPoint::new(lat, long))
}
