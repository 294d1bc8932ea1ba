//! Point lookups across data sources
//!
//! The shape of an identifier decides where its coordinates come from. Keys
//! use the canonical form of the identifier: the raw position result goes
//! under `pos.<id>` (shared with [`PlaceService::get_position`]) and the
//! derived point, or the negative marker, under `geo.<id>`.
//!
//! [`PlaceService::get_position`]: super::PlaceService::get_position

use regex::Regex;
use std::sync::{Arc, OnceLock};

use super::fetch_cached;
use super::place::POSITION_PREFIX;
use crate::cache::LodCache;
use crate::geo::{CoordinateResolver, GeoPoint};
use crate::lookup::{LookupError, SparqlSource};
use crate::sparql::QueryBuilder;

/// Cache key prefix of derived points
pub const GEO_PREFIX: &str = "geo.";

/// Data source implied by an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdScheme {
    /// DBpedia resource IRI, normalized to `http://`
    Dbpedia(String),

    /// Wikidata entity id (`Q220`)
    Wikidata(String),

    /// GeoNames feature id (`3169070`), resolved through Wikidata
    GeoNames(String),
}

impl IdScheme {
    /// Classify `id`, returning `None` for unsupported identifiers
    ///
    /// ```
    /// use lodgeo::lod::IdScheme;
    ///
    /// assert_eq!(
    ///     IdScheme::parse("http://www.wikidata.org/entity/Q220"),
    ///     Some(IdScheme::Wikidata("Q220".to_string()))
    /// );
    /// assert_eq!(IdScheme::parse("https://viaf.org/viaf/97105654"), None);
    /// ```
    pub fn parse(id: &str) -> Option<Self> {
        static DBPEDIA_RE: OnceLock<Regex> = OnceLock::new();
        static WIKIDATA_RE: OnceLock<Regex> = OnceLock::new();
        static GEONAMES_RE: OnceLock<Regex> = OnceLock::new();

        let id = id.trim();

        let dbpedia = DBPEDIA_RE.get_or_init(|| {
            Regex::new(r"^https?://dbpedia\.org/resource/(.+)$").expect("Invalid regex pattern")
        });
        if let Some(caps) = dbpedia.captures(id) {
            return Some(Self::Dbpedia(format!(
                "http://dbpedia.org/resource/{}",
                &caps[1]
            )));
        }

        let wikidata = WIKIDATA_RE.get_or_init(|| {
            Regex::new(r"^(?:https?://www\.wikidata\.org/(?:entity|wiki)/)?(Q[0-9]+)$")
                .expect("Invalid regex pattern")
        });
        if let Some(caps) = wikidata.captures(id) {
            return Some(Self::Wikidata(caps[1].to_string()));
        }

        let geonames = GEONAMES_RE.get_or_init(|| {
            Regex::new(r"^https?://(?:sws\.|www\.)?geonames\.org/([0-9]+)(?:/.*)?$")
                .expect("Invalid regex pattern")
        });
        if let Some(caps) = geonames.captures(id) {
            return Some(Self::GeoNames(caps[1].to_string()));
        }

        None
    }

    /// Identifier used in cache keys
    ///
    /// Spellings of the same resource (`https://` DBpedia IRIs, Wikidata
    /// entity URLs) share one canonical form.
    pub fn canonical_id(&self) -> String {
        match self {
            Self::Dbpedia(uri) => uri.clone(),
            Self::Wikidata(qid) => qid.clone(),
            Self::GeoNames(gid) => format!("http://sws.geonames.org/{gid}/"),
        }
    }

    /// Data source label used in logs and metrics
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Dbpedia(_) => "dbpedia",
            Self::Wikidata(_) => "wikidata",
            Self::GeoNames(_) => "geonames",
        }
    }

    /// Coordinates query for this identifier
    pub fn position_query(&self) -> String {
        match self {
            Self::Dbpedia(uri) => QueryBuilder::build_position_query(uri),
            Self::Wikidata(qid) => QueryBuilder::build_wikidata_position_query(qid),
            Self::GeoNames(gid) => QueryBuilder::build_geonames_position_query(gid),
        }
    }
}

/// Resolves identifiers to points
#[derive(Clone)]
pub struct GeoService {
    dbpedia: Arc<dyn SparqlSource>,
    wikidata: Arc<dyn SparqlSource>,
    cache: Arc<LodCache>,
    resolver: CoordinateResolver,
}

impl std::fmt::Debug for GeoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoService")
            .field("dbpedia", &self.dbpedia.name())
            .field("wikidata", &self.wikidata.name())
            .finish_non_exhaustive()
    }
}

impl GeoService {
    pub fn new(
        dbpedia: Arc<dyn SparqlSource>,
        wikidata: Arc<dyn SparqlSource>,
        cache: Arc<LodCache>,
        resolver: CoordinateResolver,
    ) -> Self {
        Self {
            dbpedia,
            wikidata,
            cache,
            resolver,
        }
    }

    /// Point for `id`, or `None` when no source has coordinates
    ///
    /// Unsupported identifiers resolve to `None` without any lookup.
    pub async fn get_point(&self, id: &str) -> Result<Option<GeoPoint>, LookupError> {
        match IdScheme::parse(id) {
            Some(scheme) => self.get_point_for(&scheme).await,
            None => {
                tracing::debug!(id = %id, "No geo source for identifier");
                Ok(None)
            }
        }
    }

    /// Point for an already classified identifier
    pub async fn get_point_for(&self, scheme: &IdScheme) -> Result<Option<GeoPoint>, LookupError> {
        let namespace = self.cache.namespace();
        let id = scheme.canonical_id();
        let key = format!("{GEO_PREFIX}{id}");

        if let Some(cached) = self.cache.get::<GeoPoint>(namespace, &key) {
            return Ok(cached.into_option());
        }

        let source = match scheme {
            IdScheme::Dbpedia(_) => &self.dbpedia,
            IdScheme::Wikidata(_) | IdScheme::GeoNames(_) => &self.wikidata,
        };

        let raw_key = format!("{POSITION_PREFIX}{id}");
        let result =
            fetch_cached(&self.cache, source.as_ref(), &raw_key, &scheme.position_query()).await?;
        let point = result.and_then(|r| self.resolver.extract_first(r.bindings()));

        match &point {
            Some(point) => {
                if let Err(e) = self.cache.add(namespace, &key, point) {
                    tracing::warn!(key = %key, error = %e, "Failed to cache point");
                }
            }
            None => self.cache.add_not_found(namespace, &key),
        }

        Ok(point)
    }
}
