//! LOD services
//!
//! Each service pairs a [`SparqlSource`] with the shared [`LodCache`]:
//!
//! - [`PersonService`]: DBpedia person facts
//! - [`PlaceService`]: DBpedia place facts and positions
//! - [`GeoService`]: points for DBpedia, Wikidata and GeoNames identifiers
//!
//! [`LodService`] wires them from a [`Config`] and is what the CLI and the
//! enricher use.
//!
//! # Example
//!
//! ```rust,no_run
//! use lodgeo::config::Config;
//! use lodgeo::lod::LodService;
//! use lodgeo::metrics::default_observer;
//!
//! # async fn run() -> lodgeo::Result<()> {
//! let service = LodService::from_config(&Config::default(), default_observer())?;
//! let point = service.geo().get_point("Q220").await?;
//! println!("{point:?}");
//! # Ok(())
//! # }
//! ```

pub mod geo;
pub mod person;
pub mod place;

pub use geo::{GeoService, IdScheme};
pub use person::PersonService;
pub use place::PlaceService;

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::cache::LodCache;
use crate::config::Config;
use crate::enrich::{EntityKind, Enricher};
use crate::error::Result;
use crate::geo::CoordinateResolver;
use crate::lookup::{LookupError, SparqlClient, SparqlSource};
use crate::metrics::LodObserver;
use crate::sparql::{PersonInfo, PlaceInfo, QueryResult};

/// Facts about one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityInfo {
    Person(PersonInfo),
    Place(PlaceInfo),
}

/// Raw result for `key`, from the cache or from `source`
///
/// An empty result is stored as the negative marker and reads back as `None`.
/// Transport errors are returned as is and nothing is cached for them.
pub(crate) async fn fetch_cached(
    cache: &LodCache,
    source: &dyn SparqlSource,
    key: &str,
    query: &str,
) -> std::result::Result<Option<QueryResult>, LookupError> {
    let namespace = cache.namespace();

    if let Some(cached) = cache.get::<QueryResult>(namespace, key) {
        return Ok(cached.into_option());
    }

    let result = source.fetch(query).await?;

    if result.is_empty() {
        cache.add_not_found(namespace, key);
        return Ok(None);
    }

    if let Err(e) = cache.add(namespace, key, &result) {
        tracing::warn!(key = %key, error = %e, "Failed to cache query result");
    }

    Ok(Some(result))
}

/// All services over one cache
#[derive(Debug, Clone)]
pub struct LodService {
    persons: PersonService,
    places: PlaceService,
    geo: Arc<GeoService>,
    cache: Arc<LodCache>,
    observer: Arc<dyn LodObserver>,
}

impl LodService {
    /// Build HTTP clients and an empty cache from `config`
    pub fn from_config(config: &Config, observer: Arc<dyn LodObserver>) -> Result<Self> {
        let cache = Arc::new(LodCache::with_observer(&config.cache, Arc::clone(&observer)));

        let dbpedia: Arc<dyn SparqlSource> = Arc::new(SparqlClient::with_observer(
            config.endpoints.dbpedia.clone(),
            &config.lookup,
            Arc::clone(&observer),
        )?);
        let wikidata: Arc<dyn SparqlSource> = Arc::new(SparqlClient::with_observer(
            config.endpoints.wikidata.clone(),
            &config.lookup,
            Arc::clone(&observer),
        )?);

        Ok(Self::from_sources(dbpedia, wikidata, cache, observer))
    }

    /// Wire services over existing sources and cache
    pub fn from_sources(
        dbpedia: Arc<dyn SparqlSource>,
        wikidata: Arc<dyn SparqlSource>,
        cache: Arc<LodCache>,
        observer: Arc<dyn LodObserver>,
    ) -> Self {
        let resolver = CoordinateResolver::new(Arc::clone(&observer));

        Self {
            persons: PersonService::new(Arc::clone(&dbpedia), Arc::clone(&cache)),
            places: PlaceService::new(Arc::clone(&dbpedia), Arc::clone(&cache), resolver.clone()),
            geo: Arc::new(GeoService::new(
                dbpedia,
                wikidata,
                Arc::clone(&cache),
                resolver,
            )),
            cache,
            observer,
        }
    }

    /// Facts about `id` for the given entity kind
    ///
    /// Kinds other than person and place have no info source and yield `None`.
    pub async fn get_info(
        &self,
        id: &str,
        kind: &EntityKind,
        language: Option<&str>,
    ) -> Result<Option<EntityInfo>> {
        let info = match kind {
            EntityKind::Person => {
                let languages: Vec<String> =
                    language.map(|l| vec![l.to_string()]).unwrap_or_default();
                self.persons
                    .get_info(id, &languages)
                    .await?
                    .map(EntityInfo::Person)
            }
            EntityKind::Place => self
                .places
                .get_info(id, language)
                .await?
                .map(EntityInfo::Place),
            EntityKind::Other(other) => {
                tracing::debug!(id = %id, kind = %other, "No info source for entity kind");
                None
            }
        };

        Ok(info)
    }

    pub fn persons(&self) -> &PersonService {
        &self.persons
    }

    pub fn places(&self) -> &PlaceService {
        &self.places
    }

    pub fn geo(&self) -> &GeoService {
        &self.geo
    }

    pub fn cache(&self) -> &Arc<LodCache> {
        &self.cache
    }

    /// Merge the cache snapshot at `path`, returning the number of entries read
    pub fn load_snapshot(&self, path: &Path) -> Result<usize> {
        Ok(self.cache.load_from(path)?)
    }

    /// Write the cache to `path`
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        self.cache.save_to(path)?;
        Ok(())
    }

    /// Enricher resolving points through this service's geo lookups
    pub fn enricher(&self) -> Enricher {
        Enricher::new(Arc::clone(&self.geo), Arc::clone(&self.observer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, Cached};
    use crate::geo::GeoPoint;
    use crate::metrics::{default_observer, LodEvent};
    use crate::sparql::{Binding, RdfTerm};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Source answering from a queue of canned results
    #[derive(Debug, Default)]
    struct CannedSource {
        answers: Mutex<Vec<std::result::Result<QueryResult, LookupError>>>,
        calls: AtomicUsize,
    }

    impl CannedSource {
        fn new(answers: Vec<std::result::Result<QueryResult, LookupError>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SparqlSource for CannedSource {
        fn name(&self) -> &str {
            "canned"
        }

        async fn fetch(&self, _query: &str) -> std::result::Result<QueryResult, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                Ok(QueryResult::default())
            } else {
                answers.remove(0)
            }
        }
    }

    /// Observer counting malformed coordinate reports
    #[derive(Debug, Default)]
    struct MalformedCounter(AtomicUsize);

    impl LodObserver for MalformedCounter {
        fn record(&self, event: &LodEvent<'_>) {
            if matches!(event, LodEvent::MalformedCoordinate { .. }) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn cache() -> LodCache {
        LodCache::new(&CacheConfig {
            namespace: "test".into(),
            negative_ttl_secs: None,
            persist_path: None,
        })
    }

    fn rome() -> QueryResult {
        let mut row = Binding::new();
        row.insert("place".into(), RdfTerm::uri("http://dbpedia.org/resource/Rome"));
        row.insert("label".into(), RdfTerm::lang_literal("Roma", "it"));
        row.insert("point".into(), RdfTerm::literal("41.9 12.5"));
        QueryResult::new(vec!["place".into(), "label".into(), "point".into()], vec![row])
    }

    #[tokio::test]
    async fn test_fetch_cached_hits_network_once() {
        let cache = cache();
        let source = CannedSource::new(vec![Ok(rome())]);

        let first = fetch_cached(&cache, &source, "k", "q").await.unwrap();
        let second = fetch_cached(&cache, &source, "k", "q").await.unwrap();

        assert_eq!(first, Some(rome()));
        assert_eq!(second, first);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_cached_as_not_found() {
        let cache = cache();
        let source = CannedSource::new(vec![]);

        assert!(fetch_cached(&cache, &source, "k", "q").await.unwrap().is_none());
        assert!(fetch_cached(&cache, &source, "k", "q").await.unwrap().is_none());

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get::<QueryResult>("test", "k"), Some(Cached::NotFound));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cache();
        let source = CannedSource::new(vec![Err(LookupError::Status(503)), Ok(rome())]);

        assert!(fetch_cached(&cache, &source, "k", "q").await.is_err());
        assert_eq!(fetch_cached(&cache, &source, "k", "q").await.unwrap(), Some(rome()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_info_dispatches_on_kind() {
        let dbpedia = Arc::new(CannedSource::new(vec![Ok(rome())]));
        let wikidata = Arc::new(CannedSource::default());
        let service = LodService::from_sources(
            dbpedia.clone(),
            wikidata,
            Arc::new(cache()),
            default_observer(),
        );

        let info = service
            .get_info("http://dbpedia.org/resource/Rome", &EntityKind::Place, Some("it"))
            .await
            .unwrap();
        let Some(EntityInfo::Place(place)) = info else {
            panic!("expected place info");
        };
        assert_eq!(place.labels[0].value, "Roma");
        assert_eq!(place.point, Some(GeoPoint::new(41.9, 12.5)));

        let other = service
            .get_info("x", &EntityKind::Other("event".into()), None)
            .await
            .unwrap();
        assert!(other.is_none());
        assert_eq!(dbpedia.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_place_info_cached_per_language() {
        let dbpedia = Arc::new(CannedSource::new(vec![Ok(rome()), Ok(rome())]));
        let service = LodService::from_sources(
            dbpedia.clone(),
            Arc::new(CannedSource::default()),
            Arc::new(cache()),
            default_observer(),
        );
        let id = "http://dbpedia.org/resource/Rome";

        service.places().get_info(id, Some("it")).await.unwrap();
        service.places().get_info(id, Some("it")).await.unwrap();
        service.places().get_info(id, None).await.unwrap();

        assert_eq!(dbpedia.calls.load(Ordering::SeqCst), 2);
        assert!(service.cache().get::<QueryResult>("test", "http://dbpedia.org/resource/Rome:it").is_some());
    }

    #[tokio::test]
    async fn test_malformed_place_coordinates_reach_injected_observer() {
        let mut row = Binding::new();
        row.insert("place".into(), RdfTerm::uri("http://dbpedia.org/resource/Atlantis"));
        row.insert("label".into(), RdfTerm::lang_literal("Atlantis", "en"));
        row.insert("wkt".into(), RdfTerm::literal("POINT(bad)"));
        let bad = QueryResult::new(vec!["place".into(), "label".into(), "wkt".into()], vec![row]);

        let dbpedia = Arc::new(CannedSource::new(vec![Ok(bad.clone()), Ok(bad)]));
        let observer = Arc::new(MalformedCounter::default());
        let service = LodService::from_sources(
            dbpedia,
            Arc::new(CannedSource::default()),
            Arc::new(cache()),
            observer.clone(),
        );
        let id = "http://dbpedia.org/resource/Atlantis";

        let place = service.places().get_info(id, None).await.unwrap().unwrap();
        assert!(place.point.is_none());
        assert!(service.geo().get_point(id).await.unwrap().is_none());

        assert_eq!(observer.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_position_and_point_share_one_fetch() {
        let dbpedia = Arc::new(CannedSource::new(vec![Ok(rome())]));
        let service = LodService::from_sources(
            dbpedia.clone(),
            Arc::new(CannedSource::default()),
            Arc::new(cache()),
            default_observer(),
        );

        let position = service
            .places()
            .get_position("http://dbpedia.org/resource/Rome")
            .await
            .unwrap();
        let point = service
            .geo()
            .get_point("https://dbpedia.org/resource/Rome")
            .await
            .unwrap();

        assert_eq!(position, Some(GeoPoint::new(41.9, 12.5)));
        assert_eq!(point, position);
        assert_eq!(dbpedia.calls.load(Ordering::SeqCst), 1);
        assert!(service
            .cache()
            .get::<QueryResult>("test", "pos.http://dbpedia.org/resource/Rome")
            .is_some());
    }
}
