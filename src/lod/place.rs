//! Place facts and positions from DBpedia

use std::sync::Arc;

use super::fetch_cached;
use super::geo::IdScheme;
use crate::cache::LodCache;
use crate::geo::{CoordinateResolver, GeoPoint};
use crate::lookup::{LookupError, SparqlSource};
use crate::sparql::query::PLACE_VAR;
use crate::sparql::{PlaceInfo, QueryBuilder, TermMerger};

/// Cache key prefix of raw position results
pub const POSITION_PREFIX: &str = "pos.";

/// Cache key of the place result for `id` in `language`
pub fn place_key(id: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!("{id}:{lang}"),
        None => id.to_string(),
    }
}

/// Looks up places
#[derive(Clone)]
pub struct PlaceService {
    source: Arc<dyn SparqlSource>,
    cache: Arc<LodCache>,
    resolver: CoordinateResolver,
}

impl std::fmt::Debug for PlaceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceService")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl PlaceService {
    pub fn new(
        source: Arc<dyn SparqlSource>,
        cache: Arc<LodCache>,
        resolver: CoordinateResolver,
    ) -> Self {
        Self {
            source,
            cache,
            resolver,
        }
    }

    /// Facts about the place `id`, labels restricted to `language` if given
    pub async fn get_info(
        &self,
        id: &str,
        language: Option<&str>,
    ) -> Result<Option<PlaceInfo>, LookupError> {
        let languages: Vec<String> = language.map(|l| vec![l.to_string()]).unwrap_or_default();
        let key = place_key(id, language);
        let query = QueryBuilder::build_place_query(id, &languages);

        let Some(result) = fetch_cached(&self.cache, self.source.as_ref(), &key, &query).await?
        else {
            return Ok(None);
        };

        Ok(TermMerger::merge_place(
            &result,
            PLACE_VAR,
            language,
            &self.resolver,
        ))
    }

    /// Coordinates of `id` through the lighter position query
    ///
    /// `https://` DBpedia IRIs are queried and cached as their `http://` form.
    pub async fn get_position(&self, id: &str) -> Result<Option<GeoPoint>, LookupError> {
        let uri = match IdScheme::parse(id) {
            Some(IdScheme::Dbpedia(uri)) => uri,
            _ => id.to_string(),
        };
        let key = format!("{POSITION_PREFIX}{uri}");
        let query = QueryBuilder::build_position_query(&uri);

        let result = fetch_cached(&self.cache, self.source.as_ref(), &key, &query).await?;

        Ok(result.and_then(|r| self.resolver.extract_first(r.bindings())))
    }
}
