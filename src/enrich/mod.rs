//! Batch geo enrichment of parsed entities
//!
//! For every place entity without a point, identifiers are tried in order
//! until one yields coordinates. Lookups are strictly sequential (entity by
//! entity, identifier by identifier) to stay within the rate limits of the
//! public endpoints. A failing identifier is logged and counted, never
//! propagated, so one bad id cannot abort the batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::geo::GeoPoint;
use crate::lod::{GeoService, IdScheme};
use crate::metrics::{LodEvent, LodObserver};

/// Kind of a parsed entity
///
/// Serialized as the plain strings `"person"`, `"place"` or any other value.
/// Matching is case-sensitive, so other spellings are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Person,
    Place,
    Other(String),
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "person" => Self::Person,
            "place" => Self::Place,
            _ => Self::Other(value),
        }
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => f.write_str("person"),
            Self::Place => f.write_str("place"),
            Self::Other(other) => f.write_str(other),
        }
    }
}

/// An entity extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntity {
    /// Candidate identifiers, most trusted first
    pub ids: Vec<String>,

    #[serde(rename = "type")]
    pub kind: EntityKind,

    #[serde(default)]
    pub names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Set by enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
}

impl ParsedEntity {
    pub fn new(kind: EntityKind, ids: Vec<String>) -> Self {
        Self {
            ids,
            kind,
            names: Vec::new(),
            links: None,
            description: None,
            point: None,
        }
    }
}

/// Terminal state of one entity after enrichment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityOutcome {
    /// A point was attached
    Resolved(GeoPoint),

    /// No identifier produced a point
    Unresolved,

    /// Not a place, or already carrying a point
    Skipped,
}

/// Summary of one `enrich` call, one outcome per input entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    pub outcomes: Vec<EntityOutcome>,

    /// Lookups that failed with an error (not "no data")
    pub failures: usize,
}

impl EnrichReport {
    pub fn resolved(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Resolved(_)))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Unresolved))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Attaches points to place entities
#[derive(Debug, Clone)]
pub struct Enricher {
    geo: Arc<GeoService>,
    observer: Arc<dyn LodObserver>,
}

impl Enricher {
    pub fn new(geo: Arc<GeoService>, observer: Arc<dyn LodObserver>) -> Self {
        Self { geo, observer }
    }

    /// Resolve points for `entities` in place
    ///
    /// Never fails: per-identifier errors end up in
    /// [`EnrichReport::failures`]. An empty batch returns at once.
    pub async fn enrich(&self, entities: &mut [ParsedEntity]) -> EnrichReport {
        let mut report = EnrichReport {
            outcomes: Vec::with_capacity(entities.len()),
            failures: 0,
        };

        for entity in entities.iter_mut() {
            let outcome = self.enrich_entity(entity, &mut report.failures).await;
            report.outcomes.push(outcome);
        }

        if !entities.is_empty() {
            tracing::info!(
                entities = entities.len(),
                resolved = report.resolved(),
                unresolved = report.unresolved(),
                skipped = report.skipped(),
                failures = report.failures,
                "Enrichment finished"
            );
        }

        report
    }

    async fn enrich_entity(&self, entity: &mut ParsedEntity, failures: &mut usize) -> EntityOutcome {
        if entity.kind != EntityKind::Place || entity.point.is_some() {
            return EntityOutcome::Skipped;
        }

        for id in &entity.ids {
            let Some(scheme) = IdScheme::parse(id) else {
                tracing::debug!(id = %id, "Skipping identifier without geo source");
                continue;
            };

            match self.geo.get_point_for(&scheme).await {
                Ok(Some(point)) => {
                    self.observer.record(&LodEvent::EntityResolved {
                        id,
                        source: scheme.source_name(),
                    });
                    entity.point = Some(point);
                    return EntityOutcome::Resolved(point);
                }
                Ok(None) => {
                    tracing::debug!(id = %id, source = scheme.source_name(), "No coordinates");
                }
                Err(e) => {
                    *failures += 1;
                    self.observer.record(&LodEvent::LookupFailed {
                        source: scheme.source_name(),
                        id,
                        error: &e.to_string(),
                    });
                }
            }
        }

        self.observer
            .record(&LodEvent::EntityUnresolved { ids: &entity.ids });
        EntityOutcome::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_serde() {
        let json = r#"{"ids":["Q220"],"type":"place","names":["Roma"]}"#;
        let entity: ParsedEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.kind, EntityKind::Place);
        assert!(entity.point.is_none());

        let other: EntityKind = serde_json::from_str(r#""event""#).unwrap();
        assert_eq!(other, EntityKind::Other("event".into()));
        assert_eq!(serde_json::to_string(&EntityKind::Person).unwrap(), r#""person""#);
    }

    #[test]
    fn test_entity_kind_keeps_caller_spelling() {
        let kind: EntityKind = serde_json::from_str(r#""Place""#).unwrap();
        assert_eq!(kind, EntityKind::Other("Place".into()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), r#""Place""#);

        let json = r#"{"ids":["Q220"],"type":"Event"}"#;
        let entity: ParsedEntity = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_value(&entity).unwrap()["type"], "Event");
    }

    #[test]
    fn test_point_is_serialized_once_set() {
        let mut entity = ParsedEntity::new(EntityKind::Place, vec!["Q220".into()]);
        assert!(!serde_json::to_string(&entity).unwrap().contains("point"));

        entity.point = Some(GeoPoint::new(41.9, 12.5));
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["point"]["lat"], 41.9);
        assert_eq!(json["type"], "place");
    }

    #[test]
    fn test_report_counts() {
        let report = EnrichReport {
            outcomes: vec![
                EntityOutcome::Resolved(GeoPoint::new(1.0, 2.0)),
                EntityOutcome::Unresolved,
                EntityOutcome::Skipped,
                EntityOutcome::Skipped,
            ],
            failures: 1,
        };
        assert_eq!(report.resolved(), 1);
        assert_eq!(report.unresolved(), 1);
        assert_eq!(report.skipped(), 2);
    }
}
