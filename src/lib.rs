//! lodgeo - Linked Open Data aggregation and geo resolution
//!
//! Looks up people and places on public SPARQL endpoints (DBpedia, Wikidata),
//! folds the multi-language results into typed records, resolves coordinates
//! from several encodings and sources, and caches everything it fetched.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`sparql`] - SPARQL JSON result model, query templates and row merging
//! - [`geo`] - Points and the coordinate resolver
//! - [`cache`] - Namespaced cache with negative entries and snapshots
//! - [`lookup`] - Rate-limited SPARQL HTTP client
//! - [`lod`] - Person, place and point services
//! - [`enrich`] - Batch geo enrichment of parsed entities
//! - [`metrics`] - Observer hook, tracing and Prometheus
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use lodgeo::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let service = LodService::from_config(&config, default_observer())?;
//!
//!     let mut entities = vec![ParsedEntity::new(EntityKind::Place, vec!["Q220".into()])];
//!     let report = service.enricher().enrich(&mut entities).await;
//!     println!("{} resolved", report.resolved());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod lod;
pub mod lookup;
pub mod metrics;
pub mod sparql;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{Cached, LodCache};
    pub use crate::config::Config;
    pub use crate::enrich::{EnrichReport, Enricher, EntityKind, EntityOutcome, ParsedEntity};
    pub use crate::error::{Error, ErrorCategory, LodErrorTrait, Result};
    pub use crate::geo::GeoPoint;
    pub use crate::lod::{EntityInfo, GeoService, LodService};
    pub use crate::metrics::{default_observer, LodObserver};
    pub use crate::sparql::{PersonInfo, PlaceInfo, QueryResult};
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use geo::GeoPoint;
pub use sparql::QueryResult;
