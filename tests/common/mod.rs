//! Common test utilities

#![allow(dead_code)]

use lodgeo::config::Config;
use lodgeo::lod::LodService;
use lodgeo::metrics::default_observer;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const DBPEDIA_PATH: &str = "/dbpedia/sparql";
pub const WIKIDATA_PATH: &str = "/wikidata/sparql";

/// Configuration pointing both endpoints at `server`
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.endpoints.dbpedia.url = format!("{}{DBPEDIA_PATH}", server.uri());
    config.endpoints.wikidata.url = format!("{}{WIKIDATA_PATH}", server.uri());
    config.lookup.requests_per_second = 100;
    config.cache.namespace = "test".to_string();
    config
}

/// Services wired to `server`
pub fn test_service(server: &MockServer) -> LodService {
    LodService::from_config(&test_config(server), default_observer()).unwrap()
}

/// SPARQL JSON result body
pub fn sparql_body(vars: &[&str], bindings: Value) -> Value {
    json!({
        "head": { "vars": vars },
        "results": { "bindings": bindings }
    })
}

/// Result without rows
pub fn empty_body() -> Value {
    sparql_body(&["place", "lat", "long", "wkt"], json!([]))
}

/// Wikidata answer for Rome (Q220)
pub fn wikidata_rome_body() -> Value {
    sparql_body(
        &["place", "lat", "long", "wkt"],
        json!([{
            "place": { "type": "uri", "value": "http://www.wikidata.org/entity/Q220" },
            "wkt": {
                "type": "literal",
                "datatype": "http://www.opengis.net/ont/geosparql#wktLiteral",
                "value": "Point(12.482777777 41.893055555)"
            }
        }]),
    )
}

/// DBpedia place answer for Rome, one row per label language
pub fn dbpedia_rome_body() -> Value {
    sparql_body(
        &["place", "label", "abstract", "lat", "long", "point"],
        json!([
            {
                "place": { "type": "uri", "value": "http://dbpedia.org/resource/Rome" },
                "label": { "type": "literal", "xml:lang": "en", "value": "Rome" },
                "abstract": { "type": "literal", "xml:lang": "en", "value": "Rome is the capital city of Italy." },
                "lat": { "type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#float", "value": "41.893333" },
                "long": { "type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#float", "value": "12.482778" }
            },
            {
                "place": { "type": "uri", "value": "http://dbpedia.org/resource/Rome" },
                "label": { "type": "literal", "xml:lang": "it", "value": "Roma" },
                "point": { "type": "literal", "value": "41.893333 12.482778" }
            }
        ]),
    )
}
