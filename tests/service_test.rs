//! Integration tests for the person, place and point services

mod common;

use common::{
    dbpedia_rome_body, sparql_body, test_config, test_service, DBPEDIA_PATH, WIKIDATA_PATH,
};
use lodgeo::cache::LodCache;
use lodgeo::enrich::EntityKind;
use lodgeo::geo::GeoPoint;
use lodgeo::lod::{EntityInfo, LodService};
use lodgeo::metrics::default_observer;
use serde_json::json;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DANTE: &str = "http://dbpedia.org/resource/Dante_Alighieri";

fn dante_body() -> serde_json::Value {
    let row = |name: (&str, &str), abstract_: (&str, &str), birth: &str| {
        json!({
            "person": { "type": "uri", "value": DANTE },
            "name": { "type": "literal", "xml:lang": name.1, "value": name.0 },
            "abstract": { "type": "literal", "xml:lang": abstract_.1, "value": abstract_.0 },
            "birth_date": {
                "type": "typed-literal",
                "datatype": "http://www.w3.org/2001/XMLSchema#date",
                "value": birth
            }
        })
    };

    sparql_body(
        &["person", "name", "abstract", "birth_date"],
        json!([
            row(("Dante Alighieri", "en"), ("Italian poet", "en"), "1265-05-01"),
            row(("Dante Alighieri", "it"), ("Poeta italiano", "it"), "1265-05-01"),
            row(("Dante", "en"), ("Florentine poet", "en"), "1265-06-01"),
        ]),
    )
}

#[tokio::test]
async fn test_person_info_merged_and_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DBPEDIA_PATH))
        .and(query_param_contains("query", "a owl:Thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dante_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);

    let info = service.persons().get_info(DANTE, &[]).await.unwrap().unwrap();
    assert_eq!(info.uri.as_deref(), Some(DANTE));
    assert_eq!(info.names.len(), 2);
    assert_eq!(info.abstracts.len(), 2);
    assert_eq!(info.birth_date.as_ref().unwrap().value, "1265-06-01");

    // Second call is served from the cache
    let again = service.persons().get_info(DANTE, &[]).await.unwrap();
    assert_eq!(again, Some(info));
}

#[tokio::test]
async fn test_place_info_through_facade() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DBPEDIA_PATH))
        .and(query_param_contains("query", r#"lang(?label)="en""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(dbpedia_rome_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let info = service
        .get_info("http://dbpedia.org/resource/Rome", &EntityKind::Place, Some("en"))
        .await
        .unwrap();

    let Some(EntityInfo::Place(place)) = info else {
        panic!("expected place info, got {info:?}");
    };
    assert_eq!(place.labels.len(), 2);
    // Both rows carry the same position in different encodings
    assert_eq!(place.point, Some(GeoPoint::new(41.893333, 12.482778)));
}

#[tokio::test]
async fn test_unknown_person_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DBPEDIA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(sparql_body(&["person"], json!([]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);
    let langs = vec!["en".to_string()];

    assert!(service.persons().get_info("http://dbpedia.org/resource/Nobody", &langs).await.unwrap().is_none());
    assert!(service.persons().get_info("http://dbpedia.org/resource/Nobody", &langs).await.unwrap().is_none());
}

#[tokio::test]
async fn test_dbpedia_point_from_wkt() {
    let mock_server = MockServer::start().await;

    let body = sparql_body(
        &["place", "lat", "long", "wkt", "point"],
        json!([{
            "place": { "type": "uri", "value": "http://dbpedia.org/resource/Florence" },
            "wkt": { "type": "literal", "value": "POINT(11.254166984558 43.771389007568)" }
        }]),
    );

    Mock::given(method("GET"))
        .and(path(DBPEDIA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);

    let point = service
        .geo()
        .get_point("https://dbpedia.org/resource/Florence")
        .await
        .unwrap();
    assert_eq!(point, Some(GeoPoint::new(43.771389007568, 11.254166984558)));

    let position = service
        .places()
        .get_position("http://dbpedia.org/resource/Florence")
        .await
        .unwrap();
    assert_eq!(position, point);
}

#[tokio::test]
async fn test_unparseable_coordinates_cached_as_not_found() {
    let mock_server = MockServer::start().await;

    // lat/long present but broken, no point or wkt to fall back on
    let body = sparql_body(
        &["place", "lat", "long", "wkt"],
        json!([{
            "place": { "type": "uri", "value": "http://www.wikidata.org/entity/Q4321" },
            "lat": { "type": "literal", "value": "x" },
            "long": { "type": "literal", "value": "12" }
        }]),
    );

    Mock::given(method("GET"))
        .and(path(WIKIDATA_PATH))
        .and(query_param_contains("query", "wd:Q4321"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server);

    assert_eq!(service.geo().get_point("Q4321").await.unwrap(), None);
    assert_eq!(service.geo().get_point("Q4321").await.unwrap(), None);

    let stats = service.cache().stats();
    assert_eq!(stats.negative_hits, 1);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("cache.json");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::wikidata_rome_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server);

    let first = LodService::from_config(&config, default_observer()).unwrap();
    assert!(first.geo().get_point("Q220").await.unwrap().is_some());
    first.save_snapshot(&snapshot).unwrap();

    let second = LodService::from_config(&config, default_observer()).unwrap();
    // Raw position result and derived point
    assert_eq!(second.load_snapshot(&snapshot).unwrap(), 2);
    assert!(second.geo().get_point("Q220").await.unwrap().is_some());

    let fresh = LodCache::new(&config.cache);
    assert!(fresh.is_empty());
}
