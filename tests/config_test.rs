//! Tests for config module

use lodgeo::config::Config;
use lodgeo::lookup::EndpointConfig;
use std::path::{Path, PathBuf};

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_sample_config_matches_defaults() {
    let config = Config::from_file(Path::new("config.toml")).expect("config.toml should parse");

    assert!(config.validate().is_ok());
    assert_eq!(config.endpoints.dbpedia, EndpointConfig::dbpedia());
    assert_eq!(config.endpoints.wikidata, EndpointConfig::wikidata());
    assert_eq!(config.cache.negative_ttl_secs, Some(86400));
    assert_eq!(
        config.cache.persist_path,
        Some(PathBuf::from("data/lod-cache.json"))
    );
    assert!(config.lookup.timeout_secs.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lodgeo.toml");
    std::fs::write(
        &path,
        r#"
[cache]
namespace = "staging"

[logging]
format = "json"
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.cache.namespace, "staging");
    assert_eq!(config.cache.negative_ttl_secs, Some(86400));
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.endpoints.dbpedia, EndpointConfig::dbpedia());
}

#[test]
fn test_invalid_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[lookup\nrequests_per_second = ").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_missing_file() {
    assert!(Config::from_file(Path::new("does/not/exist.toml")).is_err());
}
