//! Configuration management for lodgeo
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every section has defaults, so a file only needs
//! the values it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::CacheConfig;
use crate::lookup::{EndpointConfig, LookupConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SPARQL endpoints
    pub endpoints: EndpointsConfig,

    /// HTTP client settings
    pub lookup: LookupConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Endpoint per data source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub dbpedia: EndpointConfig,
    pub wikidata: EndpointConfig,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            dbpedia: EndpointConfig::dbpedia(),
            wikidata: EndpointConfig::wikidata(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup, `LODGEO_*` names
    ///
    /// Unset variables keep their defaults; set but unparseable ones are
    /// rejected.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = var("LODGEO_DBPEDIA_URL") {
            config.endpoints.dbpedia.url = url;
        }
        if let Some(url) = var("LODGEO_WIKIDATA_URL") {
            config.endpoints.wikidata.url = url;
        }

        if let Some(rps) = var("LODGEO_REQUESTS_PER_SECOND") {
            config.lookup.requests_per_second = rps
                .parse()
                .with_context(|| format!("Invalid LODGEO_REQUESTS_PER_SECOND: {rps}"))?;
        }
        if let Some(user_agent) = var("LODGEO_USER_AGENT") {
            config.lookup.user_agent = user_agent;
        }
        if let Some(secs) = var("LODGEO_TIMEOUT_SECS") {
            config.lookup.timeout_secs = Some(
                secs.parse()
                    .with_context(|| format!("Invalid LODGEO_TIMEOUT_SECS: {secs}"))?,
            );
        }

        if let Some(namespace) = var("LODGEO_CACHE_NAMESPACE") {
            config.cache.namespace = namespace;
        }
        if let Some(ttl) = var("LODGEO_NEGATIVE_TTL_SECS") {
            config.cache.negative_ttl_secs = match ttl.to_ascii_lowercase().as_str() {
                "never" | "none" => None,
                _ => Some(
                    ttl.parse()
                        .with_context(|| format!("Invalid LODGEO_NEGATIVE_TTL_SECS: {ttl}"))?,
                ),
            };
        }
        if let Some(path) = var("LODGEO_CACHE_PATH") {
            config.cache.persist_path = Some(PathBuf::from(path));
        }

        if let Some(level) = var("LODGEO_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = var("LODGEO_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for endpoint in [&self.endpoints.dbpedia, &self.endpoints.wikidata] {
            url::Url::parse(&endpoint.url)
                .with_context(|| format!("Invalid {} endpoint URL: {}", endpoint.name, endpoint.url))?;
        }

        if self.lookup.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.lookup.user_agent.trim().is_empty() {
            anyhow::bail!("user_agent must not be empty");
        }

        if self.lookup.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than 0 when set");
        }

        if self.cache.namespace.is_empty() {
            anyhow::bail!("cache namespace must not be empty");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        Ok(())
    }
}
