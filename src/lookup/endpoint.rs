//! SPARQL endpoint descriptions
//!
//! An endpoint is a base URL plus the fixed query parameters it expects next
//! to `query`. Virtuoso (DBpedia) wants the graph, result format and a
//! server-side timeout hint; the Wikidata Query Service only needs `format`.

use serde::{Deserialize, Serialize};

/// Public DBpedia endpoint
pub const DBPEDIA_URL: &str = "https://dbpedia.org/sparql";

/// Public Wikidata Query Service endpoint
pub const WIKIDATA_URL: &str = "https://query.wikidata.org/sparql";

/// Media type of SPARQL 1.1 JSON results
pub const SPARQL_JSON: &str = "application/sparql-results+json";

/// One SPARQL endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Short name used in logs and metrics (`dbpedia`, `wikidata`)
    pub name: String,

    /// Endpoint URL
    pub url: String,

    /// Fixed parameters sent with every query, in order
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

impl EndpointConfig {
    /// Create an endpoint without fixed parameters
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Add a fixed parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Same endpoint at another URL (mock servers, mirrors)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// DBpedia Virtuoso endpoint with its fixed parameters
    pub fn dbpedia() -> Self {
        Self::new("dbpedia", DBPEDIA_URL)
            .with_param("default-graph-uri", "http://dbpedia.org")
            .with_param("format", SPARQL_JSON)
            .with_param("CXML_redir_for_subjs", "121")
            .with_param("CXML_redir_for_hrefs", "")
            .with_param("timeout", "30000")
            .with_param("debug", "on")
            .with_param("run", "Run Query")
    }

    /// Wikidata Query Service endpoint
    pub fn wikidata() -> Self {
        Self::new("wikidata", WIKIDATA_URL).with_param("format", "json")
    }

    /// Query string pairs for `query`, fixed parameters first
    pub fn query_params<'a>(&'a self, query: &'a str) -> Vec<(&'a str, &'a str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("query", query)))
            .collect()
    }
}
