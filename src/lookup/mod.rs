//! SPARQL endpoint access
//!
//! - [`EndpointConfig`]: URL plus fixed parameters of one endpoint
//! - [`SparqlSource`]: the seam services depend on
//! - [`SparqlClient`]: the HTTP implementation, rate limited with `governor`

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{SparqlClient, SparqlSource};
pub use endpoint::EndpointConfig;
pub use error::LookupError;

use serde::{Deserialize, Serialize};

/// Settings shared by all SPARQL clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Requests per second per endpoint
    pub requests_per_second: u32,

    /// User-Agent header (Wikidata rejects anonymous clients)
    pub user_agent: String,

    /// Client-side timeout in seconds (None: rely on the server-side hint)
    pub timeout_secs: Option<u64>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            user_agent: format!("lodgeo/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: None,
        }
    }
}
