//! Rate-limited SPARQL client
//!
//! One HTTP GET per call, no retry and no backoff. A transport failure or a
//! non-2xx status is handed back to the caller, which decides whether to
//! skip, retry or fail that one lookup.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use super::endpoint::{EndpointConfig, SPARQL_JSON};
use super::error::LookupError;
use super::LookupConfig;
use crate::metrics::{default_observer, LodEvent, LodObserver};
use crate::sparql::QueryResult;

/// Anything that answers SPARQL queries
#[async_trait]
pub trait SparqlSource: Send + Sync {
    /// Short name used in logs and metrics
    fn name(&self) -> &str;

    /// Run `query` and return its result set
    async fn fetch(&self, query: &str) -> Result<QueryResult, LookupError>;
}

/// HTTP client bound to one endpoint
pub struct SparqlClient {
    /// HTTP client with default headers and compression
    client: Client,

    endpoint: EndpointConfig,

    /// Spaces requests to stay polite with public endpoints
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    observer: Arc<dyn LodObserver>,
}

impl std::fmt::Debug for SparqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SparqlClient {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns `LookupError::InvalidUrl` for an unparseable endpoint URL and
    /// `LookupError::Http` if the HTTP client cannot be created
    pub fn new(endpoint: EndpointConfig, config: &LookupConfig) -> Result<Self, LookupError> {
        Self::with_observer(endpoint, config, default_observer())
    }

    /// Create a client reporting requests to `observer`
    pub fn with_observer(
        endpoint: EndpointConfig,
        config: &LookupConfig,
        observer: Arc<dyn LodObserver>,
    ) -> Result<Self, LookupError> {
        Url::parse(&endpoint.url)
            .map_err(|e| LookupError::InvalidUrl(format!("{}: {e}", endpoint.url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_JSON));
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| LookupError::InvalidHeader(format!("user agent: {e}")))?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = Client::builder().default_headers(headers).gzip(true);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            endpoint,
            rate_limiter,
            observer,
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    fn completed(&self, status: Option<u16>, started: Instant) {
        self.observer.record(&LodEvent::RequestCompleted {
            endpoint: &self.endpoint.name,
            status,
            elapsed: started.elapsed(),
        });
    }
}

#[async_trait]
impl SparqlSource for SparqlClient {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    async fn fetch(&self, query: &str) -> Result<QueryResult, LookupError> {
        self.rate_limiter.until_ready().await;

        let started = Instant::now();
        let response = self
            .client
            .get(&self.endpoint.url)
            .query(&self.endpoint.query_params(query))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.completed(None, started);
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.completed(Some(status.as_u16()), started);
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await;
        self.completed(Some(status.as_u16()), started);
        let body = body?;

        let result =
            QueryResult::from_json(&body).map_err(|e| LookupError::Decode(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.endpoint.name,
            rows = result.bindings().len(),
            "SPARQL query answered"
        );

        Ok(result)
    }
}
