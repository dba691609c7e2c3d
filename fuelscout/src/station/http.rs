//! HTTP station query service.
//!
//! Talks to the price feed over JSON:
//!
//! ```text
//! GET {base}/stations/nearby?lat=..&lng=..&radius=..&fuel=..&sort=..
//! GET {base}/stations/by-location?district=..&municipality=..&fuel=..&sort=..
//! ```
//!
//! Both endpoints return a JSON array of station records already ordered by
//! the requested sort.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, trace, warn};

use super::service::{AreaQuery, FetchError, NearbyQuery, StationQueryService};
use super::types::{Snapshot, StationRecord};

/// Default request timeout for the price feed.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_USER_AGENT: &str = concat!("fuelscout/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request and returns the response body.
    fn get(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| FetchError::failed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        trace!(url = %url, "HTTP GET request starting");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(
                url = %url,
                error = %e,
                is_connect = e.is_connect(),
                is_timeout = e.is_timeout(),
                "HTTP request failed"
            );
            FetchError::failed(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::failed(format!("HTTP {} from {}", status, url)));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::failed(format!("Failed to read response: {}", e)))
    }
}

/// [`StationQueryService`] backed by the JSON price feed.
#[derive(Debug, Clone)]
pub struct HttpStationService<C = ReqwestClient> {
    client: C,
    base_url: String,
}

impl HttpStationService<ReqwestClient> {
    /// Create a service with a reqwest client using the given timeout.
    pub fn with_reqwest(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, FetchError> {
        Ok(Self::new(ReqwestClient::with_timeout(timeout_secs)?, base_url))
    }
}

impl<C: AsyncHttpClient> HttpStationService<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn nearby_url(&self, query: &NearbyQuery) -> Result<Url, FetchError> {
        let params = [
            ("lat", query.center.latitude.to_string()),
            ("lng", query.center.longitude.to_string()),
            ("radius", query.radius_m.to_string()),
            ("fuel", query.fuel_type.as_str().to_string()),
            ("sort", query.sort.as_str().to_string()),
        ];
        self.endpoint("stations/nearby", &params)
    }

    fn area_url(&self, query: &AreaQuery) -> Result<Url, FetchError> {
        let mut params = vec![("district", query.district.clone())];
        if let Some(ref municipality) = query.municipality {
            params.push(("municipality", municipality.clone()));
        }
        params.push(("fuel", query.fuel_type.as_str().to_string()));
        params.push(("sort", query.sort.as_str().to_string()));
        self.endpoint("stations/by-location", &params)
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        Url::parse_with_params(&format!("{}/{}", self.base_url, path), params)
            .map_err(|e| FetchError::failed(format!("Invalid service URL '{}': {}", self.base_url, e)))
    }

    async fn fetch(&self, url: Url) -> Result<Snapshot, FetchError> {
        let body = self.client.get(&url).await?;
        let records = decode_snapshot(&body)?;
        debug!(url = %url, stations = records.len(), "Station snapshot received");
        Ok(records)
    }
}

impl<C: AsyncHttpClient> StationQueryService for HttpStationService<C> {
    async fn get_nearby(&self, query: &NearbyQuery) -> Result<Snapshot, FetchError> {
        let url = self.nearby_url(query)?;
        self.fetch(url).await
    }

    async fn get_by_location(&self, query: &AreaQuery) -> Result<Snapshot, FetchError> {
        let url = self.area_url(query)?;
        self.fetch(url).await
    }
}

/// Decode a JSON array of station records.
pub fn decode_snapshot(body: &[u8]) -> Result<Snapshot, FetchError> {
    serde_json::from_slice::<Vec<StationRecord>>(body)
        .map(Snapshot::new)
        .map_err(|e| FetchError::failed(format!("Malformed station payload: {}", e)))
}
