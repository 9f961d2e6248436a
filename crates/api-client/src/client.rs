//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{HazardApi, PlacesApi, RoutingApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Session correlation header
const X_SESSION_ID: &str = "X-Session-ID";

/// HTTP client shared by the hazard, places and routing adapters
///
/// Each request is a single attempt: a failed hazard poll is simply retried
/// on the next tick and route requests are superseded by newer ones.
#[derive(Clone)]
pub struct SafePathClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl SafePathClient {
    /// Create a client with default configuration and environment overrides
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("safepath/", env!("CARGO_PKG_VERSION"))),
        );
        if let Ok(value) = HeaderValue::from_str(safepath_telemetry::session_id()) {
            default_headers.insert(X_SESSION_ID, value);
        }

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access the hazard broadcast endpoints
    #[must_use]
    pub fn hazard(&self) -> HazardApi {
        HazardApi::new(self.clone())
    }

    /// Access the Overpass places lookup
    #[must_use]
    pub fn places(&self) -> PlacesApi {
        PlacesApi::new(self.clone())
    }

    /// Access the OSRM walking-route lookup
    #[must_use]
    pub fn routing(&self) -> RoutingApi {
        RoutingApi::new(self.clone())
    }

    /// Perform a GET request to an absolute URL
    #[instrument(skip(self), fields(request_id))]
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.send_json(Method::GET, url, Option::<&()>::None).await
    }

    /// Perform a POST request with a JSON body to an absolute URL
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post_url<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        self.send_json(Method::POST, url, body).await
    }

    /// Perform a POST request with a plain-text body
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post_text<T: DeserializeOwned>(&self, url: &str, body: String) -> ApiResult<T> {
        let request = self.request_builder(Method::POST, url).body(body);
        let response = self.execute_raw(request).await?;
        self.handle_response(response).await
    }

    /// Build a request builder for custom requests
    pub fn request_builder(&self, method: Method, url: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        self.inner.request(method, url).header(X_REQUEST_ID, request_id)
    }

    /// Execute a request and return the raw response, whatever its status
    pub async fn execute_raw(&self, request: RequestBuilder) -> ApiResult<Response> {
        let start = Instant::now();
        let response = request.send().await?;

        debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self.request_builder(method, url);
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = self.execute_raw(request).await?;
        self.handle_response(response).await
    }

    /// Deserialize a success response or turn the body into an error
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(ApiError::Request)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}

/// Join a base URL and a path with exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
