//! REST backend over reqwest

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::CrudBackend;
use crate::error::ApiError;
use crate::model::Endpoints;

/// Default timeout for create, update and delete calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for listing a collection.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for an [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: Url,
    pub timeout: Duration,
    pub fetch_timeout: Duration,
    pub connect_timeout: Option<Duration>,
}

impl BackendConfig {
    /// Creates a configuration with default timeouts.
    ///
    /// Fails with [`ApiError::InvalidUrl`] unless `base_url` is an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                base_url,
                parsed.scheme()
            )));
        }
        Ok(Self {
            base_url: parsed,
            timeout: DEFAULT_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            connect_timeout: None,
        })
    }
}

/// CRUD backend talking JSON over HTTP.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use refgrid_lib::backend::HttpBackend;
///
/// let backend = HttpBackend::builder()
///     .url("https://apiv2.medleb.org")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok::<(), refgrid_lib::error::ApiError>(())
/// ```
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    config: BackendConfig,
    http_client: Client,
}

impl HttpBackend {
    /// Creates a new builder for constructing a backend.
    pub fn builder() -> HttpBackendBuilder<Missing> {
        HttpBackendBuilder::new()
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.config.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        log::debug!("{} {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .timeout(timeout)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(timeout)
            } else {
                ApiError::Network(e)
            }
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::http(status, body))
        }
    }
}

/// Reads a response body as JSON. An empty body reads as `null`.
async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));
    let body = response.text().await?;

    if is_html {
        return Err(ApiError::parse_with_body("Received HTML instead of JSON", body));
    }
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body))
}

/// Extracts the record list from a list response.
fn into_records(payload: serde_json::Value) -> Result<Vec<serde_json::Value>, ApiError> {
    match payload {
        serde_json::Value::Array(records) => Ok(records),
        other => Err(ApiError::parse_with_body(
            "Expected an array of records",
            other.to_string(),
        )),
    }
}

#[async_trait]
impl CrudBackend for HttpBackend {
    async fn list(&self, endpoints: &Endpoints) -> Result<Vec<serde_json::Value>, ApiError> {
        let url = self.endpoint_url(&endpoints.list);
        let response = self
            .send(Method::GET, &url, self.inner.config.fetch_timeout, None)
            .await?;
        into_records(read_json(response).await?)
    }

    async fn create(
        &self,
        endpoints: &Endpoints,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint_url(&endpoints.create);
        let response = self
            .send(Method::POST, &url, self.inner.config.timeout, Some(&record))
            .await?;
        read_json(response).await
    }

    async fn update(
        &self,
        endpoints: &Endpoints,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint_url(&endpoints.item_path(id));
        let response = self
            .send(Method::PUT, &url, self.inner.config.timeout, Some(&patch))
            .await?;
        read_json(response).await
    }

    async fn delete(&self, endpoints: &Endpoints, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint_url(&endpoints.item_path(id));
        self.send(Method::DELETE, &url, self.inner.config.timeout, None)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpBackend`].
///
/// Uses the typestate pattern so `build` is only available once `url` is set.
pub struct HttpBackendBuilder<U> {
    url: U,
    timeout: Duration,
    fetch_timeout: Duration,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpBackendBuilder<Missing> {
    /// Creates a new builder with default timeouts.
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: DEFAULT_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> HttpBackendBuilder<Set<String>> {
        HttpBackendBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
            fetch_timeout: self.fetch_timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpBackendBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HttpBackendBuilder<U> {
    /// Sets the timeout for create, update and delete calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout for listing a collection.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpBackendBuilder<Set<String>> {
    /// Builds the [`HttpBackend`], validating the URL.
    pub fn build(self) -> Result<HttpBackend, ApiError> {
        let mut config = BackendConfig::new(&self.url.0)?;
        config.timeout = self.timeout;
        config.fetch_timeout = self.fetch_timeout;
        config.connect_timeout = self.connect_timeout;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = config.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpBackend {
            inner: Arc::new(HttpBackendInner {
                config,
                http_client,
            }),
        })
    }
}
