//! HTTP client implementation
//!
//! Thin JSON-over-HTTP client for the GoBarber backend. Requests are built
//! against a configured base URL, carry the default headers plus the current
//! bearer token (if any), and non-success responses are mapped onto
//! [`ApiError::Status`] using the backend's `{ status, message }` error body.

use parking_lot::RwLock;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{ApiError, Result};

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiClientConfig {
    /// Base service URL (e.g., "http://localhost:3333")
    pub base_url: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3333".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("GoBarber-Client/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// =============================================================================
// Error Response Format
// =============================================================================

/// Error body returned by the backend, e.g.
/// `{"status":"error","message":"Incorrect email/password combination."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always "error" for application errors
    #[serde(default)]
    pub status: String,
    /// Human-readable message
    pub message: String,
}

// =============================================================================
// Client Implementation
// =============================================================================

/// HTTP client for the GoBarber backend
///
/// Cloning is cheap; clones share the connection pool and the bearer token.
///
/// # Examples
/// ```no_run
/// use api_client::{ApiClient, ApiClientConfig};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ApiClient::new(ApiClientConfig::new("http://localhost:3333"))?;
///     client.set_token(Some("token-123".to_string()));
///     let appointments: serde_json::Value = client.get("appointments/me").await?;
///     println!("{appointments}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(config.base_url));
        }

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config, token: Arc::new(RwLock::new(None)) })
    }

    /// Set or clear the bearer token sent with every request
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// The bearer token currently attached to requests
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Make a GET request and decode the JSON response
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.url(path));
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    /// Make a POST request with a JSON body and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    /// Make a POST request with a JSON body, discarding the response body
    pub async fn post_no_content<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.send(request).await?;
        Ok(())
    }

    /// Build the absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach headers, execute, and map error statuses
    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<ReqwestResponse> {
        for (key, value) in &self.config.default_headers {
            request = request.header(key, value);
        }

        let token = self.token.read().clone();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error_body) => error_body.message,
            Err(_) => format!("HTTP {}: {}", status.as_u16(), body),
        };

        tracing::debug!(status = status.as_u16(), %message, "request failed");
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    async fn decode<T>(response: ReqwestResponse) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Get the client configuration
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}
