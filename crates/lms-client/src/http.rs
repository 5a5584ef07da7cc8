//! HTTP client for the learning platform REST API
//!
//! Thin wrapper over `reqwest` that resolves paths against the platform
//! base URL, sends form-encoded requests and maps failures into [`ApiError`].

use app_core::auth::{AuthError, ValidationPayload};
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Platform API error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Request never got a response (connect, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Best available description
        message: String,
        /// Decoded JSON object body, when the server sent one
        body: Option<serde_json::Map<String, serde_json::Value>>,
    },

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is a connectivity problem
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network(_)) || self.status() == Some(408)
    }

    fn body_field(&self, key: &str) -> Option<&str> {
        match self {
            ApiError::Status { body: Some(body), .. } => body.get(key).and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(error: ApiError) -> Self {
        if error.is_network_error() {
            return AuthError::Connectivity(error.to_string());
        }

        let has_description = error.body_field("error_description").is_some();
        let invalid_grant = error.body_field("error") == Some("invalid_grant");

        // A rejected grant often carries its own description; the grant wins.
        match error {
            ApiError::Status { .. } if invalid_grant => AuthError::InvalidGrant,
            ApiError::Status { body: Some(body), .. } if has_description => {
                AuthError::Validation(ValidationPayload::new(body))
            }
            ApiError::Status { status, message, .. } => AuthError::Api { status, message },
            other => AuthError::Unknown(other.to_string()),
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

/// Request against a path under the platform base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL (e.g. "oauth2/access_token/")
    pub path: String,
    /// Form fields (sent url-encoded for POST)
    pub form: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl ApiRequest {
    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            form: Vec::new(),
            headers: HashMap::new(),
        }
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(path)
        }
    }

    /// Add a form field
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Platform base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Campus/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiClientConfig {
    /// Create a config for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
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
}

// =============================================================================
// Client
// =============================================================================

/// Platform API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: ReqwestClient,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Absolute URL for a path
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a request and decode the JSON response
    pub async fn send<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(&request.path);

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }
        if request.method == HttpMethod::Post && !request.form.is_empty() {
            req = req.form(&request.form);
        }

        tracing::debug!(method = ?request.method, path = %request.path, "Sending API request");

        let response = req.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                ApiError::Network(format!("Request failed: {}", e))
            }
        })?;

        self.parse_response(response).await
    }

    async fn parse_response<T>(&self, response: ReqwestResponse) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| match value {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                });

            let message = parsed
                .as_ref()
                .and_then(|map| {
                    map.get("error_description")
                        .or_else(|| map.get("error"))
                        .or_else(|| map.get("detail"))
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

            tracing::warn!(status = status.as_u16(), "API request failed: {}", message);

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
                body: parsed,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}
