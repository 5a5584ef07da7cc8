//! Authentication domain types
//!
//! This module defines the boundary to the collaborator that performs the
//! actual login exchange ([`AuthInteractor`]), the identity it returns, and
//! the classification of its failures into the messages the sign-in screen
//! shows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages;

/// Authentication error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// Server-side field validation failure
    #[error("Validation error: {}", .0.error_description().unwrap_or("no description"))]
    Validation(ValidationPayload),

    /// Credential rejected by the token endpoint
    #[error("Invalid grant")]
    InvalidGrant,

    /// Network unreachable, connection lost or timed out
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Non-success response that carries no recognised payload
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Body of a server validation failure
///
/// The server answers field validation failures with a JSON object; only
/// `error_description` is surfaced to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationPayload {
    data: serde_json::Map<String, serde_json::Value>,
}

impl ValidationPayload {
    /// Wrap a decoded JSON object
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// Payload with only an `error_description` field
    pub fn with_description(description: impl Into<String>) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(
            "error_description".to_string(),
            serde_json::Value::String(description.into()),
        );
        Self { data }
    }

    /// The human-readable description, when present and a string
    pub fn error_description(&self) -> Option<&str> {
        self.data.get("error_description").and_then(|v| v.as_str())
    }

    /// Raw payload
    pub fn data(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.data
    }
}

/// Classified login failure, one per user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// Server validation message, shown verbatim
    ValidationError(String),
    /// Rejected credentials
    InvalidGrant,
    /// Slow or missing connection
    ConnectivityError,
    /// Catch-all
    UnknownError,
}

impl LoginFailure {
    /// Classify an interactor error
    ///
    /// Checks run in priority order: a validation payload with a description
    /// wins over everything, then invalid grant, then connectivity. A
    /// validation payload without a description falls through to
    /// [`LoginFailure::UnknownError`].
    pub fn classify(error: &AuthError) -> Self {
        if let AuthError::Validation(payload) = error {
            if let Some(description) = payload.error_description() {
                return LoginFailure::ValidationError(description.to_string());
            }
        }

        match error {
            AuthError::InvalidGrant => LoginFailure::InvalidGrant,
            AuthError::Connectivity(_) => LoginFailure::ConnectivityError,
            _ => LoginFailure::UnknownError,
        }
    }

    /// Message shown to the user
    pub fn message(&self) -> String {
        match self {
            LoginFailure::ValidationError(description) => description.clone(),
            LoginFailure::InvalidGrant => messages::INVALID_CREDENTIALS.to_string(),
            LoginFailure::ConnectivityError => {
                messages::SLOW_OR_NO_INTERNET_CONNECTION.to_string()
            }
            LoginFailure::UnknownError => messages::UNKNOWN_ERROR.to_string(),
        }
    }
}

impl From<&AuthError> for LoginFailure {
    fn from(error: &AuthError) -> Self {
        LoginFailure::classify(error)
    }
}

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account id
    pub id: u64,
    /// Public username
    pub username: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Full name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Credential issued by the OAuth2 provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredential {
    /// Access token
    pub access_token: String,
    /// Token type as reported by the provider (`Bearer`, `JWT`)
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthCredential {
    /// Bearer credential with no refresh token
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token: None,
            expires_in: None,
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        if self.token_type.eq_ignore_ascii_case("jwt") {
            format!("JWT {}", self.access_token)
        } else {
            format!("Bearer {}", self.access_token)
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for OAuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Collaborator that performs the network login exchange
#[async_trait]
pub trait AuthInteractor: Send + Sync {
    /// Log in with username and password
    async fn login(&self, username: &str, password: &str) -> Result<User>;

    /// Log in with a credential obtained from the web OAuth2 flow
    async fn login_with_credential(&self, credential: &OAuthCredential) -> Result<User>;
}
