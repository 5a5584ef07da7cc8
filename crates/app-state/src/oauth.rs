//! OAuth2 web login session and handshake boundary
//!
//! A web login attempt builds an [`OAuthSession`] from the [`Config`], hands it
//! to an [`OAuthHandshake`] implementation (embedded browser, system auth
//! session, ...) together with a single-use [`WebLoginCompletion`], and then
//! awaits the result on the receiving half. The handshake may complete from
//! any thread; only the awaiting task touches view-model state.

use app_core::auth::OAuthCredential;
use app_core::config::{Config, ConfigError};
use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

/// Authorization endpoint, relative to the base URL
pub const AUTHORIZE_PATH: &str = "oauth2/authorize/";

/// Token endpoint, relative to the base URL
pub const ACCESS_TOKEN_PATH: &str = "oauth2/access_token/";

/// Host part of the redirect URI
pub const CALLBACK_HOST: &str = "oauth2Callback";

/// Authorization-code response type
pub const RESPONSE_TYPE: &str = "code";

/// Errors building an OAuth session
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Endpoint URL could not be derived from the base URL
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// App identifier cannot be used as a URI scheme
    #[error("Invalid callback scheme: '{0}'")]
    InvalidCallbackScheme(String),
}

/// Result type for OAuth session operations
pub type Result<T> = std::result::Result<T, OAuthError>;

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Parameters of one authorization-code attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSession {
    client_id: String,
    authorize_url: Url,
    token_url: Url,
    callback_url: String,
    scope: String,
}

impl OAuthSession {
    /// Derive the session for the platform in `config`
    ///
    /// # Errors
    ///
    /// - `OAuthError::InvalidCallbackScheme` - the app identifier is empty or
    ///   not a valid URI scheme
    /// - `OAuthError::Config` - the endpoints cannot be formed
    pub fn from_config(config: &Config) -> Result<Self> {
        let scheme = config.app_identifier();
        if !is_valid_scheme(scheme) {
            return Err(OAuthError::InvalidCallbackScheme(scheme.to_string()));
        }

        Ok(Self {
            client_id: config.oauth_client_id().to_string(),
            authorize_url: config.endpoint(AUTHORIZE_PATH)?,
            token_url: config.endpoint(ACCESS_TOKEN_PATH)?,
            callback_url: format!("{}://{}", scheme, CALLBACK_HOST),
            scope: String::new(),
        })
    }

    /// OAuth2 client id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Authorization endpoint
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    /// Token endpoint
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Redirect URI the provider sends the code back to
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Requested scope (empty)
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Response type (always `code`)
    pub fn response_type(&self) -> &'static str {
        RESPONSE_TYPE
    }

    /// Authorization URL with the request parameters attached
    pub fn authorization_request_url(&self) -> Url {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("response_type", RESPONSE_TYPE)
            .append_pair("scope", &self.scope);
        url
    }
}

/// Opaque handle to the surface the provider page is presented on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresentationContext(String);

impl PresentationContext {
    /// Wrap a surface identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Surface identifier
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// How a web login attempt resolved
#[derive(Debug, Clone, PartialEq)]
pub enum WebLoginResult {
    /// The provider issued a credential
    Authorized(OAuthCredential),
    /// The provider reported an error
    Failed(String),
    /// The user closed the provider page without a result
    Dismissed,
}

/// Sending half of a web login attempt
///
/// Consumed by the first completion, so an attempt resolves at most once.
/// Dropping it without completing counts as [`WebLoginResult::Dismissed`].
#[derive(Debug)]
pub struct WebLoginCompletion {
    sender: oneshot::Sender<WebLoginResult>,
}

impl WebLoginCompletion {
    /// Create a completion and the receiver the attempt awaits
    pub fn channel() -> (Self, oneshot::Receiver<WebLoginResult>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Resolve the attempt
    pub fn complete(self, result: WebLoginResult) {
        if self.sender.send(result).is_err() {
            tracing::debug!("Web login completion delivered after the attempt was abandoned");
        }
    }

    /// Resolve with a provider credential
    pub fn authorized(self, credential: OAuthCredential) {
        self.complete(WebLoginResult::Authorized(credential));
    }

    /// Resolve with a provider error description
    pub fn failed(self, description: impl Into<String>) {
        self.complete(WebLoginResult::Failed(description.into()));
    }

    /// Resolve as dismissed by the user
    pub fn dismissed(self) {
        self.complete(WebLoginResult::Dismissed);
    }
}

/// Runs the provider's authorization-code flow
pub trait OAuthHandshake: Send + Sync {
    /// Present the provider login page on `context` and start the flow
    ///
    /// Must return promptly; the outcome is reported through `completion`,
    /// from any thread.
    fn authorize(
        &self,
        session: OAuthSession,
        context: PresentationContext,
        completion: WebLoginCompletion,
    );
}
