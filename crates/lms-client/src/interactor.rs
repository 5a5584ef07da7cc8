//! HTTP implementation of [`AuthInteractor`]
//!
//! Password login uses the OAuth2 password grant on the platform token
//! endpoint; web login hands over a credential the provider already issued.
//! Both paths end by fetching the user profile with the stored token.

use app_core::auth::{self, AuthInteractor, OAuthCredential, User};
use app_core::config::Config;
use async_trait::async_trait;

use crate::http::{ApiClient, ApiClientConfig, ApiRequest, Result};
use crate::token::TokenStore;

/// Token endpoint, relative to the base URL
pub const ACCESS_TOKEN_PATH: &str = "oauth2/access_token/";

/// Current-user endpoint, relative to the base URL
pub const USER_INFO_PATH: &str = "api/mobile/v0.5/my_user_info";

fn user_agent(app_identifier: &str) -> String {
    format!("{}/{}", app_identifier, env!("CARGO_PKG_VERSION"))
}

/// Login exchange against the platform REST API
#[derive(Debug, Clone)]
pub struct HttpAuthInteractor {
    client: ApiClient,
    client_id: String,
    tokens: TokenStore,
}

impl HttpAuthInteractor {
    /// Create an interactor for the platform described by `config`
    ///
    /// The user agent names the app identifier; the configured request
    /// timeout, if any, replaces the client default.
    pub fn new(config: &Config) -> Result<Self> {
        let mut client_config = ApiClientConfig::new(config.base_url().as_str())
            .with_user_agent(user_agent(config.app_identifier()));
        if let Some(timeout) = config.request_timeout() {
            client_config = client_config.with_timeout(timeout);
        }

        let client = ApiClient::new(client_config)?;
        Ok(Self::with_client(client, config.oauth_client_id()))
    }

    /// Create an interactor over an existing client
    pub fn with_client(client: ApiClient, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            tokens: TokenStore::new(),
        }
    }

    /// Share a token store with other API consumers
    pub fn with_token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    /// The token store this interactor writes to
    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    async fn request_password_token(&self, username: &str, password: &str) -> Result<OAuthCredential> {
        let request = ApiRequest::post(ACCESS_TOKEN_PATH)
            .form_field("grant_type", "password")
            .form_field("client_id", &self.client_id)
            .form_field("username", username)
            .form_field("password", password)
            .form_field("token_type", "jwt");

        self.client.send(request).await
    }

    async fn fetch_user(&self) -> Result<User> {
        let mut request = ApiRequest::get(USER_INFO_PATH);
        if let Some(header) = self.tokens.authorization_header() {
            request = request.header("Authorization", header);
        }
        self.client.send(request).await
    }

    /// Store `credential`, then load the user it belongs to
    ///
    /// The token is dropped again when the profile cannot be loaded.
    async fn authenticate(&self, credential: OAuthCredential) -> auth::Result<User> {
        self.tokens.store(credential);

        match self.fetch_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Authenticated");
                Ok(user)
            }
            Err(e) => {
                self.tokens.clear();
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl AuthInteractor for HttpAuthInteractor {
    async fn login(&self, username: &str, password: &str) -> auth::Result<User> {
        tracing::debug!("Requesting password grant token");
        let credential = self.request_password_token(username, password).await?;
        self.authenticate(credential).await
    }

    async fn login_with_credential(&self, credential: &OAuthCredential) -> auth::Result<User> {
        tracing::debug!("Logging in with web credential");
        self.authenticate(credential.clone()).await
    }
}
