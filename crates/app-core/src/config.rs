//! Process configuration and build-environment selection
//!
//! A [`Config`] is resolved once at startup from a [`BuildConfiguration`]
//! and then shared by reference (`Arc<Config>`) with every consumer. Nothing
//! in the crate reads configuration from a global.
//!
//! # Example
//!
//! ```rust
//! use app_core::config::{BuildConfiguration, Environment};
//!
//! let build = BuildConfiguration::from_json(r#"{
//!     "environment": "DebugStage",
//!     "web_login": true,
//!     "app_identifier": "org.campus.mobile",
//!     "profiles": {
//!         "stage": { "base_url": "https://stage.campus.example", "oauth_client_id": "stage-client" }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(build.environment, Environment::DebugStage);
//! let config = build.resolve().unwrap();
//! assert_eq!(config.oauth_client_id(), "stage-client");
//! assert!(config.web_login());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Process variable that overrides the configured environment
pub const ENVIRONMENT_VAR: &str = "CAMPUS_ENVIRONMENT";

/// App identifier used when none is configured
pub const DEFAULT_APP_IDENTIFIER: &str = "org.campus.mobile";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL field could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// The offending value
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },

    /// Environment name is not one of the known build environments
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// No profile for the tier of the selected environment
    #[error("No profile configured for the {0} tier")]
    MissingProfile(Tier),

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`BuildConfiguration`]
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

fn parse_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        url: value.to_string(),
        source,
    })
}

// =============================================================================
// Config
// =============================================================================

/// Immutable process-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: Url,
    oauth_client_id: String,
    web_login: bool,
    app_identifier: String,
    terms_of_use: Option<Url>,
    privacy_policy: Option<Url>,
    feedback_email: Option<String>,
    request_timeout: Option<Duration>,
}

impl Config {
    /// Create a config for a platform instance
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidUrl` - `base_url` is not an absolute URL
    pub fn new(base_url: &str, oauth_client_id: impl Into<String>, web_login: bool) -> Result<Self> {
        Ok(Self {
            base_url: parse_url(base_url)?,
            oauth_client_id: oauth_client_id.into(),
            web_login,
            app_identifier: DEFAULT_APP_IDENTIFIER.to_string(),
            terms_of_use: None,
            privacy_policy: None,
            feedback_email: None,
            request_timeout: None,
        })
    }

    /// Set the app identifier (used as the OAuth redirect scheme)
    pub fn with_app_identifier(mut self, app_identifier: impl Into<String>) -> Self {
        self.app_identifier = app_identifier.into();
        self
    }

    /// Set the terms-of-use link
    pub fn with_terms_of_use(mut self, url: &str) -> Result<Self> {
        self.terms_of_use = Some(parse_url(url)?);
        Ok(self)
    }

    /// Set the privacy policy link
    pub fn with_privacy_policy(mut self, url: &str) -> Result<Self> {
        self.privacy_policy = Some(parse_url(url)?);
        Ok(self)
    }

    /// Set the feedback address
    pub fn with_feedback_email(mut self, email: impl Into<String>) -> Self {
        self.feedback_email = Some(email.into());
        self
    }

    /// Bound every platform request by `timeout`
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Platform base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// OAuth2 client id registered for the app
    pub fn oauth_client_id(&self) -> &str {
        &self.oauth_client_id
    }

    /// Whether sign-in must go through the provider's web page
    pub fn web_login(&self) -> bool {
        self.web_login
    }

    /// App identifier (bundle id)
    pub fn app_identifier(&self) -> &str {
        &self.app_identifier
    }

    /// Terms-of-use link
    pub fn terms_of_use(&self) -> Option<&Url> {
        self.terms_of_use.as_ref()
    }

    /// Privacy policy link
    pub fn privacy_policy(&self) -> Option<&Url> {
        self.privacy_policy.as_ref()
    }

    /// Feedback address
    pub fn feedback_email(&self) -> Option<&str> {
        self.feedback_email.as_deref()
    }

    /// Request timeout, when one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Resolve `path` under the base URL
    ///
    /// Unlike [`Url::join`], any path already on the base URL is kept:
    /// `https://host/lms` + `oauth2/authorize/` gives
    /// `https://host/lms/oauth2/authorize/`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        parse_url(&joined)
    }
}

// =============================================================================
// Environments
// =============================================================================

/// Deployment tier an environment points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Development servers
    Dev,
    /// Staging servers
    Stage,
    /// Production
    Prod,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Dev => "dev",
            Tier::Stage => "stage",
            Tier::Prod => "prod",
        })
    }
}

/// Build environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// Debug build against dev
    DebugDev,
    /// Release build against dev
    ReleaseDev,
    /// Debug build against stage
    DebugStage,
    /// Release build against stage
    ReleaseStage,
    /// Debug build against production
    DebugProd,
    /// Release build against production
    ReleaseProd,
}

impl Environment {
    /// All environments
    pub fn all() -> [Environment; 6] {
        [
            Environment::DebugDev,
            Environment::ReleaseDev,
            Environment::DebugStage,
            Environment::ReleaseStage,
            Environment::DebugProd,
            Environment::ReleaseProd,
        ]
    }

    /// Name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::DebugDev => "DebugDev",
            Environment::ReleaseDev => "ReleaseDev",
            Environment::DebugStage => "DebugStage",
            Environment::ReleaseStage => "ReleaseStage",
            Environment::DebugProd => "DebugProd",
            Environment::ReleaseProd => "ReleaseProd",
        }
    }

    /// Server tier
    pub fn tier(&self) -> Tier {
        match self {
            Environment::DebugDev | Environment::ReleaseDev => Tier::Dev,
            Environment::DebugStage | Environment::ReleaseStage => Tier::Stage,
            Environment::DebugProd | Environment::ReleaseProd => Tier::Prod,
        }
    }

    /// Whether this is a debug build
    pub fn is_debug(&self) -> bool {
        matches!(
            self,
            Environment::DebugDev | Environment::DebugStage | Environment::DebugProd
        )
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Environment::all()
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownEnvironment(s.to_string()))
    }
}

/// Server settings for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    /// Platform base URL
    pub base_url: String,
    /// OAuth2 client id
    pub oauth_client_id: String,
}

/// Build-time configuration covering every environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// Selected environment
    pub environment: Environment,
    /// Force the web login flow
    #[serde(default)]
    pub web_login: bool,
    /// App identifier (bundle id)
    #[serde(default = "default_app_identifier")]
    pub app_identifier: String,
    /// Server settings per tier
    pub profiles: HashMap<Tier, EnvironmentProfile>,
    /// Terms-of-use link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_use: Option<String>,
    /// Privacy policy link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy: Option<String>,
    /// Feedback address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_email: Option<String>,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_app_identifier() -> String {
    DEFAULT_APP_IDENTIFIER.to_string()
}

impl BuildConfiguration {
    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let build = Self::from_json(&contents)?;
        tracing::debug!(
            "Loaded build configuration from {} ({})",
            path.display(),
            build.environment
        );
        Ok(build)
    }

    /// Replace the environment with `value` when one is given
    pub fn override_environment(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(value) = value {
            let environment: Environment = value.parse()?;
            if environment != self.environment {
                tracing::info!(
                    "Environment overridden: {} -> {}",
                    self.environment,
                    environment
                );
            }
            self.environment = environment;
        }
        Ok(self)
    }

    /// Apply the [`ENVIRONMENT_VAR`] override from the process environment
    pub fn with_environment_from_env(self) -> Result<Self> {
        let value = std::env::var(ENVIRONMENT_VAR).ok();
        self.override_environment(value.as_deref())
    }

    /// Resolve the [`Config`] for the selected environment
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingProfile` - no profile for the environment's tier
    /// - `ConfigError::InvalidUrl` - a configured URL does not parse
    pub fn resolve(&self) -> Result<Config> {
        let tier = self.environment.tier();
        let profile = self
            .profiles
            .get(&tier)
            .ok_or(ConfigError::MissingProfile(tier))?;

        let mut config = Config::new(&profile.base_url, &profile.oauth_client_id, self.web_login)?
            .with_app_identifier(&self.app_identifier);

        if let Some(url) = &self.terms_of_use {
            config = config.with_terms_of_use(url)?;
        }
        if let Some(url) = &self.privacy_policy {
            config = config.with_privacy_policy(url)?;
        }
        if let Some(email) = &self.feedback_email {
            config = config.with_feedback_email(email);
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        tracing::info!(
            environment = %self.environment,
            base_url = %config.base_url(),
            web_login = config.web_login(),
            "Configuration resolved"
        );

        Ok(config)
    }
}
