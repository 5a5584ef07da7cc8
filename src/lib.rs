//! Campus sign-in module
//!
//! Composition root: resolves the configuration for the selected
//! environment, builds the HTTP interactor, the router and the analytics
//! sink, and hands them to the sign-in view-model.
//!
//! # Example
//!
//! ```rust,no_run
//! use app_state::{OAuthHandshake, OAuthSession, PresentationContext, WebLoginCompletion};
//! use campus::AuthModule;
//! use std::sync::Arc;
//!
//! struct SystemBrowser;
//!
//! impl OAuthHandshake for SystemBrowser {
//!     fn authorize(&self, session: OAuthSession, _: PresentationContext, completion: WebLoginCompletion) {
//!         println!("open {}", session.authorization_request_url());
//!         completion.dismissed();
//!     }
//! }
//!
//! # async fn run() -> campus::Result<()> {
//! let module = AuthModule::bootstrap("config/campus.json", Arc::new(SystemBrowser))?;
//! let mut screen = module.sign_in_screen(PresentationContext::new("main-window"));
//! screen.on_appear().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use app_core::analytics::{AuthorizationAnalytics, TracingAnalytics};
use app_core::config::{BuildConfiguration, Config, ConfigError};
use app_core::logging;
use app_core::validator::Validator;
use app_state::{OAuthHandshake, PresentationContext, SignInViewModel};
use app_ui::{NavigationRouter, SignInScreen};
use lms_client::{ApiError, HttpAuthInteractor, TokenStore};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors assembling the module
#[derive(Debug, Error)]
pub enum CampusError {
    /// Configuration could not be loaded or resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
}

/// Result type for module assembly
pub type Result<T> = std::result::Result<T, CampusError>;

/// The assembled sign-in module
pub struct AuthModule {
    config: Arc<Config>,
    interactor: Arc<HttpAuthInteractor>,
    router: NavigationRouter,
    view_model: Arc<SignInViewModel>,
}

impl AuthModule {
    /// Install logging, load the build configuration at `path`, apply the
    /// environment override and assemble the module
    pub fn bootstrap(path: impl AsRef<Path>, handshake: Arc<dyn OAuthHandshake>) -> Result<Self> {
        logging::init(logging::DEFAULT_FILTER);

        let build = BuildConfiguration::load(path)?.with_environment_from_env()?;
        Self::from_build_configuration(&build, handshake)
    }

    /// Assemble from a build configuration
    pub fn from_build_configuration(
        build: &BuildConfiguration,
        handshake: Arc<dyn OAuthHandshake>,
    ) -> Result<Self> {
        Self::new(build.resolve()?, handshake)
    }

    /// Assemble from a resolved configuration with tracing analytics
    pub fn new(config: Config, handshake: Arc<dyn OAuthHandshake>) -> Result<Self> {
        Self::with_analytics(config, handshake, Arc::new(TracingAnalytics))
    }

    /// Assemble with a custom analytics sink
    pub fn with_analytics(
        config: Config,
        handshake: Arc<dyn OAuthHandshake>,
        analytics: Arc<dyn AuthorizationAnalytics>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let interactor = Arc::new(HttpAuthInteractor::new(&config)?);
        let router = NavigationRouter::new();

        let view_model = Arc::new(SignInViewModel::new(
            Arc::clone(&interactor) as _,
            Arc::new(router.clone()),
            analytics,
            handshake,
            Arc::clone(&config),
            Validator::new(),
        ));

        tracing::debug!(base_url = %config.base_url(), "Sign-in module assembled");

        Ok(Self {
            config,
            interactor,
            router,
            view_model,
        })
    }

    /// Resolved configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared view-model
    pub fn view_model(&self) -> &Arc<SignInViewModel> {
        &self.view_model
    }

    /// Router the view-model navigates with
    pub fn router(&self) -> &NavigationRouter {
        &self.router
    }

    /// Token store filled by successful logins
    pub fn token_store(&self) -> &TokenStore {
        self.interactor.token_store()
    }

    /// Driver for a sign-in screen presented on `context`
    pub fn sign_in_screen(&self, context: PresentationContext) -> SignInScreen {
        SignInScreen::new(Arc::clone(&self.view_model), context)
    }
}
