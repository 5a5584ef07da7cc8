//! Sign-in view-model
//!
//! [`SignInViewModel`] owns the observable [`SignInState`] of the sign-in
//! screen and drives both login paths:
//!
//! - native login: validate fields locally, then exchange username and
//!   password through the [`AuthInteractor`];
//! - web login: run the provider flow through the [`OAuthHandshake`], then
//!   exchange the issued credential through the same interactor.
//!
//! Every failure ends as a user-facing message in the state; nothing
//! propagates to the caller. At most one login runs at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use app_state::{PresentationContext, SignInViewModel};
//!
//! async fn render_loop(view_model: &SignInViewModel) {
//!     let mut state = view_model.subscribe();
//!
//!     // Starts the web flow once when it is mandatory.
//!     view_model.on_screen_entered(PresentationContext::new("main-window")).await;
//!
//!     while state.changed().await.is_ok() {
//!         let snapshot = state.borrow().clone();
//!         if let Some(message) = &snapshot.error_message {
//!             println!("error: {message}");
//!         }
//!     }
//! }
//! ```

use app_core::analytics::{AuthorizationAnalytics, LoginMethod};
use app_core::auth::{self, AuthInteractor, LoginFailure, User};
use app_core::config::Config;
use app_core::messages;
use app_core::router::AuthorizationRouter;
use app_core::validator::Validator;
use std::sync::Arc;
use tokio::sync::watch;

use crate::oauth::{OAuthHandshake, OAuthSession, PresentationContext, WebLoginCompletion, WebLoginResult};

/// Where the sign-in flow is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInPhase {
    /// Waiting for user input
    #[default]
    Idle,
    /// Provider page is presented; waiting for its result
    AwaitingWebLogin,
    /// Login exchange in flight
    Submitting,
    /// Logged in and navigated away
    Authenticated,
}

impl SignInPhase {
    /// Whether a login attempt is in progress
    pub fn is_busy(&self) -> bool {
        matches!(self, SignInPhase::AwaitingWebLogin | SignInPhase::Submitting)
    }
}

/// Observable state of the sign-in screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInState {
    /// Current phase
    pub phase: SignInPhase,
    /// An interactor call is in flight
    pub is_loading: bool,
    /// Error shown in the snackbar
    pub error_message: Option<String>,
    /// Snackbar visibility
    pub show_error: bool,
    /// Informational alert
    pub alert_message: Option<String>,
    /// Alert visibility
    pub show_alert: bool,
    /// A web login attempt has resolved at least once
    pub web_login_attempted: bool,
}

impl SignInState {
    fn set_error_message(&mut self, message: Option<String>) {
        self.show_error = message.is_some();
        self.error_message = message;
    }

    fn set_alert_message(&mut self, message: Option<String>) {
        self.show_alert = message.is_some();
        self.alert_message = message;
    }

    fn settle(&mut self, phase: SignInPhase) {
        self.phase = phase;
        self.is_loading = false;
    }
}

/// Returns a busy phase to `Idle` when an attempt is dropped mid-flight
struct AttemptGuard<'a> {
    state: &'a watch::Sender<SignInState>,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        let abandoned = self.state.send_if_modified(|state| {
            if !state.phase.is_busy() {
                return false;
            }
            state.settle(SignInPhase::Idle);
            true
        });
        if abandoned {
            tracing::debug!("Login attempt abandoned before it resolved");
        }
    }
}

/// View-model of the sign-in screen
pub struct SignInViewModel {
    interactor: Arc<dyn AuthInteractor>,
    router: Arc<dyn AuthorizationRouter>,
    analytics: Arc<dyn AuthorizationAnalytics>,
    handshake: Arc<dyn OAuthHandshake>,
    config: Arc<Config>,
    validator: Validator,
    state: watch::Sender<SignInState>,
}

impl SignInViewModel {
    /// Create a view-model wired to its collaborators
    pub fn new(
        interactor: Arc<dyn AuthInteractor>,
        router: Arc<dyn AuthorizationRouter>,
        analytics: Arc<dyn AuthorizationAnalytics>,
        handshake: Arc<dyn OAuthHandshake>,
        config: Arc<Config>,
        validator: Validator,
    ) -> Self {
        let (state, _) = watch::channel(SignInState::default());
        Self {
            interactor,
            router,
            analytics,
            handshake,
            config,
            validator,
            state,
        }
    }

    // =========================================================================
    // Observable state
    // =========================================================================

    /// Snapshot of the current state
    pub fn state(&self) -> SignInState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SignInState> {
        self.state.subscribe()
    }

    /// Configuration the view-model was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the native form must be bypassed for the web flow
    ///
    /// True while web login is enabled and no attempt has resolved yet.
    pub fn force_web_login(&self) -> bool {
        self.config.web_login() && !self.state.borrow().web_login_attempted
    }

    /// Whether an interactor call is in flight
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Current error message
    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error_message.clone()
    }

    /// Current alert message
    pub fn alert_message(&self) -> Option<String> {
        self.state.borrow().alert_message.clone()
    }

    /// Set or clear the error message, toggling its visibility
    pub fn set_error_message(&self, message: Option<String>) {
        self.state.send_modify(|state| state.set_error_message(message));
    }

    /// Set or clear the alert message, toggling its visibility
    pub fn set_alert_message(&self, message: Option<String>) {
        self.state.send_modify(|state| state.set_alert_message(message));
    }

    /// Clear the error message if it is still `expected`
    ///
    /// Returns whether it was cleared.
    pub fn clear_error_message_if(&self, expected: &str) -> bool {
        self.state.send_if_modified(|state| {
            if state.error_message.as_deref() == Some(expected) {
                state.set_error_message(None);
                true
            } else {
                false
            }
        })
    }

    /// Clear the alert message if it is still `expected`
    ///
    /// Returns whether it was cleared.
    pub fn clear_alert_message_if(&self, expected: &str) -> bool {
        self.state.send_if_modified(|state| {
            if state.alert_message.as_deref() == Some(expected) {
                state.set_alert_message(None);
                true
            } else {
                false
            }
        })
    }

    // =========================================================================
    // Navigation actions
    // =========================================================================

    /// The user chose to register
    pub fn sign_up(&self) {
        self.analytics.sign_up_clicked();
        self.router.show_register_screen();
    }

    /// The user asked to recover their password
    pub fn forgot_password(&self) {
        self.analytics.forgot_password_clicked();
        self.router.show_forgot_password_screen();
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Screen-entered event
    ///
    /// Starts the web flow when it is mandatory and has not been tried yet.
    /// Returns whether an attempt was started; repeated calls after the
    /// first never start another one.
    pub async fn on_screen_entered(&self, context: PresentationContext) -> bool {
        if !self.config.web_login() {
            return false;
        }

        let started = self.state.send_if_modified(|state| {
            if state.web_login_attempted || state.phase != SignInPhase::Idle {
                return false;
            }
            state.phase = SignInPhase::AwaitingWebLogin;
            true
        });

        if started {
            tracing::info!(context = context.id(), "Web login is mandatory, starting provider flow");
            self.run_web_login(context).await;
        }
        started
    }

    /// Native login with username and password
    ///
    /// Ignored while another login is in flight. Field validation failures
    /// set the matching message and never reach the interactor.
    pub async fn login_with_credentials(&self, username: &str, password: &str) {
        if self.state.borrow().phase.is_busy() {
            tracing::debug!("Login already in flight, ignoring submit");
            return;
        }

        if !self.validator.is_valid_email(username) {
            self.set_error_message(Some(messages::INVALID_EMAIL_ADDRESS.to_string()));
            return;
        }
        if !self.validator.is_valid_password(password) {
            self.set_error_message(Some(messages::INVALID_PASSWORD_LENGTH.to_string()));
            return;
        }

        if !self.begin(SignInPhase::Submitting) {
            tracing::debug!("Login already in flight, ignoring submit");
            return;
        }

        let _attempt = AttemptGuard { state: &self.state };
        tracing::debug!("Submitting native login");
        let result = self.interactor.login(username, password).await;
        self.finish_login(result, LoginMethod::Password);
    }

    /// Web login through the OAuth2 provider
    ///
    /// Ignored while another login is in flight.
    pub async fn login_with_web_oauth(&self, context: PresentationContext) {
        if !self.begin(SignInPhase::AwaitingWebLogin) {
            tracing::debug!("Login already in flight, ignoring web login");
            return;
        }
        self.run_web_login(context).await;
    }

    /// Atomically move from a non-busy phase into `phase`
    fn begin(&self, phase: SignInPhase) -> bool {
        self.state.send_if_modified(|state| {
            if state.phase.is_busy() {
                return false;
            }
            state.phase = phase;
            state.is_loading = phase == SignInPhase::Submitting;
            true
        })
    }

    /// Run one web attempt; the phase is already `AwaitingWebLogin`
    async fn run_web_login(&self, context: PresentationContext) {
        let _attempt = AttemptGuard { state: &self.state };

        let session = match OAuthSession::from_config(&self.config) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Cannot start web login: {}", e);
                self.state.send_modify(|state| {
                    state.web_login_attempted = true;
                    state.settle(SignInPhase::Idle);
                    state.set_error_message(Some(e.to_string()));
                });
                return;
            }
        };

        let (completion, receiver) = WebLoginCompletion::channel();
        self.handshake.authorize(session, context, completion);

        // A completion dropped without a result means the page went away.
        let result = receiver.await.unwrap_or(WebLoginResult::Dismissed);

        match result {
            WebLoginResult::Dismissed => {
                tracing::info!("Web login dismissed");
                self.state.send_modify(|state| {
                    state.web_login_attempted = true;
                    state.settle(SignInPhase::Idle);
                });
            }
            WebLoginResult::Failed(description) => {
                tracing::warn!("Web login failed: {}", description);
                self.state.send_modify(|state| {
                    state.web_login_attempted = true;
                    state.settle(SignInPhase::Idle);
                    state.set_error_message(Some(description));
                });
            }
            WebLoginResult::Authorized(credential) => {
                self.state.send_modify(|state| {
                    state.web_login_attempted = true;
                    state.phase = SignInPhase::Submitting;
                    state.is_loading = true;
                });
                let result = self.interactor.login_with_credential(&credential).await;
                self.finish_login(result, LoginMethod::Oauth2);
            }
        }
    }

    fn finish_login(&self, result: auth::Result<User>, method: LoginMethod) {
        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, method = %method, "Login succeeded");
                self.analytics.set_user_id(&user.id.to_string());
                self.analytics.user_login(method);
                self.router.show_main_screen();
                self.state
                    .send_modify(|state| state.settle(SignInPhase::Authenticated));
            }
            Err(error) => {
                let failure = LoginFailure::classify(&error);
                tracing::warn!(method = %method, "Login failed: {}", error);
                self.state.send_modify(|state| {
                    state.settle(SignInPhase::Idle);
                    state.set_error_message(Some(failure.message()));
                });
            }
        }
    }
}
