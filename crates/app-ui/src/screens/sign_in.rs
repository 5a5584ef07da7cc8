//! Sign-in screen driver

use app_state::{PresentationContext, SignInState, SignInViewModel};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::Instant;

/// How long an error or alert stays on screen
pub const SNACKBAR_TIMEOUT: Duration = Duration::from_secs(5);

/// Message currently on screen and when it goes away
#[derive(Debug)]
struct Shown {
    message: String,
    deadline: Instant,
}

fn track(shown: &mut Option<Shown>, current: Option<&str>, timeout: Duration) {
    match current {
        None => *shown = None,
        Some(message) => {
            if shown.as_ref().map(|s| s.message.as_str()) != Some(message) {
                *shown = Some(Shown {
                    message: message.to_string(),
                    deadline: Instant::now() + timeout,
                });
            }
        }
    }
}

fn is_due(shown: &Option<Shown>, now: Instant) -> Option<String> {
    shown
        .as_ref()
        .filter(|s| s.deadline <= now)
        .map(|s| s.message.clone())
}

async fn run_snackbar(
    view_model: Arc<SignInViewModel>,
    mut state: watch::Receiver<SignInState>,
    timeout: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut error: Option<Shown> = None;
    let mut alert: Option<Shown> = None;

    loop {
        {
            let snapshot = state.borrow_and_update();
            track(&mut error, snapshot.error_message.as_deref(), timeout);
            track(&mut alert, snapshot.alert_message.as_deref(), timeout);
        }

        let deadline = [&error, &alert]
            .into_iter()
            .filter_map(|shown| shown.as_ref().map(|s| s.deadline))
            .min();
        let expiry = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = &mut stop_rx => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = expiry => {
                let now = Instant::now();
                if let Some(message) = is_due(&error, now) {
                    view_model.clear_error_message_if(&message);
                    error = None;
                }
                if let Some(message) = is_due(&alert, now) {
                    view_model.clear_alert_message_if(&message);
                    alert = None;
                }
            }
        }
    }

    tracing::debug!("Snackbar task stopped");
}

/// Handle for the snackbar task
///
/// When dropped, the task is stopped.
#[derive(Debug)]
pub struct SnackbarHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl SnackbarHandle {
    /// Start clearing messages of `view_model` after `timeout`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(view_model: Arc<SignInViewModel>, timeout: Duration) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let state = view_model.subscribe();
        let handle = tokio::spawn(run_snackbar(view_model, state, timeout, stop_rx));

        Self {
            stop_tx: Some(stop_tx),
            _handle: handle,
        }
    }

    /// Stop the task
    pub fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for SnackbarHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Driver for the sign-in screen
///
/// Holds the credential fields, raises the screen-entered event and runs the
/// snackbar timer while the screen is visible.
pub struct SignInScreen {
    view_model: Arc<SignInViewModel>,
    context: PresentationContext,
    email: String,
    password: String,
    snackbar_timeout: Duration,
    snackbar: Option<SnackbarHandle>,
}

impl SignInScreen {
    /// Create a driver presenting on `context`
    pub fn new(view_model: Arc<SignInViewModel>, context: PresentationContext) -> Self {
        Self {
            view_model,
            context,
            email: String::new(),
            password: String::new(),
            snackbar_timeout: SNACKBAR_TIMEOUT,
            snackbar: None,
        }
    }

    /// Override how long messages stay visible
    pub fn with_snackbar_timeout(mut self, timeout: Duration) -> Self {
        self.snackbar_timeout = timeout;
        self
    }

    /// The view-model this screen drives
    pub fn view_model(&self) -> &Arc<SignInViewModel> {
        &self.view_model
    }

    /// Email field contents
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Update the email field
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Update the password field
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Whether the native form is shown
    pub fn shows_native_form(&self) -> bool {
        !self.view_model.force_web_login()
    }

    /// Whether the snackbar task is running
    pub fn is_visible(&self) -> bool {
        self.snackbar.is_some()
    }

    /// Screen became visible
    ///
    /// Starts the snackbar timer and raises the screen-entered event, which
    /// may run the mandatory web login. Returns whether a web login ran.
    pub async fn on_appear(&mut self) -> bool {
        if self.snackbar.is_none() {
            self.snackbar = Some(SnackbarHandle::start(
                Arc::clone(&self.view_model),
                self.snackbar_timeout,
            ));
        }
        self.view_model.on_screen_entered(self.context.clone()).await
    }

    /// Screen went away
    pub fn on_disappear(&mut self) {
        if let Some(snackbar) = self.snackbar.take() {
            snackbar.stop();
        }
    }

    /// Submit the native form
    pub async fn submit(&self) {
        self.view_model
            .login_with_credentials(&self.email, &self.password)
            .await;
    }

    /// Sign in through the web provider
    pub async fn web_login_tapped(&self) {
        self.view_model
            .login_with_web_oauth(self.context.clone())
            .await;
    }

    /// Register link
    pub fn sign_up_tapped(&self) {
        self.view_model.sign_up();
    }

    /// Forgot-password link
    pub fn forgot_password_tapped(&self) {
        self.view_model.forgot_password();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{NavigationRouter, Route};
    use app_core::analytics::{AuthorizationAnalytics, LoginMethod};
    use app_core::auth::{self, AuthError, AuthInteractor, OAuthCredential, User};
    use app_core::config::Config;
    use app_core::messages;
    use app_core::validator::Validator;
    use app_state::{OAuthHandshake, OAuthSession, WebLoginCompletion};
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Interactor {}

        #[async_trait]
        impl AuthInteractor for Interactor {
            async fn login(&self, username: &str, password: &str) -> auth::Result<User>;
            async fn login_with_credential(&self, credential: &OAuthCredential) -> auth::Result<User>;
        }
    }

    /// Analytics sink that ignores everything
    struct NoAnalytics;

    impl AuthorizationAnalytics for NoAnalytics {
        fn set_user_id(&self, _id: &str) {}
        fn user_login(&self, _method: LoginMethod) {}
        fn sign_up_clicked(&self) {}
        fn forgot_password_clicked(&self) {}
    }

    /// Handshake where the user always closes the page
    struct DismissingHandshake;

    impl OAuthHandshake for DismissingHandshake {
        fn authorize(
            &self,
            _session: OAuthSession,
            _context: PresentationContext,
            completion: WebLoginCompletion,
        ) {
            completion.dismissed();
        }
    }

    fn screen(interactor: MockInteractor, router: NavigationRouter, web_login: bool) -> SignInScreen {
        let config = Config::new("https://learn.example", "client-id", web_login).unwrap();
        let view_model = SignInViewModel::new(
            Arc::new(interactor),
            Arc::new(router),
            Arc::new(NoAnalytics),
            Arc::new(DismissingHandshake),
            Arc::new(config),
            Validator::new(),
        );
        SignInScreen::new(Arc::new(view_model), PresentationContext::new("window"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_clears_after_timeout() {
        let mut screen = screen(MockInteractor::new(), NavigationRouter::new(), false);
        screen.on_appear().await;

        screen.set_email("not-an-email");
        screen.set_password("password123");
        screen.submit().await;
        assert_eq!(
            screen.view_model().error_message().as_deref(),
            Some(messages::INVALID_EMAIL_ADDRESS)
        );

        tokio::time::sleep(SNACKBAR_TIMEOUT - Duration::from_millis(10)).await;
        assert!(screen.view_model().state().show_error);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = screen.view_model().state();
        assert!(state.error_message.is_none());
        assert!(!state.show_error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replaced_message_gets_full_timeout() {
        let mut screen = screen(MockInteractor::new(), NavigationRouter::new(), false);
        screen.on_appear().await;
        let view_model = Arc::clone(screen.view_model());

        view_model.set_alert_message(Some("first".into()));
        tokio::time::sleep(Duration::from_secs(3)).await;

        view_model.set_alert_message(Some("second".into()));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(view_model.alert_message().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(view_model.alert_message().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_clearing_after_disappear() {
        let mut screen = screen(MockInteractor::new(), NavigationRouter::new(), false);
        screen.on_appear().await;
        assert!(screen.is_visible());
        screen.on_disappear();
        assert!(!screen.is_visible());

        screen.view_model().set_error_message(Some("sticky".into()));
        tokio::time::sleep(SNACKBAR_TIMEOUT * 2).await;
        assert_eq!(screen.view_model().error_message().as_deref(), Some("sticky"));
    }

    #[tokio::test]
    async fn test_submit_forwards_fields() {
        let mut interactor = MockInteractor::new();
        interactor
            .expect_login()
            .withf(|username, password| username == "user@example.com" && password == "password123")
            .times(1)
            .returning(|_, _| Err(AuthError::InvalidGrant));

        let mut screen = screen(interactor, NavigationRouter::new(), false);
        screen.set_email("user@example.com");
        screen.set_password("password123");
        assert_eq!(screen.email(), "user@example.com");

        screen.submit().await;
        assert_eq!(
            screen.view_model().error_message().as_deref(),
            Some(messages::INVALID_CREDENTIALS)
        );
    }

    #[tokio::test]
    async fn test_forced_web_login_on_first_appear() {
        let mut screen = screen(MockInteractor::new(), NavigationRouter::new(), true);
        assert!(!screen.shows_native_form());

        assert!(screen.on_appear().await);
        assert!(screen.shows_native_form());

        screen.on_disappear();
        assert!(!screen.on_appear().await);
    }

    #[test]
    fn test_links_navigate() {
        let router = NavigationRouter::new();
        let screen = screen(MockInteractor::new(), router.clone(), false);

        screen.forgot_password_tapped();
        assert_eq!(router.current_route(), Route::ForgotPassword);
        router.go_back();

        screen.sign_up_tapped();
        assert_eq!(router.current_route(), Route::SignUp);
    }
}
