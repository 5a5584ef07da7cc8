//! Analytics events emitted by the authorization flow

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the user logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// Username and password submitted by the app
    Password,
    /// Delegated web login
    Oauth2,
}

impl LoginMethod {
    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMethod::Password => "password",
            LoginMethod::Oauth2 => "oauth2",
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analytics sink for authorization events
///
/// All calls are fire-and-forget.
pub trait AuthorizationAnalytics: Send + Sync {
    /// Associate subsequent events with a user
    fn set_user_id(&self, id: &str);

    /// A login completed
    fn user_login(&self, method: LoginMethod);

    /// The sign-up link was tapped
    fn sign_up_clicked(&self);

    /// The forgot-password link was tapped
    fn forgot_password_clicked(&self);
}

/// Analytics sink that records events as `tracing` events
///
/// Used when no analytics backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AuthorizationAnalytics for TracingAnalytics {
    fn set_user_id(&self, id: &str) {
        tracing::info!(target: "analytics", user_id = id, "set_user_id");
    }

    fn user_login(&self, method: LoginMethod) {
        tracing::info!(target: "analytics", method = method.as_str(), "user_login");
    }

    fn sign_up_clicked(&self) {
        tracing::info!(target: "analytics", "sign_up_clicked");
    }

    fn forgot_password_clicked(&self) {
        tracing::info!(target: "analytics", "forgot_password_clicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_method_names() {
        assert_eq!(LoginMethod::Password.as_str(), "password");
        assert_eq!(LoginMethod::Oauth2.to_string(), "oauth2");
        assert_eq!(serde_json::to_string(&LoginMethod::Oauth2).unwrap(), "\"oauth2\"");
    }

    #[test]
    fn test_tracing_analytics_is_object_safe() {
        let sink: Box<dyn AuthorizationAnalytics> = Box::new(TracingAnalytics);
        sink.set_user_id("42");
        sink.user_login(LoginMethod::Password);
        sink.sign_up_clicked();
        sink.forgot_password_clicked();
    }
}
