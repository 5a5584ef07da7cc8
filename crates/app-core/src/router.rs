//! Navigation boundary used by the authorization flow

/// Screen transitions the sign-in flow can request
///
/// Commands are fire-and-forget; implementors own the actual navigation
/// stack.
pub trait AuthorizationRouter: Send + Sync {
    /// Replace the sign-in flow with the main screen
    fn show_main_screen(&self);

    /// Open the registration screen
    fn show_register_screen(&self);

    /// Open the password recovery screen
    fn show_forgot_password_screen(&self);
}
