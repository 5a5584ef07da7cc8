//! Navigation for the authorization flow
//!
//! [`NavigationRouter`] applies the view-model's routing requests to a
//! shared [`NavigationState`]: main replaces the whole stack, the secondary
//! screens are pushed on top of sign-in.

use app_core::router::AuthorizationRouter;
use parking_lot::RwLock;
use std::sync::Arc;

/// Screens reachable from the authorization flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in screen
    #[default]
    SignIn,
    /// Registration
    SignUp,
    /// Password recovery
    ForgotPassword,
    /// Main application screen
    Main,
}

/// Stack of presented screens; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    root: Route,
    pushed: Vec<Route>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(Route::SignIn)
    }
}

impl NavigationStack {
    /// Create a stack holding only `root`
    pub fn new(root: Route) -> Self {
        Self {
            root,
            pushed: Vec::new(),
        }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.pushed.push(route);
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        self.pushed.pop().is_some()
    }

    /// Get the current (top) route
    pub fn current(&self) -> Route {
        self.pushed.last().copied().unwrap_or(self.root)
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        !self.pushed.is_empty()
    }

    /// Reset to a new root
    pub fn reset(&mut self, route: Route) {
        self.root = route;
        self.pushed.clear();
    }
}

/// Complete navigation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Presented screens
    pub stack: NavigationStack,
    /// Every route navigated to, oldest first
    pub history: Vec<Route>,
}

impl NavigationState {
    /// Current route
    pub fn current_route(&self) -> Route {
        self.stack.current()
    }

    fn navigate(&mut self, route: Route) {
        self.stack.push(route);
        self.history.push(route);
    }

    fn reset_to(&mut self, route: Route) {
        self.stack.reset(route);
        self.history.push(route);
    }

    fn go_back(&mut self) -> bool {
        if self.stack.pop() {
            self.history.push(self.stack.current());
            true
        } else {
            false
        }
    }
}

/// [`AuthorizationRouter`] backed by a shared [`NavigationState`]
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct NavigationRouter {
    state: Arc<RwLock<NavigationState>>,
}

impl NavigationRouter {
    /// Create a router positioned on the sign-in screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Current route
    pub fn current_route(&self) -> Route {
        self.state.read().current_route()
    }

    /// Routes navigated to, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.state.read().history.clone()
    }

    /// Snapshot of the full state
    pub fn snapshot(&self) -> NavigationState {
        self.state.read().clone()
    }

    /// Go back one screen
    pub fn go_back(&self) -> bool {
        self.state.write().go_back()
    }
}

impl AuthorizationRouter for NavigationRouter {
    fn show_main_screen(&self) {
        tracing::debug!("Navigating to main screen");
        self.state.write().reset_to(Route::Main);
    }

    fn show_register_screen(&self) {
        tracing::debug!("Navigating to registration");
        self.state.write().navigate(Route::SignUp);
    }

    fn show_forgot_password_screen(&self) {
        tracing::debug!("Navigating to password recovery");
        self.state.write().navigate(Route::ForgotPassword);
    }
}
