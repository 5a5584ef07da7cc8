//! Presentation layer for Campus
//!
//! This crate drives the sign-in screen on top of the view-model in
//! `app-state`:
//!
//! - [`navigation`] - Routes, the navigation stack and [`NavigationRouter`]
//! - [`screens`] - Screen drivers (fields, lifecycle events, snackbar timer)
//!
//! # Example
//!
//! ```rust,no_run
//! use app_ui::navigation::{NavigationRouter, Route};
//! use app_core::router::AuthorizationRouter;
//!
//! let router = NavigationRouter::new();
//! router.show_register_screen();
//! assert_eq!(router.current_route(), Route::SignUp);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;
pub mod screens;

pub use navigation::{NavigationRouter, NavigationStack, NavigationState, Route};
pub use screens::{SignInScreen, SnackbarHandle, SNACKBAR_TIMEOUT};
