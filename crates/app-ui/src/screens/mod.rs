//! Screen drivers
//!
//! A driver owns what the platform view owns: field contents, lifecycle
//! events and timers. It forwards user intent to its view-model.

pub mod sign_in;

pub use sign_in::{SignInScreen, SnackbarHandle, SNACKBAR_TIMEOUT};
