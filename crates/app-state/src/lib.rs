//! Application state for the Campus sign-in flow
//!
//! This crate holds the sign-in view-model: the observable state the
//! presentation layer renders, the two login paths (native credentials and
//! delegated web OAuth2) and the handshake boundary the web path completes
//! through.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod oauth;
pub mod sign_in;

pub use oauth::{
    OAuthError, OAuthHandshake, OAuthSession, PresentationContext, WebLoginCompletion,
    WebLoginResult,
};
pub use sign_in::{SignInPhase, SignInState, SignInViewModel};
