//! Core application logic for the Campus client
//!
//! This crate holds the pieces of the authorization module that have no
//! dependency on presentation: configuration and environment selection,
//! credential validation, the auth domain types and the collaborator
//! boundaries (interactor, router, analytics) the sign-in flow calls into.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod auth;
pub mod config;
pub mod logging;
pub mod messages;
pub mod router;
pub mod validator;

pub use analytics::{AuthorizationAnalytics, LoginMethod, TracingAnalytics};
pub use auth::{AuthError, AuthInteractor, LoginFailure, OAuthCredential, User, ValidationPayload};
pub use config::{BuildConfiguration, Config, ConfigError, Environment, Tier};
pub use router::AuthorizationRouter;
pub use validator::Validator;
