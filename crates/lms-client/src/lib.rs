//! Learning platform API client
//!
//! This crate provides the HTTP side of the authorization module: a small
//! REST client for the platform, the [`HttpAuthInteractor`] that performs the
//! login exchanges, and the in-memory [`TokenStore`] holding the active
//! credential.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod http;
pub mod interactor;
pub mod token;

pub use http::{ApiClient, ApiClientConfig, ApiError};
pub use interactor::HttpAuthInteractor;
pub use token::{StoredToken, TokenStore};
