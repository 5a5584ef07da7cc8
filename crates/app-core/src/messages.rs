//! User-facing messages shown by the sign-in flow
//!
//! Localization catalogs live outside this crate; these are the default
//! English strings the view-model surfaces.

/// Email field failed the shape check
pub const INVALID_EMAIL_ADDRESS: &str = "Invalid email address";

/// Password field failed the length policy
pub const INVALID_PASSWORD_LENGTH: &str = "Invalid password length";

/// Credentials rejected by the token endpoint
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Network unreachable or timed out
pub const SLOW_OR_NO_INTERNET_CONNECTION: &str = "Slow or no internet connection";

/// Anything else
pub const UNKNOWN_ERROR: &str = "Something went wrong";
