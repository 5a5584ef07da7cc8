//! Field-level checks for the sign-in form
//!
//! These run before any network call; a rejected field never reaches the
//! interactor.

use regex::Regex;
use std::sync::OnceLock;

/// Default minimum password length, in characters
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        // local@domain.tld, whole string only
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}$")
            .unwrap_or_else(|e| unreachable!("email pattern is a literal: {e}"))
    })
}

/// Stateless validator for email and password fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    min_password_length: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a validator with the default password policy
    pub fn new() -> Self {
        Self {
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    /// Set the minimum password length
    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// The minimum password length in characters
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Check that `email` has the shape of an email address
    pub fn is_valid_email(&self, email: &str) -> bool {
        email_regex().is_match(email)
    }

    /// Check that `password` meets the length policy
    ///
    /// Length is counted in characters, not bytes.
    pub fn is_valid_password(&self, password: &str) -> bool {
        password.chars().count() >= self.min_password_length
    }
}
