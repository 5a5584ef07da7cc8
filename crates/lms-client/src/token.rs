//! In-memory store for the current access token

use app_core::auth::OAuthCredential;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Credential plus the time it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct StoredToken {
    /// The credential
    pub credential: OAuthCredential,
    /// When it was stored
    pub issued_at: DateTime<Utc>,
}

impl StoredToken {
    /// Expiry time, when the provider reported a lifetime
    ///
    /// A lifetime too large to represent is treated as no expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(self.credential.expires_in?)?;
        self.issued_at.checked_add_signed(lifetime)
    }

    /// Whether the token is past its expiry at `now`
    ///
    /// Tokens without a lifetime never expire locally.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires| now >= expires)
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Shared holder of the active credential
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<StoredToken>>>,
}

impl TokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored credential
    pub fn store(&self, credential: OAuthCredential) {
        *self.inner.write() = Some(StoredToken {
            credential,
            issued_at: Utc::now(),
        });
    }

    /// Current token, if any
    pub fn current(&self) -> Option<StoredToken> {
        self.inner.read().clone()
    }

    /// `Authorization` header for the current token
    pub fn authorization_header(&self) -> Option<String> {
        self.inner
            .read()
            .as_ref()
            .map(|token| token.credential.authorization_header())
    }

    /// Whether a token is stored
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Drop the stored token
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_clear() {
        let store = TokenStore::new();
        assert!(!store.is_authenticated());
        assert!(store.authorization_header().is_none());

        store.store(OAuthCredential::bearer("abc"));
        assert!(store.is_authenticated());
        assert_eq!(store.authorization_header().as_deref(), Some("Bearer abc"));

        let shared = store.clone();
        shared.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_expiry() {
        let issued_at = Utc::now();
        let token = StoredToken {
            credential: OAuthCredential {
                expires_in: Some(3600),
                ..OAuthCredential::bearer("abc")
            },
            issued_at,
        };

        assert_eq!(token.expires_at(), Some(issued_at + TimeDelta::seconds(3600)));
        assert!(!token.is_expired_at(issued_at + TimeDelta::seconds(3599)));
        assert!(token.is_expired_at(issued_at + TimeDelta::seconds(3600)));

        let forever = StoredToken {
            credential: OAuthCredential::bearer("abc"),
            issued_at,
        };
        assert!(!forever.is_expired());
    }

    #[test]
    fn test_out_of_range_lifetime() {
        for expires_in in [i64::MAX, i64::MIN, i64::MAX / 1000] {
            let token = StoredToken {
                credential: OAuthCredential {
                    expires_in: Some(expires_in),
                    ..OAuthCredential::bearer("abc")
                },
                issued_at: Utc::now(),
            };
            assert_eq!(token.expires_at(), None);
            assert!(!token.is_expired());
        }
    }
}
