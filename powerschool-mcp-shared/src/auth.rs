//! Bearer token cache for the PowerSchool API
//!
//! Holds at most one access token together with its computed expiry instant.
//! The cache is owned by the client and lives for the process; tokens are
//! never persisted.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Safety margin subtracted from a token's reported lifetime, so a token is
/// never presented within its last five minutes of validity.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// A cached access token and its effective expiry
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a token cached at `now`, expiring `expires_in` seconds from now
    /// minus the safety margin. For very short-lived tokens the margin can
    /// push `expires_at` into the past; the token is then simply treated as
    /// expired on the next check. Lifetimes outside chrono's representable
    /// range get the same treatment instead of panicking, since `expires_in`
    /// is attacker-controlled input.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(expires_in.saturating_sub(TOKEN_SAFETY_MARGIN_SECS))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now);
        Self {
            access_token,
            expires_at,
        }
    }

    /// Check whether the token is still usable
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Successful response from `POST {base_url}/oauth/access_token`
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Single-slot token cache shared by all calls from the process.
///
/// The async mutex is held across the whole check-refresh-store sequence, so
/// at most one token fetch is in flight at a time; concurrent callers wait
/// for the refresh and then take the fast path.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.inner.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_reflects_lifetime_minus_safety_margin() {
        let before = Utc::now();
        let token = CachedToken::new("abc123".to_string(), 3600);
        let after = Utc::now();

        let lower = before + Duration::seconds(3600 - TOKEN_SAFETY_MARGIN_SECS);
        let upper = after + Duration::seconds(3600 - TOKEN_SAFETY_MARGIN_SECS);
        assert!(token.expires_at >= lower && token.expires_at <= upper);
        assert!(token.is_valid());
    }

    #[test]
    fn short_lived_token_is_immediately_expired() {
        // expires_in below the margin must not panic, only force a refresh
        let token = CachedToken::new("abc123".to_string(), 120);
        assert!(!token.is_valid());

        let token = CachedToken::new("abc123".to_string(), 0);
        assert!(!token.is_valid());
    }

    #[test]
    fn out_of_range_lifetimes_do_not_panic() {
        // a hostile identity provider can put any i64 in expires_in
        let token = CachedToken::new("abc123".to_string(), i64::MAX);
        assert!(!token.is_valid());

        let token = CachedToken::new("abc123".to_string(), 9_300_000_000_000_000);
        assert!(!token.is_valid());

        let token = CachedToken::new("abc123".to_string(), i64::MIN);
        assert!(!token.is_valid());
    }

    #[tokio::test]
    async fn cache_starts_empty() {
        let cache = TokenCache::new();
        assert!(cache.lock().await.is_none());
    }
}
