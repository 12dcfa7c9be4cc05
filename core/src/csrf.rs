//! In-memory CSRF token cache.
//!
//! The backend issues tokens valid for one hour; the cache treats them as
//! stale after `ttl` (50 minutes by default) so a token is never sent in the
//! last minutes of its life. Time is passed in by the caller.

use std::time::{Duration, Instant};

/// Header carrying the anti-forgery token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

pub const DEFAULT_CSRF_TTL: Duration = Duration::from_secs(50 * 60);

#[derive(Debug, Clone)]
pub struct CsrfCache {
    token: Option<String>,
    expires_at: Option<Instant>,
    ttl: Duration,
}

impl Default for CsrfCache {
    fn default() -> Self {
        Self::new(DEFAULT_CSRF_TTL)
    }
}

impl CsrfCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            token: None,
            expires_at: None,
            ttl,
        }
    }

    /// The cached token, if one is held and `now` is before its expiry.
    pub fn token(&self, now: Instant) -> Option<&str> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at)) if now < expires_at => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn store(&mut self, token: String, now: Instant) {
        self.token = Some(token);
        self.expires_at = Some(now + self.ttl);
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.expires_at = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
