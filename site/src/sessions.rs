//! Per-visitor sessions keyed by the `carte_sid` cookie.
//!
//! Public pages use one shared anonymous `ApiSession`; each signed-in
//! administrator gets their own, holding their tokens.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use carte_core::CarteClient;
use tracing::debug;
use uuid::Uuid;

use crate::error::SiteError;
use crate::session::ApiSession;
use crate::transport::Transport;
use crate::AppState;

pub const SESSION_COOKIE: &str = "carte_sid";

/// Signed-in sessions unused for this long are forgotten.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

struct Entry {
    session: Arc<ApiSession>,
    last_seen: Instant,
}

pub struct Sessions {
    client: CarteClient,
    transport: Arc<dyn Transport>,
    csrf_ttl: Duration,
    idle_ttl: Duration,
    public: Arc<ApiSession>,
    admins: RwLock<HashMap<String, Entry>>,
}

impl Sessions {
    pub fn new(client: CarteClient, transport: Arc<dyn Transport>, csrf_ttl: Duration) -> Self {
        let public = Arc::new(ApiSession::new(
            client.clone(),
            Arc::clone(&transport),
            csrf_ttl,
        ));
        Self {
            client,
            transport,
            csrf_ttl,
            idle_ttl: DEFAULT_IDLE_TTL,
            public,
            admins: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn public(&self) -> Arc<ApiSession> {
        Arc::clone(&self.public)
    }

    /// A fresh session, not yet registered.
    pub fn create(&self) -> ApiSession {
        ApiSession::new(self.client.clone(), Arc::clone(&self.transport), self.csrf_ttl)
    }

    /// Register a session and return its id. Idle sessions are dropped on
    /// the way.
    pub fn insert(&self, session: ApiSession) -> String {
        let sid = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut admins = self
            .admins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        admins.retain(|_, entry| !self.is_idle(entry, now));
        admins.insert(
            sid.clone(),
            Entry {
                session: Arc::new(session),
                last_seen: now,
            },
        );
        sid
    }

    /// Look a session up and mark it as seen. An idle one is removed instead.
    pub fn get(&self, sid: &str) -> Option<Arc<ApiSession>> {
        let now = Instant::now();
        let mut admins = self
            .admins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = admins.get_mut(sid)?;
        if self.is_idle(entry, now) {
            admins.remove(sid);
            return None;
        }
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    pub fn remove(&self, sid: &str) {
        self.admins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(sid);
    }

    pub fn len(&self) -> usize {
        self.admins
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every session idle at `now`; returns how many went.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut admins = self
            .admins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = admins.len();
        admins.retain(|_, entry| !self.is_idle(entry, now));
        let removed = before - admins.len();
        if removed > 0 {
            debug!(removed, "idle sessions dropped");
        }
        removed
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) > self.idle_ttl
    }
}

/// Session id from the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(sid: &str) -> String {
    format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// A signed-in administrator. Rejects with a redirect to `/login`.
pub struct Admin {
    pub sid: String,
    pub session: Arc<ApiSession>,
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = SiteError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let sid = session_id(&parts.headers).ok_or(SiteError::SessionExpired)?;
        let session = state.sessions.get(&sid).ok_or(SiteError::SessionExpired)?;
        if !session.is_authenticated() {
            // Tokens were cleared by a failed refresh.
            state.sessions.remove(&sid);
            return Err(SiteError::SessionExpired);
        }
        Ok(Admin { sid, session })
    }
}
