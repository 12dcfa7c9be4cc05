//! The request executor: one `ApiSession` per signed-in visitor.
//!
//! # Design
//! `send` decorates a core-built request and recovers from the two
//! failures the backend signals: an expired access token (401) and a stale
//! CSRF token (403 naming CSRF). Each recovery is tried once per request.
//! Concurrent 401s share a single refresh through `RefreshGate`: the first
//! caller spawns the refresh task, every caller parks a oneshot sender and
//! is woken with its outcome. The task owns the round-trip, so a request
//! dropped mid-refresh cannot lose the rotated tokens. The state mutex is
//! never held across an await.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use carte_core::auth::{next_step, set_bearer};
use carte_core::types::{AuthUser, LoginRequest};
use carte_core::{
    ApiError, Attempt, CarteClient, CsrfCache, HttpRequest, HttpResponse, RefreshGate, Step,
    Ticket, Tokens, CSRF_HEADER,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::transport::Transport;

type Waiter = oneshot::Sender<Result<String, ApiError>>;

#[derive(Default)]
struct State {
    tokens: Tokens,
    csrf: CsrfCache,
    gate: RefreshGate<Waiter>,
}

pub struct ApiSession {
    client: CarteClient,
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<State>>,
}

impl ApiSession {
    pub fn new(client: CarteClient, transport: Arc<dyn Transport>, csrf_ttl: Duration) -> Self {
        Self {
            client,
            transport,
            state: Arc::new(Mutex::new(State {
                csrf: CsrfCache::new(csrf_ttl),
                ..State::default()
            })),
        }
    }

    pub fn client(&self) -> &CarteClient {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().tokens.is_authenticated()
    }

    pub fn tokens(&self) -> Tokens {
        self.lock().tokens.clone()
    }

    pub fn set_tokens(&self, tokens: Tokens) {
        self.lock().tokens = tokens;
    }

    /// Forget the credentials and the CSRF token.
    pub fn logout(&self) {
        let mut state = self.lock();
        state.tokens.clear();
        state.csrf.clear();
    }

    /// One round-trip on the blocking pool, without interception.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        round_trip(Arc::clone(&self.transport), request).await
    }

    /// Exchange credentials for tokens. Sent without interception so a
    /// wrong password is reported instead of triggering a refresh.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let input = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.execute(self.client.build_login(&input)?).await?;
        let login = self.client.parse_login(response)?;
        self.lock().tokens = Tokens::from_login(&login);
        info!(email = %login.user.email, "signed in");
        Ok(login.user)
    }

    /// Send through the interceptor: bearer, CSRF, refresh and retry.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.lock().tokens.authorize(&mut request);
        if request.method.is_state_changing() {
            match self.csrf_token().await {
                Ok(token) => request.set_header(CSRF_HEADER, token),
                Err(e) => warn!(error = %e, "could not fetch csrf token, sending without it"),
            }
        }

        let mut attempt = Attempt::default();
        loop {
            let response = self.execute(request.clone()).await?;
            match next_step(&response, attempt) {
                Step::Return => return Ok(response),
                Step::Refresh => {
                    attempt.auth_retried = true;
                    debug!(path = %request.path, "access token rejected, refreshing");
                    let access = self.refreshed_access().await?;
                    set_bearer(&mut request, &access);
                }
                Step::RefetchCsrf => {
                    attempt.csrf_retried = true;
                    warn!(path = %request.path, "csrf token rejected, refetching");
                    self.lock().csrf.clear();
                    match self.fetch_csrf().await {
                        Ok(token) => request.set_header(CSRF_HEADER, token),
                        Err(e) => {
                            warn!(error = %e, "csrf refetch failed");
                            return Ok(response);
                        }
                    }
                }
            }
        }
    }

    async fn csrf_token(&self) -> Result<String, ApiError> {
        let cached = self.lock().csrf.token(Instant::now()).map(str::to_string);
        match cached {
            Some(token) => Ok(token),
            None => self.fetch_csrf().await,
        }
    }

    async fn fetch_csrf(&self) -> Result<String, ApiError> {
        let response = self.execute(self.client.build_csrf_token()).await?;
        let token = self.client.parse_csrf_token(response)?;
        self.lock().csrf.store(token.clone(), Instant::now());
        debug!("csrf token fetched");
        Ok(token)
    }

    /// A fresh access token from the running refresh, starting one when
    /// none is in flight. The refresh runs in its own task: a caller that
    /// goes away stops waiting, but the rotated tokens are still stored.
    async fn refreshed_access(&self) -> Result<String, ApiError> {
        let (tx, rx) = oneshot::channel();
        let lead = {
            let mut state = self.lock();
            let ticket = state.gate.enter();
            state.gate.park(tx);
            ticket == Ticket::Lead
        };
        if lead {
            let refresh = Refresh {
                client: self.client.clone(),
                transport: Arc::clone(&self.transport),
                state: Arc::clone(&self.state),
                settled: false,
            };
            tokio::spawn(refresh.run());
        } else {
            debug!("waiting for running refresh");
        }
        rx.await
            .unwrap_or_else(|_| Err(ApiError::Transport(REFRESH_CANCELLED.to_string())))
    }
}

const REFRESH_CANCELLED: &str = "refresh cancelled";

/// One refresh round-trip, owned by a spawned task. Settling stores the
/// outcome and wakes every parked caller; dropping it unsettled (the task
/// was aborted) fails them rather than leaving them parked.
struct Refresh {
    client: CarteClient,
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<State>>,
    settled: bool,
}

impl Refresh {
    async fn run(mut self) {
        let outcome = self.refresh().await;
        self.settle(outcome);
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        let held = lock(&self.state).tokens.refresh.clone();
        let Some(refresh_token) = held else {
            warn!("no refresh token, session expired");
            return Err(ApiError::SessionExpired);
        };
        let request = self.client.build_refresh(&refresh_token)?;
        let refreshed = match round_trip(Arc::clone(&self.transport), request).await {
            Ok(response) => self.client.parse_refresh(response),
            Err(e) => Err(e),
        };
        match refreshed {
            Ok(refreshed) => {
                let mut state = lock(&self.state);
                // Signed out while the refresh was running.
                if state.tokens.refresh.as_deref() != Some(refresh_token.as_str()) {
                    return Err(ApiError::SessionExpired);
                }
                info!("access token refreshed");
                Ok(state.tokens.apply_refresh(refreshed))
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, session expired");
                Err(ApiError::SessionExpired)
            }
        }
    }

    fn settle(&mut self, outcome: Result<String, ApiError>) {
        self.settled = true;
        let waiters = {
            let mut state = lock(&self.state);
            if outcome.is_err() {
                state.tokens.clear();
            }
            state.gate.settle()
        };
        if waiters.len() > 1 {
            debug!(waiters = waiters.len(), "releasing queued requests");
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for Refresh {
    fn drop(&mut self) {
        if !self.settled {
            let waiters = lock(&self.state).gate.settle();
            for waiter in waiters {
                let _ = waiter.send(Err(ApiError::Transport(REFRESH_CANCELLED.to_string())));
            }
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    // A panic while holding the lock leaves plain data behind; keep going.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One round-trip on the blocking pool.
async fn round_trip(
    transport: Arc<dyn Transport>,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    tokio::task::spawn_blocking(move || transport.execute(request))
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Transport for Offline {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn aborted_refresh_fails_parked_callers() {
        let state = Arc::new(Mutex::new(State::default()));
        let (tx, mut rx) = oneshot::channel();
        {
            let mut held = lock(&state);
            assert_eq!(held.gate.enter(), Ticket::Lead);
            held.gate.park(tx);
        }

        drop(Refresh {
            client: CarteClient::new("http://api.test"),
            transport: Arc::new(Offline),
            state: Arc::clone(&state),
            settled: false,
        });

        let outcome = rx.try_recv().unwrap();
        assert!(matches!(outcome, Err(ApiError::Transport(m)) if m == REFRESH_CANCELLED));
        assert!(!lock(&state).gate.is_refreshing());
    }

    #[test]
    fn settled_refresh_clears_tokens_on_failure() {
        let state = Arc::new(Mutex::new(State::default()));
        lock(&state).tokens = Tokens {
            access: Some("a1".to_string()),
            refresh: Some("r1".to_string()),
        };
        let (tx, mut rx) = oneshot::channel();
        {
            let mut held = lock(&state);
            held.gate.enter();
            held.gate.park(tx);
        }

        let mut refresh = Refresh {
            client: CarteClient::new("http://api.test"),
            transport: Arc::new(Offline),
            state: Arc::clone(&state),
            settled: false,
        };
        refresh.settle(Err(ApiError::SessionExpired));
        drop(refresh);

        assert!(matches!(rx.try_recv().unwrap(), Err(ApiError::SessionExpired)));
        assert!(!lock(&state).tokens.is_authenticated());
    }
}
