//! Bearer tokens, response classification and the single-flight refresh
//! gate.
//!
//! # Design
//! The host owns the round-trips; this module only decides. `Tokens`
//! decorates outgoing requests, `next_step` tells the host what to do with a
//! response, and `RefreshGate` guarantees that concurrent 401s trigger a
//! single refresh request while the other callers wait for its result.

use crate::client::csrf_rejection;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{LoginResponse, RefreshResponse};

pub const AUTHORIZATION: &str = "Authorization";

/// Access and refresh credentials for the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Tokens {
    pub fn from_login(login: &LoginResponse) -> Self {
        Self {
            access: Some(login.access_token.clone()),
            refresh: Some(login.refresh_token.clone()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }

    /// Add `Authorization: Bearer <access>` when an access token is held.
    pub fn authorize(&self, request: &mut HttpRequest) {
        if let Some(access) = &self.access {
            set_bearer(request, access);
        }
    }

    /// Store a refresh result and return the new access token. The refresh
    /// token is only replaced when the backend rotated it.
    pub fn apply_refresh(&mut self, refreshed: RefreshResponse) -> String {
        self.access = Some(refreshed.access_token.clone());
        if let Some(rotated) = refreshed.refresh_token {
            self.refresh = Some(rotated);
        }
        refreshed.access_token
    }

    pub fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
    }
}

pub fn set_bearer(request: &mut HttpRequest, access: &str) {
    request.set_header(AUTHORIZATION, format!("Bearer {access}"));
}

/// Retries already spent on one logical request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attempt {
    pub auth_retried: bool,
    pub csrf_retried: bool,
}

/// What the host does with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Hand the response to the parser, success or not.
    Return,
    /// 401 on a first attempt: refresh the access token, then retry.
    Refresh,
    /// 403 naming CSRF on a first attempt: refetch the token, then retry.
    RefetchCsrf,
}

/// Each recovery path is taken at most once per request; a second failure
/// of the same kind is returned to the caller.
pub fn next_step(response: &HttpResponse, attempt: Attempt) -> Step {
    if response.status == 401 && !attempt.auth_retried {
        return Step::Refresh;
    }
    if csrf_rejection(response).is_some() && !attempt.csrf_retried {
        return Step::RefetchCsrf;
    }
    Step::Return
}

/// Role of a caller entering the refresh gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticket {
    /// No refresh is running: the caller starts one.
    Lead,
    /// A refresh is already running.
    Follow,
}

/// Single-flight refresh state. `W` is whatever the host uses to wake a
/// parked caller (a oneshot sender, a test id).
#[derive(Debug)]
pub struct RefreshGate<W> {
    in_flight: bool,
    waiters: Vec<W>,
}

impl<W> Default for RefreshGate<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> RefreshGate<W> {
    pub fn new() -> Self {
        Self {
            in_flight: false,
            waiters: Vec::new(),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight
    }

    pub fn enter(&mut self) -> Ticket {
        if self.in_flight {
            Ticket::Follow
        } else {
            self.in_flight = true;
            Ticket::Lead
        }
    }

    /// Queue a waiter behind the running refresh. Must follow `enter`
    /// under the same lock; the leader parks too.
    pub fn park(&mut self, waiter: W) {
        debug_assert!(self.in_flight, "park called with no refresh in flight");
        self.waiters.push(waiter);
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    /// End the refresh and hand back every parked waiter, in arrival order.
    pub fn settle(&mut self) -> Vec<W> {
        self.in_flight = false;
        std::mem::take(&mut self.waiters)
    }
}
