//! Synchronous client core for the restaurant menu API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the
//! actual HTTP round-trip, making the core deterministic and testable.
//! Around that sit the pure pieces of the public site and the admin
//! back-office: menu filtering, promotions, French formatting and form
//! state.
//!
//! # Design
//! - `CarteClient` is stateless: it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Session-level concerns (bearer tokens, the CSRF token, refresh
//!   single-flight) are decision helpers in `auth` and `csrf`; the host
//!   holds the state and performs the retries they ask for.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod admin;
pub mod auth;
pub mod business;
pub mod client;
pub mod csrf;
pub mod error;
pub mod format;
pub mod http;
pub mod menu;
pub mod options;
pub mod order;
pub mod promo;
pub mod types;

pub use auth::{Attempt, RefreshGate, Step, Ticket, Tokens};
pub use client::CarteClient;
pub use csrf::{CsrfCache, CSRF_HEADER};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{OptionType, OptionValue};
pub use types::{
    BusinessInfo, Category, CategoryPayload, Event, EventPayload, Item, ItemPayload, LoginRequest,
};
