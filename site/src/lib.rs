//! The Pizza Le Duc website: public menu pages and the admin back-office,
//! served by axum and backed by the REST API through `carte-core`.
//!
//! # Design
//! The site is the host of the core's sans-IO client: `transport` performs
//! round-trips, `session::ApiSession` owns the per-visitor state (tokens,
//! CSRF token, refresh gate) and applies the interceptor rules, and
//! `services` pair core builders and parsers with `ApiSession::send`.
//! Pages are rendered server-side.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use carte_core::CarteClient;

pub mod config;
pub mod error;
pub mod html;
pub mod pages;
pub mod services;
pub mod session;
pub mod sessions;
pub mod transport;

pub use config::Config;
pub use error::SiteError;
pub use session::ApiSession;
pub use sessions::Sessions;
pub use transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Sessions>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let transport = Arc::new(UreqTransport::new(config.http_timeout));
        let sessions = Sessions::new(CarteClient::new(&config.api_url), transport, config.csrf_ttl)
            .with_idle_ttl(config.session_idle);
        Self {
            sessions: Arc::new(sessions),
        }
    }

    pub fn with_transport(
        api_url: &str,
        transport: Arc<dyn Transport>,
        csrf_ttl: std::time::Duration,
    ) -> Self {
        Self {
            sessions: Arc::new(Sessions::new(CarteClient::new(api_url), transport, csrf_ttl)),
        }
    }
}

pub fn app(state: AppState) -> Router {
    use pages::{admin, auth, public};

    Router::new()
        .route("/", get(public::home))
        .route("/notre-carte", get(public::menu))
        .route("/notre-carte/items/{id}", get(public::item))
        .route("/pizza-moment", get(public::pizza_moment))
        .route("/nous-trouver", get(public::find_us))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/admin", get(admin::index))
        .route("/admin/items", get(admin::items))
        .route(
            "/admin/items/new",
            get(admin::new_item).post(admin::create_item),
        )
        .route(
            "/admin/items/{id}/edit",
            get(admin::edit_item).post(admin::update_item),
        )
        .route("/admin/items/{id}/delete", post(admin::delete_item))
        .route("/admin/categories", get(admin::categories))
        .route(
            "/admin/categories/new",
            get(admin::new_category).post(admin::create_category),
        )
        .route(
            "/admin/categories/{id}/edit",
            get(admin::edit_category).post(admin::update_category),
        )
        .route("/admin/categories/{id}/delete", post(admin::delete_category))
        .route("/admin/events", get(admin::events))
        .route(
            "/admin/events/new",
            get(admin::new_event).post(admin::create_event),
        )
        .route(
            "/admin/events/{id}/edit",
            get(admin::edit_event).post(admin::update_event),
        )
        .route("/admin/events/{id}/delete", post(admin::delete_event))
        .fallback(pages::not_found)
        .with_state(state)
}
