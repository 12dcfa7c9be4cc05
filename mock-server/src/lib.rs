//! In-memory stand-in for the restaurant's REST backend.
//!
//! Reads are public. Every other verb outside `/api/auth` and `/api/test`
//! needs a live bearer token (401 otherwise) and a CSRF token issued by
//! `/api/csrf/token` (403 `{"message":"Invalid CSRF token"}` otherwise).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::warn;

pub mod error;
pub mod model;
pub mod routes;
pub mod store;

pub use error::Failure;
pub use store::{Store, ADMIN_EMAIL, ADMIN_PASSWORD};

pub const CSRF_HEADER: &str = "x-csrf-token";

pub type Db = Arc<RwLock<Store>>;

/// Router over the demo data.
pub fn app() -> Router {
    router(Store::seeded())
}

pub fn router(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/refresh", post(routes::refresh))
        .route("/api/csrf/token", get(routes::csrf_token))
        .route("/api/test/expire-tokens", post(routes::expire_tokens))
        .route("/api/test/expire-csrf", post(routes::expire_csrf))
        .route("/api/test/stats", get(routes::stats))
        .route("/api/items", get(routes::list_items).post(routes::create_item))
        .route("/api/items/pizza-moment", get(routes::pizza_moment))
        .route(
            "/api/items/{id}",
            get(routes::get_item)
                .put(routes::update_item)
                .delete(routes::delete_item),
        )
        .route(
            "/api/categories",
            get(routes::list_categories).post(routes::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(routes::get_category)
                .put(routes::update_category)
                .delete(routes::delete_category),
        )
        .route("/api/events", get(routes::list_events).post(routes::create_event))
        .route("/api/events/promo", get(routes::promo_events))
        .route("/api/events/header", get(routes::header_events))
        .route(
            "/api/events/{id}",
            get(routes::get_event)
                .put(routes::update_event)
                .delete(routes::delete_event),
        )
        .route("/api/business-info", get(routes::business_info))
        .layer(middleware::from_fn_with_state(db.clone(), guard))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn is_open(method: &Method, path: &str) -> bool {
    method == Method::GET || path.starts_with("/api/auth/") || path.starts_with("/api/test/")
}

async fn guard(State(db): State<Db>, request: Request, next: Next) -> Result<Response, Failure> {
    if !is_open(request.method(), request.uri().path()) {
        let headers = request.headers();
        let store = db.read().await;

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if !bearer.is_some_and(|token| store.check_access(token)) {
            warn!(path = %request.uri().path(), "missing or expired access token");
            return Err(Failure::Unauthorized);
        }

        let csrf = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
        if !csrf.is_some_and(|token| store.check_csrf(token)) {
            warn!(path = %request.uri().path(), "missing or stale csrf token");
            return Err(Failure::InvalidCsrf);
        }
    }
    Ok(next.run(request).await)
}
