use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures are sent as `{"message": ...}` like the real backend.
#[derive(Error, Debug)]
pub enum Failure {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Identifiants invalides")]
    InvalidCredentials,

    #[error("Invalid CSRF token")]
    InvalidCsrf,

    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = match self {
            Failure::Unauthorized | Failure::InvalidRefreshToken | Failure::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Failure::InvalidCsrf => StatusCode::FORBIDDEN,
            Failure::NotFound(_) => StatusCode::NOT_FOUND,
            Failure::BadRequest(_) => StatusCode::BAD_REQUEST,
            Failure::Conflict(_) => StatusCode::CONFLICT,
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
