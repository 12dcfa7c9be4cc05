use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use carte_core::ApiError;
use thiserror::Error;
use tracing::error;

use crate::html::{document, escape};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Session expirée")]
    SessionExpired,

    #[error("Page introuvable")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Api(ApiError),
}

impl From<ApiError> for SiteError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::SessionExpired | ApiError::Unauthorized => SiteError::SessionExpired,
            ApiError::NotFound => SiteError::NotFound,
            ApiError::Validation(message) => SiteError::Validation(message),
            other => SiteError::Api(other),
        }
    }
}

fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let body = format!(
        "<main><h1>{}</h1><p>{}</p><p><a href=\"/\">Retour à l'accueil</a></p></main>",
        escape(title),
        escape(message)
    );
    (status, document(title, &body)).into_response()
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        match self {
            SiteError::SessionExpired => Redirect::to("/login?expired=1").into_response(),
            SiteError::NotFound => error_page(
                StatusCode::NOT_FOUND,
                "Page introuvable",
                "Cette page n'existe pas ou plus.",
            ),
            SiteError::Validation(message) => {
                error_page(StatusCode::BAD_REQUEST, "Requête invalide", &message)
            }
            SiteError::Api(e) => {
                error!("backend call failed: {e}");
                let status = match e {
                    ApiError::Transport(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                error_page(
                    status,
                    "Service indisponible",
                    "Le service est momentanément indisponible. Veuillez réessayer plus tard.",
                )
            }
        }
    }
}
