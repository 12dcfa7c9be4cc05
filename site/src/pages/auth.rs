//! Sign-in and sign-out.

use axum::{
    extract::{Form, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use carte_core::ApiError;
use serde::Deserialize;
use tracing::{info, warn};

use crate::html::{document, escape, Notice};
use crate::sessions::{expired_cookie, session_cookie, session_id};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub expired: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn login_page(email: &str, notice: Option<&Notice>) -> String {
    let body = format!(
        "<main><h1>Connexion administrateur</h1>{}\
         <form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\" value=\"{}\" required></label>\
         <label>Mot de passe <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Se connecter</button></form></main>",
        notice.map(Notice::render).unwrap_or_default(),
        escape(email)
    );
    document("Connexion", &body).0
}

pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let signed_in = session_id(&headers)
        .and_then(|sid| state.sessions.get(&sid))
        .is_some_and(|s| s.is_authenticated());
    if signed_in {
        return Redirect::to("/admin/items").into_response();
    }
    let notice = query
        .expired
        .map(|_| Notice::Error("Votre session a expiré, veuillez vous reconnecter.".to_string()));
    Html(login_page("", notice.as_ref())).into_response()
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let session = state.sessions.create();
    match session.login(form.email.trim(), &form.password).await {
        Ok(_) => {
            let sid = state.sessions.insert(session);
            (
                [(SET_COOKIE, session_cookie(&sid))],
                Redirect::to("/admin/items"),
            )
                .into_response()
        }
        Err(e) => {
            let message = match e {
                ApiError::Unauthorized => "Identifiants invalides".to_string(),
                ApiError::Transport(_) => {
                    warn!("login failed: {e}");
                    "Le service est momentanément indisponible.".to_string()
                }
                other => other
                    .server_message()
                    .unwrap_or_else(|| "Connexion impossible".to_string()),
            };
            let page = login_page(&form.email, Some(&Notice::Error(message)));
            (StatusCode::UNAUTHORIZED, Html(page)).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(sid) = session_id(&headers) {
        if let Some(session) = state.sessions.get(&sid) {
            session.logout();
        }
        state.sessions.remove(&sid);
        info!("signed out");
    }
    ([(SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}
