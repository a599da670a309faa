//! Auth routes: login page, Google OAuth redirect/callback, logout.

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::pages::{self, LoginView};
use crate::services::auth::{self as auth_svc, AuthError, CallbackParams, LoginOutcome};
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

/// Reuse the browser's session id, or mint one and set the cookie.
pub(crate) fn ensure_session(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    let existing = jar
        .get(COOKIE_NAME)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty());
    if let Some(id) = existing {
        return (jar, id);
    }

    let id = session::generate_token();
    let cookie = Cookie::build((COOKIE_NAME, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(session::SESSION_TTL);
    (jar.add(cookie), id)
}

/// `/login`, carrying `pathName` when present.
pub(crate) fn login_location(path_name: Option<&str>) -> String {
    match path_name.filter(|p| !p.is_empty()) {
        Some(p) => format!("/login?pathName={}", urlencoding::encode(p)),
        None => "/login".to_owned(),
    }
}

/// Redirect to `target` as given, percent-encoding its path segments only when
/// it holds non-ASCII or control characters. `HeaderValue` accepts raw bytes
/// at or above 0x80, so ASCII is checked first.
pub(crate) fn redirect_to(target: &str) -> Redirect {
    if target.is_ascii() && HeaderValue::from_str(target).is_ok() {
        return Redirect::to(target);
    }
    let encoded: Vec<String> = target
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect();
    Redirect::to(&encoded.join("/"))
}

pub(crate) fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::UnknownAttempt => StatusCode::BAD_REQUEST,
        AuthError::TokenGrant(_) => StatusCode::UNAUTHORIZED,
        AuthError::Exchange(_) => StatusCode::BAD_GATEWAY,
        AuthError::Superseded => StatusCode::CONFLICT,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "pathName")]
    pub path_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub ready: bool,
    pub is_logged_in: bool,
    pub recipe_count: usize,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /login`: loader until ready, then the login or logout button.
pub async fn login_page(State(state): State<AppState>, jar: CookieJar, Query(query): Query<LoginQuery>) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);

    let (logged_in, alert) = {
        let mut sessions = state.sessions.write().await;
        sessions
            .get_mut(&sid)
            .map(|s| {
                s.touch(OffsetDateTime::now_utc());
                (s.is_logged_in(), s.take_alert())
            })
            .unwrap_or_default()
    };

    let html = pages::login_page(&LoginView {
        ready: state.readiness.is_ready(),
        logged_in,
        path_name: query.path_name.as_deref(),
        alert: alert.as_deref(),
    });
    (jar, Html(html)).into_response()
}

/// `GET /auth/google`: register a login attempt and redirect to Google.
pub async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    match auth_svc::start_login(&state, &sid, query.path_name).await {
        Ok(url) => (jar, Redirect::temporary(&url)).into_response(),
        Err(e) => (auth_error_to_status(&e), jar, e.to_string()).into_response(),
    }
}

/// `GET /auth/google/callback`: finish the attempt named by `state`.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    match auth_svc::complete_login(&state, &sid, params).await {
        Ok(LoginOutcome::Redirect(target)) => (jar, redirect_to(&target)).into_response(),
        Ok(LoginOutcome::NoRecipes | LoginOutcome::FetchFailed) => (jar, Redirect::to("/login")).into_response(),
        Err(e) => {
            let status = auth_error_to_status(&e);
            tracing::warn!(error = %e, %status, "oauth callback rejected");
            (status, jar, e.to_string()).into_response()
        }
    }
}

/// `POST /auth/logout`: revoke the token and return to the login page.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    auth_svc::logout(&state, &sid).await;
    (jar, Redirect::to("/login")).into_response()
}

/// `GET /api/session`: readiness and login state for the current browser.
pub async fn session_summary(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    let (is_logged_in, recipe_count) = {
        let sessions = state.sessions.read().await;
        sessions
            .get(&sid)
            .map(|s| (s.is_logged_in(), s.recipes().len()))
            .unwrap_or_default()
    };
    let summary = SessionSummary { ready: state.readiness.is_ready(), is_logged_in, recipe_count };
    (jar, Json(summary)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
