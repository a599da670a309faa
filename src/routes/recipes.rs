//! Recipe routes: the JSON list and the landing pages the login redirects to.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;

use super::auth::{ensure_session, login_location, redirect_to};
use super::pages;
use crate::services::recipes::Recipe;
use crate::state::AppState;

async fn session_recipes(state: &AppState, sid: &str) -> Option<Vec<Recipe>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(sid).filter(|s| s.is_logged_in())?;
    session.touch(OffsetDateTime::now_utc());
    Some(session.recipes().to_vec())
}

/// `GET /api/recipes`: the published list; empty when logged out.
pub async fn list_recipes(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    let recipes = session_recipes(&state, &sid).await.unwrap_or_default();
    (jar, Json(recipes)).into_response()
}

/// `GET /recipes`
pub async fn recipes_index(State(state): State<AppState>, jar: CookieJar) -> Response {
    render(&state, jar, None).await
}

/// `GET /recipes/{*path}`
pub async fn recipes_at(State(state): State<AppState>, jar: CookieJar, Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/').to_owned();
    render(&state, jar, Some(path)).await
}

/// Logged-out visitors are sent to the login page with `pathName` set so they
/// land back here afterwards.
async fn render(state: &AppState, jar: CookieJar, path: Option<String>) -> Response {
    let (jar, sid) = ensure_session(jar, state.config.cookie_secure);
    match session_recipes(state, &sid).await {
        Some(recipes) => (jar, Html(pages::recipes_page(&recipes, path.as_deref()))).into_response(),
        None => (jar, redirect_to(&login_location(path.as_deref()))).into_response(),
    }
}
