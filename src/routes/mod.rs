//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the login page, the Google OAuth redirect/callback pair, logout, and
//! the recipe pages that a successful login lands on.

pub mod auth;
pub mod pages;
pub mod recipes;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(redirect_root_to_login))
        .route("/login", get(auth::login_page))
        .route("/auth/google", get(auth::google_redirect))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/logout", post(auth::logout))
        .route("/api/session", get(auth::session_summary))
        .route("/api/recipes", get(recipes::list_recipes))
        .route("/recipes", get(recipes::recipes_index))
        .route("/recipes/{*path}", get(recipes::recipes_at))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_root_to_login() -> Redirect {
    Redirect::temporary("/login")
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
