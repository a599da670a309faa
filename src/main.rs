mod config;
mod google;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recipe_login=info,tower_http=info")),
        )
        .init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration invalid");
            std::process::exit(1);
        }
    };

    let http = match google::http_client(config.timeouts) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "http client init failed");
            std::process::exit(1);
        }
    };

    let sheets = Arc::new(google::SheetsClient::new(
        http.clone(),
        config.google.api_key.clone(),
        config.google.discovery_url.clone(),
    ));
    let identity = Arc::new(google::IdentityClient::new(http, &config.google));

    let port = config.port;
    let state = state::AppState::new(config, sheets, identity);

    // Google clients come up in the background; the login page shows a loader until then.
    let _bootstrap = services::bootstrap::spawn_bootstrap(state.clone());
    let _sweeper = services::session::spawn_session_sweeper(state.sessions.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "recipe-login listening");
    axum::serve(listener, app).await.expect("server failed");
}
