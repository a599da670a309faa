//! Google Identity OAuth client.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Url;

use super::types::{AccessToken, GoogleError, OAuthErrorBody, Prompt};
use super::IdentityApi;
use crate::config::GoogleConfig;

pub const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

pub struct IdentityClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    initialized: AtomicBool,
}

impl IdentityClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &GoogleConfig) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            initialized: AtomicBool::new(false),
        }
    }

    fn ensure_initialized(&self) -> Result<(), GoogleError> {
        if self.initialized.load(Ordering::Acquire) { Ok(()) } else { Err(GoogleError::NotInitialized) }
    }
}

#[async_trait::async_trait]
impl IdentityApi for IdentityClient {
    async fn init(&self) -> Result<(), GoogleError> {
        validate_client(&self.client_id, &self.redirect_uri, &self.scope)?;
        self.initialized.store(true, Ordering::Release);
        tracing::info!(scope = %self.scope, "identity client initialized");
        Ok(())
    }

    fn authorize_url(&self, prompt: Prompt, state: &str) -> String {
        build_authorize_url(&self.client_id, &self.redirect_uri, &self.scope, prompt, state)
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, GoogleError> {
        self.ensure_initialized()?;
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        parse_token_response(status, &text)
    }

    async fn revoke(&self, token: &AccessToken) -> Result<(), GoogleError> {
        let response = self
            .http
            .post(REVOKE_URL)
            .form(&[("token", token.secret())])
            .send()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(GoogleError::from_status(status, body))
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

pub(crate) fn validate_client(client_id: &str, redirect_uri: &str, scope: &str) -> Result<(), GoogleError> {
    if client_id.trim().is_empty() {
        return Err(GoogleError::Parse("empty OAuth client id".into()));
    }
    if scope.trim().is_empty() {
        return Err(GoogleError::Parse("empty OAuth scope".into()));
    }
    let uri = Url::parse(redirect_uri).map_err(|e| GoogleError::Parse(format!("redirect uri {redirect_uri}: {e}")))?;
    if !matches!(uri.scheme(), "http" | "https") {
        return Err(GoogleError::Parse(format!("redirect uri {redirect_uri} must be http(s)")));
    }
    Ok(())
}

pub(crate) fn build_authorize_url(
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    prompt: Prompt,
    state: &str,
) -> String {
    let mut params = vec![
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("scope", scope),
        ("state", state),
        ("include_granted_scopes", "true"),
    ];
    if let Some(value) = prompt.as_param() {
        params.push(("prompt", value));
    }

    match Url::parse_with_params(AUTHORIZE_URL, &params) {
        Ok(url) => url.into(),
        // AUTHORIZE_URL is a constant absolute URL; parsing cannot fail.
        Err(_) => AUTHORIZE_URL.to_owned(),
    }
}

pub(crate) fn parse_token_response(status: u16, body: &str) -> Result<AccessToken, GoogleError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<OAuthErrorBody>(body).map_or_else(
            |_| body.to_owned(),
            |e| match e.error_description {
                Some(desc) => format!("{}: {desc}", e.error),
                None => e.error,
            },
        );
        return Err(GoogleError::from_status(status, detail));
    }
    let token: AccessToken =
        serde_json::from_str(body).map_err(|e| GoogleError::Parse(format!("token response: {e}")))?;
    if token.access_token.is_empty() {
        return Err(GoogleError::Parse("token response carried an empty access_token".into()));
    }
    Ok(token)
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
