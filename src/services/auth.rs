//! Login flow: start an OAuth attempt, complete it from the callback, log out.
//!
//! ARCHITECTURE
//! ============
//! `start_login` registers a continuation on the session and hands back the
//! Google authorize URL. `complete_login` consumes that continuation, trades
//! the code for a token, fetches recipes and settles the session. No session
//! lock is held across a network call: the attempt is taken under the lock,
//! the lock is released for exchange/fetch, then re-acquired to apply the
//! result. A logout that lands in between removes the session, and the late
//! result is discarded because no session carries the attempt's epoch.

use time::OffsetDateTime;

use crate::google::{AccessToken, GoogleError};
use crate::services::recipes::{self, FetchOutcome};
use crate::services::session;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("google clients are still initializing")]
    NotReady,
    #[error("unknown or expired login attempt")]
    UnknownAttempt,
    #[error("token grant failed: {0}")]
    TokenGrant(String),
    #[error("token exchange failed: {0}")]
    Exchange(#[source] GoogleError),
    #[error("session logged out while the login was in flight")]
    Superseded,
}

/// Query parameters Google sends to the redirect URI.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// How a granted login ended, for the route to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Recipes published; navigate here.
    Redirect(String),
    /// Granted but the sheet had no rows.
    NoRecipes,
    /// Granted but the sheet could not be read; an alert is queued.
    FetchFailed,
}

/// Begin a login attempt for `session_id` and return the authorize URL.
///
/// # Errors
///
/// Returns [`AuthError::NotReady`] until both Google clients have initialized.
pub async fn start_login(state: &AppState, session_id: &str, path_name: Option<String>) -> Result<String, AuthError> {
    if !state.readiness.is_ready() {
        return Err(AuthError::NotReady);
    }

    let (nonce, prompt) = {
        let now = OffsetDateTime::now_utc();
        let mut sessions = state.sessions.write().await;
        let evicted = session::evict_idle(&mut sessions, now);
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle sessions");
        }
        let session = sessions.entry(session_id.to_owned()).or_default();
        session.touch(now);
        session.begin_attempt(path_name)
    };

    tracing::info!(?prompt, "login attempt started");
    Ok(state.identity.authorize_url(prompt, &nonce))
}

/// Resolve the attempt named by `params.state`.
///
/// # Errors
///
/// - [`AuthError::UnknownAttempt`] when the state does not match a pending attempt
/// - [`AuthError::TokenGrant`] / [`AuthError::Exchange`] when no token was granted
/// - [`AuthError::Superseded`] when the session logged out mid-flight
pub async fn complete_login(
    state: &AppState,
    session_id: &str,
    params: CallbackParams,
) -> Result<LoginOutcome, AuthError> {
    let nonce = params.state.as_deref().ok_or(AuthError::UnknownAttempt)?;
    let attempt = {
        let mut sessions = state.sessions.write().await;
        sessions
            .get_mut(session_id)
            .and_then(|s| s.take_attempt(nonce))
            .ok_or(AuthError::UnknownAttempt)?
    };

    let token = match grant_token(state, &params).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token grant failed");
            if let Some(session) = state.sessions.write().await.get_mut(session_id) {
                session.attempt_failed();
            }
            return Err(e);
        }
    };

    let fetched = recipes::fetch_recipes(state.sheets.as_ref(), &token, &state.config.sheet).await;

    let mut sessions = state.sessions.write().await;
    if !sessions.get(session_id).is_some_and(|s| s.epoch() == attempt.epoch) {
        drop(sessions);
        tracing::warn!("login finished after logout; revoking late token");
        revoke_quietly(state, &token).await;
        return Err(AuthError::Superseded);
    }
    let Some(session) = sessions.get_mut(session_id) else {
        return Err(AuthError::Superseded);
    };
    session.touch(OffsetDateTime::now_utc());

    let outcome = match fetched {
        Ok(FetchOutcome::Loaded(list)) => {
            session.set_recipes(list);
            let target = recipes::redirect_target(&state.config.recipes_base_path, attempt.path_name.as_deref());
            LoginOutcome::Redirect(target)
        }
        Ok(FetchOutcome::Empty) => LoginOutcome::NoRecipes,
        Err(e) => {
            match &e {
                GoogleError::PermissionDenied { status, .. } => {
                    tracing::warn!(status, "user lacks access to the recipe sheet");
                }
                other => tracing::warn!(error = %other, "recipe fetch failed"),
            }
            session.set_alert(state.config.access_denied_message.clone());
            LoginOutcome::FetchFailed
        }
    };

    // A silent re-grant comes from the same Google grant. Revoking the old
    // token would revoke that grant and the new token with it.
    if session.grant(token).is_some() {
        tracing::debug!("held token replaced by re-grant");
    }
    tracing::info!(prompt = ?attempt.prompt, outcome = ?outcome, "login completed");
    Ok(outcome)
}

/// Log the session out, revoking any held token, and drop it from the map.
/// Always succeeds.
pub async fn logout(state: &AppState, session_id: &str) {
    let token = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(session_id).and_then(|mut s| s.logout())
    };

    if let Some(token) = token {
        revoke_quietly(state, &token).await;
    }
    tracing::info!("logged out");
}

async fn grant_token(state: &AppState, params: &CallbackParams) -> Result<AccessToken, AuthError> {
    if let Some(error) = &params.error {
        return Err(AuthError::TokenGrant(error.clone()));
    }
    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AuthError::TokenGrant("missing authorization code".into()))?;
    state.identity.exchange_code(code).await.map_err(AuthError::Exchange)
}

async fn revoke_quietly(state: &AppState, token: &AccessToken) {
    if let Err(e) = state.identity.revoke(token).await {
        tracing::warn!(error = %e, "token revoke failed");
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
