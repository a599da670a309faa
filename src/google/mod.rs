//! Google clients: the Sheets values API and Google Identity OAuth.
//!
//! DESIGN
//! ======
//! Both clients sit behind async traits so the login flow can run against
//! fakes in tests. The concrete clients are thin `reqwest` wrappers; response
//! parsing lives in pure functions next to each client.

pub mod identity;
pub mod sheets;
pub mod types;

use std::time::Duration;

pub use identity::IdentityClient;
pub use sheets::SheetsClient;
pub use types::{AccessToken, GoogleError, Prompt, ValueRange};

use crate::config::HttpTimeouts;

// =============================================================================
// TRAITS
// =============================================================================

/// The generic API client: discovery bootstrap plus `values.get`.
#[async_trait::async_trait]
pub trait SheetsApi: Send + Sync {
    /// Load the discovery document so the values endpoint can be addressed.
    ///
    /// # Errors
    ///
    /// Returns a [`GoogleError`] if the document cannot be fetched or parsed.
    async fn load(&self) -> Result<(), GoogleError>;

    /// Read `range` from `spreadsheet_id` on behalf of `token`'s owner.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::PermissionDenied`] when the user cannot read the
    /// sheet, and other variants for transport or parse failures.
    async fn get_values(&self, token: &AccessToken, spreadsheet_id: &str, range: &str)
    -> Result<ValueRange, GoogleError>;
}

/// The identity/token client: authorize, exchange, revoke.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Validate client settings before the first login attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`GoogleError`] if the OAuth client settings are unusable.
    async fn init(&self) -> Result<(), GoogleError>;

    /// Authorization URL for one login attempt identified by `state`.
    fn authorize_url(&self, prompt: Prompt, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns a [`GoogleError`] when Google rejects the code.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, GoogleError>;

    /// Revoke a previously granted token.
    ///
    /// # Errors
    ///
    /// Returns a [`GoogleError`] if the revocation request fails.
    async fn revoke(&self, token: &AccessToken) -> Result<(), GoogleError>;
}

/// Shared outbound HTTP client with bounded request/connect timeouts.
///
/// # Errors
///
/// Returns [`GoogleError::HttpClientBuild`] if TLS setup fails.
pub fn http_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, GoogleError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| GoogleError::HttpClientBuild(e.to_string()))
}
