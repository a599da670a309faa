//! Google API types: errors, tokens, and wire payloads shared by the Sheets
//! and identity clients.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by Google client operations.
#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// Google answered 401/403: the caller's credentials lack access.
    #[error("permission denied: status {status}")]
    PermissionDenied { status: u16, body: String },

    /// Any other non-success status.
    #[error("response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A client was used before `load`/`init` completed.
    #[error("client not initialized")]
    NotInitialized,
}

impl GoogleError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::PermissionDenied { status, body },
            _ => Self::Response { status, body },
        }
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// An OAuth access token granted by Google Identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl AccessToken {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), expires_in: None, scope: None, token_type: None }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.access_token
    }
}

// Keep the bearer value out of logs.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// How the authorization server should treat the user on a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Show the account chooser and consent screen.
    Consent,
    /// Skip the dialogs when Google can; used when a token is already held.
    Silent,
}

impl Prompt {
    /// Value of the `prompt` authorize parameter, `None` to omit it.
    #[must_use]
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Consent => Some("consent"),
            Self::Silent => None,
        }
    }
}

// =============================================================================
// SHEETS WIRE TYPES
// =============================================================================

/// Body of `spreadsheets.values.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    /// Absent entirely when the range holds no data.
    #[serde(default)]
    pub values: Option<Vec<Vec<String>>>,
}

impl ValueRange {
    /// Rows of the range, empty when Google omitted `values`.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.values.as_deref().unwrap_or_default()
    }
}

/// Subset of the discovery document needed to address the values endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDoc {
    pub name: String,
    pub version: String,
    pub root_url: String,
    #[serde(default)]
    pub service_path: String,
}

impl DiscoveryDoc {
    /// Base URL that resource paths (`v4/spreadsheets/...`) are joined onto.
    #[must_use]
    pub fn base_url(&self) -> String {
        let root = if self.root_url.ends_with('/') { self.root_url.clone() } else { format!("{}/", self.root_url) };
        format!("{root}{}", self.service_path.trim_start_matches('/'))
    }
}

/// Error body Google attaches to OAuth endpoint failures.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
