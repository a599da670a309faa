//! Sheets v4 client.
//!
//! Thin HTTP wrapper around the discovery document and
//! `spreadsheets.values.get`. Pure parsing in `parse_discovery` and
//! `parse_values_response` for testability.

use std::sync::OnceLock;

use reqwest::Url;

use super::types::{AccessToken, DiscoveryDoc, GoogleError, ValueRange};
use super::SheetsApi;

pub struct SheetsClient {
    http: reqwest::Client,
    api_key: String,
    discovery_url: String,
    /// Set once by `load`.
    base_url: OnceLock<String>,
}

impl SheetsClient {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: String, discovery_url: String) -> Self {
        Self { http, api_key, discovery_url, base_url: OnceLock::new() }
    }
}

#[async_trait::async_trait]
impl SheetsApi for SheetsClient {
    async fn load(&self) -> Result<(), GoogleError> {
        let response = self
            .http
            .get(&self.discovery_url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        let doc = parse_discovery(status, &text)?;
        tracing::info!(name = %doc.name, version = %doc.version, base_url = %doc.base_url(), "sheets discovery loaded");
        let _ = self.base_url.set(doc.base_url());
        Ok(())
    }

    async fn get_values(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange, GoogleError> {
        let base = self.base_url.get().ok_or(GoogleError::NotInitialized)?;
        let url = values_url(base, spreadsheet_id, range, &self.api_key)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GoogleError::Request(e.to_string()))?;

        parse_values_response(status, &text)
    }
}

// =============================================================================
// URLS + PARSING
// =============================================================================

/// `{base}v4/spreadsheets/{id}/values/{range}?key={api_key}` with each path
/// segment percent-encoded.
pub(crate) fn values_url(base: &str, spreadsheet_id: &str, range: &str, api_key: &str) -> Result<Url, GoogleError> {
    let mut url = Url::parse(base).map_err(|e| GoogleError::Parse(format!("base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| GoogleError::Parse(format!("base url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

pub(crate) fn parse_discovery(status: u16, body: &str) -> Result<DiscoveryDoc, GoogleError> {
    if !(200..300).contains(&status) {
        return Err(GoogleError::from_status(status, body.to_owned()));
    }
    serde_json::from_str(body).map_err(|e| GoogleError::Parse(format!("discovery document: {e}")))
}

pub(crate) fn parse_values_response(status: u16, body: &str) -> Result<ValueRange, GoogleError> {
    if !(200..300).contains(&status) {
        return Err(GoogleError::from_status(status, body.to_owned()));
    }
    serde_json::from_str(body).map_err(|e| GoogleError::Parse(format!("value range: {e}")))
}

#[cfg(test)]
#[path = "sheets_test.rs"]
mod tests;
