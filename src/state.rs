//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the config, the two Google clients behind their traits, the
//! readiness flags set by bootstrap, and the per-browser session map.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::google::{IdentityApi, SheetsApi};
use crate::services::bootstrap::Readiness;
use crate::services::session::Session;

pub type SessionMap = Arc<RwLock<HashMap<String, Session>>>;

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sheets: Arc<dyn SheetsApi>,
    pub identity: Arc<dyn IdentityApi>,
    pub readiness: Readiness,
    pub sessions: SessionMap,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, sheets: Arc<dyn SheetsApi>, identity: Arc<dyn IdentityApi>) -> Self {
        Self {
            config: Arc::new(config),
            sheets,
            identity,
            readiness: Readiness::default(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
