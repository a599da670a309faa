//! Google client bootstrap.
//!
//! The Sheets client loads its discovery document first; the identity client
//! initializes only after that succeeds. Each step flips one readiness flag.
//! There is no retry: a failed step is logged and the login page keeps
//! showing its loader.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;

use crate::google::{IdentityApi, SheetsApi};
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct Readiness {
    api: Arc<AtomicBool>,
    identity: Arc<AtomicBool>,
}

impl Readiness {
    pub fn mark_api_ready(&self) {
        self.api.store(true, Ordering::Release);
    }

    pub fn mark_identity_ready(&self) {
        self.identity.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn api_ready(&self) -> bool {
        self.api.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn identity_ready(&self) -> bool {
        self.identity.load(Ordering::Acquire)
    }

    /// Both clients usable; until then the login control stays hidden.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.api_ready() && self.identity_ready()
    }
}

/// Initialize both clients in order, marking readiness as each succeeds.
pub async fn initialize(sheets: &dyn SheetsApi, identity: &dyn IdentityApi, readiness: &Readiness) {
    if !readiness.api_ready() {
        match sheets.load().await {
            Ok(()) => {
                readiness.mark_api_ready();
                tracing::info!("sheets client ready");
            }
            Err(e) => {
                tracing::error!(error = %e, "sheets client failed to load");
                return;
            }
        }
    }

    if !readiness.identity_ready() {
        match identity.init().await {
            Ok(()) => {
                readiness.mark_identity_ready();
                tracing::info!("identity client ready");
            }
            Err(e) => tracing::error!(error = %e, "identity client failed to initialize"),
        }
    }
}

/// Run [`initialize`] in the background so the listener can start immediately.
#[must_use]
pub fn spawn_bootstrap(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        initialize(state.sheets.as_ref(), state.identity.as_ref(), &state.readiness).await;
    })
}

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;
