//! Per-browser login session.
//!
//! ARCHITECTURE
//! ============
//! A `Session` is the single owner of login state: the auth phase, the held
//! Google token, the published recipe list and any in-flight login attempts.
//! `is_logged_in` derives from the phase, never from a second flag.
//!
//! Each login attempt registers its own `PendingLogin` under a random nonce
//! that travels through Google as the OAuth `state` parameter. The callback
//! consumes exactly that entry, so repeated or overlapping attempts never
//! share a continuation slot.
//!
//! Sessions live in the shared map until logout removes them or they sit idle
//! past `SESSION_TTL`, after which the sweeper evicts them. Epochs come from
//! one process-wide counter, so a session recreated under the same cookie
//! never matches an attempt started before the logout.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::google::{AccessToken, Prompt};
use crate::services::recipes::Recipe;
use crate::state::SessionMap;

/// Attempts older than this are dropped the next time an attempt starts.
pub const PENDING_TTL: Duration = Duration::from_secs(10 * 60);

/// Idle sessions are evicted after this long. Also the cookie max-age.
pub const SESSION_TTL: time::Duration = time::Duration::days(7);

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Generate a 16-byte hex nonce for one login attempt.
#[must_use]
pub(crate) fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    LoggedOut,
    AwaitingConsent,
    LoggedIn,
}

/// One outstanding login attempt.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    /// `pathName` captured when the login page was entered.
    pub path_name: Option<String>,
    pub prompt: Prompt,
    /// Logout count at the time the attempt started.
    pub epoch: u64,
    pub created_at: Instant,
}

#[derive(Debug)]
pub struct Session {
    phase: AuthPhase,
    token: Option<AccessToken>,
    recipes: Vec<Recipe>,
    pending: HashMap<String, PendingLogin>,
    alert: Option<String>,
    epoch: u64,
    last_seen: OffsetDateTime,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: AuthPhase::default(),
            token: None,
            recipes: Vec::new(),
            pending: HashMap::new(),
            alert: None,
            epoch: next_epoch(),
            last_seen: OffsetDateTime::now_utc(),
        }
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.phase == AuthPhase::LoggedIn
    }

    #[must_use]
    pub fn held_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn last_seen(&self) -> OffsetDateTime {
        self.last_seen
    }

    /// Record activity so the sweeper keeps the session.
    pub fn touch(&mut self, now: OffsetDateTime) {
        self.last_seen = now;
    }

    #[must_use]
    pub fn is_idle(&self, now: OffsetDateTime) -> bool {
        now - self.last_seen >= SESSION_TTL
    }

    /// Register a new login attempt and return its nonce and prompt mode.
    ///
    /// No held token means the user must see the consent screen; a held
    /// token refreshes silently.
    pub fn begin_attempt(&mut self, path_name: Option<String>) -> (String, Prompt) {
        self.prune_stale(Instant::now());

        let prompt = if self.token.is_none() { Prompt::Consent } else { Prompt::Silent };
        let nonce = generate_nonce();
        self.pending.insert(
            nonce.clone(),
            PendingLogin { path_name, prompt, epoch: self.epoch, created_at: Instant::now() },
        );
        if self.phase != AuthPhase::LoggedIn {
            self.phase = AuthPhase::AwaitingConsent;
        }
        (nonce, prompt)
    }

    /// Remove and return the attempt registered under `nonce`.
    pub fn take_attempt(&mut self, nonce: &str) -> Option<PendingLogin> {
        self.pending.remove(nonce)
    }

    /// The token grant for an attempt failed.
    pub fn attempt_failed(&mut self) {
        self.settle_waiting_phase();
    }

    /// Store a freshly granted token and mark the session logged in.
    ///
    /// Returns the token this one replaced, if it differs.
    pub fn grant(&mut self, token: AccessToken) -> Option<AccessToken> {
        self.phase = AuthPhase::LoggedIn;
        self.token.replace(token).filter(|old| Some(old) != self.token.as_ref())
    }

    /// Replace the published recipe list wholesale.
    pub fn set_recipes(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
    }

    /// Reset to logged out and hand back the token so the caller can revoke it.
    pub fn logout(&mut self) -> Option<AccessToken> {
        self.phase = AuthPhase::LoggedOut;
        self.recipes.clear();
        self.pending.clear();
        self.epoch = next_epoch();
        self.token.take()
    }

    pub fn set_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    /// Alerts show once.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub(crate) fn prune_stale(&mut self, now: Instant) {
        let before = self.pending.len();
        self.pending
            .retain(|_, attempt| now.saturating_duration_since(attempt.created_at) < PENDING_TTL);
        if self.pending.len() != before {
            tracing::debug!(dropped = before - self.pending.len(), "pruned stale login attempts");
            self.settle_waiting_phase();
        }
    }

    fn settle_waiting_phase(&mut self) {
        if self.phase == AuthPhase::AwaitingConsent && self.pending.is_empty() {
            self.phase = AuthPhase::LoggedOut;
        }
    }
}

// =============================================================================
// EVICTION
// =============================================================================

/// Drop every idle session from `sessions`. Returns how many were removed.
pub fn evict_idle(sessions: &mut HashMap<String, Session>, now: OffsetDateTime) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_idle(now));
    before - sessions.len()
}

/// Spawn the hourly idle-session sweep.
pub fn spawn_session_sweeper(sessions: SessionMap) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let evicted = evict_idle(&mut *sessions.write().await, OffsetDateTime::now_utc());
            if evicted > 0 {
                tracing::info!(evicted, "evicted idle sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
