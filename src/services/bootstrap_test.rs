use std::sync::atomic::Ordering;

use super::*;
use crate::state::test_helpers::{FakeIdentity, FakeSheets, SheetsBehavior, test_app_state};

#[test]
fn readiness_requires_both_flags() {
    let r = Readiness::default();
    assert!(!r.is_ready());
    r.mark_api_ready();
    assert!(r.api_ready());
    assert!(!r.is_ready());
    r.mark_identity_ready();
    assert!(r.is_ready());
}

#[tokio::test]
async fn initialize_marks_both_ready_in_order() {
    let sheets = FakeSheets::new(SheetsBehavior::Missing);
    let identity = FakeIdentity::default();
    let readiness = Readiness::default();

    initialize(&sheets, &identity, &readiness).await;

    assert!(readiness.is_ready());
    assert_eq!(sheets.loads.load(Ordering::SeqCst), 1);
    assert_eq!(identity.inits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_api_load_skips_identity() {
    let sheets = FakeSheets::failing_load();
    let identity = FakeIdentity::default();
    let readiness = Readiness::default();

    initialize(&sheets, &identity, &readiness).await;

    assert!(!readiness.api_ready());
    assert!(!readiness.identity_ready());
    assert_eq!(identity.inits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_identity_init_leaves_api_ready_only() {
    let sheets = FakeSheets::new(SheetsBehavior::Missing);
    let identity = FakeIdentity { init_fails: true, ..FakeIdentity::default() };
    let readiness = Readiness::default();

    initialize(&sheets, &identity, &readiness).await;

    assert!(readiness.api_ready());
    assert!(!readiness.identity_ready());
    assert!(!readiness.is_ready());
}

#[tokio::test]
async fn initialize_skips_steps_already_done() {
    let sheets = FakeSheets::new(SheetsBehavior::Missing);
    let identity = FakeIdentity::default();
    let readiness = Readiness::default();
    readiness.mark_api_ready();

    initialize(&sheets, &identity, &readiness).await;

    assert_eq!(sheets.loads.load(Ordering::SeqCst), 0);
    assert!(readiness.is_ready());
}

#[tokio::test]
async fn spawn_bootstrap_updates_shared_state() {
    let state = test_app_state(Arc::new(FakeSheets::new(SheetsBehavior::Missing)), Arc::new(FakeIdentity::default()));
    spawn_bootstrap(state.clone()).await.unwrap();
    assert!(state.readiness.is_ready());
}
