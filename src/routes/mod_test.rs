use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, header};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::*;

async fn send(app: &Router, method: &str, uri: &str, sid: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(sid) = sid {
        builder = builder.header(header::COOKIE, format!("session_token={sid}"));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("session_token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

fn nonce_from(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .unwrap()
        .to_owned()
}

fn ready_app(behavior: SheetsBehavior) -> (Router, AppState, Arc<FakeIdentity>) {
    let identity = Arc::new(FakeIdentity::default());
    let state = ready_app_state(Arc::new(FakeSheets::new(behavior)), identity.clone());
    (app(state.clone()), state, identity)
}

#[tokio::test]
async fn healthz_ok() {
    let (app, _, _) = ready_app(SheetsBehavior::Missing);
    let resp = send(&app, "GET", "/healthz", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_redirects_to_login() {
    let (app, _, _) = ready_app(SheetsBehavior::Missing);
    let resp = send(&app, "GET", "/", None).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn login_page_shows_loader_until_ready() {
    let state = test_app_state(Arc::new(FakeSheets::new(SheetsBehavior::Missing)), Arc::new(FakeIdentity::default()));
    let app = app(state.clone());

    let resp = send(&app, "GET", "/login", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_some());
    assert!(body_string(resp).await.contains("class=\"loader\""));

    state.readiness.mark_api_ready();
    state.readiness.mark_identity_ready();
    let html = body_string(send(&app, "GET", "/login", None).await).await;
    assert!(html.contains(">Login</button>"));
}

#[tokio::test]
async fn google_redirect_unready_is_503() {
    let state = test_app_state(Arc::new(FakeSheets::new(SheetsBehavior::Missing)), Arc::new(FakeIdentity::default()));
    let resp = send(&app(state), "GET", "/auth/google", Some("sid")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn full_login_fetch_redirect_logout_cycle() {
    let (app, _, identity) = ready_app(SheetsBehavior::Rows(sample_rows(&["Cake", "Pie"])));

    let page = send(&app, "GET", "/login?pathName=dessert", None).await;
    let sid = session_cookie(&page).unwrap();
    assert!(body_string(page).await.contains("value=\"dessert\""));

    let start = send(&app, "GET", "/auth/google?pathName=dessert", Some(&sid)).await;
    assert_eq!(start.status(), StatusCode::TEMPORARY_REDIRECT);
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?code=abc&state={nonce}"), Some(&sid)).await;
    assert_eq!(cb.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&cb), "/recipes/dessert");

    let json = body_string(send(&app, "GET", "/api/recipes", Some(&sid)).await).await;
    let recipes: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[1]["id"], 1);
    assert_eq!(recipes[1]["title"], "Pie");

    let landing = body_string(send(&app, "GET", "/recipes/dessert", Some(&sid)).await).await;
    assert!(landing.contains("<strong>Cake</strong>"));

    let summary = body_string(send(&app, "GET", "/api/session", Some(&sid)).await).await;
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&summary).unwrap(),
        serde_json::json!({ "ready": true, "isLoggedIn": true, "recipeCount": 2 })
    );

    let out = send(&app, "POST", "/auth/logout", Some(&sid)).await;
    assert_eq!(out.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&out), "/login");
    assert_eq!(identity.revoked(), vec!["token-for-abc".to_owned()]);

    let summary = body_string(send(&app, "GET", "/api/session", Some(&sid)).await).await;
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&summary).unwrap(),
        serde_json::json!({ "ready": true, "isLoggedIn": false, "recipeCount": 0 })
    );
}

#[tokio::test]
async fn callback_without_path_name_lands_on_base() {
    let (app, _, _) = ready_app(SheetsBehavior::Rows(sample_rows(&["Cake"])));
    let start = send(&app, "GET", "/auth/google", Some("sid-1")).await;
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?code=abc&state={nonce}"), Some("sid-1")).await;
    assert_eq!(location(&cb), "/recipes");
}

#[tokio::test]
async fn non_ascii_path_name_redirects_percent_encoded() {
    let (app, _, _) = ready_app(SheetsBehavior::Rows(sample_rows(&["Cake"])));
    let start = send(&app, "GET", "/auth/google?pathName=cr%C3%A8me", Some("sid-8")).await;
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?code=abc&state={nonce}"), Some("sid-8")).await;
    assert_eq!(cb.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&cb), "/recipes/cr%C3%A8me");
}

#[tokio::test]
async fn callback_with_error_is_401() {
    let (app, state, _) = ready_app(SheetsBehavior::Rows(sample_rows(&["Cake"])));
    let start = send(&app, "GET", "/auth/google", Some("sid-2")).await;
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?error=access_denied&state={nonce}"), Some("sid-2")).await;
    assert_eq!(cb.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(cb).await.contains("access_denied"));
    assert!(!with_session(&state, "sid-2", |s| s.is_logged_in()).await);
}

#[tokio::test]
async fn callback_with_forged_state_is_400() {
    let (app, _, _) = ready_app(SheetsBehavior::Rows(sample_rows(&["Cake"])));
    let cb = send(&app, "GET", "/auth/google/callback?code=abc&state=forged", Some("sid-3")).await;
    assert_eq!(cb.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn denied_fetch_returns_to_login_with_alert_once() {
    let (app, _, _) = ready_app(SheetsBehavior::Denied);
    let start = send(&app, "GET", "/auth/google?pathName=dessert", Some("sid-4")).await;
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?code=abc&state={nonce}"), Some("sid-4")).await;
    assert_eq!(cb.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&cb), "/login");

    let html = body_string(send(&app, "GET", "/login", Some("sid-4")).await).await;
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("You do not have access to the spreadsheet"));

    let again = body_string(send(&app, "GET", "/login", Some("sid-4")).await).await;
    assert!(!again.contains("role=\"alert\""));
}

#[tokio::test]
async fn empty_sheet_returns_to_login_without_recipes() {
    let (app, _, _) = ready_app(SheetsBehavior::Missing);
    let start = send(&app, "GET", "/auth/google", Some("sid-5")).await;
    let nonce = nonce_from(&location(&start));

    let cb = send(&app, "GET", &format!("/auth/google/callback?code=abc&state={nonce}"), Some("sid-5")).await;
    assert_eq!(location(&cb), "/login");

    let json = body_string(send(&app, "GET", "/api/recipes", Some("sid-5")).await).await;
    assert_eq!(json, "[]");
}

#[tokio::test]
async fn logged_out_recipe_page_redirects_with_path_name() {
    let (app, _, _) = ready_app(SheetsBehavior::Missing);
    let resp = send(&app, "GET", "/recipes/dessert", Some("sid-6")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login?pathName=dessert");

    let resp = send(&app, "GET", "/recipes", Some("sid-6")).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn api_recipes_empty_when_logged_out() {
    let (app, _, _) = ready_app(SheetsBehavior::Missing);
    let json = body_string(send(&app, "GET", "/api/recipes", None).await).await;
    assert_eq!(json, "[]");
}
