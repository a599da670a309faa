use super::*;

#[test]
fn from_status_classifies_permission_denied() {
    assert!(matches!(GoogleError::from_status(403, String::new()), GoogleError::PermissionDenied { status: 403, .. }));
    assert!(matches!(GoogleError::from_status(401, String::new()), GoogleError::PermissionDenied { status: 401, .. }));
    assert!(matches!(GoogleError::from_status(500, "boom".into()), GoogleError::Response { status: 500, .. }));
}

#[test]
fn error_display_includes_status() {
    let err = GoogleError::from_status(404, "not found".into());
    assert!(err.to_string().contains("404"));
}

#[test]
fn access_token_debug_redacts_secret() {
    let token = AccessToken::new("ya29.super-secret");
    let debug = format!("{token:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("redacted"));
}

#[test]
fn access_token_deserializes_google_token_body() {
    let json = r#"{"access_token":"ya29.a0","expires_in":3599,"scope":"https://www.googleapis.com/auth/spreadsheets","token_type":"Bearer"}"#;
    let token: AccessToken = serde_json::from_str(json).unwrap();
    assert_eq!(token.secret(), "ya29.a0");
    assert_eq!(token.expires_in, Some(3599));
    assert_eq!(token.token_type.as_deref(), Some("Bearer"));
}

#[test]
fn prompt_params() {
    assert_eq!(Prompt::Consent.as_param(), Some("consent"));
    assert_eq!(Prompt::Silent.as_param(), None);
}

#[test]
fn value_range_without_values_has_no_rows() {
    let json = r#"{"range":"recipeServerSpreadsheet!A2:E1000","majorDimension":"ROWS"}"#;
    let vr: ValueRange = serde_json::from_str(json).unwrap();
    assert!(vr.values.is_none());
    assert!(vr.rows().is_empty());
    assert_eq!(vr.major_dimension.as_deref(), Some("ROWS"));
}

#[test]
fn value_range_keeps_ragged_rows() {
    let json = r#"{"values":[["Pancakes","Ann","Breakfast","flour","mix"],["Toast"]]}"#;
    let vr: ValueRange = serde_json::from_str(json).unwrap();
    assert_eq!(vr.rows().len(), 2);
    assert_eq!(vr.rows()[1], vec!["Toast".to_owned()]);
}

#[test]
fn discovery_base_url_joins_root_and_service_path() {
    let doc = DiscoveryDoc {
        name: "sheets".into(),
        version: "v4".into(),
        root_url: "https://sheets.googleapis.com/".into(),
        service_path: String::new(),
    };
    assert_eq!(doc.base_url(), "https://sheets.googleapis.com/");

    let doc = DiscoveryDoc { root_url: "http://127.0.0.1:9000".into(), service_path: "/proxy/".into(), ..doc };
    assert_eq!(doc.base_url(), "http://127.0.0.1:9000/proxy/");
}
