mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{build_app, token_for};
use shipdesk_backend::model::user::ROLE_USER;

#[tokio::test]
async fn test_defaults_created_on_first_read() {
    let app = build_app();
    let (status, settings) = app.call("GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["currency"], "USD");
    assert_eq!(settings["platformOptions"].as_array().unwrap().len(), 5);
    assert!(app.store.lock().settings.is_some());
}

#[tokio::test]
async fn test_partial_update_by_admin() {
    let app = build_app();
    let (status, settings) = app
        .call(
            "PUT",
            "/api/settings",
            Some(json!({
                "companyName": "Shipdesk LLC",
                "currency": "eur",
                "paymentOptions": [" Cash ", "Cash", "Wire", ""],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{settings}");
    assert_eq!(settings["companyName"], "Shipdesk LLC");
    assert_eq!(settings["currency"], "EUR");
    assert_eq!(settings["paymentOptions"], json!(["Cash", "Wire"]));
    assert_eq!(settings["taxRate"], 0.0);

    let (_, reread) = app.call("GET", "/api/settings", None).await;
    assert_eq!(reread["companyName"], "Shipdesk LLC");
}

#[tokio::test]
async fn test_invalid_tax_rate_rejected() {
    let app = build_app();
    let (status, _) = app.call("PUT", "/api/settings", Some(json!({ "taxRate": 120.0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_requires_admin() {
    let app = build_app();
    let token = token_for(&app.jwt_utils, ROLE_USER);

    let (status, _) = app.send(Some(&token), "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Some(&token), "PUT", "/api/settings", Some(json!({ "companyName": "Nope" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(None, "PUT", "/api/settings", Some(json!({ "companyName": "Nope" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
