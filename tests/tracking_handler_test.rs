mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{build_app, oid, TestApp};
use shipdesk_backend::model::quote::QuoteStatus;

async fn create_tracking(app: &TestApp, number: &str, client: &str, quotes: &[&str]) -> (StatusCode, serde_json::Value) {
    app.call(
        "POST",
        "/api/tracking",
        Some(json!({
            "trackingNumber": number,
            "clientId": client,
            "quoteIds": quotes,
            "declaredValue": 300.0,
            "shippingCost": 20.0,
        })),
    )
    .await
}

#[tokio::test]
async fn test_create_tracking_links_quotes() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "purchased").await;

    let (status, body) = create_tracking(&app, "1Z999AA10123456784", &client, &[&quote]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalValue"], 320.0);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["client"]["name"], "Ana Ruiz");
    assert_eq!(body["quotes"].as_array().unwrap().len(), 1);

    let tracking_id = oid(&body);
    assert_eq!(app.quote(&quote).tracking_id.map(|id| id.to_hex()), Some(tracking_id.clone()));

    let (status, detail) = app.call("GET", &format!("/api/tracking/{}", tracking_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["trackingNumber"], "1Z999AA10123456784");
}

#[tokio::test]
async fn test_duplicate_tracking_number_rejected() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let first = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let second = app.create_quote(&client, "Camera", 200.0, "received").await;

    let (status, _) = create_tracking(&app, "TRK-1", &client, &[&first]).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = create_tracking(&app, "TRK-1", &client, &[&second]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("TRK-1"));

    assert_eq!(app.store.lock().trackings.len(), 1);
    assert!(app.quote(&second).tracking_id.is_none());
}

#[tokio::test]
async fn test_quote_of_another_client_rejected() {
    let app = build_app();
    let ana = app.create_client("Ana Ruiz", "ana@example.com").await;
    let bruno = app.create_client("Bruno Diaz", "bruno@example.com").await;
    let foreign = app.create_quote(&bruno, "Drone", 300.0, "purchased").await;

    let (status, body) = create_tracking(&app, "TRK-2", &ana, &[&foreign]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("does not belong"));
    assert!(app.store.lock().trackings.is_empty());
}

#[tokio::test]
async fn test_ineligible_quote_rejected() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let fresh = app.create_quote(&client, "Drone", 300.0, "quote").await;

    let (status, _) = create_tracking(&app, "TRK-3", &client, &[&fresh]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_tracking(&app, "TRK-3", &client, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quote_already_shipped_elsewhere_rejected() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "held").await;

    let (status, _) = create_tracking(&app, "TRK-4", &client, &[&quote]).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = create_tracking(&app, "TRK-5", &client, &[&quote]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("another shipment"));
}

#[tokio::test]
async fn test_status_and_payment_rules() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let (_, body) = create_tracking(&app, "TRK-6", &client, &[&quote]).await;
    let id = oid(&body);

    let (status, body) = app
        .call("PATCH", &format!("/api/tracking/{}/status", id), Some(json!({ "status": "in_transit" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_transit");

    let (status, body) = app
        .call("PATCH", &format!("/api/tracking/{}/payment", id), Some(json!({ "amountPaid": 100.0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_transit");
    assert_eq!(body["amountPaid"], 100.0);

    let (_, body) = app
        .call("PATCH", &format!("/api/tracking/{}/payment", id), Some(json!({ "amountPaid": 500.0 })))
        .await;
    assert_eq!(body["status"], "paid");
    assert_eq!(body["amountPaid"], 320.0);

    let (status, _) = app
        .call("PATCH", &format!("/api/tracking/{}/status", id), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_paid_status_settles_total() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let (_, body) = create_tracking(&app, "TRK-7", &client, &[&quote]).await;
    let id = oid(&body);

    let (_, body) = app
        .call("PATCH", &format!("/api/tracking/{}/status", id), Some(json!({ "status": "paid" })))
        .await;
    assert_eq!(body["amountPaid"], 320.0);
}

#[tokio::test]
async fn test_update_replaces_quote_set() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let first = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let second = app.create_quote(&client, "Camera", 200.0, "ready_to_ship").await;
    let (_, body) = create_tracking(&app, "TRK-8", &client, &[&first]).await;
    let id = oid(&body);

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/tracking/{}", id),
            Some(json!({
                "trackingNumber": "TRK-8",
                "clientId": client,
                "quoteIds": [second],
                "declaredValue": 200.0,
                "shippingCost": 10.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["totalValue"], 210.0);
    assert!(app.quote(&first).tracking_id.is_none());
    assert!(app.quote(&second).tracking_id.is_some());
}

#[tokio::test]
async fn test_delete_detaches_quotes() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let (_, body) = create_tracking(&app, "TRK-9", &client, &[&quote]).await;
    let id = oid(&body);

    let (status, _) = app.call("DELETE", &format!("/api/tracking/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.quote(&quote).tracking_id.is_none());

    let (_, eligible) = app.call("GET", &format!("/api/tracking/eligible-quotes?clientId={}", client), None).await;
    assert_eq!(eligible.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_shipment_marks_quotes_shipped() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let first = app.create_quote(&client, "Drone", 300.10, "purchased").await;
    let second = app.create_quote(&client, "Camera", 199.95, "held").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/tracking/batch",
            Some(json!({
                "trackingNumber": "BATCH-1",
                "clientId": client,
                "quoteIds": [first, second],
                "shippingCost": 25.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["declaredValue"], 500.05);
    assert_eq!(body["quotes"].as_array().unwrap().len(), 2);

    for id in [&first, &second] {
        let quote = app.quote(id);
        assert_eq!(quote.status, QuoteStatus::Shipped);
        assert!(quote.tracking_id.is_some());
        assert_eq!(app.activity_count(id), 2);
    }

    let (_, eligible) = app.call("GET", &format!("/api/tracking/eligible-quotes?clientId={}", client), None).await;
    assert!(eligible.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_batch_changes_nothing() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let shipped = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let (status, _) = create_tracking(&app, "BATCH-2", &client, &[&shipped]).await;
    assert_eq!(status, StatusCode::CREATED);

    let good = app.create_quote(&client, "Camera", 200.0, "purchased").await;
    let bad = app.create_quote(&client, "Tripod", 50.0, "quote").await;

    let (status, _) = app
        .call(
            "POST",
            "/api/tracking/batch",
            Some(json!({ "trackingNumber": "BATCH-3", "clientId": client, "quoteIds": [good, bad], "shippingCost": 5.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/tracking/batch",
            Some(json!({ "trackingNumber": "BATCH-2", "clientId": client, "quoteIds": [good], "shippingCost": 5.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.lock().trackings.len(), 1);
    let good_quote = app.quote(&good);
    assert_eq!(good_quote.status, QuoteStatus::Purchased);
    assert!(good_quote.tracking_id.is_none());
    assert_eq!(app.activity_count(&good), 1);
}

#[tokio::test]
async fn test_list_filters() {
    let app = build_app();
    let ana = app.create_client("Ana Ruiz", "ana@example.com").await;
    let bruno = app.create_client("Bruno Diaz", "bruno@example.com").await;
    let a = app.create_quote(&ana, "Drone", 300.0, "purchased").await;
    let b = app.create_quote(&bruno, "Camera", 200.0, "purchased").await;
    create_tracking(&app, "TRK-A", &ana, &[&a]).await;
    let (_, body) = create_tracking(&app, "TRK-B", &bruno, &[&b]).await;
    app.call("PATCH", &format!("/api/tracking/{}/status", oid(&body)), Some(json!({ "status": "delivered" })))
        .await;

    let (_, all) = app.call("GET", "/api/tracking", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, delivered) = app.call("GET", "/api/tracking?status=delivered", None).await;
    let delivered = delivered.as_array().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0]["trackingNumber"], "TRK-B");

    let (_, for_ana) = app.call("GET", &format!("/api/tracking?clientId={}", ana), None).await;
    assert_eq!(for_ana.as_array().unwrap()[0]["trackingNumber"], "TRK-A");
}

#[tokio::test]
async fn test_two_received_quotes_shipped_and_settled() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let q1 = app.create_quote(&client, "Monitor", 100.0, "received").await;
    let q2 = app.create_quote(&client, "Desk", 200.0, "received").await;

    let (status, body) = create_tracking(&app, "SCN-1", &client, &[&q1, &q2]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["declaredValue"], 300.0);
    assert_eq!(body["shippingCost"], 20.0);
    assert_eq!(body["totalValue"], 320.0);
    let id = oid(&body);

    let (status, body) = app
        .call("PATCH", &format!("/api/tracking/{}/payment", id), Some(json!({ "amountPaid": 320.0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
    assert_eq!(body["amountPaid"], 320.0);
}

#[tokio::test]
async fn test_missing_declared_value_is_bad_request() {
    let app = build_app();
    let client = app.create_client("Ana Ruiz", "ana@example.com").await;
    let quote = app.create_quote(&client, "Drone", 300.0, "purchased").await;
    let (status, body) = app
        .call(
            "POST",
            "/api/tracking",
            Some(json!({
                "trackingNumber": "TRK-NODECL",
                "clientId": client,
                "quoteIds": [quote],
                "shippingCost": 20.0,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
    assert!(body["message"].as_str().unwrap().contains("declaredValue"));
    assert!(app.store.lock().trackings.is_empty());
    assert!(app.quote(&quote).tracking_id.is_none());
}
