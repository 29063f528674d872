mod common;

use axum::http::StatusCode;
use common::{AMAZON_TOKEN, NOON_TOKEN, get, post_json, send, spawn_app};
use serde_json::json;

#[tokio::test]
async fn health_reports_database_active() {
    let t = spawn_app().await;
    let (status, body) = send(&t.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "awake", "database": "active"}));
}

#[tokio::test]
async fn client_credentials_exchange_for_a_working_token() {
    let t = spawn_app().await;

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/auth/token",
            None,
            json!({"client_id": "noon_ae_client", "client_secret": "s3cret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["marketplace"], "NOON_AE");
    assert_eq!(body["expires_in"], 86_400);
    let token = body["access_token"].as_str().expect("token missing").to_string();
    assert_ne!(token, NOON_TOKEN);

    let (status, body) = send(&t.app, get("/api/noon-ae/products", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // the previous token was replaced
    let (status, _) = send(&t.app, get("/api/noon-ae/products", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_endpoint_rejects_bad_input() {
    let t = spawn_app().await;

    let (status, body) = send(
        &t.app,
        post_json("/api/auth/token", None, json!({"client_id": "noon_ae_client"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_PARAMS");

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/auth/token",
            None,
            json!({"client_id": "noon_ae_client", "client_secret": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn missing_and_unknown_tokens_are_unauthorized() {
    let t = spawn_app().await;

    let (status, body) = send(&t.app, get("/api/amazon-ae/catalog/items", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");

    let (status, body) = send(&t.app, get("/api/amazon-ae/catalog/items", Some("nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    let t = spawn_app().await;
    let req = axum::http::Request::builder()
        .uri("/api/amazon-ae/orders")
        .header("authorization", format!("bearer {AMAZON_TOKEN}"))
        .body(axum::body::Body::empty())
        .expect("failed to build request");
    let (status, _) = send(&t.app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let t = spawn_app().await;
    let cred = t
        .storage
        .find_by_access_token(AMAZON_TOKEN)
        .await
        .expect("lookup failed")
        .expect("credential missing");
    let past = chrono::Utc::now() - chrono::Duration::minutes(5);
    t.storage
        .store_access_token(cred.id, "stale-token", Some(past))
        .await
        .expect("failed to store token");

    let (status, body) = send(&t.app, get("/api/amazon-ae/orders", Some("stale-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn tokens_are_scoped_to_their_marketplace() {
    let t = spawn_app().await;

    let (status, body) = send(&t.app, get("/api/noon-ae/orders", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = send(&t.app, get("/api/amazon-ae/fba/inventory", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, get("/api/amazon-ae/fba/inventory", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
}
