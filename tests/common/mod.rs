#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use marketplace_mock::config::ApiConfig;
use marketplace_mock::db::MarketStorage;
use marketplace_mock::router::{MarketState, market_router};
use marketplace_mock::types::marketplace::Marketplace;
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tower::ServiceExt;

pub const AMAZON_TOKEN: &str = "amazon-test-token";
pub const NOON_TOKEN: &str = "noon-test-token";
pub const BOUNDARY: &str = "----marketplace-mock-boundary";

pub struct TestApp {
    pub app: Router,
    pub storage: MarketStorage,
    pub user_id: i64,
}

/// In-memory app with one user holding a non-expiring token per marketplace.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(ApiConfig::default()).await
}

pub async fn spawn_app_with(api: ApiConfig) -> TestApp {
    let storage = MarketStorage::connect("sqlite::memory:", 1)
        .await
        .expect("failed to open in-memory database");
    let user_id = storage
        .ensure_user("testuser")
        .await
        .expect("failed to create user");

    for (marketplace, client_id, token) in [
        (Marketplace::AmazonAe, "amazon_ae_client", AMAZON_TOKEN),
        (Marketplace::NoonAe, "noon_ae_client", NOON_TOKEN),
    ] {
        let id = storage
            .insert_credential(user_id, marketplace, client_id, "s3cret")
            .await
            .expect("failed to insert credential");
        storage
            .store_access_token(id, token, None)
            .await
            .expect("failed to store token");
    }

    let app = market_router(MarketState::new(storage.clone(), api));
    TestApp {
        app,
        storage,
        user_id,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Hand-built `multipart/form-data` body with an optional file part.
pub fn multipart_body(data_type: Option<&str>, file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(data_type) = data_type {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data_type\"\r\n\r\n{data_type}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.xlsx\"\r\n\
                 Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("failed to build request")
}

/// Build an xlsx workbook; cells that parse as numbers are written as numbers.
pub fn xlsx(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *name)
            .expect("failed to write header");
    }
    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(n) => sheet.write_number(r, col, n).expect("failed to write number"),
                Err(_) => sheet.write_string(r, col, *value).expect("failed to write string"),
            };
        }
    }
    workbook.save_to_buffer().expect("failed to save workbook")
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, json)
}
