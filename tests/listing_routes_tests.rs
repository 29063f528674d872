mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use common::{AMAZON_TOKEN, NOON_TOKEN, TestApp, get, post_json, send, spawn_app};
use marketplace_mock::service::sheet::SheetRow;
use marketplace_mock::service::uploader::BulkUploader;
use marketplace_mock::types::marketplace::{DataType, Marketplace};
use serde_json::json;

async fn load(t: &TestApp, marketplace: Marketplace, data_type: DataType, rows: &[&[(&str, &str)]]) {
    let rows: Vec<SheetRow> = rows
        .iter()
        .map(|cells| SheetRow::from_cells(cells.iter().map(|(k, v)| (*k, *v))))
        .collect();
    BulkUploader::new(t.storage.clone())
        .upload(t.user_id, marketplace, data_type, &rows)
        .await
        .expect("seed upload failed");
}

async fn load_amazon_products(t: &TestApp, count: usize) {
    let asins: Vec<String> = (0..count).map(|i| format!("B{i:05}")).collect();
    let rows: Vec<Vec<(&str, &str)>> = asins
        .iter()
        .map(|asin| vec![("asin", asin.as_str()), ("title", "Desk Lamp"), ("price", "12.5")])
        .collect();
    let refs: Vec<&[(&str, &str)]> = rows.iter().map(Vec::as_slice).collect();
    load(t, Marketplace::AmazonAe, DataType::Products, &refs).await;
}

#[tokio::test]
async fn catalog_pages_cover_every_item_exactly_once() {
    let t = spawn_app().await;
    load_amazon_products(&t, 23).await;

    let mut seen = HashSet::new();
    let mut pages = 0;
    let mut uri = "/api/amazon-ae/catalog/items?MaxResults=5".to_string();
    loop {
        let (status, body) = send(&t.app, get(&uri, Some(AMAZON_TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        pages += 1;
        assert_eq!(body["payload"]["NumberOfResults"], 23);
        for item in body["payload"]["Items"].as_array().expect("Items missing") {
            let asin = item["asin"].as_str().expect("asin missing").to_string();
            assert!(seen.insert(asin), "item returned twice");
        }
        match body["payload"]["NextToken"].as_str() {
            Some(token) => uri = format!("/api/amazon-ae/catalog/items?MaxResults=5&NextToken={token}"),
            None => break,
        }
    }
    assert_eq!(pages, 5);
    assert_eq!(seen.len(), 23);
}

#[tokio::test]
async fn catalog_item_shape_and_lookup() {
    let t = spawn_app().await;
    load_amazon_products(&t, 1).await;

    let (status, body) = send(&t.app, get("/api/amazon-ae/catalog/items/B00000", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    let item = &body["payload"];
    assert_eq!(item["title"], "Desk Lamp");
    assert_eq!(item["listPrice"], json!({"amount": 12.5, "currencyCode": "AED"}));
    assert_eq!(item["status"], "ACTIVE");

    let (status, body) = send(&t.app, get("/api/amazon-ae/catalog/items/NOPE", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn empty_listing_is_one_empty_page() {
    let t = spawn_app().await;
    let (status, body) = send(&t.app, get("/api/amazon-ae/catalog/items", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["Items"], json!([]));
    assert!(body["payload"]["NextToken"].is_null());
}

#[tokio::test]
async fn garbage_next_token_is_bad_request() {
    let t = spawn_app().await;
    for uri in [
        "/api/amazon-ae/catalog/items?NextToken=!!!",
        // valid base64, but not an offset
        "/api/amazon-ae/orders?NextToken=bm90LWFuLW9mZnNldA",
        "/api/noon-ae/products?next_token=bm90LWFuLW9mZnNldA",
    ] {
        let token = if uri.contains("noon") { NOON_TOKEN } else { AMAZON_TOKEN };
        let (status, body) = send(&t.app, get(uri, Some(token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "INVALID_NEXT_TOKEN", "{uri}");
    }
}

#[tokio::test]
async fn amazon_orders_are_newest_first_and_filterable() {
    let t = spawn_app().await;
    load(
        &t,
        Marketplace::AmazonAe,
        DataType::Orders,
        &[
            &[
                ("amazon_order_id", "402-0001"),
                ("purchase_date", "2024-08-01 09:00:00"),
                ("order_status", "Shipped"),
                ("order_total_amount", "100"),
                ("order_item_id", "OI-1"),
                ("item_asin", "B00001"),
                ("item_price", "60"),
            ],
            &[
                ("amazon_order_id", "402-0001"),
                ("order_item_id", "OI-2"),
                ("item_asin", "B00002"),
                ("item_price", "40"),
            ],
            &[
                ("amazon_order_id", "402-0002"),
                ("purchase_date", "2024-08-20 09:00:00"),
                ("order_status", "Pending"),
            ],
        ],
    )
    .await;

    let (status, body) = send(&t.app, get("/api/amazon-ae/orders", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["payload"]["Orders"].as_array().expect("Orders missing");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["AmazonOrderId"], "402-0002");
    assert_eq!(orders[1]["OrderTotal"]["Amount"], "100.00");
    assert!(body["payload"]["LastUpdatedBefore"].is_string());

    let (_, body) = send(
        &t.app,
        get("/api/amazon-ae/orders?CreatedAfter=2024-08-10", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(body["payload"]["Orders"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(
        &t.app,
        get("/api/amazon-ae/orders?OrderStatus=Shipped", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(body["payload"]["Orders"][0]["AmazonOrderId"], "402-0001");

    let (status, body) = send(
        &t.app,
        get("/api/amazon-ae/orders?CreatedAfter=someday", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");

    let (status, body) = send(
        &t.app,
        get("/api/amazon-ae/orders/402-0001/items", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["AmazonOrderId"], "402-0001");
    let items = body["payload"]["OrderItems"].as_array().expect("OrderItems missing");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ItemPrice"]["Amount"], "60.00");
    assert!(body["payload"]["NextToken"].is_null());

    let (status, _) = send(&t.app, get("/api/amazon-ae/orders/402-9999", Some(AMAZON_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &t.app,
        get("/api/amazon-ae/orders/402-9999/items", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fba_inventory_filters_by_repeated_or_comma_skus() {
    let t = spawn_app().await;
    load(
        &t,
        Marketplace::AmazonAe,
        DataType::Inventory,
        &[
            &[("sku", "SKU-A"), ("available_quantity", "5"), ("reserved_quantity", "1")],
            &[("sku", "SKU-B"), ("available_quantity", "2")],
            &[("sku", "SKU-C"), ("available_quantity", "9")],
        ],
    )
    .await;

    let (status, body) = send(
        &t.app,
        get("/api/amazon-ae/fba/inventory?skus=SKU-A,SKU-C", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let summaries = body["payload"]["inventorySummaries"].as_array().expect("summaries missing");
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["sellerSku"], "SKU-A");
    assert_eq!(summaries[0]["totalQuantity"], 6);
    assert_eq!(
        summaries[0]["inventoryDetails"]["reservedQuantity"]["totalReservedQuantity"],
        1
    );

    let (_, body) = send(
        &t.app,
        get("/api/amazon-ae/fba/inventory?skus=SKU-B&skus=SKU-C", Some(AMAZON_TOKEN)),
    )
    .await;
    assert_eq!(body["payload"]["inventorySummaries"].as_array().map(Vec::len), Some(2));
    assert!(body["payload"]["nextToken"].is_null());
}

async fn load_noon_products(t: &TestApp) {
    load(
        t,
        Marketplace::NoonAe,
        DataType::Products,
        &[
            &[("noon_sku", "N001"), ("partner_sku", "P001"), ("title", "Steel Kettle"), ("brand", "Acme"), ("price", "49.5"), ("sale_price", "39")],
            &[("noon_sku", "N002"), ("partner_sku", "P002"), ("title", "Glass Kettle"), ("brand", "ACME Home"), ("price", "59")],
            &[("noon_sku", "N003"), ("partner_sku", "P003"), ("title", "Toaster"), ("brand", "Other"), ("price", "80")],
        ],
    )
    .await;
}

#[tokio::test]
async fn noon_products_use_success_envelope_and_page_numbers() {
    let t = spawn_app().await;
    load_noon_products(&t).await;

    let (status, body) = send(
        &t.app,
        get("/api/noon-ae/products?page=2&limit=2", Some(NOON_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let products = body["data"]["products"].as_array().expect("products missing");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["noon_sku"], "N003");
    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["limit"], 2);
    assert_eq!(pagination["total_items"], 3);
    assert_eq!(pagination["total_pages"], 2);
    assert_eq!(pagination["has_next"], false);
    assert_eq!(pagination["has_prev"], true);
    assert!(pagination["next_token"].is_null());

    let (_, first) = send(&t.app, get("/api/noon-ae/products?limit=2", Some(NOON_TOKEN))).await;
    assert_eq!(first["data"]["products"][0]["sale_price"], json!({"currency": "AED", "value": 39.0}));
    assert!(first["data"]["products"][1]["sale_price"].is_null());
    let token = first["data"]["pagination"]["next_token"]
        .as_str()
        .expect("next_token missing")
        .to_string();

    // the token wins over an explicit page
    let (_, second) = send(
        &t.app,
        get(&format!("/api/noon-ae/products?page=7&limit=2&next_token={token}"), Some(NOON_TOKEN)),
    )
    .await;
    assert_eq!(second["data"]["products"][0]["noon_sku"], "N003");
}

#[tokio::test]
async fn noon_product_filters_are_case_insensitive_where_expected() {
    let t = spawn_app().await;
    load_noon_products(&t).await;

    let (_, body) = send(&t.app, get("/api/noon-ae/products?brand=acme", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["pagination"]["total_items"], 2);

    let (_, body) = send(&t.app, get("/api/noon-ae/products?search=KETTLE", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["pagination"]["total_items"], 2);

    let (_, body) = send(&t.app, get("/api/noon-ae/products?sku=P003", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["products"][0]["name"], "Toaster");

    let (status, body) = send(&t.app, get("/api/noon-ae/products/N002", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sku"], "P002");

    let (status, _) = send(&t.app, get("/api/noon-ae/products/N999", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn load_noon_orders(t: &TestApp) {
    load(
        t,
        Marketplace::NoonAe,
        DataType::Orders,
        &[
            &[
                ("order_nr", "NAE100"),
                ("order_date", "2024-09-01 10:00:00"),
                ("status", "created"),
                ("address_city", "Dubai"),
                ("total_amount", "120"),
                ("order_item_id", "NI-1"),
                ("item_name", "Kettle"),
                ("quantity", "2"),
                ("unit_price", "30"),
            ],
            &[("order_nr", "NAE100"), ("order_item_id", "NI-2"), ("unit_price", "60")],
            &[
                ("order_nr", "NAE200"),
                ("order_date", "2024-09-05 10:00:00"),
                ("status", "shipped"),
                ("address_city", "Abu Dhabi"),
            ],
        ],
    )
    .await;
}

#[tokio::test]
async fn noon_orders_embed_items_and_filter() {
    let t = spawn_app().await;
    load_noon_orders(&t).await;

    let (status, body) = send(&t.app, get("/api/noon-ae/orders?city=dubai", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"]["orders"].as_array().expect("orders missing");
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["order_nr"], "NAE100");
    assert_eq!(order["items_count"], 2);
    assert_eq!(order["items"][0]["price"]["total_price"], 60.0);
    assert_eq!(order["shipping"]["address"]["city"], "Dubai");
    assert_eq!(order["payment"]["total"]["value"], 120.0);

    let (_, body) = send(
        &t.app,
        get("/api/noon-ae/orders?from_date=2024-09-03", Some(NOON_TOKEN)),
    )
    .await;
    assert_eq!(body["data"]["orders"][0]["order_nr"], "NAE200");
    assert_eq!(body["data"]["pagination"]["total_items"], 1);

    let (status, _) = send(&t.app, get("/api/noon-ae/orders?to_date=soon", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&t.app, get("/api/noon-ae/orders/NAE200", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["items_count"], 0);
}

#[tokio::test]
async fn noon_order_status_update() {
    let t = spawn_app().await;
    load_noon_orders(&t).await;

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/noon-ae/orders/status-update",
            Some(NOON_TOKEN),
            json!({"order_nr": "NAE100", "status": "shipped"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "shipped");
    assert!(body["data"]["updated_at"].is_string());

    let (_, body) = send(&t.app, get("/api/noon-ae/orders?status=shipped", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["pagination"]["total_items"], 2);

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/noon-ae/orders/status-update",
            Some(NOON_TOKEN),
            json!({"order_nr": "NAE100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_PARAMS");

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/noon-ae/orders/status-update",
            Some(NOON_TOKEN),
            json!({"order_nr": "NAE999", "status": "shipped"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn noon_inventory_listing_and_stock_update() {
    let t = spawn_app().await;
    load(
        &t,
        Marketplace::NoonAe,
        DataType::Inventory,
        &[
            &[("partner_sku", "P001"), ("quantity", "4"), ("reserved_quantity", "1"), ("warehouse_code", "DXB-01")],
            &[("partner_sku", "P002"), ("quantity", "8"), ("warehouse_code", "AUH-01")],
        ],
    )
    .await;

    let (status, body) = send(&t.app, get("/api/noon-ae/inventory", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["limit"], 100);
    let first = &body["data"]["inventory"][0];
    assert_eq!(first["sku"], "P001");
    assert_eq!(first["stock"], json!({"available": 4, "reserved": 1, "total": 5}));
    assert_eq!(first["warehouse"], json!({"code": "DXB-01", "name": "DXB-01"}));

    let (_, body) = send(&t.app, get("/api/noon-ae/inventory?warehouse=AUH-01", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["inventory"][0]["sku"], "P002");

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/noon-ae/inventory/update",
            Some(NOON_TOKEN),
            json!({"updates": [{"sku": "P001", "quantity": 11}, {"sku": "P404", "quantity": 1}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated_count"], 1);
    assert_eq!(
        body["data"]["results"],
        json!([
            {"sku": "P001", "status": "success", "new_quantity": 11},
            {"sku": "P404", "status": "error", "message": "SKU not found"}
        ])
    );

    let (_, body) = send(&t.app, get("/api/noon-ae/inventory?skus=P001", Some(NOON_TOKEN))).await;
    assert_eq!(body["data"]["inventory"][0]["stock"]["available"], 11);

    let (status, body) = send(
        &t.app,
        post_json("/api/noon-ae/inventory/update", Some(NOON_TOKEN), json!({"updates": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_UPDATES");
}

#[tokio::test]
async fn stock_update_rejects_out_of_range_quantities() {
    let t = spawn_app().await;
    load(
        &t,
        Marketplace::NoonAe,
        DataType::Inventory,
        &[&[("partner_sku", "P001"), ("quantity", "4"), ("reserved_quantity", "1")]],
    )
    .await;

    for quantity in [json!(i64::MAX), json!(-1)] {
        let (status, body) = send(
            &t.app,
            post_json(
                "/api/noon-ae/inventory/update",
                Some(NOON_TOKEN),
                json!({"updates": [{"sku": "P001", "quantity": quantity}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "quantity {quantity}");
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
    }

    let (status, body) = send(&t.app, get("/api/noon-ae/inventory", Some(NOON_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["inventory"][0]["stock"],
        json!({"available": 4, "reserved": 1, "total": 5})
    );
}
