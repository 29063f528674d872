use axum::{
    Json,
    extract::{Path, State},
};

use super::{date_param, non_empty, split_csv};
use crate::db::listing::{NoonInventoryFilter, NoonOrderFilter, NoonProductFilter};
use crate::db::models::{DbNoonInventory, DbNoonOrder, DbNoonProduct, to_db_time};
use crate::db::upsert::StockUpdate;
use crate::middleware::{ApiJson, ApiQuery};
use crate::service::authenticator::AuthScope;
use crate::service::pagination::PageRequest;
use crate::types::marketplace::Marketplace;
use crate::types::noon::{
    InventoryData, InventoryItem, Order, OrdersData, Pagination, Product, ProductsData,
    StatusUpdateRequest, StatusUpdated, StockUpdateData, StockUpdateRequest, StockUpdateResult,
    Success,
};
use crate::{MarketError, router::MarketState};
use serde::Deserialize;
use tracing::info;

/// Noon paginates by `page`/`limit`; `next_token` is accepted too and wins.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub sku: Option<String>,
    pub noon_sku: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub next_token: Option<String>,
}

/// GET /api/noon-ae/products
pub async fn list_products(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiQuery(query): ApiQuery<ProductsQuery>,
) -> Result<Json<Success<ProductsData>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let request = PageRequest::from_page(
        query.page,
        query.next_token.as_deref(),
        query.limit,
        state.page_limits(),
    )?;
    let filter = NoonProductFilter {
        partner_sku: non_empty(query.sku),
        noon_sku: non_empty(query.noon_sku),
        status: non_empty(query.status),
        brand: non_empty(query.brand),
        search: non_empty(query.search),
    };

    let page = state
        .storage
        .list_page::<DbNoonProduct, _>(scope.user_id, &filter, request)
        .await?;
    let pagination = Pagination::from(&page);

    Ok(Json(Success::new(ProductsData {
        products: page.items.into_iter().map(Product::from).collect(),
        pagination,
    })))
}

/// GET /api/noon-ae/products/{noon_sku}
pub async fn get_product(
    State(state): State<MarketState>,
    scope: AuthScope,
    Path(noon_sku): Path<String>,
) -> Result<Json<Success<Product>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let product = state
        .storage
        .get_noon_product(scope.user_id, &noon_sku)
        .await?
        .ok_or_else(|| {
            MarketError::not_found("PRODUCT_NOT_FOUND", format!("Product {noon_sku} not found"))
        })?;
    Ok(Json(Success::new(product.into())))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub city: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub next_token: Option<String>,
}

/// Attach line items to a batch of orders with one extra query.
async fn shape_orders(
    state: &MarketState,
    orders: Vec<DbNoonOrder>,
) -> Result<Vec<Order>, MarketError> {
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut items = state.storage.noon_items_by_order(&ids).await?;
    Ok(orders
        .into_iter()
        .map(|o| {
            let lines = items.remove(&o.id).unwrap_or_default();
            Order::with_items(o, lines)
        })
        .collect())
}

/// GET /api/noon-ae/orders
pub async fn list_orders(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Success<OrdersData>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let request = PageRequest::from_page(
        query.page,
        query.next_token.as_deref(),
        query.limit,
        state.page_limits(),
    )?;
    let filter = NoonOrderFilter {
        status: non_empty(query.status),
        from_date: date_param("from_date", query.from_date)?,
        to_date: date_param("to_date", query.to_date)?,
        city: non_empty(query.city),
    };

    let page = state
        .storage
        .list_page::<DbNoonOrder, _>(scope.user_id, &filter, request)
        .await?;
    let pagination = Pagination::from(&page);
    let orders = shape_orders(&state, page.items).await?;

    Ok(Json(Success::new(OrdersData { orders, pagination })))
}

/// GET /api/noon-ae/orders/{order_nr}
pub async fn get_order(
    State(state): State<MarketState>,
    scope: AuthScope,
    Path(order_nr): Path<String>,
) -> Result<Json<Success<Order>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let order = state
        .storage
        .get_noon_order(scope.user_id, &order_nr)
        .await?
        .ok_or_else(|| {
            MarketError::not_found("ORDER_NOT_FOUND", format!("Order {order_nr} not found"))
        })?;
    let items = state
        .storage
        .noon_items_by_order(&[order.id])
        .await?
        .remove(&order.id)
        .unwrap_or_default();
    Ok(Json(Success::new(Order::with_items(order, items))))
}

/// POST /api/noon-ae/orders/status-update
pub async fn update_order_status(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiJson(body): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Success<StatusUpdated>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let (Some(order_nr), Some(status)) = (non_empty(body.order_nr), non_empty(body.status)) else {
        return Err(MarketError::MissingParams(
            "order_nr and status are required".to_string(),
        ));
    };

    let updated_at = state
        .storage
        .update_noon_order_status(scope.user_id, &order_nr, &status)
        .await?
        .ok_or_else(|| {
            MarketError::not_found("ORDER_NOT_FOUND", format!("Order {order_nr} not found"))
        })?;
    info!(user_id = scope.user_id, %order_nr, %status, "noon order status updated");

    Ok(Json(Success::new(StatusUpdated {
        order_nr,
        status,
        updated_at: to_db_time(&updated_at),
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub sku: Option<String>,
    pub skus: Option<String>,
    pub warehouse: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub next_token: Option<String>,
}

/// GET /api/noon-ae/inventory
pub async fn list_inventory(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiQuery(query): ApiQuery<InventoryQuery>,
) -> Result<Json<Success<InventoryData>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    let request = PageRequest::from_page(
        query.page,
        query.next_token.as_deref(),
        query.limit,
        state.inventory_limits(),
    )?;
    let filter = NoonInventoryFilter {
        partner_sku: non_empty(query.sku),
        skus: query.skus.as_deref().map(|s| split_csv(s).collect()).unwrap_or_default(),
        warehouse: non_empty(query.warehouse),
    };

    let page = state
        .storage
        .list_page::<DbNoonInventory, _>(scope.user_id, &filter, request)
        .await?;
    let pagination = Pagination::from(&page);

    Ok(Json(Success::new(InventoryData {
        inventory: page.items.into_iter().map(InventoryItem::from).collect(),
        pagination,
    })))
}

const MAX_STOCK_QUANTITY: i64 = i32::MAX as i64;

/// POST /api/noon-ae/inventory/update
pub async fn update_inventory(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiJson(body): ApiJson<StockUpdateRequest>,
) -> Result<Json<Success<StockUpdateData>>, MarketError> {
    scope.require(Marketplace::NoonAe)?;
    if body.updates.is_empty() {
        return Err(MarketError::MissingUpdates);
    }

    if let Some(line) = body
        .updates
        .iter()
        .find(|line| !(0..=MAX_STOCK_QUANTITY).contains(&line.quantity))
    {
        return Err(MarketError::InvalidParameter(format!(
            "quantity for {} must be between 0 and {MAX_STOCK_QUANTITY}",
            line.sku.trim()
        )));
    }

    let updates: Vec<(String, i64)> = body
        .updates
        .into_iter()
        .map(|line| (line.sku.trim().to_string(), line.quantity))
        .collect();
    let outcomes = state
        .storage
        .update_noon_stock(scope.user_id, &updates)
        .await?;

    let results: Vec<StockUpdateResult> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            StockUpdate::Updated { sku, quantity } => StockUpdateResult::Success {
                sku,
                new_quantity: quantity,
            },
            StockUpdate::NotFound { sku } => StockUpdateResult::Error {
                sku,
                message: "SKU not found".to_string(),
            },
        })
        .collect();
    let updated_count = results
        .iter()
        .filter(|r| matches!(r, StockUpdateResult::Success { .. }))
        .count();
    info!(user_id = scope.user_id, lines = results.len(), updated_count, "noon stock updated");

    Ok(Json(Success::new(StockUpdateData {
        results,
        updated_count,
    })))
}
