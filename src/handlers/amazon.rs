use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use chrono::Utc;
use serde::Deserialize;

use super::{date_param, non_empty, split_csv};
use crate::db::listing::{AmazonInventoryFilter, AmazonOrderFilter, AmazonProductFilter};
use crate::db::models::{DbAmazonInventory, DbAmazonOrder, DbAmazonProduct, to_db_time};
use crate::middleware::ApiQuery;
use crate::service::authenticator::AuthScope;
use crate::service::pagination::PageRequest;
use crate::types::amazon::{
    CatalogItem, CatalogItemsPayload, Envelope, InventoryPayload, InventorySummary, Order,
    OrderItem, OrderItemsPayload, OrdersPayload,
};
use crate::types::marketplace::Marketplace;
use crate::{MarketError, router::MarketState};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogItemsQuery {
    pub asin: Option<String>,
    pub sku: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
    #[serde(rename = "MaxResults")]
    pub max_results: Option<u32>,
}

/// GET /api/amazon-ae/catalog/items
pub async fn list_catalog_items(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiQuery(query): ApiQuery<CatalogItemsQuery>,
) -> Result<Json<Envelope<CatalogItemsPayload>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let request = PageRequest::from_token(
        query.next_token.as_deref(),
        query.max_results,
        state.page_limits(),
    )?;
    let filter = AmazonProductFilter {
        asin: non_empty(query.asin),
        sku: non_empty(query.sku),
        status: non_empty(query.status),
    };

    let page = state
        .storage
        .list_page::<DbAmazonProduct, _>(scope.user_id, &filter, request)
        .await?;
    let next_token = page.next_token();
    let total = page.total;

    Ok(Json(Envelope {
        payload: CatalogItemsPayload {
            items: page.items.into_iter().map(CatalogItem::from).collect(),
            number_of_results: total,
            next_token,
        },
    }))
}

/// GET /api/amazon-ae/catalog/items/{asin}
pub async fn get_catalog_item(
    State(state): State<MarketState>,
    scope: AuthScope,
    Path(asin): Path<String>,
) -> Result<Json<Envelope<CatalogItem>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let product = state
        .storage
        .get_amazon_product(scope.user_id, &asin)
        .await?
        .ok_or_else(|| {
            MarketError::not_found("PRODUCT_NOT_FOUND", format!("Item {asin} not found"))
        })?;
    Ok(Json(Envelope {
        payload: product.into(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(rename = "OrderStatus")]
    pub order_status: Option<String>,
    #[serde(rename = "CreatedAfter")]
    pub created_after: Option<String>,
    #[serde(rename = "CreatedBefore")]
    pub created_before: Option<String>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
    #[serde(rename = "MaxResults")]
    pub max_results: Option<u32>,
}

/// GET /api/amazon-ae/orders
pub async fn list_orders(
    State(state): State<MarketState>,
    scope: AuthScope,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Envelope<OrdersPayload>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let request = PageRequest::from_token(
        query.next_token.as_deref(),
        query.max_results,
        state.page_limits(),
    )?;
    let filter = AmazonOrderFilter {
        order_status: non_empty(query.order_status),
        created_after: date_param("CreatedAfter", query.created_after)?,
        created_before: date_param("CreatedBefore", query.created_before)?,
    };

    let page = state
        .storage
        .list_page::<DbAmazonOrder, _>(scope.user_id, &filter, request)
        .await?;
    let next_token = page.next_token();

    Ok(Json(Envelope {
        payload: OrdersPayload {
            orders: page.items.into_iter().map(Order::from).collect(),
            next_token,
            last_updated_before: to_db_time(&Utc::now()),
        },
    }))
}

async fn find_order(
    state: &MarketState,
    scope: &AuthScope,
    amazon_order_id: &str,
) -> Result<DbAmazonOrder, MarketError> {
    state
        .storage
        .get_amazon_order(scope.user_id, amazon_order_id)
        .await?
        .ok_or_else(|| {
            MarketError::not_found(
                "ORDER_NOT_FOUND",
                format!("Order {amazon_order_id} not found"),
            )
        })
}

/// GET /api/amazon-ae/orders/{amazon_order_id}
pub async fn get_order(
    State(state): State<MarketState>,
    scope: AuthScope,
    Path(amazon_order_id): Path<String>,
) -> Result<Json<Envelope<Order>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let order = find_order(&state, &scope, &amazon_order_id).await?;
    Ok(Json(Envelope {
        payload: order.into(),
    }))
}

/// GET /api/amazon-ae/orders/{amazon_order_id}/items
pub async fn list_order_items(
    State(state): State<MarketState>,
    scope: AuthScope,
    Path(amazon_order_id): Path<String>,
) -> Result<Json<Envelope<OrderItemsPayload>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let order = find_order(&state, &scope, &amazon_order_id).await?;
    let items = state.storage.list_amazon_order_items(order.id).await?;

    Ok(Json(Envelope {
        payload: OrderItemsPayload {
            amazon_order_id: order.amazon_order_id,
            order_items: items.into_iter().map(OrderItem::from).collect(),
            next_token: None,
        },
    }))
}

/// FBA inventory parameters. Read from the raw query string because SP-API
/// clients send `skus` either repeated or comma-separated.
#[derive(Debug, Default, PartialEq)]
pub struct InventoryParams {
    pub skus: Vec<String>,
    pub next_token: Option<String>,
    pub max_results: Option<u32>,
}

impl InventoryParams {
    pub fn parse(query: Option<&str>) -> Result<Self, MarketError> {
        let mut params = Self::default();
        let Some(query) = query else {
            return Ok(params);
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "skus" | "sellerSkus" => params.skus.extend(split_csv(&value)),
                "nextToken" | "NextToken" => params.next_token = non_empty(Some(value.into_owned())),
                "MaxResults" | "maxResults" => {
                    let raw = value.trim();
                    if !raw.is_empty() {
                        let size = raw.parse::<u32>().map_err(|_| {
                            MarketError::InvalidParameter(format!(
                                "MaxResults: `{raw}` is not a positive integer"
                            ))
                        })?;
                        params.max_results = Some(size);
                    }
                }
                _ => {}
            }
        }
        Ok(params)
    }
}

/// GET /api/amazon-ae/fba/inventory
pub async fn list_inventory(
    State(state): State<MarketState>,
    scope: AuthScope,
    RawQuery(query): RawQuery,
) -> Result<Json<Envelope<InventoryPayload>>, MarketError> {
    scope.require(Marketplace::AmazonAe)?;
    let params = InventoryParams::parse(query.as_deref())?;
    let request = PageRequest::from_token(
        params.next_token.as_deref(),
        params.max_results,
        state.page_limits(),
    )?;
    let filter = AmazonInventoryFilter { skus: params.skus };

    let page = state
        .storage
        .list_page::<DbAmazonInventory, _>(scope.user_id, &filter, request)
        .await?;
    let next_token = page.next_token();

    Ok(Json(Envelope {
        payload: InventoryPayload {
            inventory_summaries: page.items.into_iter().map(InventorySummary::from).collect(),
            next_token,
        },
    }))
}
