use crate::types::marketplace::Marketplace;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Render a timestamp the way every table stores it.
pub fn to_db_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbCredential {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub marketplace: Marketplace,
    pub client_id: String,
    pub client_secret: String,
    pub access_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAmazonProduct {
    pub id: i64,
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub currency: String,
    pub quantity: i64,
    pub image_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAmazonOrder {
    pub id: i64,
    pub amazon_order_id: String,
    pub purchase_date: DateTime<Utc>,
    pub order_status: String,
    pub fulfillment_channel: String,
    pub sales_channel: String,
    pub order_total_amount: f64,
    pub order_total_currency: String,
    pub number_of_items_shipped: i64,
    pub number_of_items_unshipped: i64,
    pub payment_method: String,
    pub marketplace_id: String,
    pub buyer_email: String,
    pub buyer_name: String,
    pub ship_service_level: String,
    pub earliest_ship_date: Option<DateTime<Utc>>,
    pub latest_ship_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAmazonOrderItem {
    pub id: i64,
    pub order_id: i64,
    pub order_item_id: String,
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub quantity_ordered: i64,
    pub quantity_shipped: i64,
    pub item_price_amount: f64,
    pub item_price_currency: String,
    pub shipping_price_amount: f64,
    pub item_tax_amount: f64,
    pub promotion_discount_amount: f64,
    pub condition_id: String,
    pub is_gift: bool,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAmazonInventory {
    pub id: i64,
    pub asin: String,
    pub sku: String,
    pub fn_sku: String,
    pub product_name: String,
    pub condition: String,
    pub available_quantity: i64,
    pub pending_quantity: i64,
    pub reserved_quantity: i64,
    pub total_quantity: i64,
    pub warehouse_condition_code: String,
    pub last_updated_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbNoonProduct {
    pub id: i64,
    pub noon_sku: String,
    pub partner_sku: String,
    pub title: String,
    pub title_ar: String,
    pub summary: String,
    pub brand: String,
    pub category_code: String,
    pub product_type: String,
    pub model_number: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub warranty: String,
    pub stock_quantity: i64,
    pub max_order_quantity: i64,
    pub status: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbNoonOrder {
    pub id: i64,
    pub order_nr: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_method: String,
    pub total_amount: f64,
    pub currency: String,
    pub delivery_provider: String,
    pub tracking_number: String,
    pub address_city: String,
    pub address_area: String,
    pub address_street: String,
    pub is_express: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbNoonOrderItem {
    pub id: i64,
    pub order_id: i64,
    pub order_item_id: String,
    pub noon_sku: String,
    pub partner_sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub tax_amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbNoonInventory {
    pub id: i64,
    pub noon_sku: String,
    pub partner_sku: String,
    pub barcode: String,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub warehouse_code: String,
    pub last_updated: DateTime<Utc>,
}

// Write-side records. Each carries its natural key plus the columns an
// upload is allowed to set; ids, owners and timestamps are filled in by the
// storage layer.

#[derive(Debug, Clone, PartialEq)]
pub struct AmazonProductRecord {
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub currency: String,
    pub quantity: i64,
    pub image_url: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmazonOrderRecord {
    pub amazon_order_id: String,
    pub purchase_date: DateTime<Utc>,
    pub order_status: String,
    pub fulfillment_channel: String,
    pub sales_channel: String,
    pub order_total_amount: f64,
    pub order_total_currency: String,
    pub number_of_items_shipped: i64,
    pub number_of_items_unshipped: i64,
    pub payment_method: String,
    pub buyer_email: String,
    pub buyer_name: String,
    pub ship_service_level: String,
    pub earliest_ship_date: Option<DateTime<Utc>>,
    pub latest_ship_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmazonOrderItemRecord {
    pub order_item_id: String,
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub quantity_ordered: i64,
    pub quantity_shipped: i64,
    pub item_price_amount: f64,
    pub item_price_currency: String,
    pub shipping_price_amount: f64,
    pub item_tax_amount: f64,
    pub promotion_discount_amount: f64,
    pub condition_id: String,
    pub is_gift: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmazonInventoryRecord {
    pub sku: String,
    pub asin: String,
    pub fn_sku: String,
    pub product_name: String,
    pub condition: String,
    pub available_quantity: i64,
    pub pending_quantity: i64,
    pub reserved_quantity: i64,
    pub total_quantity: i64,
    pub warehouse_condition_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoonProductRecord {
    pub noon_sku: String,
    pub partner_sku: String,
    pub title: String,
    pub title_ar: String,
    pub summary: String,
    pub brand: String,
    pub category_code: String,
    pub product_type: String,
    pub model_number: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub warranty: String,
    pub stock_quantity: i64,
    pub max_order_quantity: i64,
    pub status: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoonOrderRecord {
    pub order_nr: String,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub payment_method: String,
    pub total_amount: f64,
    pub currency: String,
    pub delivery_provider: String,
    pub tracking_number: String,
    pub address_city: String,
    pub address_area: String,
    pub address_street: String,
    pub is_express: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoonOrderItemRecord {
    pub order_item_id: String,
    pub noon_sku: String,
    pub partner_sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub tax_amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoonInventoryRecord {
    pub partner_sku: String,
    pub noon_sku: String,
    pub barcode: String,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub warehouse_code: String,
}

/// Outcome of a keyed upsert: the row id and whether the row was new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created(i64),
    Updated(i64),
}

impl Upserted {
    pub fn id(&self) -> i64 {
        match self {
            Upserted::Created(id) | Upserted::Updated(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }
}
