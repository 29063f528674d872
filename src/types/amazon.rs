//! SP-API flavoured wire shapes for the Amazon AE mock.

use crate::db::models::{
    DbAmazonInventory, DbAmazonOrder, DbAmazonOrderItem, DbAmazonProduct, to_db_time,
};
use serde::Serialize;

/// SP-API money: amount rendered as a fixed two-decimal string.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    pub currency_code: String,
    pub amount: String,
}

impl Money {
    pub fn new(currency: &str, amount: f64) -> Self {
        Self {
            currency_code: currency.to_string(),
            amount: format!("{amount:.2}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListPrice {
    pub amount: f64,
    pub currency_code: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub asin: String,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub list_price: ListPrice,
    pub quantity: i64,
    pub image_url: String,
    pub status: String,
}

impl From<DbAmazonProduct> for CatalogItem {
    fn from(p: DbAmazonProduct) -> Self {
        Self {
            asin: p.asin,
            sku: p.sku,
            title: p.title,
            description: p.description,
            brand: p.brand,
            category: p.category,
            list_price: ListPrice {
                amount: p.price,
                currency_code: p.currency,
            },
            quantity: p.quantity,
            image_url: p.image_url,
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BuyerInfo {
    pub buyer_email: String,
    pub buyer_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub amazon_order_id: String,
    pub purchase_date: String,
    pub last_update_date: String,
    pub order_status: String,
    pub fulfillment_channel: String,
    pub sales_channel: String,
    pub order_total: Money,
    pub number_of_items_shipped: i64,
    pub number_of_items_unshipped: i64,
    pub payment_method: String,
    pub marketplace_id: String,
    pub buyer_info: BuyerInfo,
    pub ship_service_level: String,
    pub earliest_ship_date: Option<String>,
    pub latest_ship_date: Option<String>,
}

impl From<DbAmazonOrder> for Order {
    fn from(o: DbAmazonOrder) -> Self {
        Self {
            order_total: Money::new(&o.order_total_currency, o.order_total_amount),
            purchase_date: to_db_time(&o.purchase_date),
            last_update_date: to_db_time(&o.updated_at),
            earliest_ship_date: o.earliest_ship_date.as_ref().map(to_db_time),
            latest_ship_date: o.latest_ship_date.as_ref().map(to_db_time),
            amazon_order_id: o.amazon_order_id,
            order_status: o.order_status,
            fulfillment_channel: o.fulfillment_channel,
            sales_channel: o.sales_channel,
            number_of_items_shipped: o.number_of_items_shipped,
            number_of_items_unshipped: o.number_of_items_unshipped,
            payment_method: o.payment_method,
            marketplace_id: o.marketplace_id,
            buyer_info: BuyerInfo {
                buyer_email: o.buyer_email,
                buyer_name: o.buyer_name,
            },
            ship_service_level: o.ship_service_level,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "SellerSKU")]
    pub seller_sku: String,
    pub order_item_id: String,
    pub title: String,
    pub quantity_ordered: i64,
    pub quantity_shipped: i64,
    pub item_price: Money,
    pub shipping_price: Money,
    pub item_tax: Money,
    pub promotion_discount: Money,
    pub condition_id: String,
    pub is_gift: bool,
}

impl From<DbAmazonOrderItem> for OrderItem {
    fn from(i: DbAmazonOrderItem) -> Self {
        let currency = i.item_price_currency.as_str();
        Self {
            item_price: Money::new(currency, i.item_price_amount),
            shipping_price: Money::new(currency, i.shipping_price_amount),
            item_tax: Money::new(currency, i.item_tax_amount),
            promotion_discount: Money::new(currency, i.promotion_discount_amount),
            asin: i.asin,
            seller_sku: i.sku,
            order_item_id: i.order_item_id,
            title: i.title,
            quantity_ordered: i.quantity_ordered,
            quantity_shipped: i.quantity_shipped,
            condition_id: i.condition_id,
            is_gift: i.is_gift,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservedQuantity {
    pub total_reserved_quantity: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetails {
    pub fulfillable_quantity: i64,
    pub inbound_receiving_quantity: i64,
    pub reserved_quantity: ReservedQuantity,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub asin: String,
    pub fn_sku: String,
    pub seller_sku: String,
    pub condition: String,
    pub inventory_details: InventoryDetails,
    pub last_updated_time: String,
    pub product_name: String,
    pub total_quantity: i64,
}

impl From<DbAmazonInventory> for InventorySummary {
    fn from(i: DbAmazonInventory) -> Self {
        Self {
            last_updated_time: to_db_time(&i.last_updated_time),
            asin: i.asin,
            fn_sku: i.fn_sku,
            seller_sku: i.sku,
            condition: i.condition,
            inventory_details: InventoryDetails {
                fulfillable_quantity: i.available_quantity,
                inbound_receiving_quantity: i.pending_quantity,
                reserved_quantity: ReservedQuantity {
                    total_reserved_quantity: i.reserved_quantity,
                },
            },
            product_name: i.product_name,
            total_quantity: i.total_quantity,
        }
    }
}

/// Every SP-API response wraps its body in `payload`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub payload: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogItemsPayload {
    pub items: Vec<CatalogItem>,
    pub number_of_results: u64,
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrdersPayload {
    pub orders: Vec<Order>,
    pub next_token: Option<String>,
    pub last_updated_before: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItemsPayload {
    pub amazon_order_id: String,
    pub order_items: Vec<OrderItem>,
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPayload {
    pub inventory_summaries: Vec<InventorySummary>,
    pub next_token: Option<String>,
}
