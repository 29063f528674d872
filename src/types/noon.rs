//! Noon Seller API style wire shapes.

use crate::db::models::{
    DbNoonInventory, DbNoonOrder, DbNoonOrderItem, DbNoonProduct, to_db_time,
};
use crate::service::pagination::Page;
use serde::{Deserialize, Serialize};

/// Noon prices products in dirhams only.
pub const NOON_CURRENCY: &str = "AED";

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_token: Option<String>,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.request.page_number(),
            limit: page.request.limit,
            total_items: page.total,
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            next_token: page.next_token(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Price {
    pub currency: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductStock {
    pub quantity: i64,
    pub max_order_quantity: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Product {
    pub sku: String,
    pub noon_sku: String,
    pub name: String,
    pub name_ar: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub stock: ProductStock,
    pub status: String,
    pub images: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DbNoonProduct> for Product {
    fn from(p: DbNoonProduct) -> Self {
        let aed = |value| Price {
            currency: NOON_CURRENCY.to_string(),
            value,
        };
        Self {
            sku: p.partner_sku,
            noon_sku: p.noon_sku,
            name: p.title,
            name_ar: p.title_ar,
            brand: p.brand,
            category: p.category_code,
            price: aed(p.price),
            sale_price: p.sale_price.map(aed),
            stock: ProductStock {
                quantity: p.stock_quantity,
                max_order_quantity: p.max_order_quantity,
            },
            status: p.status,
            images: if p.image_url.is_empty() {
                Vec::new()
            } else {
                vec![p.image_url]
            },
            created_at: to_db_time(&p.created_at),
            updated_at: to_db_time(&p.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductsData {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Payment {
    pub method: String,
    pub total: Price,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Address {
    pub city: String,
    pub area: String,
    pub street: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shipping {
    pub provider: String,
    pub tracking_number: String,
    pub address: Address,
    pub is_express: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemPrice {
    pub currency: String,
    pub unit_price: f64,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItem {
    pub item_id: String,
    pub sku: String,
    pub noon_sku: String,
    pub name: String,
    pub quantity: i64,
    pub price: ItemPrice,
    pub status: String,
}

impl OrderItem {
    fn from_row(item: DbNoonOrderItem, currency: &str) -> Self {
        Self {
            item_id: item.order_item_id,
            sku: item.partner_sku,
            noon_sku: item.noon_sku,
            name: item.name,
            quantity: item.quantity,
            price: ItemPrice {
                currency: currency.to_string(),
                unit_price: item.unit_price,
                total_price: item.total_price,
            },
            status: item.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Order {
    pub order_nr: String,
    pub order_date: String,
    pub status: String,
    pub customer: Customer,
    pub payment: Payment,
    pub shipping: Shipping,
    pub items: Vec<OrderItem>,
    pub items_count: usize,
}

impl Order {
    /// Shape an order together with its lines.
    pub fn with_items(order: DbNoonOrder, items: Vec<DbNoonOrderItem>) -> Self {
        let items: Vec<OrderItem> = items
            .into_iter()
            .map(|i| OrderItem::from_row(i, &order.currency))
            .collect();
        Self {
            order_date: to_db_time(&order.order_date),
            customer: Customer {
                first_name: order.customer_first_name,
                last_name: order.customer_last_name,
                email: order.customer_email,
                phone: order.customer_phone,
            },
            payment: Payment {
                method: order.payment_method,
                total: Price {
                    currency: order.currency,
                    value: order.total_amount,
                },
            },
            shipping: Shipping {
                provider: order.delivery_provider,
                tracking_number: order.tracking_number,
                address: Address {
                    city: order.address_city,
                    area: order.address_area,
                    street: order.address_street,
                },
                is_express: order.is_express,
            },
            order_nr: order.order_nr,
            status: order.status,
            items_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrdersData {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Stock {
    pub available: i64,
    pub reserved: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Warehouse {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InventoryItem {
    pub sku: String,
    pub noon_sku: String,
    pub barcode: String,
    pub stock: Stock,
    pub warehouse: Warehouse,
    pub last_updated: String,
}

impl From<DbNoonInventory> for InventoryItem {
    fn from(i: DbNoonInventory) -> Self {
        Self {
            sku: i.partner_sku,
            noon_sku: i.noon_sku,
            barcode: i.barcode,
            stock: Stock {
                available: i.quantity,
                reserved: i.reserved_quantity,
                total: i.quantity.saturating_add(i.reserved_quantity),
            },
            // the mock has no warehouse directory, the code doubles as name
            warehouse: Warehouse {
                code: i.warehouse_code.clone(),
                name: i.warehouse_code,
            },
            last_updated: to_db_time(&i.last_updated),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryData {
    pub inventory: Vec<InventoryItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub order_nr: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusUpdated {
    pub order_nr: String,
    pub status: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockUpdateLine {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockUpdateRequest {
    #[serde(default)]
    pub updates: Vec<StockUpdateLine>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StockUpdateResult {
    Success { sku: String, new_quantity: i64 },
    Error { sku: String, message: String },
}

#[derive(Debug, Serialize)]
pub struct StockUpdateData {
    pub results: Vec<StockUpdateResult>,
    pub updated_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::pagination::PageRequest;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn pagination_block_reflects_window() {
        let page = Page {
            items: vec![(); 10],
            total: 25,
            request: PageRequest {
                offset: 10,
                limit: 10,
            },
        };
        let p = Pagination::from(&page);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);
        assert!(p.next_token.is_some());
    }

    #[test]
    fn product_without_sale_price_or_image() {
        let now = Utc::now();
        let product = Product::from(DbNoonProduct {
            id: 1,
            noon_sku: "N1".to_string(),
            partner_sku: "P1".to_string(),
            title: "Kettle".to_string(),
            title_ar: String::new(),
            summary: String::new(),
            brand: "Acme".to_string(),
            category_code: "home".to_string(),
            product_type: String::new(),
            model_number: String::new(),
            price: 49.5,
            sale_price: None,
            warranty: String::new(),
            stock_quantity: 3,
            max_order_quantity: 10,
            status: "active".to_string(),
            image_url: String::new(),
            created_at: now,
            updated_at: now,
        });
        let v = serde_json::to_value(product).unwrap();
        assert_eq!(v["sku"], "P1");
        assert_eq!(v["price"], json!({"currency": "AED", "value": 49.5}));
        assert!(v["sale_price"].is_null());
        assert_eq!(v["images"], json!([]));
    }

    #[test]
    fn stock_total_saturates() {
        let item = InventoryItem::from(DbNoonInventory {
            id: 1,
            noon_sku: "N1".to_string(),
            partner_sku: "P1".to_string(),
            barcode: String::new(),
            quantity: i64::MAX,
            reserved_quantity: 1,
            warehouse_code: "DXB-01".to_string(),
            last_updated: Utc::now(),
        });
        assert_eq!(item.stock.total, i64::MAX);
    }

    #[test]
    fn stock_results_are_tagged_by_status() {
        let ok = serde_json::to_value(StockUpdateResult::Success {
            sku: "A".to_string(),
            new_quantity: 4,
        })
        .unwrap();
        assert_eq!(ok, json!({"status": "success", "sku": "A", "new_quantity": 4}));

        let missing = serde_json::to_value(StockUpdateResult::Error {
            sku: "B".to_string(),
            message: "SKU not found".to_string(),
        })
        .unwrap();
        assert_eq!(missing["status"], "error");
        assert_eq!(missing["message"], "SKU not found");
    }
}
