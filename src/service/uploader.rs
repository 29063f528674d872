use crate::db::models::{
    AmazonInventoryRecord, AmazonOrderItemRecord, AmazonOrderRecord, AmazonProductRecord,
    NoonInventoryRecord, NoonOrderItemRecord, NoonOrderRecord, NoonProductRecord, Upserted,
};
use crate::db::sqlite::MarketStorage;
use crate::db::upsert;
use crate::error::MarketError;
use crate::service::sheet::SheetRow;
use crate::types::marketplace::{DataType, Marketplace};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub created: u64,
    pub updated: u64,
}

/// Outcome of one upload. For orders, `created`/`updated` count distinct
/// orders and `items` counts order lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemCounts>,
}

impl UploadReport {
    fn record(&mut self, outcome: Upserted) {
        if outcome.is_created() {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }

    fn record_item(&mut self, outcome: Upserted) {
        let items = self.items.get_or_insert_with(ItemCounts::default);
        if outcome.is_created() {
            items.created += 1;
        } else {
            items.updated += 1;
        }
    }
}

/// Idempotent spreadsheet import keyed by natural identifiers. One call is
/// one transaction: either every row lands or none do.
#[derive(Clone)]
pub struct BulkUploader {
    storage: MarketStorage,
}

impl BulkUploader {
    pub fn new(storage: MarketStorage) -> Self {
        Self { storage }
    }

    pub async fn upload(
        &self,
        user_id: i64,
        marketplace: Marketplace,
        data_type: DataType,
        rows: &[SheetRow],
    ) -> Result<UploadReport, MarketError> {
        let mut tx = self.storage.pool().begin().await?;
        let report = match (marketplace, data_type) {
            (Marketplace::AmazonAe, DataType::Products) => {
                amazon_products(&mut tx, user_id, rows).await?
            }
            (Marketplace::AmazonAe, DataType::Orders) => {
                amazon_orders(&mut tx, user_id, rows).await?
            }
            (Marketplace::AmazonAe, DataType::Inventory) => {
                amazon_inventory(&mut tx, user_id, rows).await?
            }
            (Marketplace::NoonAe, DataType::Products) => {
                noon_products(&mut tx, user_id, rows).await?
            }
            (Marketplace::NoonAe, DataType::Orders) => noon_orders(&mut tx, user_id, rows).await?,
            (Marketplace::NoonAe, DataType::Inventory) => {
                noon_inventory(&mut tx, user_id, rows).await?
            }
        };
        tx.commit().await?;

        info!(
            user_id,
            %marketplace,
            data_type = data_type.as_str(),
            rows = rows.len(),
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            "upload committed"
        );
        Ok(report)
    }
}

fn skip(report: &mut UploadReport, index: usize, key: &str) {
    warn!(row = index + 2, column = key, "row skipped: missing natural key");
    report.skipped += 1;
}

async fn amazon_products(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport::default();
    for (index, row) in rows.iter().enumerate() {
        let Some(rec) = amazon_product_record(row) else {
            skip(&mut report, index, "asin");
            continue;
        };
        report.record(upsert::upsert_amazon_product(conn, user_id, &rec).await?);
    }
    Ok(report)
}

async fn amazon_orders(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport {
        items: Some(ItemCounts::default()),
        ..Default::default()
    };
    let mut seen: HashMap<String, i64> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        let Some(order) = amazon_order_record(row) else {
            skip(&mut report, index, "amazon_order_id");
            continue;
        };
        let order_id = match seen.get(&order.amazon_order_id) {
            Some(id) => *id,
            None => {
                let outcome = upsert::upsert_amazon_order(conn, user_id, &order).await?;
                report.record(outcome);
                seen.insert(order.amazon_order_id.clone(), outcome.id());
                outcome.id()
            }
        };
        if let Some(item) = amazon_order_item_record(row, &order.order_total_currency) {
            let outcome = upsert::upsert_amazon_order_item(conn, user_id, order_id, &item).await?;
            debug!(order = %order.amazon_order_id, item = %item.order_item_id, "order item linked");
            report.record_item(outcome);
        }
    }
    Ok(report)
}

async fn amazon_inventory(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport::default();
    for (index, row) in rows.iter().enumerate() {
        let Some(rec) = amazon_inventory_record(row) else {
            skip(&mut report, index, "sku");
            continue;
        };
        report.record(upsert::upsert_amazon_inventory(conn, user_id, &rec).await?);
    }
    Ok(report)
}

async fn noon_products(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport::default();
    for (index, row) in rows.iter().enumerate() {
        let Some(rec) = noon_product_record(row) else {
            skip(&mut report, index, "noon_sku");
            continue;
        };
        report.record(upsert::upsert_noon_product(conn, user_id, &rec).await?);
    }
    Ok(report)
}

async fn noon_orders(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport {
        items: Some(ItemCounts::default()),
        ..Default::default()
    };
    let mut seen: HashMap<String, i64> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        let Some(order) = noon_order_record(row) else {
            skip(&mut report, index, "order_nr");
            continue;
        };
        let order_id = match seen.get(&order.order_nr) {
            Some(id) => *id,
            None => {
                let outcome = upsert::upsert_noon_order(conn, user_id, &order).await?;
                report.record(outcome);
                seen.insert(order.order_nr.clone(), outcome.id());
                outcome.id()
            }
        };
        if let Some(item) = noon_order_item_record(row) {
            let outcome = upsert::upsert_noon_order_item(conn, user_id, order_id, &item).await?;
            report.record_item(outcome);
        }
    }
    Ok(report)
}

async fn noon_inventory(
    conn: &mut SqliteConnection,
    user_id: i64,
    rows: &[SheetRow],
) -> Result<UploadReport, MarketError> {
    let mut report = UploadReport::default();
    for (index, row) in rows.iter().enumerate() {
        let Some(rec) = noon_inventory_record(row) else {
            skip(&mut report, index, "partner_sku");
            continue;
        };
        report.record(upsert::upsert_noon_inventory(conn, user_id, &rec).await?);
    }
    Ok(report)
}

pub fn amazon_product_record(row: &SheetRow) -> Option<AmazonProductRecord> {
    Some(AmazonProductRecord {
        asin: row.opt_text("asin")?,
        sku: row.text("sku", ""),
        title: row.text("title", ""),
        description: row.text("description", ""),
        brand: row.text("brand", ""),
        category: row.text("category", ""),
        price: row.amount("price", 0.0),
        currency: row.text("currency", "AED"),
        quantity: row.int("quantity", 0),
        image_url: row.text("image_url", ""),
        status: row.text("status", "ACTIVE"),
    })
}

pub fn amazon_order_record(row: &SheetRow) -> Option<AmazonOrderRecord> {
    Some(AmazonOrderRecord {
        amazon_order_id: row.opt_text("amazon_order_id")?,
        purchase_date: row.datetime("purchase_date").unwrap_or_else(Utc::now),
        order_status: row.text("order_status", "Pending"),
        fulfillment_channel: row.text("fulfillment_channel", "MFN"),
        sales_channel: row.text("sales_channel", "Amazon.ae"),
        order_total_amount: row.amount("order_total_amount", 0.0),
        order_total_currency: row.text("order_total_currency", "AED"),
        number_of_items_shipped: row.int("number_of_items_shipped", 0),
        number_of_items_unshipped: row.int("number_of_items_unshipped", 0),
        payment_method: row.text("payment_method", "Other"),
        buyer_email: row.text("buyer_email", ""),
        buyer_name: row.text("buyer_name", ""),
        ship_service_level: row.text("ship_service_level", ""),
        earliest_ship_date: row.datetime("earliest_ship_date"),
        latest_ship_date: row.datetime("latest_ship_date"),
    })
}

/// Line prices are in the order's currency unless the row names its own.
pub fn amazon_order_item_record(
    row: &SheetRow,
    order_currency: &str,
) -> Option<AmazonOrderItemRecord> {
    Some(AmazonOrderItemRecord {
        order_item_id: row.opt_text("order_item_id")?,
        asin: row.text("item_asin", ""),
        sku: row.text("item_sku", ""),
        title: row.text("item_title", ""),
        quantity_ordered: row.int("quantity_ordered", 1),
        quantity_shipped: row.int("quantity_shipped", 0),
        item_price_amount: row.amount("item_price", 0.0),
        item_price_currency: row.text("item_price_currency", order_currency),
        shipping_price_amount: row.amount("shipping_price", 0.0),
        item_tax_amount: row.amount("item_tax", 0.0),
        promotion_discount_amount: row.amount("promotion_discount", 0.0),
        condition_id: row.text("condition_id", "New"),
        is_gift: row.flag("is_gift", false),
    })
}

pub fn amazon_inventory_record(row: &SheetRow) -> Option<AmazonInventoryRecord> {
    let available = row.int("available_quantity", 0);
    let pending = row.int("pending_quantity", 0);
    let reserved = row.int("reserved_quantity", 0);
    Some(AmazonInventoryRecord {
        sku: row.opt_text("sku")?,
        asin: row.text("asin", ""),
        fn_sku: row.text("fn_sku", ""),
        product_name: row.text("product_name", ""),
        condition: row.text("condition", "new"),
        available_quantity: available,
        pending_quantity: pending,
        reserved_quantity: reserved,
        total_quantity: row
            .opt_int("total_quantity")
            .unwrap_or(available + pending + reserved),
        warehouse_condition_code: row.text("warehouse_condition_code", ""),
    })
}

pub fn noon_product_record(row: &SheetRow) -> Option<NoonProductRecord> {
    Some(NoonProductRecord {
        noon_sku: row.opt_text("noon_sku")?,
        partner_sku: row.text("partner_sku", ""),
        title: row.text("title", ""),
        title_ar: row.text("title_ar", ""),
        summary: row.text("summary", ""),
        brand: row.text("brand", ""),
        category_code: row.text("category_code", ""),
        product_type: row.text("product_type", ""),
        model_number: row.text("model_number", ""),
        price: row.amount("price", 0.0),
        sale_price: row.opt_amount("sale_price"),
        warranty: row.text("warranty", ""),
        stock_quantity: row.int("stock_quantity", 0),
        max_order_quantity: row.int("max_order_quantity", 10),
        status: row.text("status", "active"),
        image_url: row.text("image_url", ""),
    })
}

pub fn noon_order_record(row: &SheetRow) -> Option<NoonOrderRecord> {
    Some(NoonOrderRecord {
        order_nr: row.opt_text("order_nr")?,
        order_date: row.datetime("order_date").unwrap_or_else(Utc::now),
        status: row.text("status", "placed"),
        customer_first_name: row.text("customer_first_name", ""),
        customer_last_name: row.text("customer_last_name", ""),
        customer_email: row.text("customer_email", ""),
        customer_phone: row.text("customer_phone", ""),
        payment_method: row.text("payment_method", ""),
        total_amount: row.amount("total_amount", 0.0),
        currency: row.text("currency", "AED"),
        delivery_provider: row.text("delivery_provider", ""),
        tracking_number: row.text("tracking_number", ""),
        address_city: row.text("address_city", ""),
        address_area: row.text("address_area", ""),
        address_street: row.text("address_street", ""),
        is_express: row.flag("is_express", false),
    })
}

pub fn noon_order_item_record(row: &SheetRow) -> Option<NoonOrderItemRecord> {
    let quantity = row.int("quantity", 1);
    let unit_price = row.amount("unit_price", 0.0);
    let default_total = ((unit_price * quantity as f64) * 100.0).round() / 100.0;
    Some(NoonOrderItemRecord {
        order_item_id: row.opt_text("order_item_id")?,
        noon_sku: row.text("item_noon_sku", ""),
        partner_sku: row.text("item_partner_sku", ""),
        name: row.text("item_name", ""),
        quantity,
        unit_price,
        total_price: row.opt_amount("total_price").unwrap_or(default_total),
        tax_amount: row.amount("tax_amount", 0.0),
        status: row.text("item_status", ""),
    })
}

pub fn noon_inventory_record(row: &SheetRow) -> Option<NoonInventoryRecord> {
    Some(NoonInventoryRecord {
        partner_sku: row.opt_text("partner_sku")?,
        noon_sku: row.text("noon_sku", ""),
        barcode: row.text("barcode", ""),
        quantity: row.int("quantity", 0),
        reserved_quantity: row.int("reserved_quantity", 0),
        warehouse_code: row.text("warehouse_code", ""),
    })
}
