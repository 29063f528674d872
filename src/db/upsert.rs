//! Write side: keyed upserts run inside a caller-owned transaction, plus the
//! small direct mutations the Noon mock exposes and the bulk clear.

use crate::db::models::{
    AmazonInventoryRecord, AmazonOrderItemRecord, AmazonOrderRecord, AmazonProductRecord,
    NoonInventoryRecord, NoonOrderItemRecord, NoonOrderRecord, NoonProductRecord, Upserted,
    to_db_time,
};
use crate::db::sqlite::MarketStorage;
use crate::error::MarketError;
use crate::types::marketplace::Marketplace;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqliteConnection;

/// Look up a row id by its per-user natural key.
async fn find_id(
    conn: &mut SqliteConnection,
    table: &str,
    key_column: &str,
    user_id: i64,
    key: &str,
) -> Result<Option<i64>, MarketError> {
    let sql = format!("SELECT id FROM {table} WHERE user_id = ? AND {key_column} = ?");
    let id = sqlx::query_scalar::<_, i64>(&sql)
        .bind(user_id)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn upsert_amazon_product(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &AmazonProductRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    match find_id(conn, "amazon_products", "asin", user_id, &rec.asin).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE amazon_products SET
                    sku = ?, title = ?, description = ?, brand = ?, category = ?,
                    price = ?, currency = ?, quantity = ?, image_url = ?, status = ?,
                    updated_at = ?
                  WHERE id = ?"#,
            )
            .bind(&rec.sku)
            .bind(&rec.title)
            .bind(&rec.description)
            .bind(&rec.brand)
            .bind(&rec.category)
            .bind(rec.price)
            .bind(&rec.currency)
            .bind(rec.quantity)
            .bind(&rec.image_url)
            .bind(&rec.status)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO amazon_products (
                    user_id, asin, sku, title, description, brand, category,
                    price, currency, quantity, image_url, status, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.asin)
            .bind(&rec.sku)
            .bind(&rec.title)
            .bind(&rec.description)
            .bind(&rec.brand)
            .bind(&rec.category)
            .bind(rec.price)
            .bind(&rec.currency)
            .bind(rec.quantity)
            .bind(&rec.image_url)
            .bind(&rec.status)
            .bind(&now)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

pub async fn upsert_amazon_order(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &AmazonOrderRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    let purchase_date = to_db_time(&rec.purchase_date);
    let earliest = rec.earliest_ship_date.as_ref().map(to_db_time);
    let latest = rec.latest_ship_date.as_ref().map(to_db_time);
    match find_id(conn, "amazon_orders", "amazon_order_id", user_id, &rec.amazon_order_id).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE amazon_orders SET
                    purchase_date = ?, order_status = ?, fulfillment_channel = ?, sales_channel = ?,
                    order_total_amount = ?, order_total_currency = ?,
                    number_of_items_shipped = ?, number_of_items_unshipped = ?,
                    payment_method = ?, buyer_email = ?, buyer_name = ?, ship_service_level = ?,
                    earliest_ship_date = ?, latest_ship_date = ?, updated_at = ?
                  WHERE id = ?"#,
            )
            .bind(&purchase_date)
            .bind(&rec.order_status)
            .bind(&rec.fulfillment_channel)
            .bind(&rec.sales_channel)
            .bind(rec.order_total_amount)
            .bind(&rec.order_total_currency)
            .bind(rec.number_of_items_shipped)
            .bind(rec.number_of_items_unshipped)
            .bind(&rec.payment_method)
            .bind(&rec.buyer_email)
            .bind(&rec.buyer_name)
            .bind(&rec.ship_service_level)
            .bind(&earliest)
            .bind(&latest)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO amazon_orders (
                    user_id, amazon_order_id, purchase_date, order_status, fulfillment_channel,
                    sales_channel, order_total_amount, order_total_currency,
                    number_of_items_shipped, number_of_items_unshipped, payment_method,
                    buyer_email, buyer_name, ship_service_level,
                    earliest_ship_date, latest_ship_date, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.amazon_order_id)
            .bind(&purchase_date)
            .bind(&rec.order_status)
            .bind(&rec.fulfillment_channel)
            .bind(&rec.sales_channel)
            .bind(rec.order_total_amount)
            .bind(&rec.order_total_currency)
            .bind(rec.number_of_items_shipped)
            .bind(rec.number_of_items_unshipped)
            .bind(&rec.payment_method)
            .bind(&rec.buyer_email)
            .bind(&rec.buyer_name)
            .bind(&rec.ship_service_level)
            .bind(&earliest)
            .bind(&latest)
            .bind(&now)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

/// Upsert an item and (re)link it to `order_id`.
pub async fn upsert_amazon_order_item(
    conn: &mut SqliteConnection,
    user_id: i64,
    order_id: i64,
    rec: &AmazonOrderItemRecord,
) -> Result<Upserted, MarketError> {
    match find_id(conn, "amazon_order_items", "order_item_id", user_id, &rec.order_item_id).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE amazon_order_items SET
                    order_id = ?, asin = ?, sku = ?, title = ?,
                    quantity_ordered = ?, quantity_shipped = ?, item_price_amount = ?,
                    item_price_currency = ?, shipping_price_amount = ?, item_tax_amount = ?,
                    promotion_discount_amount = ?, condition_id = ?, is_gift = ?
                  WHERE id = ?"#,
            )
            .bind(order_id)
            .bind(&rec.asin)
            .bind(&rec.sku)
            .bind(&rec.title)
            .bind(rec.quantity_ordered)
            .bind(rec.quantity_shipped)
            .bind(rec.item_price_amount)
            .bind(&rec.item_price_currency)
            .bind(rec.shipping_price_amount)
            .bind(rec.item_tax_amount)
            .bind(rec.promotion_discount_amount)
            .bind(&rec.condition_id)
            .bind(rec.is_gift)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO amazon_order_items (
                    user_id, order_id, order_item_id, asin, sku, title,
                    quantity_ordered, quantity_shipped, item_price_amount,
                    item_price_currency, shipping_price_amount, item_tax_amount,
                    promotion_discount_amount, condition_id, is_gift
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(order_id)
            .bind(&rec.order_item_id)
            .bind(&rec.asin)
            .bind(&rec.sku)
            .bind(&rec.title)
            .bind(rec.quantity_ordered)
            .bind(rec.quantity_shipped)
            .bind(rec.item_price_amount)
            .bind(&rec.item_price_currency)
            .bind(rec.shipping_price_amount)
            .bind(rec.item_tax_amount)
            .bind(rec.promotion_discount_amount)
            .bind(&rec.condition_id)
            .bind(rec.is_gift)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

pub async fn upsert_amazon_inventory(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &AmazonInventoryRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    match find_id(conn, "amazon_inventory", "sku", user_id, &rec.sku).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE amazon_inventory SET
                    asin = ?, fn_sku = ?, product_name = ?, condition = ?,
                    available_quantity = ?, pending_quantity = ?, reserved_quantity = ?,
                    total_quantity = ?, warehouse_condition_code = ?, last_updated_time = ?
                  WHERE id = ?"#,
            )
            .bind(&rec.asin)
            .bind(&rec.fn_sku)
            .bind(&rec.product_name)
            .bind(&rec.condition)
            .bind(rec.available_quantity)
            .bind(rec.pending_quantity)
            .bind(rec.reserved_quantity)
            .bind(rec.total_quantity)
            .bind(&rec.warehouse_condition_code)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO amazon_inventory (
                    user_id, sku, asin, fn_sku, product_name, condition,
                    available_quantity, pending_quantity, reserved_quantity, total_quantity,
                    warehouse_condition_code, last_updated_time
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.sku)
            .bind(&rec.asin)
            .bind(&rec.fn_sku)
            .bind(&rec.product_name)
            .bind(&rec.condition)
            .bind(rec.available_quantity)
            .bind(rec.pending_quantity)
            .bind(rec.reserved_quantity)
            .bind(rec.total_quantity)
            .bind(&rec.warehouse_condition_code)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

pub async fn upsert_noon_product(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &NoonProductRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    match find_id(conn, "noon_products", "noon_sku", user_id, &rec.noon_sku).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE noon_products SET
                    partner_sku = ?, title = ?, title_ar = ?, summary = ?, brand = ?,
                    category_code = ?, product_type = ?, model_number = ?, price = ?,
                    sale_price = ?, warranty = ?, stock_quantity = ?, max_order_quantity = ?,
                    status = ?, image_url = ?, updated_at = ?
                  WHERE id = ?"#,
            )
            .bind(&rec.partner_sku)
            .bind(&rec.title)
            .bind(&rec.title_ar)
            .bind(&rec.summary)
            .bind(&rec.brand)
            .bind(&rec.category_code)
            .bind(&rec.product_type)
            .bind(&rec.model_number)
            .bind(rec.price)
            .bind(rec.sale_price)
            .bind(&rec.warranty)
            .bind(rec.stock_quantity)
            .bind(rec.max_order_quantity)
            .bind(&rec.status)
            .bind(&rec.image_url)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO noon_products (
                    user_id, noon_sku, partner_sku, title, title_ar, summary, brand,
                    category_code, product_type, model_number, price, sale_price, warranty,
                    stock_quantity, max_order_quantity, status, image_url, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.noon_sku)
            .bind(&rec.partner_sku)
            .bind(&rec.title)
            .bind(&rec.title_ar)
            .bind(&rec.summary)
            .bind(&rec.brand)
            .bind(&rec.category_code)
            .bind(&rec.product_type)
            .bind(&rec.model_number)
            .bind(rec.price)
            .bind(rec.sale_price)
            .bind(&rec.warranty)
            .bind(rec.stock_quantity)
            .bind(rec.max_order_quantity)
            .bind(&rec.status)
            .bind(&rec.image_url)
            .bind(&now)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

pub async fn upsert_noon_order(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &NoonOrderRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    let order_date = to_db_time(&rec.order_date);
    match find_id(conn, "noon_orders", "order_nr", user_id, &rec.order_nr).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE noon_orders SET
                    order_date = ?, status = ?, customer_first_name = ?, customer_last_name = ?,
                    customer_email = ?, customer_phone = ?, payment_method = ?, total_amount = ?,
                    currency = ?, delivery_provider = ?, tracking_number = ?, address_city = ?,
                    address_area = ?, address_street = ?, is_express = ?, updated_at = ?
                  WHERE id = ?"#,
            )
            .bind(&order_date)
            .bind(&rec.status)
            .bind(&rec.customer_first_name)
            .bind(&rec.customer_last_name)
            .bind(&rec.customer_email)
            .bind(&rec.customer_phone)
            .bind(&rec.payment_method)
            .bind(rec.total_amount)
            .bind(&rec.currency)
            .bind(&rec.delivery_provider)
            .bind(&rec.tracking_number)
            .bind(&rec.address_city)
            .bind(&rec.address_area)
            .bind(&rec.address_street)
            .bind(rec.is_express)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO noon_orders (
                    user_id, order_nr, order_date, status, customer_first_name, customer_last_name,
                    customer_email, customer_phone, payment_method, total_amount, currency,
                    delivery_provider, tracking_number, address_city, address_area, address_street,
                    is_express, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.order_nr)
            .bind(&order_date)
            .bind(&rec.status)
            .bind(&rec.customer_first_name)
            .bind(&rec.customer_last_name)
            .bind(&rec.customer_email)
            .bind(&rec.customer_phone)
            .bind(&rec.payment_method)
            .bind(rec.total_amount)
            .bind(&rec.currency)
            .bind(&rec.delivery_provider)
            .bind(&rec.tracking_number)
            .bind(&rec.address_city)
            .bind(&rec.address_area)
            .bind(&rec.address_street)
            .bind(rec.is_express)
            .bind(&now)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

/// Upsert an item and (re)link it to `order_id`.
pub async fn upsert_noon_order_item(
    conn: &mut SqliteConnection,
    user_id: i64,
    order_id: i64,
    rec: &NoonOrderItemRecord,
) -> Result<Upserted, MarketError> {
    match find_id(conn, "noon_order_items", "order_item_id", user_id, &rec.order_item_id).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE noon_order_items SET
                    order_id = ?, noon_sku = ?, partner_sku = ?, name = ?, quantity = ?,
                    unit_price = ?, total_price = ?, tax_amount = ?, status = ?
                  WHERE id = ?"#,
            )
            .bind(order_id)
            .bind(&rec.noon_sku)
            .bind(&rec.partner_sku)
            .bind(&rec.name)
            .bind(rec.quantity)
            .bind(rec.unit_price)
            .bind(rec.total_price)
            .bind(rec.tax_amount)
            .bind(&rec.status)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO noon_order_items (
                    user_id, order_id, order_item_id, noon_sku, partner_sku, name,
                    quantity, unit_price, total_price, tax_amount, status
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(order_id)
            .bind(&rec.order_item_id)
            .bind(&rec.noon_sku)
            .bind(&rec.partner_sku)
            .bind(&rec.name)
            .bind(rec.quantity)
            .bind(rec.unit_price)
            .bind(rec.total_price)
            .bind(rec.tax_amount)
            .bind(&rec.status)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

pub async fn upsert_noon_inventory(
    conn: &mut SqliteConnection,
    user_id: i64,
    rec: &NoonInventoryRecord,
) -> Result<Upserted, MarketError> {
    let now = to_db_time(&Utc::now());
    match find_id(conn, "noon_inventory", "partner_sku", user_id, &rec.partner_sku).await? {
        Some(id) => {
            sqlx::query(
                r#"UPDATE noon_inventory SET
                    noon_sku = ?, barcode = ?, quantity = ?, reserved_quantity = ?,
                    warehouse_code = ?, last_updated = ?
                  WHERE id = ?"#,
            )
            .bind(&rec.noon_sku)
            .bind(&rec.barcode)
            .bind(rec.quantity)
            .bind(rec.reserved_quantity)
            .bind(&rec.warehouse_code)
            .bind(&now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Updated(id))
        }
        None => {
            let res = sqlx::query(
                r#"INSERT INTO noon_inventory (
                    user_id, partner_sku, noon_sku, barcode, quantity, reserved_quantity,
                    warehouse_code, last_updated
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(user_id)
            .bind(&rec.partner_sku)
            .bind(&rec.noon_sku)
            .bind(&rec.barcode)
            .bind(rec.quantity)
            .bind(rec.reserved_quantity)
            .bind(&rec.warehouse_code)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
            Ok(Upserted::Created(res.last_insert_rowid()))
        }
    }
}

/// Rows removed by a bulk clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClearedCounts {
    pub products: u64,
    pub orders: u64,
    pub order_items: u64,
    pub inventory: u64,
}

/// Result of one stock update line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockUpdate {
    Updated { sku: String, quantity: i64 },
    NotFound { sku: String },
}

impl MarketStorage {
    /// Set a Noon order's status. Returns the new `updated_at`, or `None`
    /// when the caller owns no such order.
    pub async fn update_noon_order_status(
        &self,
        user_id: i64,
        order_nr: &str,
        status: &str,
    ) -> Result<Option<DateTime<Utc>>, MarketError> {
        let now = Utc::now();
        let res = sqlx::query(
            "UPDATE noon_orders SET status = ?, updated_at = ? WHERE user_id = ? AND order_nr = ?",
        )
        .bind(status)
        .bind(to_db_time(&now))
        .bind(user_id)
        .bind(order_nr)
        .execute(self.pool())
        .await?;
        Ok((res.rows_affected() > 0).then_some(now))
    }

    /// Apply a batch of Noon stock updates in one transaction; unknown skus
    /// are reported per line and do not abort the batch.
    pub async fn update_noon_stock(
        &self,
        user_id: i64,
        updates: &[(String, i64)],
    ) -> Result<Vec<StockUpdate>, MarketError> {
        let now = to_db_time(&Utc::now());
        let mut tx = self.pool().begin().await?;
        let mut results = Vec::with_capacity(updates.len());
        for (sku, quantity) in updates {
            let res = sqlx::query(
                "UPDATE noon_inventory SET quantity = ?, last_updated = ? WHERE user_id = ? AND partner_sku = ?",
            )
            .bind(quantity)
            .bind(&now)
            .bind(user_id)
            .bind(sku)
            .execute(&mut *tx)
            .await?;
            if res.rows_affected() > 0 {
                results.push(StockUpdate::Updated {
                    sku: sku.clone(),
                    quantity: *quantity,
                });
            } else {
                results.push(StockUpdate::NotFound { sku: sku.clone() });
            }
        }
        tx.commit().await?;
        Ok(results)
    }

    /// Delete everything `user_id` owns on one marketplace.
    pub async fn clear_marketplace(
        &self,
        user_id: i64,
        marketplace: Marketplace,
    ) -> Result<ClearedCounts, MarketError> {
        let (products, orders, items, inventory) = match marketplace {
            Marketplace::AmazonAe => (
                "amazon_products",
                "amazon_orders",
                "amazon_order_items",
                "amazon_inventory",
            ),
            Marketplace::NoonAe => (
                "noon_products",
                "noon_orders",
                "noon_order_items",
                "noon_inventory",
            ),
        };

        let mut tx = self.pool().begin().await?;
        let mut counts = ClearedCounts::default();
        // items first so the count is exact; the order delete would cascade anyway
        counts.order_items = sqlx::query(&format!("DELETE FROM {items} WHERE user_id = ?"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        counts.orders = sqlx::query(&format!("DELETE FROM {orders} WHERE user_id = ?"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        counts.products = sqlx::query(&format!("DELETE FROM {products} WHERE user_id = ?"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        counts.inventory = sqlx::query(&format!("DELETE FROM {inventory} WHERE user_id = ?"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(counts)
    }
}
