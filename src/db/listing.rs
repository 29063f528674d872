//! Read side: filtered, ordered, paginated listings scoped to one user.

use crate::db::models::{
    DbAmazonInventory, DbAmazonOrder, DbAmazonOrderItem, DbAmazonProduct, DbNoonInventory,
    DbNoonOrder, DbNoonOrderItem, DbNoonProduct, to_db_time,
};
use crate::db::sqlite::MarketStorage;
use crate::error::MarketError;
use crate::service::pagination::{Page, PageRequest};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashMap;

/// Extra `AND ...` clauses appended after `WHERE user_id = ?`.
pub trait SqlFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>);
}

/// A listable table: where it lives and its deterministic sort order.
/// Every ordering ends on a unique column so pages never overlap.
pub trait Listing {
    const TABLE: &'static str;
    const ORDER_BY: &'static str;
}

impl Listing for DbAmazonProduct {
    const TABLE: &'static str = "amazon_products";
    const ORDER_BY: &'static str = "id ASC";
}

impl Listing for DbAmazonOrder {
    const TABLE: &'static str = "amazon_orders";
    const ORDER_BY: &'static str = "purchase_date DESC, id DESC";
}

impl Listing for DbAmazonInventory {
    const TABLE: &'static str = "amazon_inventory";
    const ORDER_BY: &'static str = "sku ASC, id ASC";
}

impl Listing for DbNoonProduct {
    const TABLE: &'static str = "noon_products";
    const ORDER_BY: &'static str = "id ASC";
}

impl Listing for DbNoonOrder {
    const TABLE: &'static str = "noon_orders";
    const ORDER_BY: &'static str = "order_date DESC, id DESC";
}

impl Listing for DbNoonInventory {
    const TABLE: &'static str = "noon_inventory";
    const ORDER_BY: &'static str = "partner_sku ASC, id ASC";
}

fn push_eq(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: &Option<String>) {
    if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
        qb.push(format!(" AND {column} = ")).push_bind(v.clone());
    }
}

/// Case-insensitive substring match (SQLite LIKE folds ASCII case).
fn push_contains(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: &Option<String>) {
    if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
        let escaped = v
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        qb.push(format!(" AND {column} LIKE "))
            .push_bind(format!("%{escaped}%"))
            .push(" ESCAPE '\\'");
    }
}

fn push_in(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    qb.push(format!(" AND {column} IN ("));
    let mut sep = qb.separated(", ");
    for v in values {
        sep.push_bind(v.clone());
    }
    sep.push_unseparated(")");
}

fn push_time(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    op: &str,
    value: &Option<DateTime<Utc>>,
) {
    if let Some(ts) = value {
        qb.push(format!(" AND {column} {op} ")).push_bind(to_db_time(ts));
    }
}

#[derive(Debug, Clone, Default)]
pub struct AmazonProductFilter {
    pub asin: Option<String>,
    pub sku: Option<String>,
    pub status: Option<String>,
}

impl SqlFilter for AmazonProductFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_eq(qb, "asin", &self.asin);
        push_eq(qb, "sku", &self.sku);
        push_eq(qb, "status", &self.status);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AmazonOrderFilter {
    pub order_status: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl SqlFilter for AmazonOrderFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_eq(qb, "order_status", &self.order_status);
        push_time(qb, "purchase_date", ">=", &self.created_after);
        push_time(qb, "purchase_date", "<=", &self.created_before);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AmazonInventoryFilter {
    pub skus: Vec<String>,
}

impl SqlFilter for AmazonInventoryFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_in(qb, "sku", &self.skus);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoonProductFilter {
    pub partner_sku: Option<String>,
    pub noon_sku: Option<String>,
    pub status: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
}

impl SqlFilter for NoonProductFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_eq(qb, "partner_sku", &self.partner_sku);
        push_eq(qb, "noon_sku", &self.noon_sku);
        push_eq(qb, "status", &self.status);
        push_contains(qb, "brand", &self.brand);
        push_contains(qb, "title", &self.search);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoonOrderFilter {
    pub status: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub city: Option<String>,
}

impl SqlFilter for NoonOrderFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_eq(qb, "status", &self.status);
        push_time(qb, "order_date", ">=", &self.from_date);
        push_time(qb, "order_date", "<=", &self.to_date);
        push_contains(qb, "address_city", &self.city);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoonInventoryFilter {
    pub partner_sku: Option<String>,
    pub skus: Vec<String>,
    pub warehouse: Option<String>,
}

impl SqlFilter for NoonInventoryFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        push_eq(qb, "partner_sku", &self.partner_sku);
        push_in(qb, "partner_sku", &self.skus);
        push_eq(qb, "warehouse_code", &self.warehouse);
    }
}

impl MarketStorage {
    /// Count the filtered set, then fetch one window of it in listing order.
    pub async fn list_page<T, F>(
        &self,
        user_id: i64,
        filter: &F,
        request: PageRequest,
    ) -> Result<Page<T>, MarketError>
    where
        T: Listing + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        F: SqlFilter,
    {
        let mut count_qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {} WHERE user_id = ", T::TABLE));
        count_qb.push_bind(user_id);
        filter.push_where(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {} WHERE user_id = ", T::TABLE));
        qb.push_bind(user_id);
        filter.push_where(&mut qb);
        qb.push(format!(" ORDER BY {} LIMIT ", T::ORDER_BY));
        qb.push_bind(i64::from(request.limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(request.offset).unwrap_or(i64::MAX));
        let items = qb.build_query_as::<T>().fetch_all(self.pool()).await?;

        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or_default(),
            request,
        })
    }

    pub async fn get_amazon_product(
        &self,
        user_id: i64,
        asin: &str,
    ) -> Result<Option<DbAmazonProduct>, MarketError> {
        let row = sqlx::query_as::<_, DbAmazonProduct>(
            "SELECT * FROM amazon_products WHERE user_id = ? AND asin = ?",
        )
        .bind(user_id)
        .bind(asin)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn get_amazon_order(
        &self,
        user_id: i64,
        amazon_order_id: &str,
    ) -> Result<Option<DbAmazonOrder>, MarketError> {
        let row = sqlx::query_as::<_, DbAmazonOrder>(
            "SELECT * FROM amazon_orders WHERE user_id = ? AND amazon_order_id = ?",
        )
        .bind(user_id)
        .bind(amazon_order_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn list_amazon_order_items(
        &self,
        order_id: i64,
    ) -> Result<Vec<DbAmazonOrderItem>, MarketError> {
        let rows = sqlx::query_as::<_, DbAmazonOrderItem>(
            "SELECT * FROM amazon_order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn get_noon_product(
        &self,
        user_id: i64,
        noon_sku: &str,
    ) -> Result<Option<DbNoonProduct>, MarketError> {
        let row = sqlx::query_as::<_, DbNoonProduct>(
            "SELECT * FROM noon_products WHERE user_id = ? AND noon_sku = ?",
        )
        .bind(user_id)
        .bind(noon_sku)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn get_noon_order(
        &self,
        user_id: i64,
        order_nr: &str,
    ) -> Result<Option<DbNoonOrder>, MarketError> {
        let row = sqlx::query_as::<_, DbNoonOrder>(
            "SELECT * FROM noon_orders WHERE user_id = ? AND order_nr = ?",
        )
        .bind(user_id)
        .bind(order_nr)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Items for a batch of noon orders, grouped by parent order id.
    pub async fn noon_items_by_order(
        &self,
        order_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<DbNoonOrderItem>>, MarketError> {
        let mut grouped: HashMap<i64, Vec<DbNoonOrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM noon_order_items WHERE order_id IN (");
        let mut sep = qb.separated(", ");
        for id in order_ids {
            sep.push_bind(*id);
        }
        sep.push_unseparated(") ORDER BY order_id, id");
        let rows = qb
            .build_query_as::<DbNoonOrderItem>()
            .fetch_all(self.pool())
            .await?;
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }
}
