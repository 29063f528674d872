//! SQL DDL for initializing the marketplace store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - one `users` row per username
/// - `credentials` unique per (user, marketplace), `client_id` and non-null
///   `access_token` globally unique
/// - per-marketplace product/order/order item/inventory tables whose natural
///   keys are unique per user
/// - order items cascade with their parent order
/// - timestamps stored as RFC3339 UTC text (`YYYY-MM-DDTHH:MM:SSZ`) so that
///   text comparison matches chronological order
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    marketplace TEXT NOT NULL,
    client_id TEXT NOT NULL UNIQUE,
    client_secret TEXT NOT NULL,
    access_token TEXT NULL UNIQUE,
    token_expires_at TEXT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, marketplace)
);

CREATE TABLE IF NOT EXISTS amazon_products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    asin TEXT NOT NULL,
    sku TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    brand TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    currency TEXT NOT NULL DEFAULT 'AED',
    quantity INTEGER NOT NULL DEFAULT 0,
    image_url TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, asin)
);

CREATE TABLE IF NOT EXISTS amazon_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    amazon_order_id TEXT NOT NULL,
    purchase_date TEXT NOT NULL,
    order_status TEXT NOT NULL DEFAULT 'Pending',
    fulfillment_channel TEXT NOT NULL DEFAULT 'MFN',
    sales_channel TEXT NOT NULL DEFAULT 'Amazon.ae',
    order_total_amount REAL NOT NULL DEFAULT 0,
    order_total_currency TEXT NOT NULL DEFAULT 'AED',
    number_of_items_shipped INTEGER NOT NULL DEFAULT 0,
    number_of_items_unshipped INTEGER NOT NULL DEFAULT 0,
    payment_method TEXT NOT NULL DEFAULT 'Other',
    marketplace_id TEXT NOT NULL DEFAULT 'A2VIGQ35RCS4UG',
    buyer_email TEXT NOT NULL DEFAULT '',
    buyer_name TEXT NOT NULL DEFAULT '',
    ship_service_level TEXT NOT NULL DEFAULT '',
    earliest_ship_date TEXT NULL,
    latest_ship_date TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, amazon_order_id)
);

CREATE INDEX IF NOT EXISTS idx_amazon_orders_purchase_date ON amazon_orders(user_id, purchase_date);

CREATE TABLE IF NOT EXISTS amazon_order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    order_id INTEGER NOT NULL REFERENCES amazon_orders(id) ON DELETE CASCADE,
    order_item_id TEXT NOT NULL,
    asin TEXT NOT NULL DEFAULT '',
    sku TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    quantity_ordered INTEGER NOT NULL DEFAULT 1,
    quantity_shipped INTEGER NOT NULL DEFAULT 0,
    item_price_amount REAL NOT NULL DEFAULT 0,
    item_price_currency TEXT NOT NULL DEFAULT 'AED',
    shipping_price_amount REAL NOT NULL DEFAULT 0,
    item_tax_amount REAL NOT NULL DEFAULT 0,
    promotion_discount_amount REAL NOT NULL DEFAULT 0,
    condition_id TEXT NOT NULL DEFAULT 'New',
    is_gift INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, order_item_id)
);

CREATE INDEX IF NOT EXISTS idx_amazon_order_items_order ON amazon_order_items(order_id);

CREATE TABLE IF NOT EXISTS amazon_inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    asin TEXT NOT NULL DEFAULT '',
    sku TEXT NOT NULL,
    fn_sku TEXT NOT NULL DEFAULT '',
    product_name TEXT NOT NULL DEFAULT '',
    condition TEXT NOT NULL DEFAULT 'new',
    available_quantity INTEGER NOT NULL DEFAULT 0,
    pending_quantity INTEGER NOT NULL DEFAULT 0,
    reserved_quantity INTEGER NOT NULL DEFAULT 0,
    total_quantity INTEGER NOT NULL DEFAULT 0,
    warehouse_condition_code TEXT NOT NULL DEFAULT '',
    last_updated_time TEXT NOT NULL,
    UNIQUE (user_id, sku)
);

CREATE TABLE IF NOT EXISTS noon_products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    noon_sku TEXT NOT NULL,
    partner_sku TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    title_ar TEXT NOT NULL DEFAULT '',
    summary TEXT NOT NULL DEFAULT '',
    brand TEXT NOT NULL DEFAULT '',
    category_code TEXT NOT NULL DEFAULT '',
    product_type TEXT NOT NULL DEFAULT '',
    model_number TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    sale_price REAL NULL,
    warranty TEXT NOT NULL DEFAULT '',
    stock_quantity INTEGER NOT NULL DEFAULT 0,
    max_order_quantity INTEGER NOT NULL DEFAULT 10,
    status TEXT NOT NULL DEFAULT 'active',
    image_url TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, noon_sku)
);

CREATE TABLE IF NOT EXISTS noon_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    order_nr TEXT NOT NULL,
    order_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'placed',
    customer_first_name TEXT NOT NULL DEFAULT '',
    customer_last_name TEXT NOT NULL DEFAULT '',
    customer_email TEXT NOT NULL DEFAULT '',
    customer_phone TEXT NOT NULL DEFAULT '',
    payment_method TEXT NOT NULL DEFAULT '',
    total_amount REAL NOT NULL DEFAULT 0,
    currency TEXT NOT NULL DEFAULT 'AED',
    delivery_provider TEXT NOT NULL DEFAULT '',
    tracking_number TEXT NOT NULL DEFAULT '',
    address_city TEXT NOT NULL DEFAULT '',
    address_area TEXT NOT NULL DEFAULT '',
    address_street TEXT NOT NULL DEFAULT '',
    is_express INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, order_nr)
);

CREATE INDEX IF NOT EXISTS idx_noon_orders_order_date ON noon_orders(user_id, order_date);

CREATE TABLE IF NOT EXISTS noon_order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    order_id INTEGER NOT NULL REFERENCES noon_orders(id) ON DELETE CASCADE,
    order_item_id TEXT NOT NULL,
    noon_sku TEXT NOT NULL DEFAULT '',
    partner_sku TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    quantity INTEGER NOT NULL DEFAULT 1,
    unit_price REAL NOT NULL DEFAULT 0,
    total_price REAL NOT NULL DEFAULT 0,
    tax_amount REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT '',
    UNIQUE (user_id, order_item_id)
);

CREATE INDEX IF NOT EXISTS idx_noon_order_items_order ON noon_order_items(order_id);

CREATE TABLE IF NOT EXISTS noon_inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    noon_sku TEXT NOT NULL DEFAULT '',
    partner_sku TEXT NOT NULL,
    barcode TEXT NOT NULL DEFAULT '',
    quantity INTEGER NOT NULL DEFAULT 0,
    reserved_quantity INTEGER NOT NULL DEFAULT 0,
    warehouse_code TEXT NOT NULL DEFAULT '',
    last_updated TEXT NOT NULL,
    UNIQUE (user_id, partner_sku)
);
"#;
