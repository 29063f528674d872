use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::config::ApiConfig;
use crate::db::MarketStorage;
use crate::handlers::{amazon, auth, health, noon, upload};
use crate::service::authenticator::TokenAuthenticator;
use crate::service::pagination::PageLimits;
use crate::service::uploader::BulkUploader;

#[derive(Clone)]
pub struct MarketState {
    pub storage: MarketStorage,
    pub authenticator: TokenAuthenticator,
    pub uploader: BulkUploader,
    pub api: Arc<ApiConfig>,
}

impl MarketState {
    pub fn new(storage: MarketStorage, api: ApiConfig) -> Self {
        Self {
            authenticator: TokenAuthenticator::new(storage.clone(), api.token_ttl_secs),
            uploader: BulkUploader::new(storage.clone()),
            storage,
            api: Arc::new(api),
        }
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.api.default_page_size,
            max_size: self.api.max_page_size,
        }
    }

    /// Noon inventory pages are larger by default.
    pub fn inventory_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.api.inventory_page_size,
            max_size: self.api.max_page_size,
        }
    }
}

pub fn market_router(state: MarketState) -> Router {
    let amazon_routes = Router::new()
        .route("/catalog/items", get(amazon::list_catalog_items))
        .route("/catalog/items/{asin}", get(amazon::get_catalog_item))
        .route("/orders", get(amazon::list_orders))
        .route("/orders/{amazon_order_id}", get(amazon::get_order))
        .route("/orders/{amazon_order_id}/items", get(amazon::list_order_items))
        .route("/fba/inventory", get(amazon::list_inventory));

    let noon_routes = Router::new()
        .route("/products", get(noon::list_products))
        .route("/products/{noon_sku}", get(noon::get_product))
        .route("/orders", get(noon::list_orders))
        .route("/orders/status-update", post(noon::update_order_status))
        .route("/orders/{order_nr}", get(noon::get_order))
        .route("/inventory", get(noon::list_inventory))
        .route("/inventory/update", post(noon::update_inventory));

    let upload_routes = Router::new()
        .route("/amazon", post(upload::upload_amazon))
        .route("/noon", post(upload::upload_noon))
        .route("/clear-db", post(upload::clear_db))
        .layer(DefaultBodyLimit::max(state.api.upload_limit_bytes));

    let api = Router::new()
        .route("/auth/token", post(auth::issue_token_handler))
        .nest("/amazon-ae", amazon_routes)
        .nest("/noon-ae", noon_routes)
        .nest("/upload", upload_routes);

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .with_state(state)
}
