use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{MarketError, router::MarketState};

/// GET /health -> `SELECT 1` against the pool.
pub async fn health_handler(State(state): State<MarketState>) -> Result<Json<Value>, MarketError> {
    state.storage.ping().await?;
    Ok(Json(json!({"status": "awake", "database": "active"})))
}
