use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;

use crate::middleware::ApiJson;
use crate::service::authenticator::IssuedToken;
use crate::{MarketError, router::MarketState};

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// POST /api/auth/token -> exchanges client credentials for a bearer token.
pub async fn issue_token_handler(
    State(state): State<MarketState>,
    ApiJson(body): ApiJson<TokenRequest>,
) -> Result<Json<IssuedToken>, MarketError> {
    let client_id = body.client_id.filter(|s| !s.trim().is_empty());
    let client_secret = body.client_secret.filter(|s| !s.is_empty());
    let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
        return Err(MarketError::MissingParams(
            "client_id and client_secret are required".to_string(),
        ));
    };

    let issued = state
        .authenticator
        .issue_token(client_id.trim(), &client_secret, Utc::now())
        .await?;
    Ok(Json(issued))
}
