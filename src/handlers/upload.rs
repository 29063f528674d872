use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::upsert::ClearedCounts;
use crate::service::authenticator::AuthScope;
use crate::service::sheet::read_workbook;
use crate::service::uploader::UploadReport;
use crate::types::marketplace::{DataType, Marketplace};
use crate::{MarketError, router::MarketState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub details: UploadReport,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub deleted: ClearedCounts,
}

/// The two fields an upload form carries.
struct UploadForm {
    file: Vec<u8>,
    data_type: DataType,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, MarketError> {
    let mut file = None;
    let mut data_type = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                debug!(filename = ?field.file_name(), "reading upload file field");
                file = Some(field.bytes().await?);
            }
            "data_type" => data_type = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file
        .filter(|bytes| !bytes.is_empty())
        .ok_or(MarketError::MissingFile)?;
    let raw = data_type.unwrap_or_default();
    let data_type = raw
        .trim()
        .parse::<DataType>()
        .map_err(|_| MarketError::InvalidDataType(raw.trim().to_string()))?;

    Ok(UploadForm {
        file: file.to_vec(),
        data_type,
    })
}

async fn upload_for(
    state: MarketState,
    scope: AuthScope,
    marketplace: Marketplace,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, MarketError> {
    scope.require(marketplace)?;
    let multipart =
        multipart.map_err(|rejection| MarketError::InvalidParameter(rejection.body_text()))?;
    let UploadForm { file, data_type } = read_form(multipart).await?;
    let size = file.len();
    let rows = tokio::task::spawn_blocking(move || read_workbook(file)).await??;
    info!(
        user_id = scope.user_id,
        %marketplace,
        data_type = data_type.as_str(),
        bytes = size,
        rows = rows.len(),
        "spreadsheet received"
    );

    let report = state
        .uploader
        .upload(scope.user_id, marketplace, data_type, &rows)
        .await?;

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded {}", data_type.as_str()),
        details: report,
    }))
}

/// POST /api/upload/amazon
pub async fn upload_amazon(
    State(state): State<MarketState>,
    scope: AuthScope,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, MarketError> {
    upload_for(state, scope, Marketplace::AmazonAe, multipart).await
}

/// POST /api/upload/noon
pub async fn upload_noon(
    State(state): State<MarketState>,
    scope: AuthScope,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, MarketError> {
    upload_for(state, scope, Marketplace::NoonAe, multipart).await
}

/// POST /api/upload/clear-db -> wipes the caller's data on the token's marketplace.
pub async fn clear_db(
    State(state): State<MarketState>,
    scope: AuthScope,
) -> Result<Json<ClearResponse>, MarketError> {
    let deleted = state
        .storage
        .clear_marketplace(scope.user_id, scope.marketplace)
        .await?;
    info!(
        user_id = scope.user_id,
        marketplace = %scope.marketplace,
        products = deleted.products,
        orders = deleted.orders,
        order_items = deleted.order_items,
        inventory = deleted.inventory,
        "marketplace data cleared"
    );

    Ok(Json(ClearResponse {
        message: format!("Cleared {} data", scope.marketplace),
        deleted,
    }))
}
