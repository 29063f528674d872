use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tokio::task::JoinError;
use tracing::error;

use crate::types::marketplace::Marketplace;

#[derive(Debug, ThisError)]
pub enum MarketError {
    #[error("Authentication credentials were not provided")]
    MissingToken,

    #[error("Invalid token header: {0}")]
    InvalidAuthHeader(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid client credentials")]
    InvalidCredentials,

    #[error("Token is scoped to {actual}, endpoint requires {expected}")]
    MarketplaceMismatch {
        expected: Marketplace,
        actual: Marketplace,
    },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Invalid pagination token")]
    InvalidNextToken,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{0}")]
    MissingParams(String),

    #[error("updates array is required")]
    MissingUpdates,

    #[error("No file provided")]
    MissingFile,

    #[error("Invalid data type: {0}")]
    InvalidDataType(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Worker task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl MarketError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        MarketError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MarketError::MissingToken
            | MarketError::InvalidAuthHeader(_)
            | MarketError::InvalidToken
            | MarketError::TokenExpired
            | MarketError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            MarketError::MarketplaceMismatch { .. } => StatusCode::FORBIDDEN,
            MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
            MarketError::InvalidNextToken
            | MarketError::InvalidParameter(_)
            | MarketError::MissingParams(_)
            | MarketError::MissingUpdates
            | MarketError::MissingFile
            | MarketError::InvalidDataType(_)
            | MarketError::Spreadsheet(_) => StatusCode::BAD_REQUEST,
            MarketError::Multipart(e) => e.status(),
            MarketError::DatabaseError(_) | MarketError::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MarketError::MissingToken => "MISSING_TOKEN",
            MarketError::InvalidAuthHeader(_) | MarketError::InvalidToken => "INVALID_TOKEN",
            MarketError::TokenExpired => "TOKEN_EXPIRED",
            MarketError::InvalidCredentials => "INVALID_CREDENTIALS",
            MarketError::MarketplaceMismatch { .. } => "FORBIDDEN",
            MarketError::NotFound { code, .. } => code,
            MarketError::InvalidNextToken => "INVALID_NEXT_TOKEN",
            MarketError::InvalidParameter(_) => "INVALID_PARAMETER",
            MarketError::MissingParams(_) => "MISSING_PARAMS",
            MarketError::MissingUpdates => "MISSING_UPDATES",
            MarketError::MissingFile => "MISSING_FILE",
            MarketError::InvalidDataType(_) => "INVALID_DATA_TYPE",
            MarketError::Spreadsheet(_) => "INVALID_SPREADSHEET",
            MarketError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            MarketError::Multipart(_) => "INVALID_MULTIPART",
            MarketError::DatabaseError(_) | MarketError::TaskFailed(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };
        let body = ApiErrorBody {
            code: self.code().to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
