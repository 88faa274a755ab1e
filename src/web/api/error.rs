use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::positions::FetchError;

pub enum ApiError {
    Validation(String),
    FetchFailed(FetchError),
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        ApiError::FetchFailed(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::FetchFailed(e) => {
                log::error!("Fetching positions failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FetchFailedResponse {
                        error: "Fetching positions failed".to_string(),
                        details: e.to_string(),
                        raw: e.raw().clone(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

/// Body of a 500 from `/api/positions`; `raw` holds whatever the upstream
/// said before giving up.
#[derive(Debug, Serialize, ToSchema)]
pub struct FetchFailedResponse {
    pub error: String,
    pub details: String,
    #[schema(value_type = Object)]
    pub raw: Value,
}
