//! Shared HTTP types

mod validated_json;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::BillingService;
use crate::domain::pricing::PricingError;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Engine rejections are caller errors, including arithmetic overflow from
/// out-of-range inputs.
pub fn pricing_error(err: PricingError) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::error(err.to_string())),
    )
}

/// State shared by the pricing routes
#[derive(Clone)]
pub struct PricingState {
    pub billing: Arc<BillingService>,
}
