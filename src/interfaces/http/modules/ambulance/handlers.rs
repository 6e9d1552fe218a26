//! Ambulance pricing handlers

use axum::{extract::State, Json};
use chrono::Utc;

use super::dto::{AmbulanceQuoteRequest, AmbulanceQuoteResponse};
use crate::interfaces::http::common::{pricing_error, ApiError, ApiResponse, PricingState, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/v1/ambulance/quote",
    tag = "Ambulance",
    request_body = AmbulanceQuoteRequest,
    responses(
        (status = 200, description = "Priced dispatch", body = ApiResponse<AmbulanceQuoteResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Missing or invalid input")
    )
)]
pub async fn quote_ambulance(
    State(state): State<PricingState>,
    ValidatedJson(req): ValidatedJson<AmbulanceQuoteRequest>,
) -> Result<Json<ApiResponse<AmbulanceQuoteResponse>>, ApiError> {
    let breakdown = state
        .billing
        .quote_ambulance(&req.to_domain())
        .map_err(pricing_error)?;
    Ok(Json(ApiResponse::success(AmbulanceQuoteResponse::new(
        &breakdown,
        Utc::now(),
    ))))
}
