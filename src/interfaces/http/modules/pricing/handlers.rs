//! Pricing tables handlers

use axum::{extract::State, Json};

use super::dto::PricingTablesResponse;
use crate::interfaces::http::common::{ApiResponse, PricingState};

#[utoipa::path(
    get,
    path = "/api/v1/pricing/tables",
    tag = "Pricing",
    responses(
        (status = 200, description = "Active pricing tables", body = ApiResponse<PricingTablesResponse>)
    )
)]
pub async fn get_pricing_tables(
    State(state): State<PricingState>,
) -> Json<ApiResponse<PricingTablesResponse>> {
    let tables = state.billing.tables();
    Json(ApiResponse::success(tables.as_ref().into()))
}
