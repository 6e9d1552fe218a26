//! Invoice GST handlers

use axum::{extract::State, Json};
use chrono::Utc;

use super::dto::{InvoiceLineDto, InvoiceLineResponse, InvoiceQuoteRequest, InvoiceQuoteResponse};
use crate::interfaces::http::common::{pricing_error, ApiError, ApiResponse, PricingState, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/v1/invoices/lines/quote",
    tag = "Invoices",
    request_body = InvoiceLineDto,
    responses(
        (status = 200, description = "Priced line", body = ApiResponse<InvoiceLineResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Missing or invalid input")
    )
)]
pub async fn quote_invoice_line(
    State(state): State<PricingState>,
    ValidatedJson(req): ValidatedJson<InvoiceLineDto>,
) -> Result<Json<ApiResponse<InvoiceLineResponse>>, ApiError> {
    let line = state
        .billing
        .quote_invoice_line(&req.to_domain())
        .map_err(pricing_error)?;
    Ok(Json(ApiResponse::success((&line).into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/quote",
    tag = "Invoices",
    request_body = InvoiceQuoteRequest,
    responses(
        (status = 200, description = "Priced invoice with totals", body = ApiResponse<InvoiceQuoteResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "A line is missing or has invalid input")
    )
)]
pub async fn quote_invoice(
    State(state): State<PricingState>,
    ValidatedJson(req): ValidatedJson<InvoiceQuoteRequest>,
) -> Result<Json<ApiResponse<InvoiceQuoteResponse>>, ApiError> {
    let lines: Vec<_> = req.lines.iter().map(InvoiceLineDto::to_domain).collect();
    let invoice = state.billing.quote_invoice(&lines).map_err(pricing_error)?;
    Ok(Json(ApiResponse::success(InvoiceQuoteResponse::new(
        &invoice,
        Utc::now(),
    ))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::BillingService;
    use crate::infrastructure::tables::TableStore;

    fn app() -> Router {
        Router::new()
            .route("/lines/quote", post(quote_invoice_line))
            .route("/quote", post(quote_invoice))
            .with_state(PricingState {
                billing: Arc::new(BillingService::new(Arc::new(TableStore::standard()))),
            })
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn intra_state_line_splits_gst() {
        let (status, body) = post_json(
            "/lines/quote",
            json!({
                "quantity": 2,
                "unitPrice": 1000,
                "discountPercent": 10,
                "gstRateType": "EIGHTEEN",
                "isIntraJurisdiction": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let line = &body["data"];
        assert_eq!(line["lineTotal"].as_f64(), Some(2000.0));
        assert_eq!(line["discountAmount"].as_f64(), Some(200.0));
        assert_eq!(line["taxableAmount"].as_f64(), Some(1800.0));
        assert_eq!(line["cgstAmount"].as_f64(), Some(162.0));
        assert_eq!(line["sgstAmount"].as_f64(), Some(162.0));
        assert_eq!(line["igstAmount"].as_f64(), Some(0.0));
        assert_eq!(line["lineGrandTotal"].as_f64(), Some(2124.0));
        assert!(line.get("lineAmount").is_none());
        assert_eq!(line["rates"]["jurisdiction"], "INTRA");
    }

    #[tokio::test]
    async fn inter_state_line_uses_igst() {
        let (_, body) = post_json(
            "/lines/quote",
            json!({
                "quantity": 2,
                "unitPrice": 1000,
                "discountPercent": 10,
                "gstRateType": "EIGHTEEN",
                "isIntraJurisdiction": false
            }),
        )
        .await;
        assert_eq!(body["data"]["igstAmount"].as_f64(), Some(324.0));
        assert_eq!(body["data"]["cgstAmount"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn line_coverage_splits_taxable_amount() {
        let (_, body) = post_json(
            "/lines/quote",
            json!({"quantity": 1, "unitPrice": 1000, "coverageType": "STANDARD"}),
        )
        .await;
        assert_eq!(body["data"]["insuranceCoverage"].as_f64(), Some(800.0));
        assert_eq!(body["data"]["patientResponsibility"].as_f64(), Some(200.0));
    }

    #[tokio::test]
    async fn missing_unit_price_is_422() {
        let (status, body) = post_json("/lines/quote", json!({"quantity": 1})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("unitPrice"));
    }

    #[tokio::test]
    async fn invoice_sums_lines() {
        let (status, body) = post_json(
            "/quote",
            json!({
                "lines": [
                    {"description": "Ward", "quantity": 2, "unitPrice": 1000, "discountPercent": 10, "gstRateType": "EIGHTEEN"},
                    {"description": "Pharmacy", "quantity": 1, "unitPrice": 500, "gstRateType": "TWELVE", "isIntraJurisdiction": false},
                    {"description": "Consultation", "quantity": 5, "unitPrice": 20}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["lines"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["lines"][1]["description"], "Pharmacy");
        let totals = &data["totals"];
        assert_eq!(totals["taxableAmount"].as_f64(), Some(2400.0));
        assert_eq!(totals["cgstAmount"].as_f64(), Some(162.0));
        assert_eq!(totals["igstAmount"].as_f64(), Some(60.0));
        assert_eq!(totals["taxAmount"].as_f64(), Some(384.0));
        assert_eq!(totals["lineTotal"].as_f64(), Some(2600.0));
        assert_eq!(totals["lineGrandTotal"].as_f64(), Some(2784.0));
    }

    #[tokio::test]
    async fn invalid_line_is_reported_with_index() {
        let (status, body) = post_json(
            "/quote",
            json!({"lines": [{"quantity": 1, "unitPrice": 10}, {"quantity": -1, "unitPrice": 10}]}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("Line 1:"));
    }

    #[tokio::test]
    async fn empty_invoice_is_422() {
        let (status, _) = post_json("/quote", json!({"lines": []})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
