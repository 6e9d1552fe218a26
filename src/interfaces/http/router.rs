//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::BillingService;
use crate::interfaces::http::common::{ApiResponse, PricingState};

use super::modules::{ambulance, health, invoices, metrics, pricing, request_id};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        ambulance::quote_ambulance,
        invoices::quote_invoice_line,
        invoices::quote_invoice,
        pricing::get_pricing_tables,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            ambulance::AmbulanceQuoteRequest,
            ambulance::MedicalStaffDto,
            ambulance::InsuranceInfoDto,
            ambulance::AmbulanceBreakdownDto,
            ambulance::AmbulanceRatesDto,
            ambulance::AmbulanceQuoteResponse,
            invoices::InvoiceLineDto,
            invoices::InvoiceQuoteRequest,
            invoices::InvoiceLineRatesDto,
            invoices::InvoiceLineResponse,
            invoices::InvoiceTotalsDto,
            invoices::InvoiceQuoteResponse,
            pricing::RateTableDto,
            pricing::AmbulanceTaxDto,
            pricing::PricingTablesResponse,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Ambulance", description = "Ambulance dispatch pricing"),
        (name = "Invoices", description = "Hospital invoice GST computation"),
        (name = "Pricing", description = "Active pricing tables"),
    ),
    info(
        title = "HMS Billing API",
        version = "1.0.0",
        description = "Deterministic pricing, GST and insurance breakdowns for ambulance dispatches and hospital invoices",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(billing: Arc<BillingService>, prometheus_handle: PrometheusHandle) -> Router {
    let pricing_state = PricingState {
        billing: billing.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ambulance_routes = Router::new()
        .route("/quote", post(ambulance::quote_ambulance))
        .with_state(pricing_state.clone());

    let invoice_routes = Router::new()
        .route("/quote", post(invoices::quote_invoice))
        .route("/lines/quote", post(invoices::quote_invoice_line))
        .with_state(pricing_state.clone());

    let pricing_routes = Router::new()
        .route("/tables", get(pricing::get_pricing_tables))
        .with_state(pricing_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            billing,
            started_at: Arc::new(Instant::now()),
        });

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: prometheus_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/v1/ambulance", ambulance_routes)
        .nest("/api/v1/invoices", invoice_routes)
        .nest("/api/v1/pricing", pricing_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
