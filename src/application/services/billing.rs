//! Billing service: prices requests against the active tables

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::pricing::{
    AmbulanceBreakdown, AmbulanceRequest, Breakdown, Fallback, InvoiceBreakdown,
    InvoiceLineBreakdown, InvoiceLineRequest, PricingEngine, PricingError, PricingRequest,
    PricingResult, PricingTables,
};
use crate::infrastructure::tables::{TableStore, TablesFileError};

/// Service for pricing operations.
///
/// Each call takes one snapshot of the tables, so a concurrent reload never
/// mixes two table versions inside a single quote.
pub struct BillingService {
    store: Arc<TableStore>,
}

impl BillingService {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    pub fn tables(&self) -> Arc<PricingTables> {
        self.store.current()
    }

    fn engine(&self) -> PricingEngine {
        PricingEngine::new(self.store.current())
    }

    pub fn quote_ambulance(&self, request: &AmbulanceRequest) -> PricingResult<AmbulanceBreakdown> {
        let result = self.engine().quote_ambulance(request);
        match &result {
            Ok(breakdown) => {
                record_fallbacks("ambulance", &breakdown.rates.fallbacks);
                info!(
                    vehicle_type = %breakdown.rates.vehicle_type,
                    service_level = %breakdown.rates.service_level,
                    total = %breakdown.settlement.total,
                    tables_version = %breakdown.rates.tables_version,
                    "Ambulance quote computed"
                );
                record_quote("ambulance");
            }
            Err(e) => record_failure("ambulance", e),
        }
        result
    }

    pub fn quote_invoice_line(
        &self,
        request: &InvoiceLineRequest,
    ) -> PricingResult<InvoiceLineBreakdown> {
        let result = self.engine().quote_invoice_line(request);
        match &result {
            Ok(line) => {
                record_fallbacks("invoice_line", &line.rates.fallbacks);
                info!(
                    tax_class = %line.rates.tax_class,
                    total = %line.settlement.total,
                    "Invoice line quote computed"
                );
                record_quote("invoice_line");
            }
            Err(e) => record_failure("invoice_line", e),
        }
        result
    }

    pub fn quote_invoice(&self, lines: &[InvoiceLineRequest]) -> PricingResult<InvoiceBreakdown> {
        let result = self.engine().quote_invoice(lines);
        match &result {
            Ok(invoice) => {
                for line in &invoice.lines {
                    record_fallbacks("invoice", &line.rates.fallbacks);
                }
                info!(
                    lines = invoice.lines.len(),
                    total = %invoice.totals.total,
                    "Invoice quote computed"
                );
                record_quote("invoice");
            }
            Err(e) => record_failure("invoice", e),
        }
        result
    }

    pub fn compute_breakdown(&self, request: &PricingRequest) -> PricingResult<Breakdown> {
        match request {
            PricingRequest::Ambulance(req) => self.quote_ambulance(req).map(Breakdown::Ambulance),
            PricingRequest::InvoiceLine(req) => {
                self.quote_invoice_line(req).map(Breakdown::InvoiceLine)
            }
        }
    }

    /// Re-read the configured tables file. The active tables are unchanged
    /// on failure.
    pub fn reload_tables(&self) -> Result<Arc<PricingTables>, TablesFileError> {
        match self.store.reload() {
            Ok(tables) => {
                info!(version = %tables.version, "Pricing tables reloaded");
                metrics::counter!("pricing_table_reloads_total", "outcome" => "ok").increment(1);
                Ok(tables)
            }
            Err(e) => {
                warn!("Pricing tables reload failed, keeping current tables: {}", e);
                metrics::counter!("pricing_table_reloads_total", "outcome" => "error")
                    .increment(1);
                Err(e)
            }
        }
    }
}

fn record_quote(kind: &'static str) {
    metrics::counter!("pricing_quotes_total", "kind" => kind).increment(1);
}

fn record_failure(kind: &'static str, error: &PricingError) {
    warn!(kind, field = error.field().unwrap_or("-"), "Pricing request rejected: {}", error);
    metrics::counter!("pricing_validation_failures_total", "kind" => kind).increment(1);
}

fn record_fallbacks(kind: &'static str, fallbacks: &[Fallback]) {
    for fallback in fallbacks {
        debug!(kind, lookup = %fallback, "Lookup resolved through table default");
        metrics::counter!("pricing_fallbacks_total", "lookup" => fallback.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::{ServiceLevel, TaxClass, VehicleType};
    use rust_decimal_macros::dec;

    fn service() -> BillingService {
        BillingService::new(Arc::new(TableStore::standard()))
    }

    #[test]
    fn quotes_use_current_tables() {
        let service = service();
        let req = AmbulanceRequest::new(dec!(10), VehicleType::BasicLifeSupport, ServiceLevel::Standard);
        assert_eq!(service.quote_ambulance(&req).unwrap().settlement.total, dec!(997.5));

        let mut tables = PricingTables::standard();
        tables.version = "surge".into();
        tables.distance_rates = tables
            .distance_rates
            .clone()
            .with_rate(VehicleType::BasicLifeSupport, crate::domain::pricing::Zone::Urban, dec!(40));
        service.store.replace(tables);

        let quote = service.quote_ambulance(&req).unwrap();
        assert_eq!(quote.rates.tables_version, "surge");
        assert_eq!(quote.distance_charge, dec!(400));
    }

    #[test]
    fn compute_breakdown_matches_direct_quote() {
        let service = service();
        let line = InvoiceLineRequest {
            tax_class: Some(TaxClass::Eighteen),
            ..InvoiceLineRequest::new(dec!(2), dec!(1000))
        };
        let direct = service.quote_invoice_line(&line).unwrap();
        let via_dispatch = service
            .compute_breakdown(&PricingRequest::InvoiceLine(line))
            .unwrap();
        assert_eq!(via_dispatch, Breakdown::InvoiceLine(direct));
    }

    #[test]
    fn validation_errors_pass_through() {
        let service = service();
        let err = service
            .quote_invoice(&[InvoiceLineRequest::default()])
            .unwrap_err();
        assert_eq!(err, PricingError::MissingField("quantity").at_line(0));
    }

    #[test]
    fn reload_without_source_keeps_builtin_tables() {
        let service = service();
        let tables = service.reload_tables().unwrap();
        assert_eq!(*tables, PricingTables::standard());
    }
}
