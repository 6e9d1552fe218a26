//! Pricing requests
//!
//! Numeric inputs are `Option` so the engine can tell a missing field from
//! an explicit zero. Enumerations are already parsed; unrecognised names
//! arrive as `Unknown`.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use super::catalog::{CoverageClass, Equipment, ServiceLevel, StaffType, TaxClass, TimeOfDay, VehicleType, Zone};

#[derive(Debug, Clone, PartialEq)]
pub struct StaffRequest {
    pub staff_type: StaffType,
    /// Defaults to 1 when absent
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbulanceRequest {
    /// Kilometres. Required.
    pub distance: Option<Decimal>,
    pub vehicle_type: Option<VehicleType>,
    pub service_level: Option<ServiceLevel>,
    /// Explicit class; wins over `requested_at`
    pub time_of_day: Option<TimeOfDay>,
    /// Used to derive the time-of-day class when `time_of_day` is absent
    pub requested_at: Option<DateTime<FixedOffset>>,
    /// Minutes. Defaults to 0.
    pub waiting_time: Option<Decimal>,
    /// Defaults to `URBAN`
    pub zone: Option<Zone>,
    pub equipment: Vec<Equipment>,
    pub medical_staff: Vec<StaffRequest>,
    pub coverage: Option<CoverageClass>,
    pub discount_percent: Option<Decimal>,
    /// Defaults to the ambulance tax setting of the active tables
    pub intra_jurisdiction: Option<bool>,
}

impl AmbulanceRequest {
    pub fn new(distance: Decimal, vehicle_type: VehicleType, service_level: ServiceLevel) -> Self {
        Self {
            distance: Some(distance),
            vehicle_type: Some(vehicle_type),
            service_level: Some(service_level),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceLineRequest {
    pub description: Option<String>,
    /// Required
    pub quantity: Option<Decimal>,
    /// Required
    pub unit_price: Option<Decimal>,
    /// Defaults to 0
    pub discount_percent: Option<Decimal>,
    /// Absent means exempt
    pub tax_class: Option<TaxClass>,
    /// Defaults to intra-state
    pub intra_jurisdiction: Option<bool>,
    pub coverage: Option<CoverageClass>,
}

impl InvoiceLineRequest {
    pub fn new(quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Default::default()
        }
    }
}

/// Either call site's request
#[derive(Debug, Clone, PartialEq)]
pub enum PricingRequest {
    Ambulance(AmbulanceRequest),
    InvoiceLine(InvoiceLineRequest),
}

impl PricingRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ambulance(_) => "ambulance",
            Self::InvoiceLine(_) => "invoice_line",
        }
    }
}
