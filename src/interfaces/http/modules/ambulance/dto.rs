//! Ambulance quote DTOs

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::pricing::{
    AmbulanceBreakdown, AmbulanceRates, AmbulanceRequest, CoverageClass, Equipment, ServiceLevel,
    StaffRequest, StaffType, TimeOfDay, VehicleType, Zone,
};

/// Ambulance dispatch to be priced
///
/// Enumerated fields are plain strings; values the server does not
/// recognise are priced through the table defaults and reported in
/// `rates.fallbacks`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceQuoteRequest {
    /// Kilometres travelled
    #[schema(value_type = Option<f64>, example = 10)]
    pub distance: Option<Decimal>,
    #[schema(example = "BASIC_LIFE_SUPPORT")]
    #[validate(length(max = 64))]
    pub vehicle_type: Option<String>,
    #[schema(example = "STANDARD")]
    #[validate(length(max = 64))]
    pub service_level: Option<String>,
    /// `NORMAL`, `NIGHT`, `WEEKEND` or `HOLIDAY`; derived from `requestedAt`
    /// when absent
    #[validate(length(max = 64))]
    pub time_of_day: Option<String>,
    /// RFC 3339 dispatch time, read in its own UTC offset
    pub requested_at: Option<DateTime<FixedOffset>>,
    /// Minutes
    #[schema(value_type = Option<f64>)]
    pub waiting_time: Option<Decimal>,
    #[schema(example = "URBAN")]
    #[validate(length(max = 64))]
    pub zone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub equipment: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 64), nested)]
    pub medical_staff: Vec<MedicalStaffDto>,
    #[validate(nested)]
    pub insurance_info: Option<InsuranceInfoDto>,
    #[schema(value_type = Option<f64>)]
    pub discount_percent: Option<Decimal>,
    pub is_intra_jurisdiction: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct MedicalStaffDto {
    #[serde(rename = "type")]
    #[schema(example = "PARAMEDIC")]
    #[validate(length(max = 64))]
    pub staff_type: String,
    /// Defaults to 1
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInfoDto {
    #[schema(example = "STANDARD")]
    #[validate(length(max = 64))]
    pub coverage_type: Option<String>,
}

impl AmbulanceQuoteRequest {
    pub fn to_domain(&self) -> AmbulanceRequest {
        AmbulanceRequest {
            distance: self.distance,
            vehicle_type: self.vehicle_type.as_deref().map(VehicleType::parse),
            service_level: self.service_level.as_deref().map(ServiceLevel::parse),
            time_of_day: self.time_of_day.as_deref().map(TimeOfDay::parse),
            requested_at: self.requested_at,
            waiting_time: self.waiting_time,
            zone: self.zone.as_deref().map(Zone::parse),
            equipment: self.equipment.iter().map(|e| Equipment::parse(e)).collect(),
            medical_staff: self
                .medical_staff
                .iter()
                .map(|s| StaffRequest {
                    staff_type: StaffType::parse(&s.staff_type),
                    count: s.count,
                })
                .collect(),
            coverage: self
                .insurance_info
                .as_ref()
                .and_then(|i| i.coverage_type.as_deref())
                .map(CoverageClass::parse),
            discount_percent: self.discount_percent,
            intra_jurisdiction: self.is_intra_jurisdiction,
        }
    }
}

/// Every intermediate amount of an ambulance quote
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceBreakdownDto {
    /// Base rate after the time-of-day factor
    #[schema(value_type = f64)]
    pub base_rate: Decimal,
    #[schema(value_type = f64)]
    pub distance_charge: Decimal,
    #[schema(value_type = f64)]
    pub waiting_charge: Decimal,
    #[schema(value_type = f64)]
    pub equipment_charge: Decimal,
    #[schema(value_type = f64)]
    pub staff_charge: Decimal,
    #[schema(value_type = f64)]
    pub surcharge_total: Decimal,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[schema(value_type = f64)]
    pub discount_amount: Decimal,
    #[schema(value_type = f64)]
    pub taxable_amount: Decimal,
    #[schema(value_type = f64)]
    pub insurance_coverage: Decimal,
    #[schema(value_type = f64)]
    pub patient_responsibility: Decimal,
    #[schema(value_type = f64)]
    pub cgst: Decimal,
    #[schema(value_type = f64)]
    pub sgst: Decimal,
    #[schema(value_type = f64)]
    pub igst: Decimal,
    #[schema(value_type = f64)]
    pub tax: Decimal,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    /// Patient responsibility plus all tax
    #[schema(value_type = f64)]
    pub amount_due: Decimal,
}

/// Rates the engine actually used
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceRatesDto {
    pub tables_version: String,
    pub vehicle_type: String,
    pub service_level: String,
    pub zone: String,
    pub time_of_day: String,
    #[schema(value_type = f64)]
    pub base_rate: Decimal,
    #[schema(value_type = f64)]
    pub time_of_day_factor: Decimal,
    #[schema(value_type = f64)]
    pub distance_rate: Decimal,
    #[schema(value_type = f64)]
    pub waiting_rate_per_minute: Decimal,
    #[schema(value_type = f64)]
    pub discount_percent: Decimal,
    pub tax_class: String,
    #[schema(value_type = f64)]
    pub tax_rate_percent: Decimal,
    /// `INTRA` or `INTER`
    pub jurisdiction: String,
    #[schema(value_type = Option<f64>)]
    pub coverage_fraction: Option<Decimal>,
    /// Lookups that resolved through a table default
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceQuoteResponse {
    pub breakdown: AmbulanceBreakdownDto,
    pub rates: AmbulanceRatesDto,
    pub quoted_at: DateTime<Utc>,
}

impl From<&AmbulanceBreakdown> for AmbulanceBreakdownDto {
    fn from(b: &AmbulanceBreakdown) -> Self {
        let s = &b.settlement;
        Self {
            base_rate: b.base_rate,
            distance_charge: b.distance_charge,
            waiting_charge: b.waiting_charge,
            equipment_charge: b.equipment_charge,
            staff_charge: b.staff_charge,
            surcharge_total: b.surcharge_total,
            subtotal: s.subtotal,
            discount_amount: s.discount_amount,
            taxable_amount: s.taxable_amount,
            insurance_coverage: s.covered(),
            patient_responsibility: s.payer_responsibility(),
            cgst: s.tax.cgst,
            sgst: s.tax.sgst,
            igst: s.tax.igst,
            tax: s.tax_total,
            total_amount: s.total,
            amount_due: s.amount_due,
        }
    }
}

impl From<&AmbulanceRates> for AmbulanceRatesDto {
    fn from(r: &AmbulanceRates) -> Self {
        Self {
            tables_version: r.tables_version.clone(),
            vehicle_type: r.vehicle_type.to_string(),
            service_level: r.service_level.to_string(),
            zone: r.zone.to_string(),
            time_of_day: r.time_of_day.to_string(),
            base_rate: r.base_rate,
            time_of_day_factor: r.time_of_day_factor,
            distance_rate: r.distance_rate,
            waiting_rate_per_minute: r.waiting_rate_per_minute,
            discount_percent: r.discount_percent,
            tax_class: r.tax_class.to_string(),
            tax_rate_percent: r.tax_rate_percent,
            jurisdiction: r.jurisdiction.to_string(),
            coverage_fraction: r.coverage_fraction,
            fallbacks: r.fallbacks.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl AmbulanceQuoteResponse {
    pub fn new(breakdown: &AmbulanceBreakdown, quoted_at: DateTime<Utc>) -> Self {
        Self {
            breakdown: breakdown.into(),
            rates: (&breakdown.rates).into(),
            quoted_at,
        }
    }
}
