//! Pricing tables DTOs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pricing::PricingTables;
use crate::infrastructure::tables::{RateSection, TablesFile};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateTableDto {
    #[schema(value_type = f64)]
    pub default_rate: Decimal,
    /// Category → tier → rate
    #[schema(value_type = Object)]
    pub rates: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl From<RateSection> for RateTableDto {
    fn from(section: RateSection) -> Self {
        Self {
            default_rate: section.default_rate,
            rates: section.rates,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceTaxDto {
    pub class: String,
    pub intra_jurisdiction: bool,
}

/// The active table set
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingTablesResponse {
    pub version: String,
    pub base_rates: RateTableDto,
    pub distance_rates: RateTableDto,
    #[schema(value_type = Object)]
    pub time_of_day_factors: BTreeMap<String, Decimal>,
    #[schema(value_type = f64)]
    pub waiting_rate_per_minute: Decimal,
    #[schema(value_type = Object)]
    pub equipment_prices: BTreeMap<String, Decimal>,
    #[schema(value_type = Object)]
    pub staff_prices: BTreeMap<String, Decimal>,
    #[schema(value_type = Object)]
    pub coverage_fractions: BTreeMap<String, Decimal>,
    pub ambulance_tax: AmbulanceTaxDto,
}

impl From<&PricingTables> for PricingTablesResponse {
    fn from(tables: &PricingTables) -> Self {
        let file = TablesFile::from(tables);
        Self {
            version: file.version,
            base_rates: file.base_rates.into(),
            distance_rates: file.distance_rates.into(),
            time_of_day_factors: file.time_of_day_factors,
            waiting_rate_per_minute: file.waiting_rate_per_minute,
            equipment_prices: file.equipment_prices,
            staff_prices: file.staff_prices,
            coverage_fractions: file.coverage_fractions,
            ambulance_tax: AmbulanceTaxDto {
                class: file.ambulance_tax.class,
                intra_jurisdiction: file.ambulance_tax.intra_jurisdiction,
            },
        }
    }
}
