//! The complete, versioned set of pricing tables
//!
//! A `PricingTables` value is never edited after construction. Reloading
//! builds a new value and swaps it in whole.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::adjustment::AdjustmentResolver;
use super::catalog::{
    CoverageClass, Equipment, ServiceLevel, StaffType, TaxClass, TimeOfDay, VehicleType, Zone,
};
use super::coverage::CoverageResolver;
use super::rate_table::RateTable;
use super::surcharge::UnitPriceTable;

pub const STANDARD_TABLES_VERSION: &str = "2024.1";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TablesError {
    #[error("tables version must not be empty")]
    EmptyVersion,

    #[error("{table}: unrecognised key {key}")]
    UnknownKey { table: &'static str, key: String },

    #[error("{table}: value for {key} must be non-negative, got {value}")]
    NegativeRate {
        table: &'static str,
        key: String,
        value: Decimal,
    },

    #[error("{table}: factor for {key} must be at least 1, got {value}")]
    FactorBelowOne {
        table: &'static str,
        key: String,
        value: Decimal,
    },

    #[error("{table}: fraction for {key} must be within [0, 1], got {value}")]
    FractionOutOfRange {
        table: &'static str,
        key: String,
        value: Decimal,
    },

    #[error("coverage_fractions must define at least one class")]
    EmptyCoverage,
}

/// Tax treatment applied to ambulance dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbulanceTax {
    pub class: TaxClass,
    pub intra_jurisdiction: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingTables {
    pub version: String,
    /// Vehicle type × service level → flat dispatch rate
    pub base_rates: RateTable<VehicleType, ServiceLevel>,
    /// Vehicle type × zone → rate per km
    pub distance_rates: RateTable<VehicleType, Zone>,
    pub time_of_day: AdjustmentResolver,
    pub waiting_rate_per_minute: Decimal,
    pub equipment_prices: UnitPriceTable<Equipment>,
    pub staff_prices: UnitPriceTable<StaffType>,
    pub coverage: CoverageResolver,
    pub ambulance_tax: AmbulanceTax,
}

impl PricingTables {
    /// Built-in tables used when no tables file is configured.
    pub fn standard() -> Self {
        use ServiceLevel::{Emergency, Standard, Urgent};
        use VehicleType::*;
        use Zone::{Remote, Rural, Suburban, Urban};

        let base_rates = [
            (BasicLifeSupport, [dec!(750), dec!(1000), dec!(1250)]),
            (AdvancedLifeSupport, [dec!(1500), dec!(2000), dec!(2500)]),
            (CriticalCare, [dec!(2500), dec!(3200), dec!(4000)]),
            (PatientTransport, [dec!(500), dec!(600), dec!(750)]),
            (Neonatal, [dec!(3000), dec!(3600), dec!(4500)]),
        ]
        .into_iter()
        .fold(RateTable::new(dec!(500)), |table, (vehicle, [standard, urgent, emergency])| {
            table
                .with_rate(vehicle, Standard, standard)
                .with_rate(vehicle, Urgent, urgent)
                .with_rate(vehicle, Emergency, emergency)
        });

        let distance_rates = [
            (BasicLifeSupport, [dec!(20), dec!(25), dec!(30), dec!(40)]),
            (AdvancedLifeSupport, [dec!(30), dec!(35), dec!(45), dec!(55)]),
            (CriticalCare, [dec!(40), dec!(50), dec!(60), dec!(75)]),
            (PatientTransport, [dec!(15), dec!(18), dec!(22), dec!(30)]),
            (Neonatal, [dec!(45), dec!(55), dec!(65), dec!(80)]),
        ]
        .into_iter()
        .fold(RateTable::new(dec!(20)), |table, (vehicle, [urban, suburban, rural, remote])| {
            table
                .with_rate(vehicle, Urban, urban)
                .with_rate(vehicle, Suburban, suburban)
                .with_rate(vehicle, Rural, rural)
                .with_rate(vehicle, Remote, remote)
        });

        Self {
            version: STANDARD_TABLES_VERSION.to_string(),
            base_rates,
            distance_rates,
            time_of_day: AdjustmentResolver::new()
                .with_factor(TimeOfDay::Normal, dec!(1.0))
                .with_factor(TimeOfDay::Night, dec!(1.25))
                .with_factor(TimeOfDay::Weekend, dec!(1.15))
                .with_factor(TimeOfDay::Holiday, dec!(1.5)),
            waiting_rate_per_minute: dec!(5),
            equipment_prices: UnitPriceTable::new()
                .with_price(Equipment::Oxygen, dec!(200))
                .with_price(Equipment::Defibrillator, dec!(500))
                .with_price(Equipment::Ventilator, dec!(1000))
                .with_price(Equipment::CardiacMonitor, dec!(400))
                .with_price(Equipment::SuctionUnit, dec!(150))
                .with_price(Equipment::Incubator, dec!(800)),
            staff_prices: UnitPriceTable::new()
                .with_price(StaffType::Emt, dec!(300))
                .with_price(StaffType::Paramedic, dec!(500))
                .with_price(StaffType::Nurse, dec!(400))
                .with_price(StaffType::Doctor, dec!(1500))
                .with_price(StaffType::RespiratoryTherapist, dec!(700)),
            coverage: CoverageResolver::new()
                .with_fraction(CoverageClass::Basic, dec!(0.50))
                .with_fraction(CoverageClass::Standard, dec!(0.80))
                .with_fraction(CoverageClass::Premium, dec!(0.90))
                .with_fraction(CoverageClass::Comprehensive, dec!(1.00)),
            ambulance_tax: AmbulanceTax {
                class: TaxClass::Five,
                intra_jurisdiction: true,
            },
        }
    }

    /// Check numeric invariants of every table.
    pub fn validate(&self) -> Result<(), TablesError> {
        if self.version.trim().is_empty() {
            return Err(TablesError::EmptyVersion);
        }

        non_negative("base_rates", "default_rate", self.base_rates.default_rate())?;
        for (vehicle, level, rate) in self.base_rates.entries() {
            non_negative("base_rates", &format!("{vehicle}.{level}"), rate)?;
        }

        non_negative("distance_rates", "default_rate", self.distance_rates.default_rate())?;
        for (vehicle, zone, rate) in self.distance_rates.entries() {
            non_negative("distance_rates", &format!("{vehicle}.{zone}"), rate)?;
        }

        for (class, factor) in self.time_of_day.entries() {
            if factor < Decimal::ONE {
                return Err(TablesError::FactorBelowOne {
                    table: "time_of_day_factors",
                    key: class.to_string(),
                    value: factor,
                });
            }
        }

        non_negative("waiting_rate_per_minute", "rate", self.waiting_rate_per_minute)?;

        for (kind, price) in self.equipment_prices.entries() {
            non_negative("equipment_prices", kind.as_str(), price)?;
        }
        for (kind, price) in self.staff_prices.entries() {
            non_negative("staff_prices", kind.as_str(), price)?;
        }

        if self.coverage.is_empty() {
            return Err(TablesError::EmptyCoverage);
        }
        for (class, fraction) in self.coverage.entries() {
            if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(TablesError::FractionOutOfRange {
                    table: "coverage_fractions",
                    key: class.to_string(),
                    value: fraction,
                });
            }
        }

        Ok(())
    }
}

fn non_negative(table: &'static str, key: &str, value: Decimal) -> Result<(), TablesError> {
    if value < Decimal::ZERO {
        return Err(TablesError::NegativeRate {
            table,
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}
