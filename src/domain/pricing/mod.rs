//! Pricing domain
//!
//! One engine serves both ambulance dispatch quotes and invoice lines. All
//! money is `Decimal`; every leaf amount is rounded half-up to two places
//! exactly once and aggregates are exact sums of rounded leaves.

pub mod adjustment;
pub mod breakdown;
pub mod catalog;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod money;
pub mod rate_table;
pub mod request;
pub mod surcharge;
pub mod tables;
pub mod tax;

pub use adjustment::{classify_time_of_day, AdjustmentResolver};
pub use breakdown::{
    AmbulanceBreakdown, AmbulanceRates, Breakdown, Fallback, InvoiceBreakdown,
    InvoiceLineBreakdown, InvoiceLineRates, InvoiceTotals, Settlement,
};
pub use catalog::{
    CatalogKey, CoverageClass, Equipment, ServiceLevel, StaffType, TaxClass, TimeOfDay,
    VehicleType, Zone,
};
pub use coverage::{CoverageResolution, CoverageResolver};
pub use engine::PricingEngine;
pub use error::{PricingError, PricingResult};
pub use rate_table::{Lookup, RateTable};
pub use request::{AmbulanceRequest, InvoiceLineRequest, PricingRequest, StaffRequest};
pub use surcharge::{AddOn, SurchargeCalculator, UnitPriceTable};
pub use tables::{AmbulanceTax, PricingTables, TablesError, STANDARD_TABLES_VERSION};
pub use tax::{JurisdictionMode, TaxComponents, TaxEngine};
