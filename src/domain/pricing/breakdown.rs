//! Pricing results
//!
//! Every intermediate amount is a named field. Identities that always hold:
//!
//! - `taxable_amount == subtotal - discount_amount`
//! - `total == taxable_amount + tax.total()`
//! - `total == covered + amount_due`

use rust_decimal::Decimal;

use super::catalog::{ServiceLevel, TaxClass, TimeOfDay, VehicleType, Zone};
use super::coverage::CoverageResolution;
use super::error::PricingResult;
use super::money::checked_add;
use super::tax::{JurisdictionMode, TaxComponents};

/// A lookup that resolved through a table default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fallback {
    BaseRate,
    DistanceRate,
    TimeOfDay,
    Equipment,
    MedicalStaff,
    TaxClass,
    Coverage,
}

impl Fallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseRate => "baseRate",
            Self::DistanceRate => "distanceRate",
            Self::TimeOfDay => "timeOfDay",
            Self::Equipment => "equipment",
            Self::MedicalStaff => "medicalStaff",
            Self::TaxClass => "taxClass",
            Self::Coverage => "coverage",
        }
    }
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount → coverage → tax → totals, shared by both call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub coverage: Option<CoverageResolution>,
    pub tax: TaxComponents,
    pub tax_total: Decimal,
    pub total: Decimal,
    /// Payer responsibility on the taxable amount plus all tax
    pub amount_due: Decimal,
}

impl Settlement {
    pub fn covered(&self) -> Decimal {
        self.coverage.map(|c| c.covered).unwrap_or(Decimal::ZERO)
    }

    /// Share of the taxable amount left to the payer.
    pub fn payer_responsibility(&self) -> Decimal {
        self.coverage
            .map(|c| c.payer_responsibility)
            .unwrap_or(self.taxable_amount)
    }
}

/// Rates actually used for an ambulance quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbulanceRates {
    pub tables_version: String,
    pub vehicle_type: VehicleType,
    pub service_level: ServiceLevel,
    pub zone: Zone,
    pub time_of_day: TimeOfDay,
    /// Looked-up base rate before the time-of-day factor
    pub base_rate: Decimal,
    pub time_of_day_factor: Decimal,
    pub distance_rate: Decimal,
    pub waiting_rate_per_minute: Decimal,
    pub discount_percent: Decimal,
    pub tax_class: TaxClass,
    pub tax_rate_percent: Decimal,
    pub jurisdiction: JurisdictionMode,
    pub coverage_fraction: Option<Decimal>,
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbulanceBreakdown {
    /// Base rate after the time-of-day factor
    pub base_rate: Decimal,
    pub distance_charge: Decimal,
    pub waiting_charge: Decimal,
    pub equipment_charge: Decimal,
    pub staff_charge: Decimal,
    pub surcharge_total: Decimal,
    pub settlement: Settlement,
    pub rates: AmbulanceRates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineRates {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_class: TaxClass,
    pub tax_rate_percent: Decimal,
    pub jurisdiction: JurisdictionMode,
    pub coverage_fraction: Option<Decimal>,
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineBreakdown {
    pub description: Option<String>,
    /// `quantity × unit_price` before discount
    pub line_amount: Decimal,
    pub settlement: Settlement,
    pub rates: InvoiceLineRates,
}

/// Column sums over all invoice lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvoiceTotals {
    pub line_amount: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub tax_total: Decimal,
    pub covered: Decimal,
    pub payer_responsibility: Decimal,
    pub total: Decimal,
    pub amount_due: Decimal,
}

impl InvoiceTotals {
    pub fn accumulate(&self, line: &InvoiceLineBreakdown) -> PricingResult<Self> {
        let s = &line.settlement;
        Ok(Self {
            line_amount: checked_add(self.line_amount, line.line_amount, "invoice total")?,
            discount_amount: checked_add(self.discount_amount, s.discount_amount, "invoice total")?,
            taxable_amount: checked_add(self.taxable_amount, s.taxable_amount, "invoice total")?,
            cgst: checked_add(self.cgst, s.tax.cgst, "invoice total")?,
            sgst: checked_add(self.sgst, s.tax.sgst, "invoice total")?,
            igst: checked_add(self.igst, s.tax.igst, "invoice total")?,
            tax_total: checked_add(self.tax_total, s.tax_total, "invoice total")?,
            covered: checked_add(self.covered, s.covered(), "invoice total")?,
            payer_responsibility: checked_add(
                self.payer_responsibility,
                s.payer_responsibility(),
                "invoice total",
            )?,
            total: checked_add(self.total, s.total, "invoice total")?,
            amount_due: checked_add(self.amount_due, s.amount_due, "invoice total")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceBreakdown {
    pub lines: Vec<InvoiceLineBreakdown>,
    pub totals: InvoiceTotals,
}

/// Either call site's result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breakdown {
    Ambulance(AmbulanceBreakdown),
    InvoiceLine(InvoiceLineBreakdown),
}

impl Breakdown {
    pub fn settlement(&self) -> &Settlement {
        match self {
            Self::Ambulance(b) => &b.settlement,
            Self::InvoiceLine(b) => &b.settlement,
        }
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        match self {
            Self::Ambulance(b) => &b.rates.fallbacks,
            Self::InvoiceLine(b) => &b.rates.fallbacks,
        }
    }
}
