//! GST split

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::catalog::TaxClass;
use super::error::PricingResult;
use super::money::{checked_add, money_mul, percent_to_fraction};

impl TaxClass {
    /// Statutory rate in percent. Unknown classes are exempt.
    pub fn rate_percent(&self) -> Decimal {
        match self {
            TaxClass::Zero => dec!(0),
            TaxClass::Five => dec!(5),
            TaxClass::Twelve => dec!(12),
            TaxClass::Eighteen => dec!(18),
            TaxClass::TwentyEight => dec!(28),
            TaxClass::Unknown => dec!(0),
        }
    }
}

/// Whether supplier and recipient are in the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JurisdictionMode {
    /// Dual split into CGST + SGST
    Intra,
    /// Single IGST
    Inter,
}

impl JurisdictionMode {
    pub fn from_intra_flag(is_intra: bool) -> Self {
        if is_intra {
            Self::Intra
        } else {
            Self::Inter
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intra => "INTRA",
            Self::Inter => "INTER",
        }
    }
}

impl std::fmt::Display for JurisdictionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxComponents {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl TaxComponents {
    pub fn total(&self) -> PricingResult<Decimal> {
        let dual = checked_add(self.cgst, self.sgst, "tax")?;
        checked_add(dual, self.igst, "tax")
    }
}

pub struct TaxEngine;

impl TaxEngine {
    /// Split `taxable` into components.
    ///
    /// Each component is computed from the unrounded rate and rounded once,
    /// so an intra-state split may differ from the inter-state tax by one
    /// paisa.
    pub fn split(
        taxable: Decimal,
        class: TaxClass,
        mode: JurisdictionMode,
    ) -> PricingResult<TaxComponents> {
        let fraction = percent_to_fraction(class.rate_percent());
        match mode {
            JurisdictionMode::Intra => {
                let half = money_mul(taxable, fraction / dec!(2), "cgst")?;
                Ok(TaxComponents {
                    cgst: half,
                    sgst: half,
                    igst: Decimal::ZERO,
                })
            }
            JurisdictionMode::Inter => Ok(TaxComponents {
                cgst: Decimal::ZERO,
                sgst: Decimal::ZERO,
                igst: money_mul(taxable, fraction, "igst")?,
            }),
        }
    }
}
