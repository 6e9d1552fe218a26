//! Insurance coverage resolution

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::catalog::CoverageClass;
use super::error::PricingResult;
use super::money::{checked_sub, money_mul};
use super::rate_table::Lookup;

/// Portion of an amount absorbed by the insurer and what is left for the
/// payer. `covered + payer_responsibility` always equals the input amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageResolution {
    pub class: CoverageClass,
    pub fraction: Decimal,
    pub covered: Decimal,
    pub payer_responsibility: Decimal,
    pub fallback: bool,
}

/// Coverage class → fraction in `[0, 1]`.
///
/// An unknown class gets the lowest configured fraction, never zero unless
/// zero is itself the lowest configured fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageResolver {
    fractions: BTreeMap<CoverageClass, Decimal>,
}

impl CoverageResolver {
    pub fn new() -> Self {
        Self {
            fractions: BTreeMap::new(),
        }
    }

    pub fn with_fraction(mut self, class: CoverageClass, fraction: Decimal) -> Self {
        self.insert(class, fraction);
        self
    }

    pub(crate) fn insert(&mut self, class: CoverageClass, fraction: Decimal) {
        self.fractions.insert(class, fraction);
    }

    /// Lowest configured fraction, or zero for an empty table.
    pub fn lowest_fraction(&self) -> Decimal {
        self.fractions.values().copied().min().unwrap_or(Decimal::ZERO)
    }

    pub fn fraction(&self, class: CoverageClass) -> Lookup {
        match self.fractions.get(&class) {
            Some(fraction) => Lookup::hit(*fraction),
            None => Lookup::fallback(self.lowest_fraction()),
        }
    }

    pub fn resolve(&self, amount: Decimal, class: CoverageClass) -> PricingResult<CoverageResolution> {
        let fraction = self.fraction(class);
        let covered = money_mul(amount, fraction.value, "insuranceCoverage")?;
        let payer_responsibility = checked_sub(amount, covered, "patientResponsibility")?;
        Ok(CoverageResolution {
            class,
            fraction: fraction.value,
            covered,
            payer_responsibility,
            fallback: fraction.fallback,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = (CoverageClass, Decimal)> + '_ {
        self.fractions.iter().map(|(class, fraction)| (*class, *fraction))
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

impl Default for CoverageResolver {
    fn default() -> Self {
        Self::new()
    }
}
