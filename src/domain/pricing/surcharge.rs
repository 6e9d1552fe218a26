//! Additive surcharges for add-ons and waiting time

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::PricingResult;
use super::money::{checked_add, checked_mul, money_mul, round_money};
use super::rate_table::Lookup;

/// Per-unit prices for one add-on family. Unknown kinds cost nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPriceTable<K> {
    prices: BTreeMap<K, Decimal>,
}

impl<K: Ord + Copy> UnitPriceTable<K> {
    pub fn new() -> Self {
        Self {
            prices: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, kind: K, price: Decimal) -> Self {
        self.insert(kind, price);
        self
    }

    pub(crate) fn insert(&mut self, kind: K, price: Decimal) {
        self.prices.insert(kind, price);
    }

    pub fn resolve(&self, kind: K) -> Lookup {
        match self.prices.get(&kind) {
            Some(price) => Lookup::hit(*price),
            None => Lookup::fallback(Decimal::ZERO),
        }
    }

    pub fn price(&self, kind: K) -> Decimal {
        self.resolve(kind).value
    }

    pub fn entries(&self) -> impl Iterator<Item = (K, Decimal)> + '_ {
        self.prices.iter().map(|(kind, price)| (*kind, *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl<K: Ord + Copy> Default for UnitPriceTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// A billable add-on and how many of it were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOn<K> {
    pub kind: K,
    pub count: u32,
}

impl<K> AddOn<K> {
    pub fn single(kind: K) -> Self {
        Self { kind, count: 1 }
    }

    pub fn new(kind: K, count: u32) -> Self {
        Self { kind, count }
    }
}

pub struct SurchargeCalculator;

impl SurchargeCalculator {
    /// Sum of `unit price × count` over all add-ons, rounded once.
    ///
    /// The sum is exact before rounding, so the result does not depend on
    /// the order of `add_ons`.
    pub fn sum<K: Ord + Copy>(
        add_ons: &[AddOn<K>],
        prices: &UnitPriceTable<K>,
    ) -> PricingResult<Decimal> {
        let total = add_ons.iter().try_fold(Decimal::ZERO, |acc, add_on| {
            let line = checked_mul(
                prices.price(add_on.kind),
                Decimal::from(add_on.count),
                "surcharge",
            )?;
            checked_add(acc, line, "surcharge")
        })?;
        Ok(round_money(total))
    }

    /// Waiting-time charge, independent of any add-on kind.
    pub fn waiting(minutes: Decimal, per_minute_rate: Decimal) -> PricingResult<Decimal> {
        money_mul(minutes, per_minute_rate, "waitingCharge")
    }
}
