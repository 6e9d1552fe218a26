//! Tiered rate lookup

use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Result of a table lookup: the value used and whether it came from the
/// table's default rather than an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub value: Decimal,
    pub fallback: bool,
}

impl Lookup {
    pub fn hit(value: Decimal) -> Self {
        Self {
            value,
            fallback: false,
        }
    }

    pub fn fallback(value: Decimal) -> Self {
        Self {
            value,
            fallback: true,
        }
    }
}

/// Immutable `(category, tier) → rate` table.
///
/// A category missing from the table, or a tier missing under a known
/// category, resolves to the single `default_rate`. No lookup ever fails.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable<C, T> {
    entries: BTreeMap<C, BTreeMap<T, Decimal>>,
    default_rate: Decimal,
}

impl<C, T> RateTable<C, T>
where
    C: Ord + Copy,
    T: Ord + Copy,
{
    pub fn new(default_rate: Decimal) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_rate,
        }
    }

    pub fn with_rate(mut self, category: C, tier: T, rate: Decimal) -> Self {
        self.insert(category, tier, rate);
        self
    }

    pub(crate) fn insert(&mut self, category: C, tier: T, rate: Decimal) {
        self.entries.entry(category).or_default().insert(tier, rate);
    }

    pub fn resolve(&self, category: C, tier: T) -> Lookup {
        self.entries
            .get(&category)
            .and_then(|tiers| tiers.get(&tier))
            .map(|rate| Lookup::hit(*rate))
            .unwrap_or_else(|| Lookup::fallback(self.default_rate))
    }

    pub fn lookup(&self, category: C, tier: T) -> Decimal {
        self.resolve(category, tier).value
    }

    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    /// All entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (C, T, Decimal)> + '_ {
        self.entries.iter().flat_map(|(category, tiers)| {
            tiers
                .iter()
                .map(move |(tier, rate)| (*category, *tier, *rate))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::catalog::{ServiceLevel, VehicleType};
    use rust_decimal_macros::dec;

    fn table() -> RateTable<VehicleType, ServiceLevel> {
        RateTable::new(dec!(500))
            .with_rate(VehicleType::BasicLifeSupport, ServiceLevel::Standard, dec!(750))
            .with_rate(VehicleType::BasicLifeSupport, ServiceLevel::Emergency, dec!(1250))
    }

    #[test]
    fn known_key_hits_entry() {
        let lookup = table().resolve(VehicleType::BasicLifeSupport, ServiceLevel::Standard);
        assert_eq!(lookup, Lookup::hit(dec!(750)));
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        let lookup = table().resolve(VehicleType::Unknown, ServiceLevel::Standard);
        assert_eq!(lookup, Lookup::fallback(dec!(500)));
    }

    #[test]
    fn missing_category_falls_back_to_default() {
        assert_eq!(
            table().lookup(VehicleType::Neonatal, ServiceLevel::Standard),
            dec!(500)
        );
    }

    #[test]
    fn unknown_tier_under_known_category_falls_back_to_default() {
        let lookup = table().resolve(VehicleType::BasicLifeSupport, ServiceLevel::Urgent);
        assert!(lookup.fallback);
        assert_eq!(lookup.value, dec!(500));
    }

    #[test]
    fn entries_iterate_in_key_order() {
        let rates: Vec<_> = table().entries().map(|(_, _, rate)| rate).collect();
        assert_eq!(rates, vec![dec!(750), dec!(1250)]);
        assert_eq!(table().len(), 2);
    }
}
