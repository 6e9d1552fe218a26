//! Time-of-day base-rate multiplier

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use rust_decimal::Decimal;

use super::catalog::TimeOfDay;
use super::rate_table::Lookup;

/// First hour (inclusive) of the night window
pub const NIGHT_STARTS_AT: u32 = 22;
/// First hour after the night window
pub const NIGHT_ENDS_AT: u32 = 6;

/// Maps a time-of-day class to a multiplier ≥ 1.
///
/// Only the base rate is multiplied. Zone pricing lives in the distance
/// rate table and must not be folded in here.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentResolver {
    factors: BTreeMap<TimeOfDay, Decimal>,
}

impl AdjustmentResolver {
    pub fn new() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn with_factor(mut self, class: TimeOfDay, factor: Decimal) -> Self {
        self.insert(class, factor);
        self
    }

    pub(crate) fn insert(&mut self, class: TimeOfDay, factor: Decimal) {
        self.factors.insert(class, factor);
    }

    pub fn resolve(&self, class: TimeOfDay) -> Lookup {
        match self.factors.get(&class) {
            Some(factor) => Lookup::hit(*factor),
            None => Lookup::fallback(Decimal::ONE),
        }
    }

    pub fn factor(&self, class: TimeOfDay) -> Decimal {
        self.resolve(class).value
    }

    pub fn entries(&self) -> impl Iterator<Item = (TimeOfDay, Decimal)> + '_ {
        self.factors.iter().map(|(class, factor)| (*class, *factor))
    }
}

impl Default for AdjustmentResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a caller-supplied timestamp using its own wall-clock offset.
///
/// Night wins over weekend. Holidays are never derived; callers must send
/// `HOLIDAY` explicitly.
pub fn classify_time_of_day(at: &DateTime<FixedOffset>) -> TimeOfDay {
    let hour = at.hour();
    if hour >= NIGHT_STARTS_AT || hour < NIGHT_ENDS_AT {
        return TimeOfDay::Night;
    }
    match at.weekday() {
        Weekday::Sat | Weekday::Sun => TimeOfDay::Weekend,
        _ => TimeOfDay::Normal,
    }
}
