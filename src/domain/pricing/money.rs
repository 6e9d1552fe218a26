//! Money arithmetic helpers
//!
//! Every leaf amount is rounded exactly once, to [`MONEY_SCALE`] decimal
//! places, half away from zero. Aggregates are sums and differences of
//! already-rounded leaves and are never rounded again.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::{PricingError, PricingResult};

pub const MONEY_SCALE: u32 = 2;

const HUNDRED: Decimal = dec!(100);

/// Round half up to two decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn checked_mul(left: Decimal, right: Decimal, what: &'static str) -> PricingResult<Decimal> {
    left.checked_mul(right).ok_or(PricingError::Overflow(what))
}

pub fn checked_add(left: Decimal, right: Decimal, what: &'static str) -> PricingResult<Decimal> {
    left.checked_add(right).ok_or(PricingError::Overflow(what))
}

pub fn checked_sub(left: Decimal, right: Decimal, what: &'static str) -> PricingResult<Decimal> {
    left.checked_sub(right).ok_or(PricingError::Overflow(what))
}

/// `left * right`, rounded once.
pub fn money_mul(left: Decimal, right: Decimal, what: &'static str) -> PricingResult<Decimal> {
    checked_mul(left, right, what).map(round_money)
}

/// Sum of already-rounded amounts.
pub fn money_sum<I>(amounts: I, what: &'static str) -> PricingResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| checked_add(acc, amount, what))
}

/// Convert a percentage (e.g. `18`) into a fraction (`0.18`).
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / HUNDRED
}
