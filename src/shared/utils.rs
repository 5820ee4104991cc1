//! Utility functions and helpers

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;

/// Format a base-unit amount with its decimal point restored
pub fn format_base_amount(amount: &BigInt, decimals: u8) -> String {
    BigDecimal::new(amount.clone(), decimals as i64).to_string()
}

/// Exact ratio of two base-unit integers
pub fn bigint_ratio(numerator: &BigInt, denominator: &BigInt) -> BigDecimal {
    BigDecimal::from(numerator.clone()) / BigDecimal::from(denominator.clone())
}

/// Truncate a decimal back to base units, dropping the fractional part
pub fn decimal_to_base_units(value: &BigDecimal) -> BigInt {
    value
        .with_scale_round(0, RoundingMode::Down)
        .into_bigint_and_exponent()
        .0
}
