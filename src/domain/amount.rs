//! Base-unit amounts bound to an asset identity

use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::shared::errors::AmountError;
use crate::shared::types::Asset;
use crate::shared::utils::{decimal_to_base_units, format_base_amount};

/// An immutable base-unit amount paired with its asset and decimal count.
///
/// Arithmetic is only defined between amounts of the same asset and the same
/// decimal count; anything else fails fast instead of silently mixing units.
/// Every operation returns a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoAmount {
    amount: BigInt,
    decimals: u8,
    asset: Asset,
}

impl CryptoAmount {
    pub fn new(amount: BigInt, decimals: u8, asset: Asset) -> Self {
        Self { amount, decimals, asset }
    }

    pub fn amount(&self) -> &BigInt {
        &self.amount
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn plus(&self, other: &CryptoAmount) -> Result<CryptoAmount, AmountError> {
        self.check(other)?;
        Ok(self.with_amount(&self.amount + &other.amount))
    }

    pub fn minus(&self, other: &CryptoAmount) -> Result<CryptoAmount, AmountError> {
        self.check(other)?;
        Ok(self.with_amount(&self.amount - &other.amount))
    }

    pub fn times(&self, other: &CryptoAmount) -> Result<CryptoAmount, AmountError> {
        self.check(other)?;
        Ok(self.with_amount(&self.amount * &other.amount))
    }

    pub fn div(&self, other: &CryptoAmount) -> Result<CryptoAmount, AmountError> {
        self.check(other)?;
        if other.amount.is_zero() {
            return Err(AmountError::DivisionByZero);
        }
        Ok(self.with_amount(&self.amount / &other.amount))
    }

    /// Scale by a decimal factor, truncating back to base units
    pub fn times_ratio(&self, ratio: &BigDecimal) -> CryptoAmount {
        let scaled = BigDecimal::from(self.amount.clone()) * ratio;
        self.with_amount(decimal_to_base_units(&scaled))
    }

    pub fn lt(&self, other: &CryptoAmount) -> Result<bool, AmountError> {
        self.check(other)?;
        Ok(self.amount < other.amount)
    }

    pub fn lte(&self, other: &CryptoAmount) -> Result<bool, AmountError> {
        self.check(other)?;
        Ok(self.amount <= other.amount)
    }

    pub fn gt(&self, other: &CryptoAmount) -> Result<bool, AmountError> {
        self.check(other)?;
        Ok(self.amount > other.amount)
    }

    pub fn gte(&self, other: &CryptoAmount) -> Result<bool, AmountError> {
        self.check(other)?;
        Ok(self.amount >= other.amount)
    }

    pub fn eq_amount(&self, other: &CryptoAmount) -> Result<bool, AmountError> {
        self.check(other)?;
        Ok(self.amount == other.amount)
    }

    fn with_amount(&self, amount: BigInt) -> CryptoAmount {
        CryptoAmount::new(amount, self.decimals, self.asset.clone())
    }

    /// Guard against mixing assets or decimal scales
    fn check(&self, other: &CryptoAmount) -> Result<(), AmountError> {
        if self.asset != other.asset {
            return Err(AmountError::AssetMismatch(
                self.asset.to_string(),
                other.asset.to_string(),
            ));
        }
        if self.decimals != other.decimals {
            return Err(AmountError::DecimalMismatch(self.decimals, other.decimals));
        }
        Ok(())
    }
}

impl fmt::Display for CryptoAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_base_amount(&self.amount, self.decimals), self.asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::{Chain, RUNE_DECIMALS};

    fn btc(amount: i64) -> CryptoAmount {
        CryptoAmount::new(BigInt::from(amount), 8, Asset::new(Chain::Btc, "BTC", false))
    }

    #[test]
    fn test_plus_returns_new_amount() {
        let a = btc(100);
        let b = btc(50);
        let sum = a.plus(&b).unwrap();
        assert_eq!(sum.amount(), &BigInt::from(150));
        // operands untouched
        assert_eq!(a.amount(), &BigInt::from(100));
    }

    #[test]
    fn test_asset_mismatch_fails_fast() {
        let a = btc(100);
        let rune = CryptoAmount::new(BigInt::from(100), RUNE_DECIMALS, Asset::rune());
        assert!(matches!(a.plus(&rune), Err(AmountError::AssetMismatch(_, _))));
    }

    #[test]
    fn test_decimal_mismatch_fails_fast() {
        let a = btc(100);
        let b = CryptoAmount::new(BigInt::from(100), 6, Asset::new(Chain::Btc, "BTC", false));
        assert!(matches!(a.plus(&b), Err(AmountError::DecimalMismatch(8, 6))));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(btc(10).div(&btc(0)), Err(AmountError::DivisionByZero)));
    }

    #[test]
    fn test_times_ratio_truncates() {
        use std::str::FromStr;
        let rate = BigDecimal::from_str("0.333").unwrap();
        let out = btc(100).times_ratio(&rate);
        assert_eq!(out.amount(), &BigInt::from(33));
    }

    #[test]
    fn test_display() {
        assert_eq!(btc(150_000_000).to_string(), "1.50000000 BTC.BTC");
    }
}
