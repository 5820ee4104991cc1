//! Liquidity-provision math over pool snapshots
//!
//! Pure functions; depths come from a [`LiquidityPool`] snapshot, deltas from
//! the caller. All formulas work on base units with a single truncating
//! division at the end, so results are deterministic for a given input.

use bigdecimal::{BigDecimal, ToPrimitive};
use num_bigint::BigInt;
use num_traits::Zero;

use super::LiquidityPool;
use crate::domain::amount::CryptoAmount;
use crate::shared::errors::PoolError;
use crate::shared::types::{Asset, RUNE_DECIMALS};
use crate::shared::utils::decimal_to_base_units;

/// A deposit of both pool sides, in base units
#[derive(Debug, Clone)]
pub struct LiquidityToAdd {
    pub asset: CryptoAmount,
    pub rune: CryptoAmount,
}

/// A provider's units against the pool's total
#[derive(Debug, Clone)]
pub struct UnitData {
    pub liquidity_units: BigInt,
    pub total_units: BigInt,
}

/// Redeemable share of both pool sides
#[derive(Debug, Clone)]
pub struct PoolShare {
    pub asset_share: CryptoAmount,
    pub rune_share: CryptoAmount,
}

/// Block heights framing an impermanent-loss protection window
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub current: u64,
    pub last_added: u64,
    pub full_protection: u64,
}

/// Impermanent-loss coverage estimate
#[derive(Debug, Clone)]
pub struct LossProtection {
    /// Coverage owed, priced in RUNE. Negative when the position is ahead.
    pub protection: CryptoAmount,
    /// Fraction of the protection window elapsed. Deliberately not clamped
    /// to [0, 1]; callers decide how to treat positions past full protection.
    pub progress: f64,
}

/// Liquidity units issued for depositing `(asset, rune)` into the pool.
///
/// With depths `(A, N)` and deltas `(a, n)`, rune is added before asset:
/// `N' = N + n`, `A' = A + a`, and
/// `units = (N' + A') * (n*A' + N'*a) / (4 * N' * A')`.
pub fn get_liquidity_units(to_add: &LiquidityToAdd, pool: &LiquidityPool) -> Result<BigInt, PoolError> {
    check_depths(pool)?;
    let a = to_add.asset.amount();
    let n = to_add.rune.amount();
    let n1 = pool.rune_depth() + n;
    let a1 = pool.asset_depth() + a;
    if n1.is_zero() || a1.is_zero() {
        return Err(PoolError::ZeroDepth(pool.asset().to_string()));
    }
    let numerator = (&n1 + &a1) * (n * &a1 + &n1 * a);
    let denominator = BigInt::from(4) * &n1 * &a1;
    Ok(numerator / denominator)
}

/// Redeemable pool share for `liquidity_units` out of `total_units`.
///
/// Proportional by construction: `assetShare = A*u/T`, `runeShare = N*u/T`.
pub fn get_pool_share(unit_data: &UnitData, pool: &LiquidityPool) -> Result<PoolShare, PoolError> {
    check_depths(pool)?;
    if unit_data.total_units.is_zero() {
        return Err(PoolError::ZeroTotalUnits(pool.asset().to_string()));
    }
    let asset = pool.asset_depth() * &unit_data.liquidity_units / &unit_data.total_units;
    let rune = pool.rune_depth() * &unit_data.liquidity_units / &unit_data.total_units;
    Ok(PoolShare {
        asset_share: CryptoAmount::new(asset, RUNE_DECIMALS, pool.asset().clone()),
        rune_share: CryptoAmount::new(rune, RUNE_DECIMALS, Asset::rune()),
    })
}

/// How far the deposit's rune:asset ratio deviates from the pool's ratio:
/// `|(a*N - A*n) / (A*n + N*A)|`. Zero for a perfectly ratio-matched add.
pub fn get_slip_on_liquidity(to_add: &LiquidityToAdd, pool: &LiquidityPool) -> Result<BigDecimal, PoolError> {
    check_depths(pool)?;
    let a = to_add.asset.amount();
    let n = to_add.rune.amount();
    let big_a = pool.asset_depth();
    let big_n = pool.rune_depth();
    let numerator = BigDecimal::from(a * big_n - big_a * n);
    let denominator = BigDecimal::from(big_a * n + big_n * big_a);
    Ok((numerator / denominator).abs())
}

/// Impermanent-loss coverage for withdrawing a position deposited as
/// `to_add`, given current depths `(A, N)` and the protection window.
///
/// With `P1 = N/A` (pool ratio at withdrawal), coverage is the difference
/// between the deposit value and the current redeemable value, both priced
/// at `P1`: `(a*P1 + n) - (A*P1 + N)`. The window progress factor is
/// applied unclamped.
pub fn get_liquidity_protection_data(
    to_add: &LiquidityToAdd,
    pool: &LiquidityPool,
    block: &Block,
) -> Result<LossProtection, PoolError> {
    check_depths(pool)?;
    if block.full_protection == 0 {
        return Err(PoolError::InvalidPoolData {
            asset: pool.asset().to_string(),
            reason: "zero full-protection block window".to_string(),
        });
    }
    let a = BigDecimal::from(to_add.asset.amount().clone());
    let n = BigDecimal::from(to_add.rune.amount().clone());
    let big_a = BigDecimal::from(pool.asset_depth().clone());
    let big_n = BigDecimal::from(pool.rune_depth().clone());
    let p1 = &big_n / &big_a;

    let coverage = (&a * &p1 + &n) - (&big_a * &p1 + &big_n);
    let progress = (block.current as f64 - block.last_added as f64) / block.full_protection as f64;
    let progress_dec = BigDecimal::try_from(progress).map_err(|e| PoolError::InvalidPoolData {
        asset: pool.asset().to_string(),
        reason: format!("bad protection progress: {e}"),
    })?;
    let result = decimal_to_base_units(&(coverage * progress_dec));
    Ok(LossProtection {
        protection: CryptoAmount::new(result, RUNE_DECIMALS, Asset::rune()),
        progress,
    })
}

/// Fraction of the pool's total units a deposit would mint
pub fn get_pool_ownership(to_add: &LiquidityToAdd, pool: &LiquidityPool) -> Result<f64, PoolError> {
    if pool.liquidity_units().is_zero() {
        return Err(PoolError::ZeroTotalUnits(pool.asset().to_string()));
    }
    let units = get_liquidity_units(to_add, pool)?;
    let fraction = BigDecimal::from(units) / BigDecimal::from(pool.liquidity_units().clone());
    Ok(fraction.to_f64().unwrap_or(0.0))
}

fn check_depths(pool: &LiquidityPool) -> Result<(), PoolError> {
    if pool.asset_depth().is_zero() || pool.rune_depth().is_zero() {
        return Err(PoolError::ZeroDepth(pool.asset().to_string()));
    }
    Ok(())
}
