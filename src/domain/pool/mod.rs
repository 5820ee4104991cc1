//! Pool domain - immutable pool snapshots and liquidity mathematics

mod liquidity;

pub use liquidity::{
    get_liquidity_protection_data, get_liquidity_units, get_pool_ownership, get_pool_share,
    get_slip_on_liquidity, Block, LiquidityToAdd, LossProtection, PoolShare, UnitData,
};

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::shared::errors::PoolError;
use crate::shared::types::{Asset, PoolRecord};
use crate::shared::utils::bigint_ratio;

/// Upstream status string that marks a pool as tradable
const POOL_STATUS_AVAILABLE: &str = "available";

/// An immutable snapshot of one liquidity pool.
///
/// Both price ratios are computed once at construction. A pool object is
/// never patched in place; the owning cache replaces it wholesale on refresh.
#[derive(Debug, Clone)]
pub struct LiquidityPool {
    asset: Asset,
    record: PoolRecord,
    asset_depth: BigInt,
    rune_depth: BigInt,
    liquidity_units: BigInt,
    available: bool,
    rune_per_asset: BigDecimal,
    asset_per_rune: BigDecimal,
}

impl LiquidityPool {
    /// Build a snapshot from a raw upstream pool record
    pub fn new(record: PoolRecord) -> Result<Self, PoolError> {
        let asset = Asset::from_str(&record.asset).map_err(|e| PoolError::InvalidPoolData {
            asset: record.asset.clone(),
            reason: e.to_string(),
        })?;
        let asset_depth = parse_depth(&record.asset, &record.asset_depth)?;
        let rune_depth = parse_depth(&record.asset, &record.rune_depth)?;
        let liquidity_units = parse_depth(&record.asset, &record.units)?;
        if asset_depth.is_zero() || rune_depth.is_zero() {
            return Err(PoolError::ZeroDepth(record.asset.clone()));
        }
        let rune_per_asset = bigint_ratio(&rune_depth, &asset_depth);
        let asset_per_rune = bigint_ratio(&asset_depth, &rune_depth);
        let available = record.status.eq_ignore_ascii_case(POOL_STATUS_AVAILABLE);
        Ok(Self {
            asset,
            record,
            asset_depth,
            rune_depth,
            liquidity_units,
            available,
            rune_per_asset,
            asset_per_rune,
        })
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// The raw record the snapshot was built from
    pub fn record(&self) -> &PoolRecord {
        &self.record
    }

    pub fn asset_depth(&self) -> &BigInt {
        &self.asset_depth
    }

    pub fn rune_depth(&self) -> &BigInt {
        &self.rune_depth
    }

    /// Total liquidity units issued for this pool
    pub fn liquidity_units(&self) -> &BigInt {
        &self.liquidity_units
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// RUNE per one asset, i.e. runeDepth / assetDepth
    pub fn rune_per_asset(&self) -> &BigDecimal {
        &self.rune_per_asset
    }

    /// Asset per one RUNE, i.e. assetDepth / runeDepth
    pub fn asset_per_rune(&self) -> &BigDecimal {
        &self.asset_per_rune
    }

    /// Decimal count of the pool asset on its native chain, if the indexer
    /// reports a usable one
    pub fn native_decimals(&self) -> Option<u8> {
        let raw = self.record.native_decimal.as_deref()?;
        match raw.parse::<i32>() {
            Ok(d) if d > 0 => Some(d as u8),
            _ => None,
        }
    }
}

fn parse_depth(asset: &str, raw: &str) -> Result<BigInt, PoolError> {
    BigInt::from_str(raw).map_err(|e| PoolError::InvalidPoolData {
        asset: asset.to_string(),
        reason: format!("bad integer '{raw}': {e}"),
    })
}
