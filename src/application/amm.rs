//! High-level facade tying the cache, liquidity math and finality polling
//! together

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::application::cache::ThorchainCache;
use crate::application::checktx::CheckTx;
use crate::domain::amount::CryptoAmount;
use crate::domain::pool::{
    get_liquidity_units, get_pool_share, get_slip_on_liquidity, LiquidityPool, LiquidityToAdd,
    PoolShare, UnitData,
};
use crate::domain::tracker::TxStatus;
use crate::infrastructure::PoolDataSource;
use crate::shared::errors::QueryError;
use crate::shared::types::{Asset, Chain};

/// Priced swap, as produced by a quoting collaborator
#[derive(Debug, Clone)]
pub struct SwapEstimate {
    pub output: CryptoAmount,
    pub swap_fee: CryptoAmount,
    pub slip: BigDecimal,
}

/// Pricing collaborator for single trades. The facade only depends on this
/// call shape; implementations bring their own fee and slip arithmetic.
#[async_trait]
pub trait SwapEstimator: Send + Sync {
    async fn estimate_swap(
        &self,
        input: &CryptoAmount,
        destination: &Asset,
    ) -> Result<SwapEstimate, QueryError>;
}

/// Projected result of a symmetric or asymmetric liquidity deposit
#[derive(Debug, Clone)]
pub struct AddLiquidityEstimate {
    pub liquidity_units: BigInt,
    pub slip: BigDecimal,
    pub pool_share: PoolShare,
}

/// One object per process wiring the read cache and the finality poller
pub struct ThorchainAmm<S> {
    cache: ThorchainCache<S>,
    check_tx: CheckTx,
}

impl<S: PoolDataSource> ThorchainAmm<S> {
    pub fn new(cache: ThorchainCache<S>, check_tx: CheckTx) -> Self {
        Self { cache, check_tx }
    }

    pub fn cache(&self) -> &ThorchainCache<S> {
        &self.cache
    }

    pub async fn get_pool_for_asset(&self, asset: &Asset) -> Result<LiquidityPool, QueryError> {
        self.cache.get_pool_for_asset(asset).await
    }

    pub async fn convert(
        &self,
        amount: &CryptoAmount,
        out_asset: &Asset,
    ) -> Result<CryptoAmount, QueryError> {
        self.cache.convert(amount, out_asset).await
    }

    /// Units, slip and redeemable share for a prospective deposit, computed
    /// against the current pool snapshot
    pub async fn estimate_add_liquidity(
        &self,
        to_add: &LiquidityToAdd,
    ) -> Result<AddLiquidityEstimate, QueryError> {
        let pool = self.cache.get_pool_for_asset(to_add.asset.asset()).await?;
        let liquidity_units = get_liquidity_units(to_add, &pool)?;
        let slip = get_slip_on_liquidity(to_add, &pool)?;
        let unit_data = UnitData {
            liquidity_units: liquidity_units.clone(),
            total_units: pool.liquidity_units() + &liquidity_units,
        };
        let pool_share = get_pool_share(&unit_data, &pool)?;
        Ok(AddLiquidityEstimate { liquidity_units, slip, pool_share })
    }

    /// Redeemable pool share for an existing position
    pub async fn estimate_withdraw(
        &self,
        asset: &Asset,
        unit_data: &UnitData,
    ) -> Result<PoolShare, QueryError> {
        let pool = self.cache.get_pool_for_asset(asset).await?;
        Ok(get_pool_share(unit_data, &pool)?)
    }

    pub async fn tx_status(
        &self,
        hash: &str,
        source_chain: Option<Chain>,
    ) -> Result<TxStatus, QueryError> {
        self.check_tx.tx_status(hash, source_chain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use crate::infrastructure::thornode::Thornode;
    use crate::infrastructure::NetworkValues;
    use crate::shared::errors::UpstreamError;
    use crate::shared::types::{InboundAddressRecord, InboundDetail, PoolRecord, RUNE_DECIMALS};

    struct StaticPools(Vec<PoolRecord>);

    #[async_trait]
    impl PoolDataSource for StaticPools {
        async fn get_pools(&self) -> Result<Vec<PoolRecord>, UpstreamError> {
            Ok(self.0.clone())
        }

        async fn get_inbound_addresses(
            &self,
        ) -> Result<Vec<InboundAddressRecord>, UpstreamError> {
            Ok(vec![])
        }

        async fn get_inbound_details(&self) -> Result<Vec<InboundDetail>, UpstreamError> {
            Ok(vec![])
        }

        async fn get_network_values(&self) -> Result<NetworkValues, UpstreamError> {
            Ok(NetworkValues::new())
        }
    }

    fn amm() -> ThorchainAmm<StaticPools> {
        let source = StaticPools(vec![PoolRecord {
            asset: "BTC.BTC".to_string(),
            asset_depth: "100000000".to_string(),
            rune_depth: "400000000".to_string(),
            status: "available".to_string(),
            units: "250000000".to_string(),
            native_decimal: None,
            asset_price: None,
        }]);
        let check_tx = CheckTx::new(Thornode::with_base_urls(vec![]));
        ThorchainAmm::new(ThorchainCache::new(source), check_tx)
    }

    #[tokio::test]
    async fn test_estimate_add_liquidity() {
        let amm = amm();
        let btc = Asset::from_str("BTC.BTC").unwrap();
        let to_add = LiquidityToAdd {
            asset: CryptoAmount::new(BigInt::from(25_000_000), RUNE_DECIMALS, btc),
            rune: CryptoAmount::new(BigInt::from(100_000_000), RUNE_DECIMALS, Asset::rune()),
        };

        let estimate = amm.estimate_add_liquidity(&to_add).await.unwrap();
        assert_eq!(estimate.liquidity_units, BigInt::from(62_500_000));
        // deposit matches the pool ratio exactly
        assert_eq!(estimate.slip, BigDecimal::from(0));
        assert_eq!(
            estimate.pool_share.rune_share.amount(),
            &(to_add.rune.amount() * BigInt::from(4) / BigInt::from(5))
        );
    }

    #[tokio::test]
    async fn test_withdraw_share_is_proportional() {
        let amm = amm();
        let btc = Asset::from_str("BTC.BTC").unwrap();
        let unit_data = UnitData {
            liquidity_units: BigInt::from(25_000_000),
            total_units: BigInt::from(250_000_000),
        };

        let share = amm.estimate_withdraw(&btc, &unit_data).await.unwrap();
        assert_eq!(share.asset_share.amount(), &BigInt::from(10_000_000));
        assert_eq!(share.rune_share.amount(), &BigInt::from(40_000_000));
    }
}
