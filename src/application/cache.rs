//! Layered resource cache over the upstream indexer
//!
//! Four independently expiring snapshots shield callers from upstream
//! latency and transient failures. A refresh that fails keeps serving the
//! last good snapshot; a resource that has never been populated is an error.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bigdecimal::{BigDecimal, One};
use num_bigint::BigInt;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::domain::amount::CryptoAmount;
use crate::domain::pool::LiquidityPool;
use crate::infrastructure::{NetworkValues, PoolDataSource};
use crate::shared::config::CacheCfg;
use crate::shared::errors::{CacheError, PoolError, QueryError, UpstreamError};
use crate::shared::types::{Asset, Chain, InboundAddressRecord, InboundDetail, RUNE_DECIMALS};
use crate::shared::utils::decimal_to_base_units;

const POOLS_TTL: Duration = Duration::from_secs(6);
const INBOUND_ADDRESSES_TTL: Duration = Duration::from_secs(6);
const INBOUND_DETAILS_TTL: Duration = Duration::from_secs(6);
const NETWORK_VALUES_TTL: Duration = Duration::from_secs(600);

struct Snapshot<T> {
    value: Arc<T>,
    refreshed_at: Instant,
}

/// One expiring snapshot with a single-flight refresh guard.
///
/// Concurrent callers that observe an expired snapshot serialize on the
/// guard so only the first one hits the upstream; the rest are served the
/// snapshot it installed.
pub struct ResourceCache<T> {
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot<T>>>,
    refresh_gate: Mutex<()>,
}

impl<T> ResourceCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Return the snapshot, refreshing it first if its TTL has elapsed. A
    /// failed refresh downgrades to a warning while a stale snapshot exists.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        resource: &'static str,
        refresh: F,
    ) -> Result<Arc<T>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        if let Some(value) = self.fresh_snapshot().await {
            return Ok(value);
        }
        let _gate = self.refresh_gate.lock().await;
        // another caller may have refreshed while we waited on the gate
        if let Some(value) = self.fresh_snapshot().await {
            return Ok(value);
        }
        match refresh().await {
            Ok(value) => {
                let value = Arc::new(value);
                let mut guard = self.snapshot.write().await;
                *guard = Some(Snapshot {
                    value: value.clone(),
                    refreshed_at: Instant::now(),
                });
                Ok(value)
            }
            Err(e) => {
                let guard = self.snapshot.read().await;
                match guard.as_ref() {
                    Some(snapshot) => {
                        warn!("Refresh of {} failed, serving stale snapshot: {}", resource, e);
                        Ok(snapshot.value.clone())
                    }
                    None => Err(CacheError::NeverPopulated { resource, source: e }),
                }
            }
        }
    }

    async fn fresh_snapshot(&self) -> Option<Arc<T>> {
        let guard = self.snapshot.read().await;
        guard
            .as_ref()
            .filter(|snapshot| snapshot.refreshed_at.elapsed() <= self.ttl)
            .map(|snapshot| snapshot.value.clone())
    }
}

/// Pool map keyed by asset ticker, so a layer-1 asset and its synthetic
/// counterpart resolve to the same pool
pub type PoolMap = HashMap<String, LiquidityPool>;

/// The top-level read API over upstream pool and network state
pub struct ThorchainCache<S> {
    source: S,
    pools: ResourceCache<PoolMap>,
    inbound_addresses: ResourceCache<HashMap<String, InboundAddressRecord>>,
    inbound_details: ResourceCache<HashMap<Chain, InboundDetail>>,
    network_values: ResourceCache<NetworkValues>,
}

impl<S: PoolDataSource> ThorchainCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pools: ResourceCache::new(POOLS_TTL),
            inbound_addresses: ResourceCache::new(INBOUND_ADDRESSES_TTL),
            inbound_details: ResourceCache::new(INBOUND_DETAILS_TTL),
            network_values: ResourceCache::new(NETWORK_VALUES_TTL),
        }
    }

    pub fn with_config(source: S, cfg: &CacheCfg) -> Self {
        let ttl = |secs: Option<u64>, default: Duration| {
            secs.map(Duration::from_secs).unwrap_or(default)
        };
        Self {
            source,
            pools: ResourceCache::new(ttl(cfg.pools_ttl_secs, POOLS_TTL)),
            inbound_addresses: ResourceCache::new(ttl(
                cfg.inbound_addresses_ttl_secs,
                INBOUND_ADDRESSES_TTL,
            )),
            inbound_details: ResourceCache::new(ttl(
                cfg.inbound_details_ttl_secs,
                INBOUND_DETAILS_TTL,
            )),
            network_values: ResourceCache::new(ttl(
                cfg.network_values_ttl_secs,
                NETWORK_VALUES_TTL,
            )),
        }
    }

    /// Populate every snapshot once, surfacing the first failure. Callers
    /// that skip this must tolerate a `NeverPopulated` error on early reads.
    pub async fn ensure_initialized(&self) -> Result<(), CacheError> {
        self.get_pools().await?;
        self.get_inbound_addresses().await?;
        self.get_inbound_details().await?;
        self.get_network_values().await?;
        Ok(())
    }

    /// Current pool map. Records that fail to parse are skipped with a
    /// warning rather than poisoning the whole refresh.
    pub async fn get_pools(&self) -> Result<Arc<PoolMap>, CacheError> {
        self.pools
            .get_or_refresh("pools", || async move {
                let records = self.source.get_pools().await?;
                let mut pools = PoolMap::with_capacity(records.len());
                for record in records {
                    match LiquidityPool::new(record) {
                        Ok(pool) => {
                            pools.insert(pool.asset().ticker.clone(), pool);
                        }
                        Err(e) => warn!("Skipping unusable pool record: {}", e),
                    }
                }
                info!("Refreshed {} pools", pools.len());
                Ok(pools)
            })
            .await
    }

    pub async fn get_inbound_addresses(
        &self,
    ) -> Result<Arc<HashMap<String, InboundAddressRecord>>, CacheError> {
        self.inbound_addresses
            .get_or_refresh("inbound addresses", || async move {
                let records = self.source.get_inbound_addresses().await?;
                Ok(records
                    .into_iter()
                    .map(|record| (record.chain.clone(), record))
                    .collect())
            })
            .await
    }

    pub async fn get_inbound_details(
        &self,
    ) -> Result<Arc<HashMap<Chain, InboundDetail>>, CacheError> {
        self.inbound_details
            .get_or_refresh("inbound details", || async move {
                let details = self.source.get_inbound_details().await?;
                Ok(details.into_iter().map(|detail| (detail.chain, detail)).collect())
            })
            .await
    }

    pub async fn get_network_values(&self) -> Result<Arc<NetworkValues>, CacheError> {
        self.network_values
            .get_or_refresh("network values", || async move {
                self.source.get_network_values().await
            })
            .await
    }

    /// Pool backing an asset. The native settlement asset has no pool, and
    /// synthetic assets resolve to their layer-1 pool via the ticker key.
    pub async fn get_pool_for_asset(&self, asset: &Asset) -> Result<LiquidityPool, QueryError> {
        if asset.is_rune_native() {
            return Err(PoolError::NativeAssetHasNoPool(asset.to_string()).into());
        }
        let pools = self.get_pools().await?;
        pools
            .get(&asset.ticker)
            .cloned()
            .ok_or_else(|| PoolError::PoolNotFound(asset.to_string()).into())
    }

    /// Price ratio of `to` units per `from` unit, routed through the native
    /// settlement asset when neither side is it
    pub async fn get_exchange_rate(
        &self,
        from: &Asset,
        to: &Asset,
    ) -> Result<BigDecimal, QueryError> {
        if from == to {
            return Ok(BigDecimal::one());
        }
        if from.is_rune_native() {
            let to_pool = self.get_pool_for_asset(to).await?;
            return Ok(to_pool.asset_per_rune().clone());
        }
        if to.is_rune_native() {
            let from_pool = self.get_pool_for_asset(from).await?;
            return Ok(from_pool.rune_per_asset().clone());
        }
        let from_pool = self.get_pool_for_asset(from).await?;
        let to_pool = self.get_pool_for_asset(to).await?;
        Ok(from_pool.rune_per_asset() * to_pool.asset_per_rune())
    }

    /// Convert an amount into another asset at the current pool price. Pure
    /// price conversion with no fee or slip, unlike a swap quote.
    pub async fn convert(
        &self,
        amount: &CryptoAmount,
        out_asset: &Asset,
    ) -> Result<CryptoAmount, QueryError> {
        let rate = self.get_exchange_rate(amount.asset(), out_asset).await?;
        let out_decimals = self.decimals_for_asset(out_asset).await?;
        let value = BigDecimal::new(amount.amount().clone(), amount.decimals() as i64) * rate;
        let base_units =
            decimal_to_base_units(&(value * BigDecimal::new(BigInt::from(1), -(out_decimals as i64))));
        Ok(CryptoAmount::new(base_units, out_decimals, out_asset.clone()))
    }

    pub async fn get_router_address_for_chain(&self, chain: Chain) -> Result<String, QueryError> {
        let details = self.get_inbound_details().await?;
        details
            .get(&chain)
            .and_then(|detail| detail.router.clone())
            .ok_or_else(|| CacheError::MissingRouter(chain).into())
    }

    /// Base-unit decimal places of an asset. The native asset and synthetic
    /// derivatives always carry 8; layer-1 assets report their own through
    /// the pool record, defaulting to 8 when upstream omits it.
    async fn decimals_for_asset(&self, asset: &Asset) -> Result<u8, QueryError> {
        if asset.is_rune_native() || asset.synth {
            return Ok(RUNE_DECIMALS);
        }
        let pool = self.get_pool_for_asset(asset).await?;
        Ok(pool.native_decimals().unwrap_or(RUNE_DECIMALS))
    }
}
