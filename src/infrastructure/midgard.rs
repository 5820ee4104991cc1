//! Midgard indexer client

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::infrastructure::{fetch_json, NetworkValues, PoolDataSource};
use crate::shared::errors::UpstreamError;
use crate::shared::types::{Chain, InboundAddressRecord, InboundDetail, Network, PoolRecord};

const SERVICE: &str = "Midgard";

/// `/v2/thorchain/constants` response; only the integer table matters here
#[derive(Debug, Deserialize)]
struct ConstantsResponse {
    int_64_values: HashMap<String, i64>,
}

/// Client for the Midgard indexer with an ordered failover list
pub struct Midgard {
    http_client: Client,
    base_urls: Vec<String>,
}

impl Midgard {
    pub fn new(network: Network) -> Self {
        Self::with_base_urls(default_base_urls(network))
    }

    pub fn with_base_urls(base_urls: Vec<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_urls,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, UpstreamError> {
        fetch_json(&self.http_client, &self.base_urls, path, SERVICE).await
    }

    /// All known pools, regardless of status
    pub async fn get_pools(&self) -> Result<Vec<PoolRecord>, UpstreamError> {
        self.get_json("/v2/pools").await
    }

    pub async fn get_inbound_addresses(
        &self,
    ) -> Result<Vec<InboundAddressRecord>, UpstreamError> {
        self.get_json("/v2/thorchain/inbound_addresses").await
    }

    /// Live mimir overrides, keyed by upper-case constant name
    pub async fn get_mimir(&self) -> Result<HashMap<String, i64>, UpstreamError> {
        self.get_json("/v2/thorchain/mimir").await
    }

    /// Compile-time network constants
    pub async fn get_constants(&self) -> Result<HashMap<String, i64>, UpstreamError> {
        let response: ConstantsResponse = self.get_json("/v2/thorchain/constants").await?;
        Ok(response.int_64_values)
    }

    /// Constants with mimir overrides applied on top, keyed upper-case
    pub async fn get_network_values(&self) -> Result<NetworkValues, UpstreamError> {
        let constants = self.get_constants().await?;
        let mimir = self.get_mimir().await?;
        let mut values: NetworkValues = constants
            .into_iter()
            .map(|(key, value)| (key.to_ascii_uppercase(), value))
            .collect();
        for (key, value) in mimir {
            values.insert(key.to_ascii_uppercase(), value);
        }
        Ok(values)
    }

    /// Inbound addresses joined with the network's halt flags, plus a
    /// synthetic entry for the native chain itself
    pub async fn get_inbound_details(&self) -> Result<Vec<InboundDetail>, UpstreamError> {
        let records = self.get_inbound_addresses().await?;
        let mimir = self.get_mimir().await?;

        let mut details = Vec::with_capacity(records.len() + 1);
        for record in records {
            let chain = match Chain::from_str(&record.chain) {
                Ok(chain) => chain,
                Err(_) => {
                    warn!("Skipping inbound address for unsupported chain {}", record.chain);
                    continue;
                }
            };
            details.push(inbound_detail(chain, &record, &mimir));
        }
        details.push(native_inbound_detail(&mimir));
        Ok(details)
    }
}

#[async_trait]
impl PoolDataSource for Midgard {
    async fn get_pools(&self) -> Result<Vec<PoolRecord>, UpstreamError> {
        Midgard::get_pools(self).await
    }

    async fn get_inbound_addresses(&self) -> Result<Vec<InboundAddressRecord>, UpstreamError> {
        Midgard::get_inbound_addresses(self).await
    }

    async fn get_inbound_details(&self) -> Result<Vec<InboundDetail>, UpstreamError> {
        Midgard::get_inbound_details(self).await
    }

    async fn get_network_values(&self) -> Result<NetworkValues, UpstreamError> {
        Midgard::get_network_values(self).await
    }
}

fn default_base_urls(network: Network) -> Vec<String> {
    match network {
        Network::Mainnet => vec![
            "https://midgard.ninerealms.com".to_string(),
            "https://midgard.thorchain.info".to_string(),
            "https://midgard.thorswap.net".to_string(),
        ],
        Network::Stagenet => vec!["https://stagenet-midgard.ninerealms.com".to_string()],
        Network::Testnet => vec!["https://testnet.midgard.thorchain.info".to_string()],
    }
}

fn mimir_flag(mimir: &HashMap<String, i64>, key: &str) -> bool {
    mimir.get(key).copied().unwrap_or(0) > 0
}

fn inbound_detail(
    chain: Chain,
    record: &InboundAddressRecord,
    mimir: &HashMap<String, i64>,
) -> InboundDetail {
    let name = chain.as_str();
    InboundDetail {
        chain,
        address: record.address.clone(),
        router: record.router.clone(),
        gas_rate: record.gas_rate.parse().unwrap_or(0),
        gas_rate_units: record.gas_rate_units.clone(),
        outbound_tx_size: record.outbound_tx_size.parse().unwrap_or(0),
        outbound_fee: record.outbound_fee.parse().unwrap_or(0),
        halted_chain: record.halted
            || mimir_flag(mimir, "HALTCHAINGLOBAL")
            || mimir_flag(mimir, &format!("HALT{}CHAIN", name)),
        halted_trading: mimir_flag(mimir, "HALTTRADING")
            || mimir_flag(mimir, &format!("HALT{}TRADING", name)),
        halted_lp: mimir_flag(mimir, "PAUSELP")
            || mimir_flag(mimir, &format!("PAUSELP{}", name)),
    }
}

/// The native chain has no inbound vault; it still carries halt flags
fn native_inbound_detail(mimir: &HashMap<String, i64>) -> InboundDetail {
    InboundDetail {
        chain: Chain::Thor,
        address: String::new(),
        router: None,
        gas_rate: 0,
        gas_rate_units: String::new(),
        outbound_tx_size: 0,
        outbound_fee: 0,
        halted_chain: mimir_flag(mimir, "HALTTHORCHAIN"),
        halted_trading: mimir_flag(mimir, "HALTTRADING")
            || mimir_flag(mimir, "HALTTHORTRADING"),
        halted_lp: mimir_flag(mimir, "PAUSELP"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chain: &str, halted: bool) -> InboundAddressRecord {
        InboundAddressRecord {
            chain: chain.to_string(),
            address: "addr".to_string(),
            router: None,
            halted,
            gas_rate: "24".to_string(),
            gas_rate_units: "satsperbyte".to_string(),
            outbound_tx_size: "1000".to_string(),
            outbound_fee: "30000".to_string(),
        }
    }

    #[test]
    fn test_halt_flags_from_mimir() {
        let mut mimir = HashMap::new();
        mimir.insert("HALTBTCCHAIN".to_string(), 1);
        mimir.insert("PAUSELPBTC".to_string(), 1);

        let detail = inbound_detail(Chain::Btc, &record("BTC", false), &mimir);
        assert!(detail.halted_chain);
        assert!(detail.halted_lp);
        assert!(!detail.halted_trading);
        assert_eq!(detail.gas_rate, 24);
        assert_eq!(detail.outbound_fee, 30_000);
    }

    #[test]
    fn test_record_halt_wins_without_mimir() {
        let detail = inbound_detail(Chain::Eth, &record("ETH", true), &HashMap::new());
        assert!(detail.halted_chain);
        assert!(!detail.halted_trading);
    }

    #[test]
    fn test_native_entry_has_no_vault_address() {
        let detail = native_inbound_detail(&HashMap::new());
        assert_eq!(detail.chain, Chain::Thor);
        assert!(detail.address.is_empty());
    }

    #[test]
    fn test_mainnet_failover_list_order() {
        let urls = default_base_urls(Network::Mainnet);
        assert_eq!(urls.len(), 3);
        assert!(urls[0].contains("ninerealms"));
    }
}
