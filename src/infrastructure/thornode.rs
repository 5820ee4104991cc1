//! Thornode client for transaction and queue state

use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::infrastructure::fetch_json;
use crate::shared::errors::UpstreamError;
use crate::shared::types::{LastBlock, Network, ObservedTx, TxOutItem, TxResponse};

const SERVICE: &str = "Thornode";

/// Client for a THORChain node with an ordered failover list
pub struct Thornode {
    http_client: Client,
    base_urls: Vec<String>,
}

impl Thornode {
    pub fn new(network: Network) -> Self {
        Self::with_base_urls(default_base_urls(network))
    }

    pub fn with_base_urls(base_urls: Vec<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_urls,
        }
    }

    /// The node's observed record of an inbound transaction. A hash the node
    /// has never seen is not an error, just `None`.
    pub async fn get_observed_tx(&self, hash: &str) -> Result<Option<ObservedTx>, UpstreamError> {
        let path = format!("/thorchain/tx/{}", hash);
        for base in &self.base_urls {
            let url = format!("{}{}", base, path);
            match self.http_client.get(&url).send().await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => return Ok(None),
                Ok(response) if response.status().is_success() => {
                    match response.json::<TxResponse>().await {
                        Ok(body) => return Ok(body.observed_tx),
                        Err(e) => {
                            warn!("{} returned an unreadable body from {}: {}", SERVICE, url, e)
                        }
                    }
                }
                Ok(response) => {
                    warn!("{} returned status {} from {}", SERVICE, response.status(), url)
                }
                Err(e) => warn!("{} request to {} failed: {}", SERVICE, url, e),
            }
        }
        Err(UpstreamError::NotResponding(SERVICE))
    }

    /// Outbound transactions scheduled but not yet dispatched
    pub async fn get_scheduled_queue(&self) -> Result<Vec<TxOutItem>, UpstreamError> {
        fetch_json(&self.http_client, &self.base_urls, "/thorchain/queue/scheduled", SERVICE).await
    }

    /// Latest recorded block heights per chain, optionally at a specific
    /// native height
    pub async fn get_last_block(
        &self,
        height: Option<i64>,
    ) -> Result<Vec<LastBlock>, UpstreamError> {
        let path = match height {
            Some(height) => format!("/thorchain/lastblock/{}", height),
            None => "/thorchain/lastblock".to_string(),
        };
        fetch_json(&self.http_client, &self.base_urls, &path, SERVICE).await
    }
}

fn default_base_urls(network: Network) -> Vec<String> {
    match network {
        Network::Mainnet => vec![
            "https://thornode.ninerealms.com".to_string(),
            "https://thornode.thorswap.net".to_string(),
            "https://thornode.thorchain.info".to_string(),
        ],
        Network::Stagenet => vec!["https://stagenet-thornode.ninerealms.com".to_string()],
        Network::Testnet => vec!["https://testnet.thornode.thorchain.info".to_string()],
    }
}
