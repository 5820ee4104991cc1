//! Upstream API clients - indexer and node, both with endpoint failover

pub mod midgard;
pub mod thornode;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::shared::errors::UpstreamError;
use crate::shared::types::{InboundAddressRecord, InboundDetail, PoolRecord};

/// Network-wide constant values, mimir overrides already applied
pub type NetworkValues = HashMap<String, i64>;

/// Everything the pool cache needs from upstream, behind a trait so the
/// cache can be exercised without a network
#[async_trait]
pub trait PoolDataSource: Send + Sync {
    async fn get_pools(&self) -> Result<Vec<PoolRecord>, UpstreamError>;
    async fn get_inbound_addresses(&self) -> Result<Vec<InboundAddressRecord>, UpstreamError>;
    async fn get_inbound_details(&self) -> Result<Vec<InboundDetail>, UpstreamError>;
    async fn get_network_values(&self) -> Result<NetworkValues, UpstreamError>;
}

/// GET a JSON document trying each base URL in order. Individual endpoint
/// failures are logged and the next URL tried; only a fully exhausted list
/// is an error.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    base_urls: &[String],
    path: &str,
    service: &'static str,
) -> Result<T, UpstreamError> {
    for base in base_urls {
        let url = format!("{}{}", base, path);
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => match response.json::<T>().await {
                Ok(body) => return Ok(body),
                Err(e) => warn!("{} returned an unreadable body from {}: {}", service, url, e),
            },
            Ok(response) => {
                warn!("{} returned status {} from {}", service, response.status(), url)
            }
            Err(e) => warn!("{} request to {} failed: {}", service, url, e),
        }
    }
    Err(UpstreamError::NotResponding(service))
}
