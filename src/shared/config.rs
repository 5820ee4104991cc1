use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::shared::errors::ConfigError;

/// Endpoint list override for one upstream service
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsCfg {
    pub base_urls: Vec<String>,
}

/// Cache TTL overrides, in seconds
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheCfg {
    pub pools_ttl_secs: Option<u64>,
    pub inbound_addresses_ttl_secs: Option<u64>,
    pub inbound_details_ttl_secs: Option<u64>,
    pub network_values_ttl_secs: Option<u64>,
}

/// Optional file configuration. Anything left out falls back to the
/// built-in per-network defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    pub network: Option<String>,
    pub midgard: Option<EndpointsCfg>,
    pub thornode: Option<EndpointsCfg>,
    #[serde(default)]
    pub cache: CacheCfg,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load_config(path: impl AsRef<Path>) -> Result<QueryConfig, ConfigError> {
        let config_content = fs::read_to_string(path)?;
        let config: QueryConfig = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let raw = r#"
            network = "stagenet"

            [thornode]
            base_urls = ["https://stagenet-thornode.ninerealms.com"]

            [cache]
            pools_ttl_secs = 12
        "#;
        let config: QueryConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.network.as_deref(), Some("stagenet"));
        assert_eq!(config.thornode.unwrap().base_urls.len(), 1);
        assert_eq!(config.cache.pools_ttl_secs, Some(12));
        assert!(config.midgard.is_none());
    }
}
