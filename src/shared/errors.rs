//! Error handling for the library

use thiserror::Error;

use crate::shared::types::Chain;

/// Asset and chain identity errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid asset string: {0}")]
    InvalidAsset(String),
}

/// Amount arithmetic errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Cannot perform math on two different assets: {0} vs {1}")]
    AssetMismatch(String, String),

    #[error("Cannot perform math on different decimals: {0} vs {1}")]
    DecimalMismatch(u8, u8),

    #[error("Division by zero amount")]
    DivisionByZero,
}

/// Pool model and liquidity math errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("{0} is the native settlement asset and has no pool of its own")]
    NativeAssetHasNoPool(String),

    #[error("Pool for {0} not found")]
    PoolNotFound(String),

    #[error("Pool {0} has a zero depth")]
    ZeroDepth(String),

    #[error("Zero total pool units for {0}")]
    ZeroTotalUnits(String),

    #[error("Invalid pool record for {asset}: {reason}")]
    InvalidPoolData { asset: String, reason: String },
}

/// A failover endpoint list was exhausted without a single success
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{0} not responding")]
    NotResponding(&'static str),
}

/// Resource cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("{resource} cache has never been populated")]
    NeverPopulated {
        resource: &'static str,
        #[source]
        source: UpstreamError,
    },

    #[error("No router address known for chain {0}")]
    MissingRouter(Chain),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Transaction finality tracking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Cannot resolve source chain of observed transaction")]
    MissingSourceChain,

    #[error("Cannot resolve destination from memo: {0}")]
    UnresolvableMemo(String),

    #[error("No recorded block height for {0}")]
    MissingBlockHeight(String),

    #[error("No chain attributes configured for {0}")]
    MissingChainAttributes(Chain),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level library error
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
