//! Common types - networks, chains, assets and upstream record shapes

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::shared::errors::AssetError;

/// Decimal places of the native settlement asset (RUNE base units)
pub const RUNE_DECIMALS: u8 = 8;

/// Which THORChain network the clients should talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Stagenet,
    Testnet,
}

impl FromStr for Network {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "stagenet" => Ok(Network::Stagenet),
            "testnet" => Ok(Network::Testnet),
            other => Err(AssetError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Chains THORChain settles against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Thor,
    Btc,
    Eth,
    Bnb,
    Gaia,
    Bch,
    Ltc,
    Doge,
    Avax,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Thor => "THOR",
            Chain::Btc => "BTC",
            Chain::Eth => "ETH",
            Chain::Bnb => "BNB",
            Chain::Gaia => "GAIA",
            Chain::Bch => "BCH",
            Chain::Ltc => "LTC",
            Chain::Doge => "DOGE",
            Chain::Avax => "AVAX",
        }
    }

    /// All supported chains, used to build default attribute tables
    pub fn all() -> [Chain; 9] {
        [
            Chain::Thor,
            Chain::Btc,
            Chain::Eth,
            Chain::Bnb,
            Chain::Gaia,
            Chain::Bch,
            Chain::Ltc,
            Chain::Doge,
            Chain::Avax,
        ]
    }
}

impl FromStr for Chain {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "THOR" => Ok(Chain::Thor),
            "BTC" => Ok(Chain::Btc),
            "ETH" => Ok(Chain::Eth),
            "BNB" => Ok(Chain::Bnb),
            "GAIA" => Ok(Chain::Gaia),
            "BCH" => Ok(Chain::Bch),
            "LTC" => Ok(Chain::Ltc),
            "DOGE" => Ok(Chain::Doge),
            "AVAX" => Ok(Chain::Avax),
            other => Err(AssetError::UnknownChain(other.to_string())),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset identity as THORChain spells it: `CHAIN.SYMBOL` for layer-1
/// assets, `CHAIN/SYMBOL` for synthetic ones. The ticker is the symbol up to
/// the first `-` so that e.g. `ETH.USDC-0XA0B...` keys the same as `USDC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub chain: Chain,
    pub symbol: String,
    pub ticker: String,
    pub synth: bool,
}

impl Asset {
    pub fn new(chain: Chain, symbol: &str, synth: bool) -> Self {
        let ticker = symbol.split('-').next().unwrap_or(symbol).to_string();
        Self {
            chain,
            symbol: symbol.to_string(),
            ticker,
            synth,
        }
    }

    /// The native settlement asset. Every pool is paired against it.
    pub fn rune() -> Self {
        Asset::new(Chain::Thor, "RUNE", false)
    }

    pub fn is_rune_native(&self) -> bool {
        self.chain == Chain::Thor && self.ticker == "RUNE" && !self.synth
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (delimiter, synth) = if s.contains('/') { ('/', true) } else { ('.', false) };
        let mut parts = s.splitn(2, delimiter);
        let chain = parts
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AssetError::InvalidAsset(s.to_string()))?;
        let symbol = parts
            .next()
            .filter(|sym| !sym.is_empty())
            .ok_or_else(|| AssetError::InvalidAsset(s.to_string()))?;
        let chain = Chain::from_str(chain)?;
        Ok(Asset::new(chain, &symbol.to_ascii_uppercase(), synth))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delimiter = if self.synth { '/' } else { '.' };
        write!(f, "{}{}{}", self.chain, delimiter, self.symbol)
    }
}

/// Raw pool record as returned by the indexer's `/v2/pools`
#[derive(Debug, Clone, Deserialize)]
pub struct PoolRecord {
    pub asset: String,
    #[serde(rename = "assetDepth")]
    pub asset_depth: String,
    #[serde(rename = "runeDepth")]
    pub rune_depth: String,
    pub status: String,
    /// Total liquidity units issued for this pool
    pub units: String,
    #[serde(rename = "nativeDecimal", default)]
    pub native_decimal: Option<String>,
    #[serde(rename = "assetPrice", default)]
    pub asset_price: Option<String>,
}

/// One entry of `/thorchain/inbound_addresses`
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAddressRecord {
    pub chain: String,
    pub address: String,
    #[serde(default)]
    pub router: Option<String>,
    #[serde(default)]
    pub halted: bool,
    pub gas_rate: String,
    pub gas_rate_units: String,
    pub outbound_tx_size: String,
    pub outbound_fee: String,
}

/// Per-chain inbound settlement details derived from the inbound address
/// record plus the network's halt flags
#[derive(Debug, Clone)]
pub struct InboundDetail {
    pub chain: Chain,
    pub address: String,
    pub router: Option<String>,
    pub gas_rate: u64,
    pub gas_rate_units: String,
    pub outbound_tx_size: u64,
    pub outbound_fee: u64,
    pub halted_chain: bool,
    pub halted_trading: bool,
    pub halted_lp: bool,
}

/// `/thorchain/tx/{hash}` response wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub observed_tx: Option<ObservedTx>,
}

/// The node's observed record of an inbound transaction
#[derive(Debug, Clone, Deserialize)]
pub struct ObservedTx {
    pub tx: InboundTx,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub block_height: Option<i64>,
    #[serde(default)]
    pub finalise_height: Option<i64>,
}

impl ObservedTx {
    /// Upstream marks a fully processed inbound with status "done"
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some("done")
    }
}

/// Inbound transaction body inside an observed record
#[derive(Debug, Clone, Deserialize)]
pub struct InboundTx {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// One pending item of `/thorchain/queue/scheduled`
#[derive(Debug, Clone, Deserialize)]
pub struct TxOutItem {
    pub chain: String,
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub in_hash: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// One row of `/thorchain/lastblock`
#[derive(Debug, Clone, Deserialize)]
pub struct LastBlock {
    pub chain: String,
    #[serde(default)]
    pub last_observed_in: Option<i64>,
    #[serde(default)]
    pub last_signed_out: Option<i64>,
    pub thorchain: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer1_asset() {
        let asset: Asset = "BTC.BTC".parse().unwrap();
        assert_eq!(asset.chain, Chain::Btc);
        assert_eq!(asset.ticker, "BTC");
        assert!(!asset.synth);
    }

    #[test]
    fn test_parse_synth_asset() {
        let asset: Asset = "BTC/BTC".parse().unwrap();
        assert_eq!(asset.chain, Chain::Btc);
        assert!(asset.synth);
        assert_eq!(asset.to_string(), "BTC/BTC");
    }

    #[test]
    fn test_ticker_strips_contract_suffix() {
        let asset: Asset = "ETH.USDC-0XA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48".parse().unwrap();
        assert_eq!(asset.ticker, "USDC");
        assert_eq!(asset.chain, Chain::Eth);
    }

    #[test]
    fn test_unknown_chain_is_an_error() {
        let err = "POLKA.DOT".parse::<Asset>().unwrap_err();
        assert!(matches!(err, AssetError::UnknownChain(_)));
    }

    #[test]
    fn test_rune_native_detection() {
        assert!(Asset::rune().is_rune_native());
        let synth_rune = Asset::new(Chain::Thor, "RUNE", true);
        assert!(!synth_rune.is_rune_native());
    }
}
