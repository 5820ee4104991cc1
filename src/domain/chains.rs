//! Static per-chain attributes used for wait-time estimation

use std::collections::HashMap;

use crate::shared::types::Chain;

/// Attributes of one settlement chain, fixed for the process lifetime
#[derive(Debug, Clone, Copy)]
pub struct ChainAttributes {
    pub block_reward: f64,
    pub avg_block_time_secs: f64,
}

/// Lookup table of chain attributes, defaulting to the built-in values
#[derive(Debug, Clone)]
pub struct ChainAttributeTable {
    attrs: HashMap<Chain, ChainAttributes>,
}

impl ChainAttributeTable {
    pub fn new(attrs: HashMap<Chain, ChainAttributes>) -> Self {
        Self { attrs }
    }

    pub fn get(&self, chain: Chain) -> Option<&ChainAttributes> {
        self.attrs.get(&chain)
    }

    pub fn avg_block_time_secs(&self, chain: Chain) -> Option<f64> {
        self.attrs.get(&chain).map(|a| a.avg_block_time_secs)
    }
}

impl Default for ChainAttributeTable {
    fn default() -> Self {
        let mut attrs = HashMap::new();
        attrs.insert(Chain::Thor, ChainAttributes { block_reward: 0.0, avg_block_time_secs: 6.0 });
        attrs.insert(Chain::Btc, ChainAttributes { block_reward: 6.25, avg_block_time_secs: 600.0 });
        attrs.insert(Chain::Bch, ChainAttributes { block_reward: 6.25, avg_block_time_secs: 600.0 });
        attrs.insert(Chain::Ltc, ChainAttributes { block_reward: 12.5, avg_block_time_secs: 150.0 });
        attrs.insert(Chain::Doge, ChainAttributes { block_reward: 10_000.0, avg_block_time_secs: 60.0 });
        attrs.insert(Chain::Eth, ChainAttributes { block_reward: 2.0, avg_block_time_secs: 13.0 });
        attrs.insert(Chain::Avax, ChainAttributes { block_reward: 2.0, avg_block_time_secs: 3.0 });
        attrs.insert(Chain::Bnb, ChainAttributes { block_reward: 0.0, avg_block_time_secs: 6.0 });
        attrs.insert(Chain::Gaia, ChainAttributes { block_reward: 0.0, avg_block_time_secs: 6.0 });
        Self { attrs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_all_chains() {
        let table = ChainAttributeTable::default();
        for chain in Chain::all() {
            assert!(table.get(chain).is_some(), "missing attributes for {chain}");
        }
    }

    #[test]
    fn test_known_block_times() {
        let table = ChainAttributeTable::default();
        assert_eq!(table.avg_block_time_secs(Chain::Btc), Some(600.0));
        assert_eq!(table.avg_block_time_secs(Chain::Thor), Some(6.0));
    }
}
