//! Thorquery - THORChain pool quoting and transaction finality tracking
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::amm::ThorchainAmm;
pub use application::cache::ThorchainCache;
pub use application::checktx::CheckTx;
pub use domain::amount::CryptoAmount;
pub use domain::pool::LiquidityPool;
pub use domain::tracker::{TxStage, TxStatus};
pub use infrastructure::midgard::Midgard;
pub use infrastructure::thornode::Thornode;
pub use shared::errors::QueryError;
pub use shared::types::{Asset, Chain, Network};
