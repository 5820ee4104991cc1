//! Domain layer - pool model, liquidity math and finality tracking logic

pub mod amount;
pub mod pool;
pub mod chains;
pub mod tracker;
