//! Application services - caching, finality polling and the AMM facade

pub mod amm;
pub mod cache;
pub mod checktx;
