//! Oracle-guided arbitrage capture for Uniswap V4 hooks.
//!
//! For every swap the engine compares the pool's price with a confidence
//! band derived from two oracle feeds and decides whether, and how much of,
//! the swap's arbitrage value the hook should keep. The decision itself
//! ([`arbitrage::evaluate`]) is pure; oracle and pool lookups, configuration
//! and the capture ledger sit around it.

pub mod arbitrage;
pub mod config;
pub mod dex;
pub mod errors;
pub mod fixed_point;
pub mod hook;
pub mod ledger;
pub mod models;
pub mod oracle;
pub mod utils;
