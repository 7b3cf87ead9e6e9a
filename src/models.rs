//! Shared data structures used throughout the engine.

use alloy_primitives::{B256, U256};

/// Identifier of an oracle price feed (Pyth feeds are 32-byte ids).
pub type FeedId = B256;

/// Uniswap V4 pool identifier, `keccak256(abi.encode(PoolKey))`.
pub type PoolId = B256;

/// Price exactly as reported by the oracle collaborator:
/// `price = mantissa * 10^exponent`, `conf = confidence_mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPriceQuote {
    pub mantissa: i64,
    pub confidence_mantissa: u64,
    pub exponent: i32,
    /// Unix seconds.
    pub publish_time: u64,
}

/// Oracle price and confidence on the canonical 1e8 grid.
///
/// `valid == false` means the quote must not be used; price and confidence
/// are zero in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizedPrice {
    pub price: U256,
    pub confidence: U256,
    pub valid: bool,
}

impl NormalizedPrice {
    pub const INVALID: Self = Self {
        price: U256::ZERO,
        confidence: U256::ZERO,
        valid: false,
    };

    pub fn new(price: U256, confidence: U256) -> Self {
        Self {
            price,
            confidence,
            valid: true,
        }
    }
}

/// Closed interval `[lower, upper]` for the oracle-implied pool price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketBounds {
    pub lower: U256,
    pub upper: U256,
}

impl MarketBounds {
    pub const UNDECIDABLE: Self = Self {
        lower: U256::ZERO,
        upper: U256::ZERO,
    };

    pub fn contains(&self, price: U256) -> bool {
        price >= self.lower && price <= self.upper
    }
}
