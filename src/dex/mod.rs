//! Pool price reader for Uniswap V4 pools.
//!
//! Converts the pool's `sqrtPriceX96` into the same canonical 1e8 ratio the
//! oracle side produces (`currency1` per `currency0`), so both can be compared
//! directly.

use crate::errors::{AppError, Result};
use crate::fixed_point::{PRICE_DECIMALS, from_biguint, to_biguint};
use crate::models::PoolId;
use alloy_primitives::U256;
use async_trait::async_trait;
use num_bigint::BigUint;
use tracing::{debug, warn};

pub mod client;
pub mod state;

pub use client::StateViewClient;
pub use state::{PoolKey, PoolSnapshot, SwapParams};

/// Pool-state collaborator: current `sqrtPriceX96` of a pool, 0 if uninitialized.
#[async_trait]
pub trait PoolStateSource: Send + Sync {
    async fn get_sqrt_price(&self, pool_id: PoolId) -> Result<U256>;
}

#[async_trait]
impl<T: PoolStateSource + ?Sized> PoolStateSource for std::sync::Arc<T> {
    async fn get_sqrt_price(&self, pool_id: PoolId) -> Result<U256> {
        (**self).get_sqrt_price(pool_id).await
    }
}

/// `(sqrtPriceX96^2 * 10^8) >> 192`, the raw `token1/token0` ratio at 1e8.
///
/// Equal to `((sqrtPriceX96^2 * 10^18) >> 192) * 10^8 / 10^18` since both
/// floor the same rational.
pub fn sqrt_price_to_ratio(sqrt_price_x96: U256) -> Result<U256> {
    sqrt_price_to_price(sqrt_price_x96, 0, 0)
}

/// Like [`sqrt_price_to_ratio`] but expressed per whole token, shifting by
/// `10^(token0_decimals - token1_decimals)` before flooring.
pub fn sqrt_price_to_price(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Result<U256> {
    if sqrt_price_x96.is_zero() {
        return Ok(U256::ZERO);
    }
    let sqrt = to_biguint(sqrt_price_x96);
    let ten = BigUint::from(10u32);

    let mut numerator = &sqrt * &sqrt * ten.pow(PRICE_DECIMALS as u32);
    let mut denominator = BigUint::from(1u32) << 192usize;
    if token0_decimals >= token1_decimals {
        numerator *= ten.pow(u32::from(token0_decimals - token1_decimals));
    } else {
        denominator *= ten.pow(u32::from(token1_decimals - token0_decimals));
    }
    from_biguint(&(numerator / denominator)).ok_or(AppError::Overflow("sqrt_price_to_price"))
}

/// Reads pool prices from a [`PoolStateSource`].
#[derive(Debug, Clone)]
pub struct PoolPriceReader<S> {
    source: S,
}

impl<S: PoolStateSource> PoolPriceReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current pool price at 1e8. Returns 0 when no decision is possible:
    /// uninitialized pool, lookup failure, or an out-of-range price.
    pub async fn read_pool_price(
        &self,
        pool_id: PoolId,
        token0_decimals: u8,
        token1_decimals: u8,
    ) -> U256 {
        let sqrt_price_x96 = match self.source.get_sqrt_price(pool_id).await {
            Ok(v) => v,
            Err(e) => {
                warn!(%pool_id, error = %e, "[POOL] failed to read sqrtPriceX96");
                return U256::ZERO;
            }
        };
        if sqrt_price_x96.is_zero() {
            debug!(%pool_id, "[POOL] pool not initialized");
            return U256::ZERO;
        }
        sqrt_price_to_price(sqrt_price_x96, token0_decimals, token1_decimals).unwrap_or_else(|e| {
            warn!(%pool_id, %sqrt_price_x96, error = %e, "[POOL] price out of range");
            U256::ZERO
        })
    }
}
