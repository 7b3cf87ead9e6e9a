use crate::errors::{AppError, Result};
use crate::models::PoolId;
use alloy_primitives::{Address, I256, U256, keccak256};
use async_trait::async_trait;
use dashmap::DashMap;

use super::PoolStateSource;

/// Uniswap V4 pool key. `currency0 < currency1` by address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    /// LP fee in hundredths of a bip.
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    pub fn new(
        currency0: Address,
        currency1: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Result<Self> {
        if currency0 >= currency1 {
            return Err(AppError::Config(format!(
                "currencies out of order: {currency0} >= {currency1}"
            )));
        }
        Ok(Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        })
    }

    /// `keccak256(abi.encode(currency0, currency1, fee, tickSpacing, hooks))`.
    pub fn pool_id(&self) -> PoolId {
        let mut encoded = [0u8; 160];
        encoded[12..32].copy_from_slice(self.currency0.as_slice());
        encoded[44..64].copy_from_slice(self.currency1.as_slice());
        encoded[92..96].copy_from_slice(&self.fee.to_be_bytes());
        // int24 is sign-extended to a full word
        if self.tick_spacing < 0 {
            encoded[96..124].fill(0xff);
        }
        encoded[124..128].copy_from_slice(&self.tick_spacing.to_be_bytes());
        encoded[140..160].copy_from_slice(self.hooks.as_slice());
        keccak256(encoded)
    }

    /// Currency the swapper pays in.
    pub fn input_currency(&self, zero_for_one: bool) -> Address {
        if zero_for_one { self.currency0 } else { self.currency1 }
    }

    /// Currency the swapper receives.
    pub fn output_currency(&self, zero_for_one: bool) -> Address {
        if zero_for_one { self.currency1 } else { self.currency0 }
    }
}

/// Swap request as seen by the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    pub zero_for_one: bool,
    /// Negative for exact-input swaps, positive for exact-output swaps.
    pub amount_specified: I256,
    pub sqrt_price_limit_x96: U256,
}

impl SwapParams {
    pub fn exact_input(zero_for_one: bool, amount_in: U256) -> Result<Self> {
        let amount = I256::try_from(amount_in).map_err(|_| AppError::Overflow("amount_specified"))?;
        Ok(Self {
            zero_for_one,
            amount_specified: -amount,
            sqrt_price_limit_x96: U256::ZERO,
        })
    }

    pub fn is_exact_input(&self) -> bool {
        self.amount_specified.is_negative()
    }

    /// Fixed input amount of an exact-input swap, zero otherwise.
    pub fn exact_input_amount(&self) -> U256 {
        if self.is_exact_input() {
            self.amount_specified.unsigned_abs()
        } else {
            U256::ZERO
        }
    }
}

/// In-memory pool-state source, useful for replaying recorded `sqrtPriceX96` values.
#[derive(Debug, Default)]
pub struct PoolSnapshot {
    sqrt_prices: DashMap<PoolId, U256>,
}

impl PoolSnapshot {
    pub fn set_sqrt_price(&self, pool_id: PoolId, sqrt_price_x96: U256) {
        self.sqrt_prices.insert(pool_id, sqrt_price_x96);
    }
}

#[async_trait]
impl PoolStateSource for PoolSnapshot {
    async fn get_sqrt_price(&self, pool_id: PoolId) -> Result<U256> {
        // unknown pools read as uninitialized
        Ok(self
            .sqrt_prices
            .get(&pool_id)
            .map(|entry| *entry)
            .unwrap_or(U256::ZERO))
    }
}
