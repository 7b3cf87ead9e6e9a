use super::PoolStateSource;
use crate::errors::{AppError, Result};
use crate::models::PoolId;
use alloy_primitives::U256;
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    providers::{Http, Provider},
    types::Address,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

abigen!(
    StateView,
    r"[
        function getSlot0(bytes32 poolId) view returns (uint160 sqrtPriceX96, int24 tick, uint24 protocolFee, uint24 lpFee)
    ]",
);

/// Slot0 of a Uniswap V4 pool as exposed by the periphery `StateView` lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub protocol_fee: u32,
    pub lp_fee: u32,
}

/// Handle for reading V4 pool state through a `StateView` deployment.
#[derive(Clone)]
pub struct StateViewClient {
    state_view: StateView<Provider<Http>>,
    request_timeout: Duration,
}

impl StateViewClient {
    pub fn new(
        rpc_url: &str,
        address: alloy_primitives::Address,
        request_timeout: Duration,
    ) -> Result<Self> {
        let provider = Arc::new(Provider::<Http>::try_from(rpc_url)?);
        let state_view = StateView::new(Address::from(address.0.0), provider);
        Ok(Self {
            state_view,
            request_timeout,
        })
    }

    pub async fn get_slot0(&self, pool_id: PoolId) -> Result<Slot0> {
        let call = self.state_view.get_slot_0(pool_id.0);
        let (sqrt_price_x96, tick, protocol_fee, lp_fee) =
            tokio::time::timeout(self.request_timeout, call.call())
                .await
                .map_err(|_| AppError::Timeout(self.request_timeout.as_millis() as u64))??;

        // ethers limbs are little-endian u64s, same layout as alloy
        let sqrt_price_x96 = U256::from_limbs(sqrt_price_x96.0);
        debug!(%pool_id, %sqrt_price_x96, tick, lp_fee, "[POOL] slot0");
        Ok(Slot0 {
            sqrt_price_x96,
            tick,
            protocol_fee,
            lp_fee,
        })
    }
}

#[async_trait]
impl PoolStateSource for StateViewClient {
    async fn get_sqrt_price(&self, pool_id: PoolId) -> Result<U256> {
        Ok(self.get_slot0(pool_id).await?.sqrt_price_x96)
    }
}
