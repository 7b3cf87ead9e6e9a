//! On-chain Pyth price source.

use super::PriceSource;
use crate::errors::{AppError, Result};
use crate::models::{FeedId, RawPriceQuote};
use async_trait::async_trait;
use ethers::{
    contract::{ContractError, abigen},
    providers::{Http, Provider},
    types::Address,
};
use std::sync::Arc;
use std::time::Duration;

/// Selector of Pyth's `PriceFeedNotFound()` custom error.
const PRICE_FEED_NOT_FOUND: [u8; 4] = [0x14, 0xae, 0xbe, 0x68];

// `getPriceUnsafe` returns a static `PythStructs.Price` tuple, which is
// ABI-identical to the flattened outputs below.
abigen!(
    IPyth,
    r"[
        function getPriceUnsafe(bytes32 id) view returns (int64 price, uint64 conf, int32 expo, uint256 publishTime)
    ]",
);

/// Reads the last stored price of a feed from a Pyth contract.
///
/// Staleness is not enforced here; the oracle reader applies the hook's own
/// threshold to `publish_time`.
#[derive(Clone)]
pub struct PythOracle {
    contract: IPyth<Provider<Http>>,
    request_timeout: Duration,
}

impl PythOracle {
    pub fn new(
        rpc_url: &str,
        address: alloy_primitives::Address,
        request_timeout: Duration,
    ) -> Result<Self> {
        let provider = Arc::new(Provider::<Http>::try_from(rpc_url)?);
        let contract = IPyth::new(Address::from(address.0.0), provider);
        Ok(Self {
            contract,
            request_timeout,
        })
    }
}

#[async_trait]
impl PriceSource for PythOracle {
    async fn get_price(&self, feed_id: FeedId) -> Result<RawPriceQuote> {
        let call = self.contract.get_price_unsafe(feed_id.0);
        let (price, conf, expo, publish_time) =
            tokio::time::timeout(self.request_timeout, call.call())
                .await
                .map_err(|_| AppError::Timeout(self.request_timeout.as_millis() as u64))?
                .map_err(|e| match e {
                    ContractError::Revert(ref data) if data.starts_with(&PRICE_FEED_NOT_FOUND) => {
                        AppError::PriceFeedNotFound(feed_id)
                    }
                    other => AppError::Contract(other),
                })?;

        if publish_time.bits() > 64 {
            return Err(AppError::Overflow("publish_time"));
        }
        Ok(RawPriceQuote {
            mantissa: price,
            confidence_mantissa: conf,
            exponent: expo,
            publish_time: publish_time.as_u64(),
        })
    }
}
