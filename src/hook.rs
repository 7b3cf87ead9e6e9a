//! Per-swap orchestration.
//!
//! For each swap the hook reads both oracle prices and the pool price, runs
//! the pure decision engine against a configuration snapshot, and hands the
//! decision to the swap-execution collaborator. Captures it reports are
//! recorded in the [`CaptureLedger`]. Swaps on the same pool are serialized
//! end to end; different pools run concurrently.

use crate::arbitrage::{ArbitrageParams, ArbitrageResult, evaluate};
use crate::config::ConfigStore;
use crate::dex::{PoolKey, PoolPriceReader, PoolStateSource, SwapParams};
use crate::errors::{AppError, Result};
use crate::ledger::CaptureLedger;
use crate::models::{FeedId, NormalizedPrice, PoolId};
use crate::oracle::{OracleReader, PriceSource};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Everything the swap-execution collaborator needs to act on a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDecision {
    pub pool_id: PoolId,
    pub zero_for_one: bool,
    /// Currency `hook_share` is denominated in and taken from.
    pub input_currency: Address,
    pub pool_price: U256,
    pub input_price: NormalizedPrice,
    pub output_price: NormalizedPrice,
    pub result: ArbitrageResult,
    /// Version of the configuration snapshot the decision was made with.
    pub config_version: u64,
}

/// Swap-execution collaborator.
///
/// Moves up to `decision.result.hook_share` of the input currency out of
/// the swap before it settles and returns the amount actually taken.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute(&self, decision: &SwapDecision) -> Result<U256>;
}

pub struct ArbitrageHook<P, S> {
    config: Arc<ConfigStore>,
    oracle: OracleReader<P>,
    pools: PoolPriceReader<S>,
    ledger: Arc<CaptureLedger>,
    /// One lock per pool ever swapped through the hook, never evicted.
    pool_locks: DashMap<PoolId, Arc<Mutex<()>>>,
}

impl<P: PriceSource, S: PoolStateSource> ArbitrageHook<P, S> {
    pub fn new(
        config: Arc<ConfigStore>,
        price_source: P,
        pool_source: S,
        ledger: Arc<CaptureLedger>,
    ) -> Self {
        Self {
            config,
            oracle: OracleReader::new(price_source),
            pools: PoolPriceReader::new(pool_source),
            ledger,
            pool_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn ledger(&self) -> &CaptureLedger {
        &self.ledger
    }

    /// Evaluate a swap without executing anything.
    pub async fn evaluate_swap(
        &self,
        key: &PoolKey,
        swap: &SwapParams,
        now: u64,
    ) -> Result<SwapDecision> {
        let cfg = self.config.snapshot();
        let pool_id = key.pool_id();
        let input_currency = key.input_currency(swap.zero_for_one);
        let output_currency = key.output_currency(swap.zero_for_one);
        let (decimals0, decimals1) = cfg.pair_decimals(&key.currency0, &key.currency1);
        let staleness = cfg.staleness_threshold_secs;

        // two independent feed reads plus the pool read
        let (input_price, output_price, pool_price) = futures::join!(
            self.read_asset_price(input_currency, cfg.feed_id(&input_currency), staleness, now),
            self.read_asset_price(output_currency, cfg.feed_id(&output_currency), staleness, now),
            self.pools.read_pool_price(pool_id, decimals0, decimals1),
        );

        let params = ArbitrageParams::new(pool_price, input_price, output_price, swap);
        let result = evaluate(&params, cfg.capture_share_bps)?;

        if result.should_interfere {
            info!(
                %pool_id,
                zero_for_one = swap.zero_for_one,
                %pool_price,
                input_price = %input_price.price,
                output_price = %output_price.price,
                opportunity = %result.arbitrage_opportunity,
                hook_share = %result.hook_share,
                "[HOOK] interfering"
            );
        } else {
            debug!(
                %pool_id,
                zero_for_one = swap.zero_for_one,
                %pool_price,
                outside_band = result.is_outside_confidence_band,
                opportunity = %result.arbitrage_opportunity,
                "[HOOK] no interference"
            );
        }

        Ok(SwapDecision {
            pool_id,
            zero_for_one: swap.zero_for_one,
            input_currency,
            pool_price,
            input_price,
            output_price,
            result,
            config_version: cfg.version,
        })
    }

    /// Evaluate, execute and record a swap while holding the pool's lock.
    pub async fn process_swap<E: SwapExecutor + ?Sized>(
        &self,
        key: &PoolKey,
        swap: &SwapParams,
        now: u64,
        executor: &E,
    ) -> Result<SwapDecision> {
        let pool_id = key.pool_id();
        let lock = Arc::clone(&self.pool_locks.entry(pool_id).or_default());
        let _guard = lock.lock().await;

        let decision = self.evaluate_swap(key, swap, now).await?;
        let captured = executor.execute(&decision).await?;
        // tokens already moved; the ledger tracks them even when over the share
        self.ledger
            .record_capture(pool_id, decision.input_currency, captured)?;
        if captured > decision.result.hook_share {
            warn!(
                %pool_id,
                %captured,
                hook_share = %decision.result.hook_share,
                "[HOOK] executor exceeded hook share"
            );
            return Err(AppError::CaptureExceedsShare {
                captured,
                hook_share: decision.result.hook_share,
            });
        }
        Ok(decision)
    }

    async fn read_asset_price(
        &self,
        asset: Address,
        feed_id: Option<FeedId>,
        staleness_threshold_secs: u64,
        now: u64,
    ) -> NormalizedPrice {
        match feed_id {
            Some(feed_id) => {
                self.oracle
                    .read_price(feed_id, staleness_threshold_secs, now)
                    .await
            }
            None => {
                debug!(%asset, "[HOOK] no price feed configured");
                NormalizedPrice::INVALID
            }
        }
    }
}
