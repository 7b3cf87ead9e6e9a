//! Hook configuration and service settings.

use crate::errors::{AppError, Result};
use crate::fixed_point::BPS_DENOMINATOR;
use crate::models::FeedId;
use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Largest token decimals accepted for price adjustment.
const MAX_TOKEN_DECIMALS: u8 = 36;

/// Parameters the decision path reads on every swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    /// Share of a detected opportunity the hook keeps, in basis points.
    pub capture_share_bps: u16,
    /// Maximum oracle quote age in seconds.
    pub staleness_threshold_secs: u64,
    pub price_feed_ids: HashMap<Address, FeedId>,
    /// Token decimals; assets without an entry are not rescaled.
    pub token_decimals: HashMap<Address, u8>,
    /// Bumped on every accepted update.
    pub version: u64,
    /// Unix seconds of the last accepted update.
    pub updated_at: u64,
}

impl HookConfig {
    pub fn new(capture_share_bps: u32, staleness_threshold_secs: u64) -> Result<Self> {
        Ok(Self {
            capture_share_bps: validate_capture_share(capture_share_bps)?,
            staleness_threshold_secs: validate_staleness(staleness_threshold_secs)?,
            price_feed_ids: HashMap::new(),
            token_decimals: HashMap::new(),
            version: 0,
            updated_at: 0,
        })
    }

    pub fn feed_id(&self, asset: &Address) -> Option<FeedId> {
        self.price_feed_ids.get(asset).copied()
    }

    /// Decimals of `(token0, token1)` used for pool price adjustment.
    ///
    /// Unless both are known the pool ratio is used as-is.
    pub fn pair_decimals(&self, token0: &Address, token1: &Address) -> (u8, u8) {
        match (self.token_decimals.get(token0), self.token_decimals.get(token1)) {
            (Some(&d0), Some(&d1)) => (d0, d1),
            _ => (0, 0),
        }
    }
}

fn validate_capture_share(bps: u32) -> Result<u16> {
    if U256::from(bps) > BPS_DENOMINATOR {
        return Err(AppError::InvalidCaptureShare(bps));
    }
    u16::try_from(bps).map_err(|_| AppError::InvalidCaptureShare(bps))
}

fn validate_staleness(secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(AppError::InvalidStalenessThreshold(secs));
    }
    Ok(secs)
}

/// Administrator-guarded holder of the current [`HookConfig`].
///
/// Readers take a cheap `Arc` snapshot; a decision keeps using the snapshot
/// it started with even if an update lands mid-evaluation.
#[derive(Debug)]
pub struct ConfigStore {
    admin: Address,
    current: RwLock<Arc<HookConfig>>,
}

impl ConfigStore {
    pub fn new(admin: Address, initial: HookConfig) -> Self {
        Self {
            admin,
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn snapshot(&self) -> Arc<HookConfig> {
        Arc::clone(&self.current.read())
    }

    pub fn update_parameters(
        &self,
        caller: Address,
        capture_share_bps: u32,
        staleness_threshold_secs: u64,
        now: u64,
    ) -> Result<Arc<HookConfig>> {
        self.ensure_admin(caller)?;
        let capture_share_bps = validate_capture_share(capture_share_bps)?;
        let staleness_threshold_secs = validate_staleness(staleness_threshold_secs)?;

        let updated = self.apply(now, |cfg| {
            cfg.capture_share_bps = capture_share_bps;
            cfg.staleness_threshold_secs = staleness_threshold_secs;
        });
        info!(
            capture_share_bps,
            staleness_threshold_secs,
            version = updated.version,
            "[CONFIG] parameters updated"
        );
        Ok(updated)
    }

    pub fn set_price_feed_id(
        &self,
        caller: Address,
        asset: Address,
        feed_id: FeedId,
        now: u64,
    ) -> Result<Arc<HookConfig>> {
        self.ensure_admin(caller)?;
        if feed_id.is_zero() {
            return Err(AppError::InvalidFeedId(feed_id, asset));
        }

        let updated = self.apply(now, |cfg| {
            cfg.price_feed_ids.insert(asset, feed_id);
        });
        info!(%asset, %feed_id, version = updated.version, "[CONFIG] price feed set");
        Ok(updated)
    }

    pub fn set_token_decimals(
        &self,
        caller: Address,
        asset: Address,
        decimals: u8,
        now: u64,
    ) -> Result<Arc<HookConfig>> {
        self.ensure_admin(caller)?;
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(AppError::Config(format!(
                "{decimals} decimals for {asset} exceeds {MAX_TOKEN_DECIMALS}"
            )));
        }

        let updated = self.apply(now, |cfg| {
            cfg.token_decimals.insert(asset, decimals);
        });
        info!(%asset, decimals, version = updated.version, "[CONFIG] token decimals set");
        Ok(updated)
    }

    fn ensure_admin(&self, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(AppError::Unauthorized(caller));
        }
        Ok(())
    }

    fn apply(&self, now: u64, change: impl FnOnce(&mut HookConfig)) -> Arc<HookConfig> {
        let mut current = self.current.write();
        let mut next = HookConfig::clone(&current);
        change(&mut next);
        next.version += 1;
        next.updated_at = now;
        *current = Arc::new(next);
        Arc::clone(&current)
    }
}

/// Settings of the monitoring service, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC endpoint for the chain hosting the pool and the oracle.
    pub rpc_url: String,
    pub pyth_address: Address,
    pub state_view_address: Address,
    pub admin_address: Address,
    pub currency0: Address,
    pub currency1: Address,
    pub pool_fee: u32,
    pub tick_spacing: i32,
    pub hooks_address: Address,
    pub feed_id0: FeedId,
    pub feed_id1: FeedId,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
    pub capture_share_bps: u32,
    pub staleness_threshold_secs: u64,
    /// Exact-input amount of the probe swaps, in raw input units.
    pub probe_amount: U256,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let rpc_url = required("RPC_URL")?;
        Url::parse(&rpc_url)?;

        let probe_amount = match std::env::var("PROBE_AMOUNT") {
            Ok(raw) => U256::from_str_radix(raw.trim(), 10)
                .map_err(|e| AppError::Config(format!("PROBE_AMOUNT: {e}")))?,
            Err(_) => U256::from(1_000_000_000_000_000_000u64),
        };

        Ok(Self {
            rpc_url,
            pyth_address: parse_required("PYTH_ADDRESS")?,
            state_view_address: parse_required("STATE_VIEW_ADDRESS")?,
            admin_address: parse_or("ADMIN_ADDRESS", Address::ZERO)?,
            currency0: parse_required("CURRENCY0")?,
            currency1: parse_required("CURRENCY1")?,
            pool_fee: parse_or("POOL_FEE", 3000)?,
            tick_spacing: parse_or("TICK_SPACING", 60)?,
            hooks_address: parse_or("HOOKS_ADDRESS", Address::ZERO)?,
            feed_id0: parse_required("FEED_ID0")?,
            feed_id1: parse_required("FEED_ID1")?,
            token0_decimals: parse_or("TOKEN0_DECIMALS", 18)?,
            token1_decimals: parse_or("TOKEN1_DECIMALS", 18)?,
            capture_share_bps: parse_or("CAPTURE_SHARE_BPS", 5000)?,
            staleness_threshold_secs: parse_or("STALENESS_THRESHOLD_SECS", 60)?,
            probe_amount,
            poll_interval: Duration::from_secs(parse_or("POLL_INTERVAL_SECS", 5)?),
            request_timeout: Duration::from_millis(parse_or("REQUEST_TIMEOUT_MS", 3000)?),
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| AppError::Config(format!("{key} env var is not set")))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key}: {e}")))
}

fn parse_required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, &required(key)?)
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}
