use anyhow::Result;
use oracle_arb_hook::{
    config::{AppConfig, ConfigStore, HookConfig},
    dex::{PoolKey, StateViewClient, SwapParams},
    fixed_point::to_decimal,
    hook::{ArbitrageHook, SwapDecision},
    ledger::CaptureLedger,
    oracle::PythOracle,
    utils,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cfg = AppConfig::from_env()?;
    let key = PoolKey::new(
        cfg.currency0,
        cfg.currency1,
        cfg.pool_fee,
        cfg.tick_spacing,
        cfg.hooks_address,
    )?;

    // Hook configuration mirrors what the administrator set on-chain
    let admin = cfg.admin_address;
    let now = utils::unix_now();
    let store = ConfigStore::new(
        admin,
        HookConfig::new(cfg.capture_share_bps, cfg.staleness_threshold_secs)?,
    );
    store.set_price_feed_id(admin, key.currency0, cfg.feed_id0, now)?;
    store.set_price_feed_id(admin, key.currency1, cfg.feed_id1, now)?;
    store.set_token_decimals(admin, key.currency0, cfg.token0_decimals, now)?;
    store.set_token_decimals(admin, key.currency1, cfg.token1_decimals, now)?;

    let oracle = PythOracle::new(&cfg.rpc_url, cfg.pyth_address, cfg.request_timeout)?;
    let state_view =
        StateViewClient::new(&cfg.rpc_url, cfg.state_view_address, cfg.request_timeout)?;
    let hook = ArbitrageHook::new(
        Arc::new(store),
        oracle,
        state_view,
        Arc::new(CaptureLedger::new()),
    );

    tracing::info!(
        pool_id = %key.pool_id(),
        currency0 = %key.currency0,
        currency1 = %key.currency1,
        capture_share_bps = cfg.capture_share_bps,
        staleness_threshold_secs = cfg.staleness_threshold_secs,
        probe_amount = %cfg.probe_amount,
        "[INIT] oracle-arb-hook monitor starting"
    );

    let mut ticker = tokio::time::interval(cfg.poll_interval);
    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[SHUTDOWN] ctrl-c received");
                break;
            }
        }
        ticks += 1;
        let now = utils::unix_now();

        // Probe both directions with the same exact-input size
        let mut decisions: Vec<SwapDecision> = Vec::with_capacity(2);
        for zero_for_one in [true, false] {
            let swap = SwapParams::exact_input(zero_for_one, cfg.probe_amount)?;
            match hook.evaluate_swap(&key, &swap, now).await {
                Ok(decision) => decisions.push(decision),
                Err(e) => tracing::warn!(error = %e, zero_for_one, "[HOOK] evaluation failed"),
            }
        }

        let captures: Vec<String> = decisions
            .iter()
            .filter(|d| d.result.should_interfere)
            .map(|d| {
                format!(
                    "{}: pool @ {} | opportunity {} | hook share {}",
                    if d.zero_for_one { "0->1" } else { "1->0" },
                    to_decimal(d.pool_price),
                    d.result.arbitrage_opportunity,
                    d.result.hook_share
                )
            })
            .collect();

        if !captures.is_empty() {
            tracing::info!(captures = ?captures, "[OPP] probe swaps would be captured");
        } else if ticks % 5 == 0 {
            match decisions.first() {
                Some(d) => tracing::info!(
                    pool_price = %to_decimal(d.pool_price),
                    price0 = %to_decimal(d.input_price.price),
                    price1 = %to_decimal(d.output_price.price),
                    oracle_valid = d.input_price.valid && d.output_price.valid,
                    outside_band = d.result.is_outside_confidence_band,
                    "[HEARTBEAT] no interference"
                ),
                None => tracing::info!("[HEARTBEAT] waiting for pool and oracle reads"),
            }
        }
    }
    Ok(())
}
