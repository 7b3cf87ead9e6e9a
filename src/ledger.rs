//! Running totals of value captured by the hook, per pool and currency.

use crate::errors::{AppError, Result};
use crate::models::PoolId;
use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use tracing::info;

/// Monotonic `(pool, currency) -> captured amount` map.
///
/// Each update holds the entry's shard lock for the whole read-add-write, so
/// concurrent captures on the same key never lose updates while different
/// keys proceed independently.
#[derive(Debug, Default)]
pub struct CaptureLedger {
    totals: DashMap<(PoolId, Address), U256>,
}

impl CaptureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the total for `(pool_id, currency)` and return the new total.
    ///
    /// Zero amounts leave the ledger untouched.
    pub fn record_capture(&self, pool_id: PoolId, currency: Address, amount: U256) -> Result<U256> {
        if amount.is_zero() {
            return Ok(self.captured(pool_id, currency));
        }
        let mut total = self.totals.entry((pool_id, currency)).or_insert(U256::ZERO);
        let updated = total
            .checked_add(amount)
            .ok_or(AppError::Overflow("capture ledger"))?;
        *total = updated;
        drop(total);

        info!(%pool_id, %currency, %amount, total = %updated, "[LEDGER] capture recorded");
        Ok(updated)
    }

    pub fn captured(&self, pool_id: PoolId, currency: Address) -> U256 {
        self.totals
            .get(&(pool_id, currency))
            .map(|total| *total)
            .unwrap_or(U256::ZERO)
    }

    /// Copy of every non-empty entry.
    pub fn snapshot(&self) -> Vec<(PoolId, Address, U256)> {
        self.totals
            .iter()
            .map(|entry| {
                let (pool_id, currency) = *entry.key();
                (pool_id, currency, *entry.value())
            })
            .collect()
    }
}
