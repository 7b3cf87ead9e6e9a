//! Confidence band around the oracle-implied pool price.

use crate::errors::{AppError, Result};
use crate::fixed_point::{SCALE, mul_div};
use crate::models::MarketBounds;
use alloy_primitives::U256;

/// Conservative bounds for `base_price / quote_price` at 1e8.
///
/// The lower edge pairs the lowest base price with the highest quote price
/// and the upper edge does the opposite, so the band covers both feeds'
/// uncertainty at once. The quote's lower edge is clamped to 1 to keep the
/// division defined. A zero `quote_price` is undecidable and yields `(0, 0)`.
pub fn compute_bounds(
    base_price: U256,
    quote_price: U256,
    base_conf: U256,
    quote_conf: U256,
) -> Result<MarketBounds> {
    if quote_price.is_zero() {
        return Ok(MarketBounds::UNDECIDABLE);
    }

    let base_lower = base_price.saturating_sub(base_conf);
    let base_upper = base_price
        .checked_add(base_conf)
        .ok_or(AppError::Overflow("compute_bounds"))?;
    let quote_lower = quote_price.saturating_sub(quote_conf).max(U256::from(1u64));
    let quote_upper = quote_price
        .checked_add(quote_conf)
        .ok_or(AppError::Overflow("compute_bounds"))?;

    Ok(MarketBounds {
        lower: mul_div(base_lower, SCALE, quote_upper)?,
        upper: mul_div(base_upper, SCALE, quote_lower)?,
    })
}

/// Midpoint `base_price / quote_price` at 1e8, ignoring confidence.
pub fn market_price(base_price: U256, quote_price: U256) -> Result<U256> {
    mul_div(base_price, SCALE, quote_price)
}
