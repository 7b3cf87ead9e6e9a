//! Oracle price reader.
//!
//! Wraps a single price-feed lookup against a [`PriceSource`] and turns the
//! raw quote into a [`NormalizedPrice`]. Lookups never fail from the caller's
//! point of view: fetch errors, non-positive prices, stale quotes and
//! unrepresentable exponents all come back as `valid == false`.

use crate::errors::Result;
use crate::fixed_point::normalize;
use crate::models::{FeedId, NormalizedPrice, RawPriceQuote};
use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::debug;

pub mod hermes;
pub mod pyth;

pub use hermes::PriceSnapshot;
pub use pyth::PythOracle;

/// Oracle collaborator: returns the latest quote for a feed.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, feed_id: FeedId) -> Result<RawPriceQuote>;
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for std::sync::Arc<T> {
    async fn get_price(&self, feed_id: FeedId) -> Result<RawPriceQuote> {
        (**self).get_price(feed_id).await
    }
}

/// Validate and normalize a quote that has already been fetched.
pub fn validate_quote(
    quote: &RawPriceQuote,
    staleness_threshold_secs: u64,
    now: u64,
) -> NormalizedPrice {
    if quote.mantissa <= 0 {
        debug!(mantissa = quote.mantissa, "[ORACLE] non-positive price");
        return NormalizedPrice::INVALID;
    }
    let age = now.saturating_sub(quote.publish_time);
    if age > staleness_threshold_secs {
        debug!(age, staleness_threshold_secs, "[ORACLE] stale price");
        return NormalizedPrice::INVALID;
    }

    let price = normalize(U256::from(quote.mantissa as u64), quote.exponent);
    let confidence = normalize(U256::from(quote.confidence_mantissa), quote.exponent);
    match (price, confidence) {
        (Ok(price), Ok(confidence)) => NormalizedPrice::new(price, confidence),
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, exponent = quote.exponent, "[ORACLE] unrepresentable quote");
            NormalizedPrice::INVALID
        }
    }
}

/// Reads one feed at a time from a [`PriceSource`].
#[derive(Debug, Clone)]
pub struct OracleReader<P> {
    source: P,
}

impl<P: PriceSource> OracleReader<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    /// Fetch, validate and normalize the price of `feed_id`.
    pub async fn read_price(
        &self,
        feed_id: FeedId,
        staleness_threshold_secs: u64,
        now: u64,
    ) -> NormalizedPrice {
        match self.source.get_price(feed_id).await {
            Ok(quote) => validate_quote(&quote, staleness_threshold_secs, now),
            Err(e) => {
                debug!(%feed_id, error = %e, "[ORACLE] fetch failed");
                NormalizedPrice::INVALID
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use alloy_primitives::B256;

    struct Unreachable;

    #[async_trait]
    impl PriceSource for Unreachable {
        async fn get_price(&self, _feed_id: FeedId) -> Result<RawPriceQuote> {
            Err(AppError::Timeout(3000))
        }
    }

    fn quote(mantissa: i64, conf: u64, exponent: i32, publish_time: u64) -> RawPriceQuote {
        RawPriceQuote {
            mantissa,
            confidence_mantissa: conf,
            exponent,
            publish_time,
        }
    }

    #[test]
    fn fresh_quote_is_normalized() {
        let q = quote(200_012_345_678, 150_000_000, -8, 1_000);
        let p = validate_quote(&q, 60, 1_030);
        assert!(p.valid);
        assert_eq!(p.price, U256::from(200_012_345_678u64));
        assert_eq!(p.confidence, U256::from(150_000_000u64));
    }

    #[test]
    fn exponent_applies_to_price_and_confidence() {
        let q = quote(99_995_000, 7_000, -8, 0);
        assert_eq!(validate_quote(&q, 60, 0).confidence, U256::from(7_000u64));

        let q = quote(1_000_123, 45, -6, 0);
        let p = validate_quote(&q, 60, 0);
        assert_eq!(p.price, U256::from(100_012_300u64));
        assert_eq!(p.confidence, U256::from(4_500u64));
    }

    #[test]
    fn non_positive_price_is_invalid() {
        assert_eq!(validate_quote(&quote(0, 1, -8, 0), 60, 0), NormalizedPrice::INVALID);
        assert_eq!(validate_quote(&quote(-5, 1, -8, 0), 60, 0), NormalizedPrice::INVALID);
    }

    #[test]
    fn staleness_boundary() {
        let q = quote(100, 0, -8, 1_000);
        assert!(validate_quote(&q, 60, 1_060).valid);
        assert!(!validate_quote(&q, 60, 1_061).valid);
        // publish time ahead of the local clock counts as fresh
        assert!(validate_quote(&q, 60, 900).valid);
    }

    #[test]
    fn overflowing_exponent_is_invalid() {
        let q = quote(i64::MAX, 1, 90, 0);
        assert!(!validate_quote(&q, 60, 0).valid);
    }

    #[tokio::test]
    async fn fetch_errors_degrade_to_invalid() {
        let reader = OracleReader::new(Unreachable);
        let p = reader.read_price(B256::repeat_byte(1), 60, 0).await;
        assert_eq!(p, NormalizedPrice::INVALID);
    }

    #[tokio::test]
    async fn reads_from_snapshot() {
        let feed = B256::repeat_byte(7);
        let snapshot = PriceSnapshot::default();
        snapshot.insert(feed, quote(2_000_00000000, 1_00000000, -8, 500));
        let reader = OracleReader::new(snapshot);

        let p = reader.read_price(feed, 60, 520).await;
        assert!(p.valid);
        assert_eq!(p.price, U256::from(2_000_00000000u64));

        let missing = reader.read_price(B256::repeat_byte(8), 60, 520).await;
        assert!(!missing.valid);
    }
}
