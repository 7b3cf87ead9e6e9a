//! In-memory price source fed from Hermes price update payloads.
//!
//! Hermes (`/v2/updates/price/latest`) answers with a `parsed` array whose
//! entries carry the feed id without a `0x` prefix and string-encoded
//! integers. Fetching those payloads is left to the caller; this module only
//! decodes them and serves the resulting quotes.

use super::PriceSource;
use crate::errors::{AppError, Result};
use crate::models::{FeedId, RawPriceQuote};
use alloy_primitives::b256;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Pyth ETH/USD feed.
pub const ETH_USD_FEED_ID: FeedId =
    b256!("ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace");

/// Pyth USDC/USD feed.
pub const USDC_USD_FEED_ID: FeedId =
    b256!("eaa020c61cc479712813461ce153894a96a6c00b21ed0cfc2798d1f9a9e9c94a");

#[derive(Debug, Deserialize)]
struct HermesResponse {
    parsed: Vec<ParsedPriceUpdate>,
}

#[derive(Debug, Deserialize)]
struct ParsedPriceUpdate {
    id: String,
    price: HermesPrice,
}

#[derive(Debug, Deserialize)]
struct HermesPrice {
    price: String,
    conf: String,
    expo: i32,
    publish_time: u64,
}

impl ParsedPriceUpdate {
    fn into_quote(self) -> Result<(FeedId, RawPriceQuote)> {
        let feed_id = FeedId::from_str(&self.id)?;
        let quote = RawPriceQuote {
            mantissa: self.price.price.parse()?,
            confidence_mantissa: self.price.conf.parse()?,
            exponent: self.price.expo,
            publish_time: self.price.publish_time,
        };
        Ok((feed_id, quote))
    }
}

/// Latest known quote per feed.
#[derive(Debug, Default)]
pub struct PriceSnapshot {
    quotes: RwLock<HashMap<FeedId, RawPriceQuote>>,
}

impl PriceSnapshot {
    /// Build a snapshot from a Hermes JSON response body.
    pub fn from_hermes_json(body: &str) -> Result<Self> {
        let snapshot = Self::default();
        snapshot.apply_hermes_json(body)?;
        Ok(snapshot)
    }

    /// Merge a Hermes JSON response body; returns the number of feeds updated.
    ///
    /// Quotes older than the one already held for a feed are ignored.
    pub fn apply_hermes_json(&self, body: &str) -> Result<usize> {
        let response: HermesResponse = serde_json::from_str(body)?;
        let decoded = response
            .parsed
            .into_iter()
            .map(ParsedPriceUpdate::into_quote)
            .collect::<Result<Vec<_>>>()?;

        let mut quotes = self.quotes.write();
        let mut updated = 0;
        for (feed_id, quote) in decoded {
            let newer = quotes
                .get(&feed_id)
                .is_none_or(|held| held.publish_time <= quote.publish_time);
            if newer {
                quotes.insert(feed_id, quote);
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub fn insert(&self, feed_id: FeedId, quote: RawPriceQuote) {
        self.quotes.write().insert(feed_id, quote);
    }

    pub fn get(&self, feed_id: &FeedId) -> Option<RawPriceQuote> {
        self.quotes.read().get(feed_id).copied()
    }
}

#[async_trait]
impl PriceSource for PriceSnapshot {
    async fn get_price(&self, feed_id: FeedId) -> Result<RawPriceQuote> {
        self.get(&feed_id)
            .ok_or(AppError::PriceFeedNotFound(feed_id))
    }
}
