use crate::dex::SwapParams;
use crate::models::NormalizedPrice;
use alloy_primitives::U256;

/// Inputs of one swap evaluation. All prices are at 1e8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrageParams {
    /// Pool price, `currency1` per `currency0`.
    pub pool_price: U256,
    /// Oracle price of the currency the swapper pays.
    pub input_price: U256,
    /// Oracle price of the currency the swapper receives.
    pub output_price: U256,
    pub input_confidence: U256,
    pub output_confidence: U256,
    pub exact_input_amount: U256,
    pub zero_for_one: bool,
    pub exact_input: bool,
    pub input_valid: bool,
    pub output_valid: bool,
}

impl ArbitrageParams {
    pub fn new(
        pool_price: U256,
        input: NormalizedPrice,
        output: NormalizedPrice,
        swap: &SwapParams,
    ) -> Self {
        Self {
            pool_price,
            input_price: input.price,
            output_price: output.price,
            input_confidence: input.confidence,
            output_confidence: output.confidence,
            exact_input_amount: swap.exact_input_amount(),
            zero_for_one: swap.zero_for_one,
            exact_input: swap.is_exact_input(),
            input_valid: input.valid,
            output_valid: output.valid,
        }
    }
}

/// Outcome of one swap evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArbitrageResult {
    pub arbitrage_opportunity: U256,
    pub should_interfere: bool,
    pub hook_share: U256,
    pub is_outside_confidence_band: bool,
}

impl ArbitrageResult {
    pub const NONE: Self = Self {
        arbitrage_opportunity: U256::ZERO,
        should_interfere: false,
        hook_share: U256::ZERO,
        is_outside_confidence_band: false,
    };
}
