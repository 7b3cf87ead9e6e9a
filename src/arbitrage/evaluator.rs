use super::bounds::{compute_bounds, market_price};
use super::types::{ArbitrageParams, ArbitrageResult};
use crate::errors::{AppError, Result};
use crate::fixed_point::{BPS_DENOMINATOR, SCALE, mul_div};
use alloy_primitives::U256;

/// Decide whether the hook should take part of a swap, and how much.
///
/// Pure function of its inputs. The pool price is `currency1` per
/// `currency0`, so the oracle ratio it is compared with is
/// `price(currency0) / price(currency1)`: input over output for
/// `zero_for_one`, output over input otherwise.
///
/// Only [`AppError::Overflow`]-class failures and an out-of-range
/// `capture_share_bps` produce an error; every other degenerate input
/// yields [`ArbitrageResult::NONE`].
pub fn evaluate(params: &ArbitrageParams, capture_share_bps: u16) -> Result<ArbitrageResult> {
    if U256::from(capture_share_bps) > BPS_DENOMINATOR {
        return Err(AppError::InvalidCaptureShare(u32::from(capture_share_bps)));
    }
    if !params.exact_input
        || !params.input_valid
        || !params.output_valid
        || params.input_price.is_zero()
        || params.output_price.is_zero()
        || params.pool_price.is_zero()
    {
        return Ok(ArbitrageResult::NONE);
    }

    let (base_price, quote_price, base_conf, quote_conf) = if params.zero_for_one {
        (
            params.input_price,
            params.output_price,
            params.input_confidence,
            params.output_confidence,
        )
    } else {
        (
            params.output_price,
            params.input_price,
            params.output_confidence,
            params.input_confidence,
        )
    };

    let bounds = compute_bounds(base_price, quote_price, base_conf, quote_conf)?;
    let market = market_price(base_price, quote_price)?;
    let pool = params.pool_price;

    let is_outside_confidence_band = if base_conf.is_zero() && quote_conf.is_zero() {
        // no uncertainty: any deviation from the midpoint is outside
        pool != market
    } else {
        !bounds.contains(pool)
    };

    // swapper gains when the pool pays more output than the market would
    let advantageous = if params.zero_for_one {
        pool > market
    } else {
        pool < market
    };
    let should_interfere = is_outside_confidence_band && advantageous;

    // sized against the band edge, independently of `should_interfere`
    let arbitrage_opportunity = if params.zero_for_one {
        if pool > bounds.upper {
            mul_div(params.exact_input_amount, pool - bounds.upper, SCALE)?
        } else {
            U256::ZERO
        }
    } else if pool < bounds.lower {
        mul_div(params.exact_input_amount, bounds.lower - pool, SCALE)?
    } else {
        U256::ZERO
    };

    let hook_share = if should_interfere {
        mul_div(
            arbitrage_opportunity,
            U256::from(capture_share_bps),
            BPS_DENOMINATOR,
        )?
    } else {
        U256::ZERO
    };

    Ok(ArbitrageResult {
        arbitrage_opportunity,
        should_interfere,
        hook_share,
        is_outside_confidence_band,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn e8(v: u64) -> U256 {
        U256::from(v) * SCALE
    }

    fn one_ether() -> U256 {
        U256::from(1_000_000_000_000_000_000u64)
    }

    /// ETH -> USDC, zero confidence, 1 ETH in.
    fn eth_for_usdc(pool_price: U256) -> ArbitrageParams {
        ArbitrageParams {
            pool_price,
            input_price: e8(2000),
            output_price: e8(1),
            input_confidence: U256::ZERO,
            output_confidence: U256::ZERO,
            exact_input_amount: one_ether(),
            zero_for_one: true,
            exact_input: true,
            input_valid: true,
            output_valid: true,
        }
    }

    #[test]
    fn overpriced_pool_is_captured() {
        let res = evaluate(&eth_for_usdc(e8(2100)), 5_000).unwrap();
        assert!(res.is_outside_confidence_band);
        assert!(res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, one_ether() * U256::from(100u64));
        assert_eq!(res.hook_share, one_ether() * U256::from(50u64));
    }

    #[test]
    fn pool_at_market_is_left_alone() {
        let res = evaluate(&eth_for_usdc(e8(2000)), 5_000).unwrap();
        assert!(!res.is_outside_confidence_band);
        assert!(!res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, U256::ZERO);
        assert_eq!(res.hook_share, U256::ZERO);
    }

    #[test]
    fn underpriced_pool_favours_lp_not_seller() {
        // selling ETH into a pool paying 1900 hurts the swapper
        let res = evaluate(&eth_for_usdc(e8(1900)), 5_000).unwrap();
        assert!(res.is_outside_confidence_band);
        assert!(!res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, U256::ZERO);
        assert_eq!(res.hook_share, U256::ZERO);
    }

    #[test]
    fn buying_token0_from_cheap_pool_is_captured() {
        // USDC -> ETH while the pool sells ETH at 1900
        let params = ArbitrageParams {
            pool_price: e8(1900),
            input_price: e8(1),
            output_price: e8(2000),
            zero_for_one: false,
            exact_input_amount: U256::from(2_000_000_000u64),
            ..eth_for_usdc(U256::ZERO)
        };
        let res = evaluate(&params, 10_000).unwrap();
        assert!(res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, U256::from(2_000_000_000u64) * U256::from(100u64));
        assert_eq!(res.hook_share, res.arbitrage_opportunity);
    }

    #[test]
    fn zero_input_price_never_divides() {
        let params = ArbitrageParams {
            input_price: U256::ZERO,
            ..eth_for_usdc(e8(2100))
        };
        assert_eq!(evaluate(&params, 5_000).unwrap(), ArbitrageResult::NONE);
    }

    #[test]
    fn invalid_or_uninitialized_inputs_short_circuit() {
        for params in [
            ArbitrageParams { input_valid: false, ..eth_for_usdc(e8(2100)) },
            ArbitrageParams { output_valid: false, ..eth_for_usdc(e8(2100)) },
            ArbitrageParams { exact_input: false, ..eth_for_usdc(e8(2100)) },
            eth_for_usdc(U256::ZERO),
        ] {
            assert_eq!(evaluate(&params, 5_000).unwrap(), ArbitrageResult::NONE);
        }
    }

    #[test]
    fn inside_band_is_not_outside() {
        // ETH 2000 +- 20 keeps 2010 inside the band
        let params = ArbitrageParams {
            input_confidence: e8(20),
            ..eth_for_usdc(e8(2010))
        };
        let res = evaluate(&params, 5_000).unwrap();
        assert!(!res.is_outside_confidence_band);
        assert!(!res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, U256::ZERO);
    }

    #[test]
    fn opportunity_is_measured_from_band_edge() {
        // band [1980, 2020], pool at 2100: 80 above the upper edge
        let params = ArbitrageParams {
            input_confidence: e8(20),
            ..eth_for_usdc(e8(2100))
        };
        let res = evaluate(&params, 2_500).unwrap();
        assert!(res.should_interfere);
        assert_eq!(res.arbitrage_opportunity, one_ether() * U256::from(80u64));
        assert_eq!(res.hook_share, one_ether() * U256::from(20u64));
    }

    #[test]
    fn capture_share_above_full_is_rejected() {
        assert!(matches!(
            evaluate(&eth_for_usdc(e8(2100)), 10_001),
            Err(AppError::InvalidCaptureShare(10_001))
        ));
    }

    #[test]
    fn huge_amounts_fail_loudly() {
        let params = ArbitrageParams {
            exact_input_amount: U256::MAX,
            pool_price: U256::MAX,
            ..eth_for_usdc(U256::ZERO)
        };
        assert!(matches!(evaluate(&params, 5_000), Err(AppError::Overflow(_))));
    }

    fn arb_params() -> impl Strategy<Value = ArbitrageParams> {
        (
            1u64..10_000_000_000_000,
            1u64..10_000_000_000_000,
            1u64..10_000_000_000_000,
            0u64..1_000_000_000,
            0u64..1_000_000_000,
            0u128..u128::MAX,
            any::<bool>(),
        )
            .prop_map(|(pool, input, output, in_conf, out_conf, amount, zero_for_one)| {
                ArbitrageParams {
                    pool_price: U256::from(pool),
                    input_price: U256::from(input),
                    output_price: U256::from(output),
                    input_confidence: U256::from(in_conf),
                    output_confidence: U256::from(out_conf),
                    exact_input_amount: U256::from(amount),
                    zero_for_one,
                    exact_input: true,
                    input_valid: true,
                    output_valid: true,
                }
            })
    }

    proptest! {
        #[test]
        fn hook_share_never_exceeds_opportunity(params in arb_params(), bps in 0u16..=10_000) {
            let res = evaluate(&params, bps).unwrap();
            prop_assert!(res.hook_share <= res.arbitrage_opportunity);
            if !res.should_interfere {
                prop_assert_eq!(res.hook_share, U256::ZERO);
            }
        }

        #[test]
        fn exact_output_never_interferes(params in arb_params(), bps in 0u16..=10_000) {
            let params = ArbitrageParams { exact_input: false, ..params };
            let res = evaluate(&params, bps).unwrap();
            prop_assert!(!res.should_interfere);
            prop_assert_eq!(res, ArbitrageResult::NONE);
        }

        #[test]
        fn zero_confidence_band_is_exact_equality(params in arb_params()) {
            let params = ArbitrageParams {
                input_confidence: U256::ZERO,
                output_confidence: U256::ZERO,
                ..params
            };
            let (base, quote) = if params.zero_for_one {
                (params.input_price, params.output_price)
            } else {
                (params.output_price, params.input_price)
            };
            let market = market_price(base, quote).unwrap();
            let res = evaluate(&params, 5_000).unwrap();
            prop_assert_eq!(res.is_outside_confidence_band, params.pool_price != market);

            let at_market = ArbitrageParams { pool_price: market, ..params };
            if !market.is_zero() {
                prop_assert!(!evaluate(&at_market, 5_000).unwrap().is_outside_confidence_band);
            }
        }
    }
}
