//! Canonical fixed-point arithmetic.
//!
//! Every price inside the engine is an unsigned integer carrying
//! [`PRICE_DECIMALS`] fractional decimal digits, i.e. `1.0 == SCALE == 1e8`.
//! Oracle quotes arrive as `(mantissa, exponent)` pairs and are brought onto
//! that grid by [`normalize`]; products that may exceed 256 bits go through
//! [`mul_div`].

use crate::errors::{AppError, Result};
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

/// Number of fractional decimal digits of the canonical representation.
pub const PRICE_DECIMALS: i32 = 8;

/// `10^PRICE_DECIMALS`.
pub const SCALE: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

/// Denominator for basis-point shares.
pub const BPS_DENOMINATOR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// `10^exp`, or `None` once it no longer fits in 256 bits.
pub fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

/// Rescale `mantissa * 10^exponent` to the canonical 8-decimal grid.
///
/// Exponents below `-8` drop the extra precision (integer division, rounds
/// toward zero). Exponents above `-8` multiply and fail with
/// [`AppError::Overflow`] if the result leaves the 256-bit range.
pub fn normalize(mantissa: U256, exponent: i32) -> Result<U256> {
    if mantissa.is_zero() {
        return Ok(U256::ZERO);
    }
    let shift = exponent as i64 + PRICE_DECIMALS as i64;
    match shift {
        0 => Ok(mantissa),
        s if s > 0 => {
            let factor = u32::try_from(s)
                .ok()
                .and_then(pow10)
                .ok_or(AppError::Overflow("normalize"))?;
            mantissa
                .checked_mul(factor)
                .ok_or(AppError::Overflow("normalize"))
        }
        s => match u32::try_from(-s).ok().and_then(pow10) {
            Some(divisor) => Ok(mantissa / divisor),
            // 10^k beyond 2^256 exceeds any mantissa
            None => Ok(U256::ZERO),
        },
    }
}

/// `floor(a * b / denominator)` with a 512-bit-equivalent intermediate.
///
/// Errors when `denominator` is zero or the quotient does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(AppError::DivisionByZero("mul_div"));
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }
    let wide = to_biguint(a) * to_biguint(b) / to_biguint(denominator);
    from_biguint(&wide).ok_or(AppError::Overflow("mul_div"))
}

pub(crate) fn to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

pub(crate) fn from_biguint(value: &BigUint) -> Option<U256> {
    if value.is_zero() {
        return Some(U256::ZERO);
    }
    U256::try_from_be_slice(&value.to_bytes_be())
}

/// Render a canonical fixed-point value as a decimal number, for logs.
pub fn to_decimal(value: U256) -> BigDecimal {
    BigDecimal::new(BigInt::from(to_biguint(value)), PRICE_DECIMALS as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exponent_minus_eight_is_identity() {
        let m = U256::from(2_000_00000000u64);
        assert_eq!(normalize(m, -8).unwrap(), m);
    }

    #[test]
    fn higher_exponent_scales_up() {
        // 2000 * 10^-5 = 0.02 -> 2_000_000 at 1e8
        assert_eq!(
            normalize(U256::from(2000u64), -5).unwrap(),
            U256::from(2_000_000u64)
        );
        assert_eq!(normalize(U256::from(3u64), 0).unwrap(), U256::from(300_000_000u64));
    }

    #[test]
    fn lower_exponent_truncates() {
        // 123456789 * 10^-10 = 0.0123456789 -> 1234567 (sub-1e-8 digits dropped)
        assert_eq!(
            normalize(U256::from(123_456_789u64), -10).unwrap(),
            U256::from(1_234_567u64)
        );
        assert_eq!(normalize(U256::from(99u64), -10).unwrap(), U256::ZERO);
    }

    #[test]
    fn extreme_exponents() {
        assert_eq!(normalize(U256::from(u64::MAX), -200).unwrap(), U256::ZERO);
        assert!(matches!(
            normalize(U256::from(1u64), 80),
            Err(AppError::Overflow(_))
        ));
        assert!(matches!(
            normalize(U256::MAX, 1),
            Err(AppError::Overflow(_))
        ));
    }

    #[test]
    fn zero_mantissa_is_zero_for_any_exponent() {
        assert_eq!(normalize(U256::ZERO, 500).unwrap(), U256::ZERO);
        assert_eq!(normalize(U256::ZERO, -500).unwrap(), U256::ZERO);
    }

    #[test]
    fn mul_div_handles_512_bit_products() {
        let a = U256::MAX;
        let b = U256::from(10u64);
        assert_eq!(mul_div(a, b, U256::from(10u64)).unwrap(), U256::MAX);
        assert!(matches!(
            mul_div(a, b, U256::from(9u64)),
            Err(AppError::Overflow(_))
        ));
        assert!(matches!(
            mul_div(a, b, U256::ZERO),
            Err(AppError::DivisionByZero(_))
        ));
    }

    #[test]
    fn decimal_rendering() {
        let v = U256::from(2_000_50000000u64);
        assert_eq!(to_decimal(v).to_string(), "2000.50000000");
    }

    proptest! {
        #[test]
        fn renormalizing_at_another_exponent_is_stable(m in 0u64..u64::MAX, k in 0u32..12) {
            let canonical = normalize(U256::from(m), -8).unwrap();
            // same value written with k more fractional digits
            let finer = U256::from(m) * pow10(k).unwrap();
            prop_assert_eq!(normalize(finer, -8 - k as i32).unwrap(), canonical);
        }

        #[test]
        fn coarser_exponent_round_trips(m in 0u64..1_000_000_000_000u64, k in 1u32..8) {
            // m at exponent -8+k equals m*10^k at -8
            let coarse = normalize(U256::from(m), -8 + k as i32).unwrap();
            prop_assert_eq!(coarse, U256::from(m) * pow10(k).unwrap());
            // re-expressing the canonical value at a finer exponent loses nothing
            prop_assert_eq!(normalize(coarse * U256::from(10u64), -9).unwrap(), coarse);
        }

        #[test]
        fn mul_div_matches_native_when_small(a in 0u128..u128::MAX, b in 0u64..u64::MAX, d in 1u64..u64::MAX) {
            let expected = U256::from(a) * U256::from(b) / U256::from(d);
            prop_assert_eq!(mul_div(U256::from(a), U256::from(b), U256::from(d)).unwrap(), expected);
        }
    }
}
