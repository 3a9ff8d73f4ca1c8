//! Safe arithmetic operations with overflow protection
//!
//! All operations return errors instead of panicking. Wide products go
//! through a 256-bit intermediate so nothing overflows before the final
//! division or shift.

use ethnum::U256;
use ladder_types::{LadderError, LadderResult, Q64};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

// ============================================================================
// Safe Basic Arithmetic
// ============================================================================

/// Safe addition for u128 values
pub fn safe_add_u128(a: u128, b: u128) -> LadderResult<u128> {
    a.checked_add(b)
        .ok_or(LadderError::MathOverflow("u128 addition"))
}

/// Safe subtraction for u128 values
pub fn safe_sub_u128(a: u128, b: u128) -> LadderResult<u128> {
    a.checked_sub(b)
        .ok_or(LadderError::MathUnderflow("u128 subtraction"))
}

// ============================================================================
// Wide Multiply-Divide
// ============================================================================

/// Narrow a 256-bit value back to u128
pub fn u256_to_u128(value: U256, operation: &'static str) -> LadderResult<u128> {
    let (hi, lo) = value.into_words();
    if hi != 0 {
        return Err(LadderError::MathOverflow(operation));
    }
    Ok(lo)
}

/// Divide a 256-bit numerator with the requested rounding
pub fn div_u256(
    numerator: U256,
    denominator: U256,
    rounding: Rounding,
    operation: &'static str,
) -> LadderResult<u128> {
    if denominator == U256::ZERO {
        return Err(LadderError::DivisionByZero(operation));
    }

    let quotient = numerator / denominator;
    let quotient = match rounding {
        Rounding::Up if numerator % denominator != U256::ZERO => quotient
            .checked_add(U256::ONE)
            .ok_or(LadderError::MathOverflow(operation))?,
        _ => quotient,
    };

    u256_to_u128(quotient, operation)
}

/// result = a * b / denominator with the requested rounding
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> LadderResult<u128> {
    // A 128x128 product always fits in 256 bits.
    let product = U256::from(a) * U256::from(b);
    div_u256(product, U256::from(denominator), rounding, "mul_div")
}

/// Signed a * b / denominator, truncated toward zero
pub fn mul_div_signed(a: i128, b: u128, denominator: u128) -> LadderResult<i128> {
    let magnitude = mul_div(a.unsigned_abs(), b, denominator, Rounding::Down)?;
    let magnitude =
        i128::try_from(magnitude).map_err(|_| LadderError::MathOverflow("signed mul_div"))?;
    Ok(if a < 0 { -magnitude } else { magnitude })
}

// ============================================================================
// Safe Fixed-Point Arithmetic
// ============================================================================

/// Safe multiplication in Q64.64 fixed point, rounded down
pub fn safe_mul_q64(a: u128, b: u128) -> LadderResult<u128> {
    mul_div(a, b, Q64, Rounding::Down)
}

/// Q64.64 multiplication rounded up
pub fn safe_mul_q64_up(a: u128, b: u128) -> LadderResult<u128> {
    mul_div(a, b, Q64, Rounding::Up)
}

/// Safe division in Q64.64 fixed point, rounded down
pub fn safe_div_q64(a: u128, b: u128) -> LadderResult<u128> {
    if b == 0 {
        return Err(LadderError::DivisionByZero("Q64 fixed-point division"));
    }
    mul_div(a, Q64, b, Rounding::Down)
}

// ============================================================================
// Safe Square Root
// ============================================================================

/// Safe integer square root using the integer-sqrt crate
pub fn safe_sqrt_u128(value: u128) -> u128 {
    use integer_sqrt::IntegerSquareRoot;
    value.integer_sqrt()
}

/// Floor square root of a 256-bit value (Newton iteration)
pub fn sqrt_u256(value: U256) -> U256 {
    if value == U256::ZERO {
        return U256::ZERO;
    }

    let bits = 256 - value.leading_zeros();
    let mut x = U256::ONE << ((bits + 1) / 2);
    loop {
        let y = (x + value / x) >> 1u32;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a Q64.64 number, rounded down
pub fn safe_sqrt_q64(value: u128) -> LadderResult<u128> {
    if value < Q64 {
        // value * 2^64 still fits in u128
        return Ok(safe_sqrt_u128(value << 64));
    }

    let root = sqrt_u256(U256::from(value) << 64u32);
    u256_to_u128(root, "Q64 square root")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 3, 4, Rounding::Down).unwrap(), 7);
        assert_eq!(mul_div(10, 3, 4, Rounding::Up).unwrap(), 8);
        assert_eq!(mul_div(12, 3, 4, Rounding::Up).unwrap(), 9);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // (2^127 * 2^64) / 2^64 overflows u128 only in the intermediate
        let a = 1u128 << 127;
        assert_eq!(mul_div(a, Q64, Q64, Rounding::Down).unwrap(), a);
        assert_eq!(
            mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down).unwrap(),
            u128::MAX
        );
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(
            mul_div(1, 1, 0, Rounding::Down),
            Err(LadderError::DivisionByZero("mul_div"))
        );
        assert_eq!(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            Err(LadderError::MathOverflow("mul_div"))
        );
    }

    #[test]
    fn test_mul_div_signed_truncates_toward_zero() {
        assert_eq!(mul_div_signed(-10, 3, 4).unwrap(), -7);
        assert_eq!(mul_div_signed(10, 3, 4).unwrap(), 7);
    }

    #[test]
    fn test_q64_mul_div() {
        let half = Q64 / 2;
        assert_eq!(safe_mul_q64(half, half).unwrap(), Q64 / 4);
        assert_eq!(safe_div_q64(Q64, 4 * Q64).unwrap(), Q64 / 4);
        assert!(safe_div_q64(Q64, 0).is_err());
        // 3 * 2^-64 * 0.5 rounds down to 1 ulp, up to 2 ulps
        assert_eq!(safe_mul_q64(3, half).unwrap(), 1);
        assert_eq!(safe_mul_q64_up(3, half).unwrap(), 2);
    }

    #[test]
    fn test_sqrt_q64() {
        assert_eq!(safe_sqrt_q64(4 * Q64).unwrap(), 2 * Q64);
        assert_eq!(safe_sqrt_q64(Q64 / 4).unwrap(), Q64 / 2);
        assert_eq!(safe_sqrt_q64(0).unwrap(), 0);
        assert_eq!(safe_sqrt_q64(10_000 * Q64).unwrap(), 100 * Q64);
    }

    #[test]
    fn test_sqrt_u256_is_floor() {
        let value = U256::from(99u128);
        assert_eq!(sqrt_u256(value), U256::from(9u128));
        let big = U256::from(u128::MAX) * U256::from(u128::MAX);
        assert_eq!(sqrt_u256(big), U256::from(u128::MAX));
    }
}
