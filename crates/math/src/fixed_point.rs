//! Fixed-point arithmetic utilities for high-precision calculations
//!
//! Values are 64.64 binary fixed point carried in a raw `u128` (unsigned)
//! or `i128` (signed). Every function truncates; nothing rounds to nearest.

use fixed::types::{I64F64, U64F64};
use ladder_types::{
    LadderError, LadderResult, LN_2_Q64, ONE_OVER_SQRT_2_Q64, ONE_OVER_SQRT_PI_Q64, Q64,
    TWO_OVER_SQRT_PI_Q64,
};

use crate::safe::*;

/// Below this argument erfc uses the convergent series
const ERFC_SERIES_LIMIT: u128 = 4 * Q64;

/// From here on erfc is below one ulp of 64.64
const ERFC_ZERO_LIMIT: u128 = 7 * Q64;

const ERF_SERIES_MAX_TERMS: u32 = 300;
const ERFC_ASYMPTOTIC_TERMS: u32 = 12;
const EXP_MAX_TERMS: u32 = 30;

// ============================================================================
// Fixed-Point Conversion Functions
// ============================================================================

/// Convert f64 to Q64.64 fixed-point
pub fn f64_to_q64(value: f64) -> LadderResult<u128> {
    if value < 0.0 || value.is_nan() {
        return Err(LadderError::invalid_parameter(
            "f64_to_q64",
            format!("{value} is not a non-negative number"),
        ));
    }

    U64F64::checked_from_num(value)
        .map(U64F64::to_bits)
        .ok_or(LadderError::MathOverflow("f64 to Q64 conversion"))
}

/// Convert Q64.64 fixed-point to f64
pub fn q64_to_f64(value: u128) -> f64 {
    U64F64::from_bits(value).to_num::<f64>()
}

/// Convert signed f64 to signed Q64.64
pub fn f64_to_i64f64(value: f64) -> LadderResult<i128> {
    I64F64::checked_from_num(value)
        .map(I64F64::to_bits)
        .ok_or(LadderError::MathOverflow("f64 to signed Q64 conversion"))
}

/// Convert signed Q64.64 to f64
pub fn i64f64_to_f64(value: i128) -> f64 {
    I64F64::from_bits(value).to_num::<f64>()
}

/// Convert u64 integer to Q64.64 fixed-point
pub fn u64_to_q64(value: u64) -> u128 {
    (value as u128) << 64
}

/// Convert Q64.64 fixed-point to u64 integer (truncating fractional part)
pub fn q64_to_u64(value: u128) -> u64 {
    (value >> 64) as u64
}

// ============================================================================
// Fixed-Point Arithmetic Operations
// ============================================================================

/// Add two Q64.64 fixed-point numbers
pub fn add_q64(a: u128, b: u128) -> LadderResult<u128> {
    safe_add_u128(a, b)
}

/// Subtract two Q64.64 fixed-point numbers
pub fn sub_q64(a: u128, b: u128) -> LadderResult<u128> {
    safe_sub_u128(a, b)
}

/// Multiply two Q64.64 fixed-point numbers
pub fn mul_q64(a: u128, b: u128) -> LadderResult<u128> {
    safe_mul_q64(a, b)
}

/// Divide two Q64.64 fixed-point numbers
pub fn div_q64(a: u128, b: u128) -> LadderResult<u128> {
    safe_div_q64(a, b)
}

/// Take square root of Q64.64 fixed-point number
pub fn sqrt_q64(value: u128) -> LadderResult<u128> {
    safe_sqrt_q64(value)
}

/// Clamp a Q64.64 value to a range
pub fn clamp_q64(value: u128, min_val: u128, max_val: u128) -> u128 {
    value.max(min_val).min(max_val)
}

// ============================================================================
// Logarithm and Exponential
// ============================================================================

/// Natural logarithm in Q64.64 fixed point
///
/// Normalizes `x = m * 2^k` with `m` in [1, 2) and evaluates
/// `ln(m) = 2 * atanh((m - 1) / (m + 1))`, whose series argument stays
/// below 1/3.
pub fn ln_q64(x: u128) -> LadderResult<i128> {
    if x == 0 {
        return Err(LadderError::InvalidLogarithmInput);
    }
    if x == Q64 {
        return Ok(0);
    }

    let msb = 127 - x.leading_zeros() as i32;
    let k = msb - 64;
    let mantissa = if k >= 0 { x >> k } else { x << (-k) };

    let y = mul_div(mantissa - Q64, Q64, mantissa + Q64, Rounding::Down)?;
    let y2 = mul_q64(y, y)?;

    let mut sum: u128 = 0;
    let mut term = y;
    let mut divisor: u128 = 1;
    while term != 0 {
        sum += term / divisor;
        term = mul_q64(term, y2)?;
        divisor += 2;
    }

    let ln_mantissa = (sum << 1) as i128;
    Ok(k as i128 * LN_2_Q64 as i128 + ln_mantissa)
}

/// Exponential function e^x in Q64.64 fixed point
///
/// Splits `x = n * ln2 + r` with `r` in [0, ln2), sums the Taylor series
/// for `e^r` and shifts by `n`. Results below one ulp come back as zero.
pub fn exp_q64(x: i128) -> LadderResult<u128> {
    if x == 0 {
        return Ok(Q64);
    }

    let ln2 = LN_2_Q64 as i128;
    let n = x.div_euclid(ln2);
    let r = x.rem_euclid(ln2) as u128;

    let mut result = Q64;
    let mut term = Q64;
    for i in 1..=EXP_MAX_TERMS {
        term = mul_q64(term, r)? / i as u128;
        if term == 0 {
            break;
        }
        result += term;
    }

    if n >= 0 {
        if n > result.leading_zeros() as i128 {
            return Err(LadderError::MathOverflow("exp"));
        }
        Ok(result << n)
    } else if -n >= 128 {
        Ok(0)
    } else {
        Ok(result >> (-n))
    }
}

// ============================================================================
// Error Function and Normal Distribution
// ============================================================================

/// Complementary error function erfc(z) for z >= 0, Q64.64
pub fn erfc_q64(z: u128) -> LadderResult<u128> {
    if z == 0 {
        return Ok(Q64);
    }
    if z >= ERFC_ZERO_LIMIT {
        return Ok(0);
    }

    let z2 = mul_q64(z, z)?;
    let decay = exp_q64(-(z2 as i128))?;

    if z <= ERFC_SERIES_LIMIT {
        // erf(z) = 2/sqrt(pi) * e^{-z^2} * sum 2^n z^{2n+1} / (2n+1)!!
        let two_z2 = z2 << 1;
        let mut sum = z;
        let mut term = z;
        for n in 1..=ERF_SERIES_MAX_TERMS {
            term = mul_div(term, two_z2, (2 * n as u128 + 1) * Q64, Rounding::Down)?;
            if term == 0 {
                break;
            }
            sum = safe_add_u128(sum, term)?;
        }

        let erf = mul_q64(mul_q64(TWO_OVER_SQRT_PI_Q64, decay)?, sum)?;
        return Ok(Q64.saturating_sub(erf));
    }

    // erfc(z) ~ e^{-z^2} / (z sqrt(pi)) * sum (-1)^n (2n-1)!! / (2z^2)^n
    let inv_two_z2 = div_q64(Q64, z2 << 1)?;
    let mut series = Q64 as i128;
    let mut term = Q64;
    for n in 1..=ERFC_ASYMPTOTIC_TERMS {
        term = mul_q64(term, inv_two_z2)? * (2 * n as u128 - 1);
        if n % 2 == 1 {
            series -= term as i128;
        } else {
            series += term as i128;
        }
    }

    let scaled = mul_q64(decay, series.max(0) as u128)?;
    div_q64(mul_q64(scaled, ONE_OVER_SQRT_PI_Q64)?, z)
}

/// Standard normal cumulative distribution Φ(x), Q64.64 in [0, 1]
pub fn norm_cdf_q64(x: i128) -> LadderResult<u128> {
    let z = mul_q64(x.unsigned_abs(), ONE_OVER_SQRT_2_Q64)?;
    let tail = erfc_q64(z)? >> 1;

    if x >= 0 {
        Ok(Q64 - tail.min(Q64))
    } else {
        Ok(tail.min(Q64))
    }
}
