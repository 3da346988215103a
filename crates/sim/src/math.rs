//! Fixed-point arithmetic shared by every model in the crate.
//!
//! Three bases are used and must never be mixed without an explicit
//! conversion:
//!
//! | Base | Scale | Used for |
//! |------|-------|----------|
//! | ray | 1e27 | indexes, growth factors, per-year rates |
//! | wad | 1e18 | USD values, health factor |
//! | percent | 1e4 (10_000 = 100%) | factors, cursors, ratios, APYs |
//!
//! Products and quotients against an index round half-up by default, which is
//! what the on-chain `WadRayMath` / `PercentageMath` libraries do. The `_up`
//! and `_down` variants exist for the places where the contract rounds in a
//! fixed direction (debt is rounded up, redeemable amounts down).
//!
//! Helpers never panic on a zero denominator: they return zero. Callers that
//! need a sentinel for an empty denominator (matching ratio, health factor)
//! check for it before dividing.

use alloy_primitives::{I256, U256};
use rust_decimal::Decimal;

/// 1e18
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// 1e27
pub const RAY: U256 = U256::from_limbs([0x9fd0803ce8000000, 0x33b2e3c, 0, 0]);

/// 100% in percent base.
pub const PERCENT: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// 50% in percent base.
pub const HALF_PERCENT: U256 = U256::from_limbs([5_000, 0, 0, 0]);

/// One percent unit expressed in ray (1e27 / 1e4).
pub const RAY_PER_PERCENT: U256 = U256::from_limbs([0x02c7e14af6800000, 0x152d, 0, 0]);

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Lower bound on liquidation thresholds of listed assets (10%, percent base).
///
/// Collateral is discounted by `(LT_LOWER_BOUND - 1) / LT_LOWER_BOUND` before
/// factors are applied, mirroring the contract.
pub const LT_LOWER_BOUND: U256 = U256::from_limbs([1_000, 0, 0, 0]);

/// Oracle prices carry 8 decimals.
pub const PRICE_UNIT: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

/// Rounding direction for share/index conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    /// Round towards zero
    Down,
    /// Round away from zero
    Up,
    /// Round to nearest, halves away from zero
    HalfUp,
}

/// `x * y / d` with the given rounding. Zero when `d` is zero.
pub fn mul_div(x: U256, y: U256, d: U256, rounding: RoundingDirection) -> U256 {
    if d.is_zero() {
        return U256::ZERO;
    }
    let product = x.saturating_mul(y);
    match rounding {
        RoundingDirection::Down => product / d,
        RoundingDirection::Up => {
            let quotient = product / d;
            if (product % d).is_zero() {
                quotient
            } else {
                quotient + U256::from(1u8)
            }
        }
        RoundingDirection::HalfUp => product.saturating_add(d / U256::from(2u8)) / d,
    }
}

/// `x * y / d`, rounded down.
pub fn mul_div_down(x: U256, y: U256, d: U256) -> U256 {
    mul_div(x, y, d, RoundingDirection::Down)
}

/// `x * y / d`, rounded up.
pub fn mul_div_up(x: U256, y: U256, d: U256) -> U256 {
    mul_div(x, y, d, RoundingDirection::Up)
}

/// `x * y / RAY`, half-up.
pub fn ray_mul(x: U256, y: U256) -> U256 {
    mul_div(x, y, RAY, RoundingDirection::HalfUp)
}

/// `x * RAY / y`, half-up.
pub fn ray_div(x: U256, y: U256) -> U256 {
    mul_div(x, RAY, y, RoundingDirection::HalfUp)
}

/// `x * RAY / y`, rounded up.
pub fn ray_div_up(x: U256, y: U256) -> U256 {
    mul_div_up(x, RAY, y)
}

/// `x * WAD / y`, rounded down.
pub fn wad_div_down(x: U256, y: U256) -> U256 {
    mul_div_down(x, WAD, y)
}

/// `x * p / PERCENT`, half-up.
pub fn percent_mul(x: U256, p: U256) -> U256 {
    mul_div(x, p, PERCENT, RoundingDirection::HalfUp)
}

/// `x * p / PERCENT`, rounded down.
pub fn percent_mul_down(x: U256, p: U256) -> U256 {
    mul_div_down(x, p, PERCENT)
}

/// `x * PERCENT / p`, half-up.
pub fn percent_div(x: U256, p: U256) -> U256 {
    mul_div(x, PERCENT, p, RoundingDirection::HalfUp)
}

/// `x * PERCENT / p`, rounded down.
pub fn percent_div_down(x: U256, p: U256) -> U256 {
    mul_div_down(x, PERCENT, p)
}

/// Weighted average `x * (1 - p) + y * p` with `p` in percent base, half-up.
pub fn percent_avg(x: U256, y: U256, p: U256) -> U256 {
    let p = min(p, PERCENT);
    x.saturating_mul(PERCENT - p)
        .saturating_add(y.saturating_mul(p))
        .saturating_add(HALF_PERCENT)
        / PERCENT
}

/// Ray to percent, half-up.
pub fn ray_to_percent(x: U256) -> U256 {
    x.saturating_add(RAY_PER_PERCENT / U256::from(2u8)) / RAY_PER_PERCENT
}

/// Smaller of two values.
pub fn min(a: U256, b: U256) -> U256 {
    if a < b {
        a
    } else {
        b
    }
}

/// `x - y`, floored at zero.
pub fn zero_floor_sub(x: U256, y: U256) -> U256 {
    x.saturating_sub(y)
}

/// `10^decimals` as a U256.
pub fn pow10(decimals: u8) -> U256 {
    U256::from(10u8).pow(U256::from(decimals))
}

/// Ratio of `part` over `total` in percent base, zero when `total` is zero.
pub fn ratio(part: U256, total: U256) -> U256 {
    if total.is_zero() {
        return U256::ZERO;
    }
    percent_div(part, total)
}

/// Usage of `used` over `available` in percent base.
///
/// Zero when both are zero, `U256::MAX` when only `available` is zero.
pub fn usage_ratio(used: U256, available: U256) -> U256 {
    if available.is_zero() {
        if used.is_zero() {
            return U256::ZERO;
        }
        return U256::MAX;
    }
    percent_div(used, available)
}

/// Interest factor accrued linearly by `rate` (ray per year) over `elapsed` seconds.
///
/// `RAY + rate * elapsed / SECONDS_PER_YEAR`, truncated like the pool does.
pub fn linear_interest(rate: U256, elapsed: u64) -> U256 {
    RAY + rate.saturating_mul(U256::from(elapsed)) / U256::from(SECONDS_PER_YEAR)
}

/// Interest factor compounded by `rate` (ray per year) over `elapsed` seconds.
///
/// Third-order Taylor expansion of `(1 + rate / SECONDS_PER_YEAR)^elapsed`:
///
/// ```text
/// RAY + r·t + t(t-1)·r²/2 + t(t-1)(t-2)·r³/6     with r = rate / SECONDS_PER_YEAR
/// ```
///
/// The cross-terms are computed on integers so the result is bit-identical to
/// the pool's own accrual.
pub fn compounded_interest(rate: U256, elapsed: u64) -> U256 {
    if elapsed == 0 {
        return RAY;
    }

    let seconds_per_year = U256::from(SECONDS_PER_YEAR);
    let exp = U256::from(elapsed);
    let exp_minus_one = U256::from(elapsed - 1);
    let exp_minus_two = U256::from(elapsed.saturating_sub(2));

    let base_power_two = ray_mul(rate, rate) / (seconds_per_year * seconds_per_year);
    let base_power_three = ray_mul(base_power_two, rate) / seconds_per_year;

    let second_term = exp * exp_minus_one * base_power_two / U256::from(2u8);
    let third_term = exp * exp_minus_one * exp_minus_two * base_power_three / U256::from(6u8);

    RAY + rate * exp / seconds_per_year + second_term + third_term
}

/// Converts a percent-base value to a decimal fraction (10_000 => 1.0).
///
/// Values that do not fit a `Decimal` (the `U256::MAX` sentinels) saturate
/// to `Decimal::MAX`.
pub fn percent_to_decimal(value: U256) -> Decimal {
    if value > U256::from(i64::MAX as u64) {
        return Decimal::MAX;
    }
    Decimal::new(value.to::<u64>() as i64, 4)
}

/// Converts a signed percent-base value to a decimal fraction.
pub fn signed_percent_to_decimal(value: I256) -> Decimal {
    let magnitude = percent_to_decimal(value.unsigned_abs());
    if value.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Converts a wad value to a decimal, saturating at `Decimal::MAX`.
pub fn wad_to_decimal(value: U256) -> Decimal {
    to_decimal(value, 18)
}

/// Converts an integer with `decimals` implied decimals to a `Decimal`.
///
/// Digits beyond `Decimal`'s 28-digit precision are truncated.
pub fn to_decimal(value: U256, decimals: u8) -> Decimal {
    let unit = pow10(decimals);
    let integer = value / unit;
    if integer > U256::from(u64::MAX) {
        return Decimal::MAX;
    }
    let fraction = value % unit;
    // keep at most 12 fractional digits so the mantissa fits in 96 bits
    let kept = decimals.min(12);
    let fraction = fraction / pow10(decimals - kept);
    Decimal::from(integer.to::<u64>()) + Decimal::new(fraction.to::<u64>() as i64, u32::from(kept))
}
