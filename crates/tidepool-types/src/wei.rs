//! Wei-scale fixed-point arithmetic.
//!
//! All reward amounts, percentages, and commission rates are unsigned 256-bit
//! integers at 1e18 scale (1e18 = 1.0). Division always truncates toward zero;
//! the rounding direction is consensus-critical, so every truncation-sensitive
//! code path goes through [`floor_div`].

use alloy_primitives::U256;

/// One full unit at wei scale (1e18 = 1.0).
pub const ONE_ETH: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// 32 ETH, the full bond of a validator. Spans two limbs; see the limb test.
pub const THIRTY_TWO_ETH: U256 = U256::from_limbs([13_553_255_926_290_448_384, 1, 0, 0]);

/// Base commission floor for bonus-eligible minipools (0.10).
pub const COMMISSION_FLOOR: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

/// Commission spread added on top of the floor, scaled by borrowed-stake
/// coverage (0.04).
pub const COMMISSION_SPREAD: U256 = U256::from_limbs([40_000_000_000_000_000, 0, 0, 0]);

/// Structural upper bound on a bonus-adjusted commission (0.14). The rewards
/// contract guarantees this is never exceeded; crossing it aborts generation.
pub const MAX_BONUS_COMMISSION: U256 = U256::from_limbs([140_000_000_000_000_000, 0, 0, 0]);

/// Truncating (floor) division.
///
/// The single shared division used everywhere a truncated quotient feeds the
/// commitment. For unsigned integers truncation toward zero and flooring
/// coincide, but routing every division through one function keeps the
/// rounding direction auditable.
///
/// The caller must guarantee `denominator` is non-zero; every call site is
/// guarded by an explicit zero check that short-circuits into the documented
/// degenerate behavior instead.
pub fn floor_div(numerator: U256, denominator: U256) -> U256 {
    numerator / denominator
}

/// Render a wei amount as a human-readable decimal with three fractional
/// digits, for log output only. Never used in committed data.
pub fn display_eth(wei: U256) -> String {
    let whole = wei / ONE_ETH;
    let milli: u64 = ((wei % ONE_ETH) / U256::from(1_000_000_000_000_000u64)).to::<u64>();
    format!("{whole}.{milli:03}")
}
