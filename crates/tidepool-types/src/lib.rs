//! # tidepool-types
//!
//! Shared domain types for the tidepool rewards workspace.
//!
//! ## Modules
//!
//! - [`wei`] — wei-scale (1e18) fixed-point arithmetic helpers
//! - [`artifact`] — the interval rewards artifact committed to on-chain
//! - [`performance`] — the companion minipool performance report

pub mod artifact;
pub mod performance;
pub mod wei;

use alloy_primitives::FixedBytes;

/// Reward destination network identifier. Network 0 is the home network and
/// is always considered valid.
pub type NetworkId = u64;

/// BLS public key of a minipool's validator.
pub type ValidatorPubkey = FixedBytes<48>;

/// Fixed penalty-count threshold at which a node operator is treated as
/// cheating for the interval.
pub const CHEATER_PENALTY_THRESHOLD: u64 = 3;
