//! The minipool performance report.
//!
//! A companion document to the rewards artifact, keyed by minipool address.
//! It is not committed to the Merkle root but is published alongside the
//! artifact for operator diagnostics, so it carries the same version fields
//! and must serialize deterministically (`BTreeMap` keys, sorted slot lists).

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::ValidatorPubkey;

/// Per-minipool attestation performance and earnings for one interval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinipoolPerformance {
    /// Validator public key backing the minipool.
    pub pubkey: ValidatorPubkey,
    /// Attestations credited to the minipool this interval.
    pub successful_attestations: u64,
    /// Attestations the minipool missed this interval.
    pub missed_attestations: u64,
    /// Cheater-adjusted attestation score (1e18 scale).
    pub attestation_score: U256,
    /// Base smoothing pool ETH earned.
    pub eth_earned: U256,
    /// Commission bonus ETH earned, when the minipool qualified.
    pub bonus_eth_earned: Option<U256>,
    /// Consensus-layer income measured over the interval. Negative when the
    /// validator was penalized more than it earned.
    pub consensus_income: Option<I256>,
    /// Bonus-adjusted commission rate, when a bonus applied.
    pub effective_commission: Option<U256>,
    /// Slots of missed attestations, sorted ascending.
    pub missed_attestation_slots: Vec<u64>,
}

/// The full performance report for one interval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinipoolPerformanceReport {
    /// Artifact layout version, matching the rewards artifact.
    pub rewards_file_version: u64,
    /// Apportionment ruleset version, matching the rewards artifact.
    pub ruleset_version: u64,
    /// The interval index.
    pub index: u64,
    /// Chain name this report was generated for.
    pub network: String,
    /// Interval start, unix seconds.
    pub start_time: u64,
    /// Interval end, unix seconds.
    pub end_time: u64,
    /// First consensus slot of the interval.
    pub consensus_start_block: u64,
    /// Snapshot consensus slot.
    pub consensus_end_block: u64,
    /// Execution block matching the interval start.
    pub execution_start_block: u64,
    /// Execution block of the snapshot.
    pub execution_end_block: u64,
    /// Uniform scale-down applied to bonuses when the pool could not cover
    /// them (1e18 = no scaling). Recorded even when unused.
    pub bonus_scalar: U256,
    /// Per-minipool performance, keyed by minipool address.
    pub minipool_performance: BTreeMap<Address, MinipoolPerformance>,
}
