//! Rolling attestation record.
//!
//! The record accumulates per-minipool attestation performance across an
//! interval; how it is built and persisted is the embedding service's
//! concern. The engine consumes it through one query: [`RollingRecord::
//! get_scores`], which applies the interval's cheater set and returns the
//! eligible minipools with their score totals.

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use tidepool_types::ValidatorPubkey;

use crate::CheaterSet;

/// Attestation performance of one minipool over the interval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinipoolAttestations {
    /// The minipool's address.
    pub minipool: Address,
    /// Owning node operator.
    pub node: Address,
    /// Validator public key.
    pub pubkey: ValidatorPubkey,
    /// Attestations credited to the minipool.
    pub successful_attestations: u64,
    /// Performance score across those attestations (1e18 scale).
    pub attestation_score: U256,
    /// Slots of missed attestations, in observation order.
    pub missed_slots: Vec<u64>,
    /// Consensus-layer income over the interval; negative when penalties
    /// outweighed earnings.
    pub consensus_income: I256,
}

/// The rolling record for one interval.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingRecord {
    /// First attested slot covered by the record.
    pub start_slot: u64,
    /// Per-minipool performance, in record order.
    pub minipools: Vec<MinipoolAttestations>,
}

/// Result of a scoring query: the eligible minipools and their totals.
#[derive(Clone, Debug)]
pub struct ScoreQuery<'a> {
    /// Minipools eligible for smoothing pool rewards, record order preserved.
    pub minipools: Vec<&'a MinipoolAttestations>,
    /// Sum of eligible attestation scores (1e18 scale).
    pub total_score: U256,
    /// Sum of eligible successful attestations.
    pub attestation_count: u64,
}

impl RollingRecord {
    /// Score the record for the interval, excluding every minipool owned by a
    /// cheating node from the result set and from both totals.
    pub fn get_scores(&self, cheaters: &CheaterSet) -> ScoreQuery<'_> {
        let mut minipools = Vec::with_capacity(self.minipools.len());
        let mut total_score = U256::ZERO;
        let mut attestation_count = 0u64;
        for entry in &self.minipools {
            if cheaters.contains(&entry.node) {
                continue;
            }
            total_score += entry.attestation_score;
            attestation_count += entry.successful_attestations;
            minipools.push(entry);
        }
        tracing::debug!(
            eligible = minipools.len(),
            excluded = self.minipools.len() - minipools.len(),
            attestation_count,
            "scored rolling record"
        );
        ScoreQuery {
            minipools,
            total_score,
            attestation_count,
        }
    }
}
