//! Immutable per-run inputs.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// First ruleset supported by this engine.
pub const RULESET_V9: u64 = 9;

/// Ruleset that introduced the commission bonus.
pub const RULESET_V10: u64 = 10;

/// Whether the given ruleset pays commission bonuses.
pub fn bonuses_enabled(ruleset_version: u64) -> bool {
    ruleset_version >= RULESET_V10
}

/// Where the interval's snapshot was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEnd {
    /// Consensus slot of the snapshot.
    pub slot: u64,
    /// Consensus block recorded as the interval end.
    pub consensus_block: u64,
    /// Execution block recorded as the interval end.
    pub execution_block: u64,
}

/// Immutable inputs describing one interval run. Created once at run start
/// and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalContext {
    /// The interval index. Interval 0 has no discrete start time, so its
    /// smoothing pool is never apportioned.
    pub index: u64,
    /// Which apportionment ruleset to run.
    pub ruleset_version: u64,
    /// Chain name recorded in the artifact.
    pub network_name: String,
    /// How many intervals this run spans (normally 1).
    pub intervals_passed: u64,
    /// Snapshot end blocks.
    pub snapshot_end: SnapshotEnd,
    /// Merkle roots of the preceding intervals, carried for continuity checks
    /// by the embedding service. Not an apportionment input.
    pub prior_roots: Vec<B256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_gate() {
        assert!(!bonuses_enabled(RULESET_V9));
        assert!(bonuses_enabled(RULESET_V10));
        assert!(bonuses_enabled(RULESET_V10 + 1));
    }
}
