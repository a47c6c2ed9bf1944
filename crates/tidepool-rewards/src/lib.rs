//! # tidepool-rewards
//!
//! The rewards apportionment and commitment engine.
//!
//! Each accounting interval, every independent operator runs this engine over
//! the same inputs — an on-chain snapshot, a rolling attestation record, and
//! an interval context — and must arrive at a byte-identical artifact. The
//! engine splits the pending token rewards among the treasury, node
//! operators, and trusted members, splits the smoothing pool between pool
//! stakers and node operators by attestation score, applies the commission
//! bonus where the ruleset enables it, and commits the result as a Merkle
//! root.
//!
//! One run is one single-threaded, synchronous computation. The only
//! suspension points are the execution/consensus client calls, and any
//! failure there — or any violated economic invariant — abandons the run
//! without emitting a partial artifact.
//!
//! ## Modules
//!
//! - [`context`] — immutable per-run inputs and ruleset gates
//! - [`cheaters`] — penalty-based node exclusion
//! - [`network_check`] — reward destination network validation with a per-run
//!   cache
//! - [`accumulator`] — mirrored node/network reward tables
//! - [`generator`] — run orchestration and artifact assembly
//! - [`rpl`] — token reward apportionment
//! - [`eth`] — smoothing pool apportionment
//! - [`bonus`] — commission bonus calculation

pub mod accumulator;
pub mod bonus;
pub mod cheaters;
pub mod context;
pub mod eth;
pub mod generator;
pub mod network_check;
pub mod rpl;

#[cfg(test)]
pub(crate) mod testutil;

use alloy_primitives::{Address, U256};

use tidepool_state::clients::ClientError;

pub use bonus::{AlwaysEligible, BonusEligibility};
pub use context::{IntervalContext, SnapshotEnd};
pub use generator::{GenerateResult, TreeGenerator};

/// A fatal condition that aborts the run. No partial artifact is ever
/// emitted: a partially correct reward commitment cannot be un-submitted
/// once published, so every fatal error abandons everything.
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    /// The interval has no pending token rewards to distribute.
    #[error("no pending token rewards for interval {index}; the interval cannot be used for a rewards submission")]
    NoPendingRewards {
        /// The interval index.
        index: u64,
    },

    /// The consensus block at the interval's start slot could not be found.
    #[error("no consensus block at interval start slot {slot}; the beacon node likely checkpoint synced and has not backfilled to the previous interval")]
    MissingStartBlock {
        /// The missing slot.
        slot: u64,
    },

    /// A weighted split's actual total drifted from its budget by more than
    /// the tolerated truncation epsilon. Indicates a modeling bug, not
    /// acceptable rounding.
    #[error("{split} total {actual} deviates from expected {expected} by more than epsilon {epsilon}")]
    EpsilonExceeded {
        /// Which split failed.
        split: &'static str,
        /// The budgeted total.
        expected: U256,
        /// The summed per-entity total.
        actual: U256,
        /// The tolerated drift.
        epsilon: U256,
    },

    /// A bonus-adjusted commission crossed the 14% structural cap the
    /// rewards contract guarantees can never be exceeded.
    #[error("minipool {minipool} bonus commission {commission} exceeds the structural cap")]
    CommissionCapExceeded {
        /// The offending minipool.
        minipool: Address,
        /// The computed commission (1e18 scale).
        commission: U256,
    },

    /// Node operator shares would exceed the smoothing pool balance, leaving
    /// pool stakers with a negative remainder.
    #[error("node operator ETH {node_operator_eth} exceeds the smoothing pool balance {balance}")]
    NegativeStakerRemainder {
        /// Total ETH assigned to node operators.
        node_operator_eth: U256,
        /// The smoothing pool balance.
        balance: U256,
    },

    /// A run input referenced a node the snapshot does not know.
    #[error("node {0} is referenced by the run inputs but missing from the snapshot")]
    UnknownNode(Address),

    /// The rolling record referenced a minipool the snapshot does not know.
    #[error("minipool {0} is referenced by the rolling record but missing from the snapshot")]
    UnknownMinipool(Address),

    /// An external client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, RewardsError>;
