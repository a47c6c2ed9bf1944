//! The interval rewards artifact.
//!
//! One artifact is assembled per accounting interval, after every allocation
//! has run and every invariant has held. It is immutable once built: the
//! embedding service persists it (disk, IPFS) and submits its Merkle root
//! on-chain, so nothing in here may depend on iteration order or wall-clock
//! state. Node rewards are ordered by ascending address bytes and network
//! rewards by ascending network id; that ordering is part of the commitment
//! format.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::NetworkId;

/// Version of the artifact layout itself. Bumped when fields change shape so
/// historical artifacts remain parseable.
pub const REWARDS_FILE_VERSION: u64 = 3;

/// Interval-wide reward totals across all nodes and networks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalRewards {
    /// RPL absorbed by the protocol treasury, including all truncation dust.
    pub protocol_dao_rpl: U256,
    /// Sum of collateral RPL actually apportioned to nodes.
    pub total_collateral_rpl: U256,
    /// Sum of RPL actually apportioned to trusted (oracle DAO) members.
    pub total_oracle_dao_rpl: U256,
    /// Full smoothing pool balance at the snapshot block.
    pub total_smoothing_pool_eth: U256,
    /// Residual smoothing pool ETH assigned to pool stakers.
    pub pool_staker_smoothing_pool_eth: U256,
    /// Smoothing pool ETH assigned to node operators, bonuses included.
    pub node_operator_smoothing_pool_eth: U256,
    /// Total collateral eligibility weight across all eligible nodes.
    pub total_node_weight: U256,
}

/// Running reward totals for a single node operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReward {
    /// The node operator's address.
    pub address: Address,
    /// Resolved destination network. Invalid declared networks are redirected
    /// to network 0 before the entry is created.
    pub network: NetworkId,
    /// Collateral RPL earned this interval.
    pub collateral_rpl: U256,
    /// Trusted-member RPL earned this interval.
    pub oracle_dao_rpl: U256,
    /// Smoothing pool ETH earned this interval, bonuses included.
    pub smoothing_pool_eth: U256,
}

impl NodeReward {
    /// A fresh zeroed entry for a node whose destination network has already
    /// been resolved.
    pub fn new(address: Address, network: NetworkId) -> Self {
        Self {
            address,
            network,
            collateral_rpl: U256::ZERO,
            oracle_dao_rpl: U256::ZERO,
            smoothing_pool_eth: U256::ZERO,
        }
    }

    /// Combined RPL total, the amount committed in this node's Merkle leaf.
    pub fn total_rpl(&self) -> U256 {
        self.collateral_rpl + self.oracle_dao_rpl
    }
}

/// Running reward totals for a destination network, mirrored 1:1 from the
/// node entries resolved to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkReward {
    /// The destination network id.
    pub network: NetworkId,
    /// Collateral RPL routed to this network.
    pub collateral_rpl: U256,
    /// Trusted-member RPL routed to this network.
    pub oracle_dao_rpl: U256,
    /// Smoothing pool ETH routed to this network.
    pub smoothing_pool_eth: U256,
}

impl NetworkReward {
    /// A fresh zeroed entry for a network.
    pub fn new(network: NetworkId) -> Self {
        Self {
            network,
            collateral_rpl: U256::ZERO,
            oracle_dao_rpl: U256::ZERO,
            smoothing_pool_eth: U256::ZERO,
        }
    }
}

/// The terminal artifact for one interval.
///
/// Assembled once at the end of a successful run and never mutated. The
/// Merkle root commits to `node_rewards` in their recorded order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsArtifact {
    /// Artifact layout version ([`REWARDS_FILE_VERSION`]).
    pub rewards_file_version: u64,
    /// Apportionment ruleset that produced this artifact.
    pub ruleset_version: u64,
    /// The interval index.
    pub index: u64,
    /// Chain name this artifact was generated for.
    pub network: String,
    /// How many intervals this artifact spans (normally 1).
    pub intervals_passed: u64,
    /// Interval start, unix seconds (first slot of the start epoch).
    pub start_time: u64,
    /// Interval end, unix seconds (snapshot end slot).
    pub end_time: u64,
    /// First consensus slot of the interval.
    pub consensus_start_block: u64,
    /// Snapshot consensus slot.
    pub consensus_end_block: u64,
    /// Execution block matching the interval start.
    pub execution_start_block: u64,
    /// Execution block of the snapshot.
    pub execution_end_block: u64,
    /// Interval-wide totals.
    pub total_rewards: TotalRewards,
    /// Per-network totals, ascending network id.
    pub network_rewards: Vec<NetworkReward>,
    /// Per-node totals, ascending address bytes.
    pub node_rewards: Vec<NodeReward>,
    /// Merkle root over the node reward leaves.
    pub merkle_root: B256,
}
