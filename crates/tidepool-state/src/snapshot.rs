//! On-chain pool state at the snapshot block.
//!
//! A [`NetworkSnapshot`] is an immutable view of every input the rewards
//! engine reads from the chain: the node and minipool registries, trusted
//! member roster, percentage splits, balances, and the externally computed
//! collateral eligibility weights. It is created once per run and only read
//! afterwards.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use tidepool_types::wei::{floor_div, ONE_ETH, THIRTY_TWO_ETH};
use tidepool_types::{NetworkId, ValidatorPubkey};

use crate::CheaterSet;

/// Consensus chain timing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Genesis time, unix seconds.
    pub genesis_time: u64,
    /// Seconds per slot.
    pub seconds_per_slot: u64,
    /// Slots per epoch.
    pub slots_per_epoch: u64,
}

impl BeaconConfig {
    /// Wall-clock time of the given slot, unix seconds.
    pub fn slot_time(&self, slot: u64) -> u64 {
        self.genesis_time + slot * self.seconds_per_slot
    }

    /// First slot of the epoch containing the given slot.
    pub fn first_slot_of_epoch(&self, slot: u64) -> u64 {
        (slot / self.slots_per_epoch) * self.slots_per_epoch
    }
}

/// A registered node operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetails {
    /// The operator's address.
    pub address: Address,
    /// Declared reward destination network. Validated at apportionment time;
    /// an invalid declaration redirects to network 0.
    pub reward_network: NetworkId,
    /// Staked RPL backing the node's minipools.
    pub rpl_stake: U256,
    /// Externally computed collateral eligibility weight.
    pub weight: U256,
}

/// A single staking validator bonded with operator and pooled capital.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinipoolDetails {
    /// The minipool's address.
    pub address: Address,
    /// Validator public key.
    pub pubkey: ValidatorPubkey,
    /// Owning node operator.
    pub node: Address,
    /// Base commission rate (1e18 scale).
    pub node_fee: U256,
    /// Operator-supplied bond, out of the 32 ETH validator balance.
    pub node_deposit_balance: U256,
    /// On-chain penalty counter.
    pub penalty_count: u64,
}

/// A trusted (oracle DAO) member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleMemberDetails {
    /// The member's node address.
    pub address: Address,
    /// When the member joined, unix seconds.
    pub joined_time: u64,
}

/// Pool-wide amounts and percentages at the snapshot block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDetails {
    /// Token rewards pending for this interval.
    pub pending_rpl_rewards: U256,
    /// Treasury share of the pending rewards (1e18 scale).
    pub protocol_dao_percent: U256,
    /// Collateral (node operator) share of the pending rewards (1e18 scale).
    pub node_operator_percent: U256,
    /// Trusted-member share of the pending rewards (1e18 scale).
    pub trusted_node_percent: U256,
    /// Smoothing pool balance at the snapshot block.
    pub smoothing_pool_balance: U256,
    /// Nominal interval duration in seconds.
    pub interval_duration_secs: u64,
    /// RPL price in ETH (1e18 scale), for borrowed-stake coverage.
    pub rpl_price: U256,
}

/// Immutable on-chain state at the snapshot block.
#[derive(Clone, Debug)]
pub struct NetworkSnapshot {
    /// Execution block number of the snapshot.
    pub execution_block: u64,
    /// Timestamp of the snapshot block, unix seconds.
    pub execution_block_time: u64,
    /// Consensus chain timing.
    pub beacon: BeaconConfig,
    /// Pool-wide amounts and percentages.
    pub pool: PoolDetails,
    /// All registered nodes, in registration order.
    pub nodes: Vec<NodeDetails>,
    /// All minipools, in registration order.
    pub minipools: Vec<MinipoolDetails>,
    /// Trusted member roster.
    pub oracle_members: Vec<OracleMemberDetails>,
    nodes_by_address: BTreeMap<Address, usize>,
    minipools_by_address: BTreeMap<Address, usize>,
    minipools_by_node: BTreeMap<Address, Vec<usize>>,
}

impl NetworkSnapshot {
    /// Assemble a snapshot and build its lookup indices.
    pub fn new(
        execution_block: u64,
        execution_block_time: u64,
        beacon: BeaconConfig,
        pool: PoolDetails,
        nodes: Vec<NodeDetails>,
        minipools: Vec<MinipoolDetails>,
        oracle_members: Vec<OracleMemberDetails>,
    ) -> Self {
        let nodes_by_address = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.address, i))
            .collect();
        let minipools_by_address = minipools
            .iter()
            .enumerate()
            .map(|(i, m)| (m.address, i))
            .collect();
        let mut minipools_by_node: BTreeMap<Address, Vec<usize>> = BTreeMap::new();
        for (i, minipool) in minipools.iter().enumerate() {
            minipools_by_node.entry(minipool.node).or_default().push(i);
        }
        Self {
            execution_block,
            execution_block_time,
            beacon,
            pool,
            nodes,
            minipools,
            oracle_members,
            nodes_by_address,
            minipools_by_address,
            minipools_by_node,
        }
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of registered minipools.
    pub fn minipool_count(&self) -> usize {
        self.minipools.len()
    }

    /// Look up a node by address.
    pub fn node(&self, address: Address) -> Option<&NodeDetails> {
        self.nodes_by_address.get(&address).map(|&i| &self.nodes[i])
    }

    /// Look up a minipool by address.
    pub fn minipool(&self, address: Address) -> Option<&MinipoolDetails> {
        self.minipools_by_address
            .get(&address)
            .map(|&i| &self.minipools[i])
    }

    /// All minipools owned by the given node, in registration order.
    pub fn minipools_of(&self, node: Address) -> impl Iterator<Item = &MinipoolDetails> {
        self.minipools_by_node
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&i| &self.minipools[i])
    }

    /// Collateral eligibility weights for the interval, with cheater
    /// contributions excluded, plus their total.
    ///
    /// The weight formula itself is computed upstream and carried on
    /// [`NodeDetails::weight`]; this only filters and sums it.
    pub fn calculate_node_weights(&self, cheaters: &CheaterSet) -> (BTreeMap<Address, U256>, U256) {
        let mut weights = BTreeMap::new();
        let mut total = U256::ZERO;
        for node in &self.nodes {
            let weight = if cheaters.contains(&node.address) {
                U256::ZERO
            } else {
                node.weight
            };
            total += weight;
            weights.insert(node.address, weight);
        }
        (weights, total)
    }

    /// ETH borrowed from the pool across the node's minipools: the portion of
    /// each 32 ETH validator balance not covered by the operator's bond.
    pub fn eligible_borrowed_eth(&self, node: Address) -> U256 {
        self.minipools_of(node)
            .map(|m| THIRTY_TWO_ETH.saturating_sub(m.node_deposit_balance))
            .fold(U256::ZERO, |acc, b| acc + b)
    }

    /// Value of the node's staked RPL as a fraction of its borrowed ETH
    /// (1e18 scale; 0.10 means the stake covers 10% of the borrowed value).
    pub fn staked_rpl_value_percent_of_borrowed(
        &self,
        borrowed_eth: U256,
        rpl_stake: U256,
    ) -> U256 {
        if borrowed_eth.is_zero() {
            return U256::ZERO;
        }
        let staked_value = floor_div(rpl_stake * self.pool.rpl_price, ONE_ETH);
        floor_div(staked_value * ONE_ETH, borrowed_eth)
    }
}
