//! Mirrored node/network reward tables.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use tidepool_types::artifact::{NetworkReward, NodeReward};
use tidepool_types::NetworkId;

/// The running per-node and per-network reward totals for one run.
///
/// The two tables move together: every credit lands in a node entry and in
/// the entry of that node's resolved network in the same call, so the sum of
/// any reward field over the networks equals its sum over the nodes at all
/// times, not just at the end. Node entries are created lazily on the first
/// non-zero credit, with the destination network fixed at creation.
///
/// Owned exclusively by the run that creates it; `BTreeMap` keys double as
/// the canonical commitment ordering (ascending address bytes, ascending
/// network id).
#[derive(Debug, Default)]
pub struct RewardAccumulator {
    nodes: BTreeMap<Address, NodeReward>,
    networks: BTreeMap<NetworkId, NetworkReward>,
}

impl RewardAccumulator {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The network a node's entry was created with, if the node has earned
    /// anything yet. Later credits reuse this resolution.
    pub fn node_network(&self, address: Address) -> Option<NetworkId> {
        self.nodes.get(&address).map(|n| n.network)
    }

    /// Credit collateral RPL to a node and its network.
    pub fn credit_collateral(&mut self, address: Address, network: NetworkId, amount: U256) {
        let (node_network, node) = self.node_entry(address, network);
        node.collateral_rpl += amount;
        self.network_entry(node_network).collateral_rpl += amount;
        debug_assert!(self.is_mirrored());
    }

    /// Credit trusted-member RPL to a node and its network.
    pub fn credit_oracle_dao(&mut self, address: Address, network: NetworkId, amount: U256) {
        let (node_network, node) = self.node_entry(address, network);
        node.oracle_dao_rpl += amount;
        self.network_entry(node_network).oracle_dao_rpl += amount;
        debug_assert!(self.is_mirrored());
    }

    /// Credit smoothing pool ETH to a node and its network.
    pub fn credit_smoothing_eth(&mut self, address: Address, network: NetworkId, amount: U256) {
        let (node_network, node) = self.node_entry(address, network);
        node.smoothing_pool_eth += amount;
        self.network_entry(node_network).smoothing_pool_eth += amount;
        debug_assert!(self.is_mirrored());
    }

    /// Sum of collateral RPL over the network table.
    pub fn total_collateral(&self) -> U256 {
        self.networks
            .values()
            .fold(U256::ZERO, |acc, n| acc + n.collateral_rpl)
    }

    /// Sum of trusted-member RPL over the network table.
    pub fn total_oracle_dao(&self) -> U256 {
        self.networks
            .values()
            .fold(U256::ZERO, |acc, n| acc + n.oracle_dao_rpl)
    }

    /// Sum of smoothing pool ETH over the network table.
    pub fn total_smoothing_eth(&self) -> U256 {
        self.networks
            .values()
            .fold(U256::ZERO, |acc, n| acc + n.smoothing_pool_eth)
    }

    /// Whether the node and network tables still mirror each other.
    pub fn is_mirrored(&self) -> bool {
        let sum = |f: fn(&NodeReward) -> U256| {
            self.nodes.values().fold(U256::ZERO, |acc, n| acc + f(n))
        };
        sum(|n| n.collateral_rpl) == self.total_collateral()
            && sum(|n| n.oracle_dao_rpl) == self.total_oracle_dao()
            && sum(|n| n.smoothing_pool_eth) == self.total_smoothing_eth()
    }

    /// Materialize both tables in canonical commitment order.
    pub fn into_ordered(self) -> (Vec<NodeReward>, Vec<NetworkReward>) {
        (
            self.nodes.into_values().collect(),
            self.networks.into_values().collect(),
        )
    }

    fn node_entry(&mut self, address: Address, network: NetworkId) -> (NetworkId, &mut NodeReward) {
        let node = self
            .nodes
            .entry(address)
            .or_insert_with(|| NodeReward::new(address, network));
        (node.network, node)
    }

    fn network_entry(&mut self, network: NetworkId) -> &mut NetworkReward {
        self.networks
            .entry(network)
            .or_insert_with(|| NetworkReward::new(network))
    }
}
