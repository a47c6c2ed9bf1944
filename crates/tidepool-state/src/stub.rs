//! Deterministic in-memory clients.
//!
//! Used by tests and by embedding services that replay recorded chain data.
//! Lookups hit fixed tables; a missing entry is reported as a failed request,
//! matching how a live client surfaces an unreachable endpoint.

use std::collections::{BTreeMap, BTreeSet};

use tidepool_types::NetworkId;

use crate::clients::{BeaconBlockInfo, BlockHeader, ClientError, ConsensusClient, ExecutionClient};

/// An execution client backed by fixed tables.
#[derive(Clone, Debug, Default)]
pub struct StaticExecutionClient {
    headers: BTreeMap<u64, BlockHeader>,
    enabled_networks: BTreeSet<NetworkId>,
}

impl StaticExecutionClient {
    /// An empty client; populate it with [`with_header`](Self::with_header)
    /// and [`with_enabled_network`](Self::with_enabled_network).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block header.
    pub fn with_header(mut self, header: BlockHeader) -> Self {
        self.headers.insert(header.number, header);
        self
    }

    /// Mark a reward network as enabled.
    pub fn with_enabled_network(mut self, network: NetworkId) -> Self {
        self.enabled_networks.insert(network);
        self
    }
}

impl ExecutionClient for StaticExecutionClient {
    fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError> {
        self.headers
            .get(&number)
            .copied()
            .ok_or_else(|| ClientError::Execution(format!("no header for block {number}")))
    }

    fn is_network_enabled(&self, network: NetworkId, _at_block: u64) -> Result<bool, ClientError> {
        Ok(self.enabled_networks.contains(&network))
    }
}

/// A consensus client backed by a fixed slot table.
#[derive(Clone, Debug, Default)]
pub struct StaticConsensusClient {
    blocks: BTreeMap<u64, BeaconBlockInfo>,
}

impl StaticConsensusClient {
    /// An empty client; populate it with [`with_block`](Self::with_block).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a beacon block. Slots without a registered block report as
    /// empty, not as errors.
    pub fn with_block(mut self, block: BeaconBlockInfo) -> Self {
        self.blocks.insert(block.slot, block);
        self
    }
}

impl ConsensusClient for StaticConsensusClient {
    fn block_at_slot(&self, slot: u64) -> Result<Option<BeaconBlockInfo>, ClientError> {
        Ok(self.blocks.get(&slot).copied())
    }
}
