//! Execution and consensus client contracts.
//!
//! The engine's only suspension points. Calls are synchronous and blocking
//! from the run's perspective; a failed call aborts the whole run. Retry
//! policy, if any, belongs to the implementing client, not here.

use serde::{Deserialize, Serialize};

use tidepool_types::NetworkId;

/// An execution-layer block header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,
    /// Block timestamp, unix seconds.
    pub timestamp: u64,
}

/// The consensus-layer facts the engine needs about one beacon block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockInfo {
    /// The block's slot.
    pub slot: u64,
    /// Execution block number carried in the block's payload.
    pub execution_block_number: u64,
}

/// A client request that failed. Always fatal for the run in progress.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The execution client RPC failed.
    #[error("execution client request failed: {0}")]
    Execution(String),

    /// The consensus client RPC failed.
    #[error("consensus client request failed: {0}")]
    Consensus(String),
}

/// Execution-layer queries the engine depends on.
pub trait ExecutionClient {
    /// Fetch the header of the given block.
    fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError>;

    /// Whether the given reward destination network is enabled on-chain,
    /// evaluated at the given block.
    fn is_network_enabled(&self, network: NetworkId, at_block: u64) -> Result<bool, ClientError>;
}

/// Consensus-layer queries the engine depends on.
pub trait ConsensusClient {
    /// Fetch the block at the given slot. `Ok(None)` means the slot is
    /// genuinely empty or not backfilled, as opposed to a failed request.
    fn block_at_slot(&self, slot: u64) -> Result<Option<BeaconBlockInfo>, ClientError>;
}
