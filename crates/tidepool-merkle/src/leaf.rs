//! Leaf encoding for node reward commitments.

use alloy_primitives::{keccak256, B256, U256};
use tidepool_types::artifact::NodeReward;

/// Byte length of an encoded leaf: 20-byte address plus three 32-byte
/// big-endian amounts.
pub const LEAF_LEN: usize = 20 + 32 + 32 + 32;

/// Encode a node reward into its canonical leaf bytes.
///
/// Layout: `address || network || collateral + oracle DAO RPL || smoothing
/// pool ETH`, every amount as a 32-byte big-endian word. The RPL fields are
/// committed as one combined total; the split is recorded in the artifact
/// body only.
pub fn encode_leaf(reward: &NodeReward) -> [u8; LEAF_LEN] {
    let mut data = [0u8; LEAF_LEN];
    data[..20].copy_from_slice(reward.address.as_slice());
    data[20..52].copy_from_slice(&U256::from(reward.network).to_be_bytes::<32>());
    data[52..84].copy_from_slice(&reward.total_rpl().to_be_bytes::<32>());
    data[84..116].copy_from_slice(&reward.smoothing_pool_eth.to_be_bytes::<32>());
    data
}

/// Hash a node reward into its Merkle leaf.
pub fn leaf_hash(reward: &NodeReward) -> B256 {
    keccak256(encode_leaf(reward))
}
