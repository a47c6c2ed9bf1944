//! # tidepool-merkle
//!
//! Canonical commitment over an interval's node rewards.
//!
//! Every independent operator must derive a byte-identical Merkle root from
//! the same reward set, so both the leaf encoding and the tree shape are fixed
//! here and versioned through the artifact's `rewards_file_version`:
//!
//! - Leaves are keccak256 over `address(20) || network(u256 BE) ||
//!   total RPL(u256 BE) || smoothing pool ETH(u256 BE)`, in the artifact's
//!   node order (ascending address bytes).
//! - Parents are keccak256 over the pair's two hashes with the
//!   lexicographically smaller hash first, so proof verification does not need
//!   position bits.
//! - A level with an odd number of nodes duplicates its last element.
//! - An empty reward set commits to the all-zero root.
//!
//! ## Modules
//!
//! - [`leaf`] — leaf encoding and hashing
//! - [`tree`] — tree construction, root, proofs

pub mod leaf;
pub mod tree;

pub use leaf::{encode_leaf, leaf_hash};
pub use tree::{verify_proof, RewardsTree};
