//! Merkle tree construction and proofs.

use alloy_primitives::{keccak256, B256};

/// Hash a parent from two child hashes, smaller hash first.
fn hash_pair(a: &B256, b: &B256) -> B256 {
    let mut data = [0u8; 64];
    if a <= b {
        data[..32].copy_from_slice(a.as_slice());
        data[32..].copy_from_slice(b.as_slice());
    } else {
        data[..32].copy_from_slice(b.as_slice());
        data[32..].copy_from_slice(a.as_slice());
    }
    keccak256(data)
}

/// A Merkle tree over an interval's reward leaves.
///
/// Keeps every level so membership proofs can be produced after the root is
/// committed. An empty leaf set is a valid tree with the all-zero root.
#[derive(Clone, Debug)]
pub struct RewardsTree {
    levels: Vec<Vec<B256>>,
}

impl RewardsTree {
    /// Build the tree from the leaf hashes in their committed order.
    pub fn build(leaves: Vec<B256>) -> Self {
        if leaves.is_empty() {
            return Self { levels: Vec::new() };
        }

        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for chunk in current.chunks(2) {
                let left = &chunk[0];
                // Odd level: duplicate the last element.
                let right = chunk.get(1).unwrap_or(left);
                next.push(hash_pair(left, right));
            }
            levels.push(next);
        }
        Self { levels }
    }

    /// The committed root.
    pub fn root(&self) -> B256 {
        match self.levels.last() {
            Some(top) => top[0],
            None => B256::ZERO,
        }
    }

    /// Number of leaves committed.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Membership proof for the leaf at `index`, or `None` when out of range.
    ///
    /// The proof lists sibling hashes from leaf level to just below the root.
    /// Positions are not encoded; verification re-sorts each pair.
    pub fn proof(&self, index: usize) -> Option<Vec<B256>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut proof = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = position ^ 1;
            // A lone last element pairs with itself.
            let hash = level.get(sibling).unwrap_or(&level[position]);
            proof.push(*hash);
            position /= 2;
        }
        Some(proof)
    }
}

/// Verify a membership proof produced by [`RewardsTree::proof`].
pub fn verify_proof(root: B256, leaf: B256, proof: &[B256]) -> bool {
    let mut hash = leaf;
    for sibling in proof {
        hash = hash_pair(&hash, sibling);
    }
    hash == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u8) -> Vec<B256> {
        (0..n).map(B256::repeat_byte).collect()
    }

    #[test]
    fn test_empty_tree_zero_root() {
        let tree = RewardsTree::build(Vec::new());
        assert_eq!(tree.root(), B256::ZERO);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.proof(0), None);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let leaf = B256::repeat_byte(0x42);
        let tree = RewardsTree::build(vec![leaf]);
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.proof(0), Some(Vec::new()));
    }

    #[test]
    fn test_two_leaves_sorted_pair() {
        let a = B256::repeat_byte(0x02);
        let b = B256::repeat_byte(0x01);
        let tree = RewardsTree::build(vec![a, b]);
        // The pair is sorted before hashing, so leaf order does not change
        // the parent, only the proof indices.
        let mut data = [0u8; 64];
        data[..32].copy_from_slice(b.as_slice());
        data[32..].copy_from_slice(a.as_slice());
        assert_eq!(tree.root(), keccak256(data));
    }

    #[test]
    fn test_root_depends_on_leaf_set() {
        let r1 = RewardsTree::build(leaves(4)).root();
        let mut altered = leaves(4);
        altered[2] = B256::repeat_byte(0xff);
        let r2 = RewardsTree::build(altered).root();
        assert_ne!(r1, r2);
    }

    #[test]
    fn test_deterministic() {
        let r1 = RewardsTree::build(leaves(7)).root();
        let r2 = RewardsTree::build(leaves(7)).root();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_proofs_verify_even_count() {
        let tree = RewardsTree::build(leaves(8));
        for (i, leaf) in leaves(8).iter().enumerate() {
            let proof = tree.proof(i).expect("proof in range");
            assert!(verify_proof(tree.root(), *leaf, &proof), "leaf {i}");
        }
    }

    #[test]
    fn test_proofs_verify_odd_count() {
        // Odd levels exercise the duplicate-last rule.
        for n in [3u8, 5, 7, 9] {
            let tree = RewardsTree::build(leaves(n));
            for (i, leaf) in leaves(n).iter().enumerate() {
                let proof = tree.proof(i).expect("proof in range");
                assert!(verify_proof(tree.root(), *leaf, &proof), "n={n} leaf {i}");
            }
        }
    }

    #[test]
    fn test_wrong_leaf_fails_verification() {
        let tree = RewardsTree::build(leaves(5));
        let proof = tree.proof(2).expect("proof in range");
        assert!(!verify_proof(tree.root(), B256::repeat_byte(0xde), &proof));
    }

    #[test]
    fn test_proof_out_of_range() {
        let tree = RewardsTree::build(leaves(3));
        assert!(tree.proof(3).is_none());
    }
}
