//! Penalty-based node exclusion.

use tidepool_state::snapshot::NetworkSnapshot;
use tidepool_state::CheaterSet;
use tidepool_types::CHEATER_PENALTY_THRESHOLD;

/// Flag every node with a repeatedly penalized minipool.
///
/// A single minipool at the penalty threshold bans the whole node for the
/// interval, not just that minipool: the ban has to remove any incentive to
/// sacrifice one validator key to protect the others. Pure function over the
/// snapshot; the set is derived fresh each run.
pub fn detect_cheaters(snapshot: &NetworkSnapshot) -> CheaterSet {
    let mut cheaters = CheaterSet::new();
    for node in &snapshot.nodes {
        let banned = snapshot
            .minipools_of(node.address)
            .any(|m| m.penalty_count >= CHEATER_PENALTY_THRESHOLD);
        if banned {
            cheaters.insert(node.address);
        }
    }
    if !cheaters.is_empty() {
        tracing::warn!(count = cheaters.len(), "flagged cheating nodes for the interval");
    }
    cheaters
}
