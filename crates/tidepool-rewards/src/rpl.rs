//! Token (RPL) reward apportionment.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use tidepool_state::CheaterSet;
use tidepool_types::wei::{display_eth, floor_div, ONE_ETH};

use crate::generator::TreeGenerator;
use crate::{Result, RewardsError};

impl TreeGenerator<'_> {
    /// Split the interval's pending token rewards among the treasury, node
    /// operators (by collateral weight), and trusted members (by
    /// time-weighted participation).
    ///
    /// Accumulator updates happen per node as soon as each reward is known,
    /// so an abort mid-loop leaves a consistent partial state for
    /// diagnostics. The treasury takes the residual after both weighted
    /// splits, absorbing every wei of truncation drift.
    pub(crate) fn apportion_rpl(&mut self, cheaters: &CheaterSet) -> Result<()> {
        let snapshot = self.snapshot;
        let pending = snapshot.pool.pending_rpl_rewards;
        tracing::info!(pending = %display_eth(pending), "pending RPL rewards");
        if pending.is_zero() {
            return Err(RewardsError::NoPendingRewards {
                index: self.context.index,
            });
        }

        let expected_treasury = floor_div(pending * snapshot.pool.protocol_dao_percent, ONE_ETH);
        tracing::info!(expected = %display_eth(expected_treasury), "expected treasury RPL");

        // Collateral rewards, apportioned by cheater-adjusted weight.
        let collateral_budget = floor_div(pending * snapshot.pool.node_operator_percent, ONE_ETH);
        tracing::info!(budget = %display_eth(collateral_budget), "collateral RPL budget");
        let (weights, total_weight) = snapshot.calculate_node_weights(cheaters);
        if total_weight.is_zero() {
            tracing::warn!("no node is eligible for collateral rewards; the budget flows to the treasury");
        } else {
            self.totals.total_node_weight = total_weight;
            for node in &snapshot.nodes {
                let weight = weights.get(&node.address).copied().unwrap_or(U256::ZERO);
                if weight.is_zero() {
                    // Weightless nodes earn exactly zero; no entry is created.
                    continue;
                }
                let reward = floor_div(collateral_budget * weight, total_weight);
                if reward.is_zero() {
                    continue;
                }
                let network = self.resolve_network(node.address)?;
                self.accumulator.credit_collateral(node.address, network, reward);
            }
            let actual = self.accumulator.total_collateral();
            self.check_epsilon("collateral RPL", collateral_budget, actual)?;
            self.totals.total_collateral_rpl = actual;
        }

        // Trusted member rewards, apportioned by participation time, clamped
        // to the interval duration for members who joined before it began.
        let trusted_budget = floor_div(pending * snapshot.pool.trusted_node_percent, ONE_ETH);
        tracing::info!(budget = %display_eth(trusted_budget), "trusted member RPL budget");
        let mut participation = BTreeMap::new();
        let mut total_participation = U256::ZERO;
        for member in &snapshot.oracle_members {
            let eligible = snapshot.execution_block_time.saturating_sub(member.joined_time);
            let seconds = eligible.min(snapshot.pool.interval_duration_secs);
            participation.insert(member.address, U256::from(seconds));
            total_participation += U256::from(seconds);
        }
        if !total_participation.is_zero() {
            for member in &snapshot.oracle_members {
                let time = participation
                    .get(&member.address)
                    .copied()
                    .unwrap_or(U256::ZERO);
                let reward = floor_div(trusted_budget * time, total_participation);
                if reward.is_zero() {
                    continue;
                }
                let network = self.resolve_network(member.address)?;
                self.accumulator.credit_oracle_dao(member.address, network, reward);
            }
        }
        let actual_trusted = self.accumulator.total_oracle_dao();
        self.check_epsilon("trusted member RPL", trusted_budget, actual_trusted)?;
        self.totals.total_oracle_dao_rpl = actual_trusted;

        // Residual absorption: treasury + collateral + trusted == pending,
        // exactly, with the treasury taking all truncation dust.
        self.totals.protocol_dao_rpl =
            pending - self.totals.total_collateral_rpl - actual_trusted;
        tracing::info!(
            treasury = %display_eth(self.totals.protocol_dao_rpl),
            "treasury RPL after residual absorption"
        );
        Ok(())
    }
}
