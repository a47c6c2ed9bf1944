//! Smoothing pool (ETH) apportionment.

use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};

use tidepool_state::CheaterSet;
use tidepool_types::performance::MinipoolPerformance;
use tidepool_types::wei::{display_eth, floor_div, ONE_ETH};
use tidepool_types::ValidatorPubkey;

use crate::context::bonuses_enabled;
use crate::generator::TreeGenerator;
use crate::{Result, RewardsError};

/// Working state for one minipool's smoothing pool share.
#[derive(Clone, Debug)]
pub(crate) struct MinipoolSmoothing {
    pub(crate) address: Address,
    pub(crate) pubkey: ValidatorPubkey,
    pub(crate) successful_attestations: u64,
    pub(crate) missed_slots: Vec<u64>,
    pub(crate) attestation_score: U256,
    pub(crate) consensus_income: I256,
    pub(crate) share: U256,
    /// Set by the bonus calculator when the minipool qualifies.
    pub(crate) bonus: Option<U256>,
    pub(crate) effective_commission: Option<U256>,
}

/// Working state for one node's smoothing pool earnings.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeSmoothingDetails {
    pub(crate) smoothing_pool_eth: U256,
    pub(crate) bonus_eth: U256,
    pub(crate) minipools: Vec<MinipoolSmoothing>,
}

/// Outcome of the share calculation, before accumulator credits.
struct SmoothingShares {
    node_details: BTreeMap<Address, NodeSmoothingDetails>,
    pool_staker_eth: U256,
    node_operator_eth: U256,
    bonus_scalar: U256,
}

impl TreeGenerator<'_> {
    /// Split the smoothing pool balance between pool stakers and node
    /// operators, weighted by attestation score.
    ///
    /// A zero balance and the very first interval are both silent no-ops:
    /// there is nothing to split, or no discrete start time to measure
    /// against.
    pub(crate) fn apportion_smoothing_pool(&mut self, cheaters: &CheaterSet) -> Result<()> {
        let snapshot = self.snapshot;
        let balance = snapshot.pool.smoothing_pool_balance;
        tracing::info!(balance = %display_eth(balance), "smoothing pool balance");
        if balance.is_zero() {
            return Ok(());
        }
        if self.context.index == 0 {
            tracing::info!("first interval has no discrete start time; skipping smoothing pool rewards");
            return Ok(());
        }

        self.resolve_interval_bounds()?;

        let shares = self.calculate_smoothing_shares(cheaters, balance)?;
        self.bonus_scalar = shares.bonus_scalar;

        for (address, details) in shares.node_details {
            if details.smoothing_pool_eth.is_zero() {
                continue;
            }
            let network = self.resolve_network(address)?;
            self.accumulator
                .credit_smoothing_eth(address, network, details.smoothing_pool_eth);

            for minipool in details.minipools {
                let total_attestations =
                    minipool.successful_attestations + minipool.missed_slots.len() as u64;
                if total_attestations == 0 {
                    // Minipools that never attested stay out of the report.
                    continue;
                }
                self.performance.insert(
                    minipool.address,
                    MinipoolPerformance {
                        pubkey: minipool.pubkey,
                        successful_attestations: minipool.successful_attestations,
                        missed_attestations: minipool.missed_slots.len() as u64,
                        attestation_score: minipool.attestation_score,
                        eth_earned: minipool.share,
                        bonus_eth_earned: minipool.bonus,
                        consensus_income: minipool
                            .bonus
                            .is_some()
                            .then_some(minipool.consensus_income),
                        effective_commission: minipool.effective_commission,
                        missed_attestation_slots: minipool.missed_slots,
                    },
                );
            }
        }

        self.totals.pool_staker_smoothing_pool_eth = shares.pool_staker_eth;
        self.totals.node_operator_smoothing_pool_eth = shares.node_operator_eth;
        self.totals.total_smoothing_pool_eth = balance;
        Ok(())
    }

    /// Resolve the interval's start block and times through the rolling
    /// record's start slot and both chain clients.
    fn resolve_interval_bounds(&mut self) -> Result<()> {
        let snapshot = self.snapshot;
        let start_slot = self.record.start_slot;
        let block = self
            .consensus
            .block_at_slot(start_slot)?
            .ok_or(RewardsError::MissingStartBlock { slot: start_slot })?;
        let start_header = self.execution.header_by_number(block.execution_block_number)?;

        self.consensus_start_block = start_slot;
        self.execution_start_block = block.execution_block_number;
        self.consensus_end_block = self.context.snapshot_end.consensus_block;
        self.execution_end_block = self.context.snapshot_end.execution_block;
        // The record's start slot is the first non-missing slot and sits in
        // the interval's first epoch, so that epoch's first slot carries the
        // interval's start time.
        self.start_time = snapshot
            .beacon
            .slot_time(snapshot.beacon.first_slot_of_epoch(start_slot));
        self.end_time = snapshot.beacon.slot_time(self.context.snapshot_end.slot);
        self.interval_seconds = snapshot
            .execution_block_time
            .saturating_sub(start_header.timestamp);
        tracing::debug!(
            start_slot,
            execution_start = block.execution_block_number,
            seconds = self.interval_seconds,
            "resolved interval bounds"
        );
        Ok(())
    }

    fn calculate_smoothing_shares(
        &self,
        cheaters: &CheaterSet,
        balance: U256,
    ) -> Result<SmoothingShares> {
        let query = self.record.get_scores(cheaters);
        let mut bonus_scalar = ONE_ETH;

        if query.total_score.is_zero() || query.attestation_count == 0 {
            tracing::warn!(
                total_score = %query.total_score,
                attestations = query.attestation_count,
                "no eligible attestations; the whole balance goes to pool stakers"
            );
            return Ok(SmoothingShares {
                node_details: BTreeMap::new(),
                pool_staker_eth: balance,
                node_operator_eth: U256::ZERO,
                bonus_scalar,
            });
        }

        // Two-step floor: scale the balance by score per attestation, then
        // normalize by the fixed-point unit. The step order is load-bearing;
        // collapsing it changes historical outputs.
        let node_operator_share = floor_div(
            floor_div(balance * query.total_score, U256::from(query.attestation_count)),
            ONE_ETH,
        );

        let mut node_details: BTreeMap<Address, NodeSmoothingDetails> = BTreeMap::new();
        for entry in &query.minipools {
            let details = node_details.entry(entry.node).or_default();
            let share = floor_div(
                node_operator_share * entry.attestation_score,
                query.total_score,
            );
            details.smoothing_pool_eth += share;
            details.minipools.push(MinipoolSmoothing {
                address: entry.minipool,
                pubkey: entry.pubkey,
                successful_attestations: entry.successful_attestations,
                missed_slots: entry.missed_slots.clone(),
                attestation_score: entry.attestation_score,
                consensus_income: entry.consensus_income,
                share,
                bonus: None,
                effective_commission: None,
            });
        }

        let mut node_operator_total = node_details
            .values()
            .fold(U256::ZERO, |acc, d| acc + d.smoothing_pool_eth);

        if bonuses_enabled(self.context.ruleset_version) {
            let total_bonus = self.calculate_bonuses(&mut node_details)?;
            let remaining = balance.checked_sub(node_operator_total).ok_or(
                RewardsError::NegativeStakerRemainder {
                    node_operator_eth: node_operator_total,
                    balance,
                },
            )?;
            if remaining < total_bonus {
                tracing::warn!(
                    remaining = %display_eth(remaining),
                    total_bonus = %display_eth(total_bonus),
                    "smoothing pool cannot cover all bonuses; scaling down"
                );
                bonus_scalar = floor_div(remaining * ONE_ETH, total_bonus);
                for details in node_details.values_mut() {
                    // Recompute from the ratio directly; multiplying by the
                    // scalar would compound truncation error.
                    details.bonus_eth = floor_div(details.bonus_eth * remaining, total_bonus);
                    for minipool in &mut details.minipools {
                        if let Some(bonus) = minipool.bonus {
                            minipool.bonus = Some(floor_div(bonus * remaining, total_bonus));
                        }
                    }
                }
            }
        }

        // Base shares must reconcile before any bonus lands, keeping this
        // check independent of bonus behavior.
        self.check_epsilon("smoothing pool ETH", node_operator_share, node_operator_total)?;

        if bonuses_enabled(self.context.ruleset_version) {
            for details in node_details.values_mut() {
                details.smoothing_pool_eth += details.bonus_eth;
                node_operator_total += details.bonus_eth;
            }
        }

        let pool_staker_eth = balance.checked_sub(node_operator_total).ok_or(
            RewardsError::NegativeStakerRemainder {
                node_operator_eth: node_operator_total,
                balance,
            },
        )?;

        tracing::info!(
            pool_stakers = %display_eth(pool_staker_eth),
            node_operators = %display_eth(node_operator_total),
            "smoothing pool split"
        );
        Ok(SmoothingShares {
            node_details,
            pool_staker_eth,
            node_operator_eth: node_operator_total,
            bonus_scalar,
        })
    }
}
