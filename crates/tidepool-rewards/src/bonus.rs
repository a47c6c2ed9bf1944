//! Commission bonus calculation.
//!
//! Rulesets v10 and later raise the effective commission of under-commissioned
//! minipools to a dynamic floor, funded out of the smoothing pool's remainder.
//! The floor grows with how much of the node's borrowed ETH its staked RPL
//! covers, saturating at 10% coverage:
//!
//! ```text
//! effective = 0.10 + 0.04 * min(0.10, coverage) / 0.10
//! ```
//!
//! which keeps every effective commission inside [0.10, 0.14]. A value above
//! 0.14 would mean the on-chain guarantee is broken, and generation aborts
//! rather than clamping it quietly.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use tidepool_state::snapshot::MinipoolDetails;
use tidepool_types::wei::{
    display_eth, floor_div, COMMISSION_FLOOR, COMMISSION_SPREAD, MAX_BONUS_COMMISSION, ONE_ETH,
    THIRTY_TWO_ETH,
};

use crate::eth::NodeSmoothingDetails;
use crate::generator::TreeGenerator;
use crate::{Result, RewardsError};

/// Gate deciding which minipools may earn a commission bonus.
///
/// The intended on-chain eligibility flag has not shipped yet, so the gate is
/// pluggable rather than hard-coded; [`AlwaysEligible`] stands in until the
/// contract exposes the real check.
pub trait BonusEligibility {
    /// Whether the given minipool may earn a bonus this interval.
    fn is_bonus_eligible(&self, minipool: &MinipoolDetails) -> bool;
}

/// The stand-in gate: every minipool is eligible.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysEligible;

impl BonusEligibility for AlwaysEligible {
    fn is_bonus_eligible(&self, _minipool: &MinipoolDetails) -> bool {
        true
    }
}

impl TreeGenerator<'_> {
    /// Compute every minipool's commission bonus and return the total.
    ///
    /// Bonuses are recorded on the working entries but not yet added to any
    /// ETH total; the caller scales and awards them after the base-share
    /// check.
    pub(crate) fn calculate_bonuses(
        &self,
        node_details: &mut BTreeMap<Address, NodeSmoothingDetails>,
    ) -> Result<U256> {
        let snapshot = self.snapshot;
        let mut total = U256::ZERO;
        for (address, details) in node_details.iter_mut() {
            let node = snapshot
                .node(*address)
                .ok_or(RewardsError::UnknownNode(*address))?;
            let borrowed = snapshot.eligible_borrowed_eth(*address);
            let coverage = snapshot.staked_rpl_value_percent_of_borrowed(borrowed, node.rpl_stake);

            for minipool in &mut details.minipools {
                let registered = snapshot
                    .minipool(minipool.address)
                    .ok_or(RewardsError::UnknownMinipool(minipool.address))?;
                if !self.bonus_eligibility.is_bonus_eligible(registered) {
                    continue;
                }

                let capped = coverage.min(COMMISSION_FLOOR);
                let effective =
                    COMMISSION_FLOOR + floor_div(COMMISSION_SPREAD * capped, COMMISSION_FLOOR);
                if registered.node_fee >= effective {
                    // Already commissioned at or above the floor.
                    continue;
                }
                if effective > MAX_BONUS_COMMISSION {
                    tracing::warn!(
                        minipool = %minipool.address,
                        commission = %effective,
                        "bonus commission exceeds the structural cap; aborting"
                    );
                    return Err(RewardsError::CommissionCapExceeded {
                        minipool: minipool.address,
                        commission: effective,
                    });
                }

                let bonus_fee = effective - registered.node_fee;
                let borrowed_share = floor_div(
                    bonus_fee * THIRTY_TWO_ETH.saturating_sub(registered.node_deposit_balance),
                    THIRTY_TWO_ETH,
                );
                // A penalized validator's negative income clamps to zero.
                let bonus = if minipool.consensus_income.is_negative() {
                    U256::ZERO
                } else {
                    floor_div(
                        borrowed_share * minipool.consensus_income.unsigned_abs(),
                        ONE_ETH,
                    )
                };

                minipool.effective_commission = Some(effective);
                minipool.bonus = Some(bonus);
                details.bonus_eth += bonus;
                total += bonus;
            }
        }
        tracing::debug!(total = %display_eth(total), "total consensus bonus");
        Ok(total)
    }
}
