//! Run orchestration and artifact assembly.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};

use tidepool_merkle::{leaf_hash, RewardsTree};
use tidepool_state::clients::{ConsensusClient, ExecutionClient};
use tidepool_state::record::RollingRecord;
use tidepool_state::snapshot::NetworkSnapshot;
use tidepool_types::artifact::{RewardsArtifact, TotalRewards, REWARDS_FILE_VERSION};
use tidepool_types::performance::{MinipoolPerformance, MinipoolPerformanceReport};
use tidepool_types::wei::ONE_ETH;
use tidepool_types::NetworkId;

use crate::accumulator::RewardAccumulator;
use crate::bonus::{AlwaysEligible, BonusEligibility};
use crate::cheaters::detect_cheaters;
use crate::context::IntervalContext;
use crate::network_check::NetworkValidityCache;
use crate::{Result, RewardsError};

static ALWAYS_ELIGIBLE: AlwaysEligible = AlwaysEligible;

/// Everything a successful run produces.
#[derive(Clone, Debug)]
pub struct GenerateResult {
    /// The committed rewards artifact.
    pub artifact: RewardsArtifact,
    /// The companion performance report.
    pub performance: MinipoolPerformanceReport,
    /// Nodes whose declared destination network was invalid, with the
    /// declared id, for operator remediation. Their rewards were redirected
    /// to network 0.
    pub invalid_network_nodes: BTreeMap<Address, NetworkId>,
}

/// One rewards tree generation run.
///
/// Owns every piece of per-run mutable state. Constructed fresh for each
/// interval and consumed by [`generate`](Self::generate); nothing is shared
/// between runs except the read-only inputs.
pub struct TreeGenerator<'a> {
    pub(crate) context: &'a IntervalContext,
    pub(crate) snapshot: &'a NetworkSnapshot,
    pub(crate) record: &'a RollingRecord,
    pub(crate) execution: &'a dyn ExecutionClient,
    pub(crate) consensus: &'a dyn ConsensusClient,
    pub(crate) bonus_eligibility: &'a dyn BonusEligibility,
    /// Tolerated cumulative truncation drift: one wei per contributing
    /// entity, so the max of the node and minipool counts.
    pub(crate) epsilon: U256,
    pub(crate) accumulator: RewardAccumulator,
    pub(crate) validity: NetworkValidityCache,
    pub(crate) invalid_network_nodes: BTreeMap<Address, NetworkId>,
    pub(crate) totals: TotalRewards,
    pub(crate) performance: BTreeMap<Address, MinipoolPerformance>,
    pub(crate) bonus_scalar: U256,
    pub(crate) start_time: u64,
    pub(crate) end_time: u64,
    pub(crate) consensus_start_block: u64,
    pub(crate) consensus_end_block: u64,
    pub(crate) execution_start_block: u64,
    pub(crate) execution_end_block: u64,
    pub(crate) interval_seconds: u64,
}

impl<'a> TreeGenerator<'a> {
    /// Set up a run over the given inputs. Bonus eligibility defaults to
    /// [`AlwaysEligible`] until the on-chain gate ships.
    pub fn new(
        context: &'a IntervalContext,
        snapshot: &'a NetworkSnapshot,
        record: &'a RollingRecord,
        execution: &'a dyn ExecutionClient,
        consensus: &'a dyn ConsensusClient,
    ) -> Self {
        let epsilon = U256::from(snapshot.node_count().max(snapshot.minipool_count()));
        Self {
            context,
            snapshot,
            record,
            execution,
            consensus,
            bonus_eligibility: &ALWAYS_ELIGIBLE,
            epsilon,
            accumulator: RewardAccumulator::new(),
            validity: NetworkValidityCache::new(),
            invalid_network_nodes: BTreeMap::new(),
            totals: TotalRewards::default(),
            performance: BTreeMap::new(),
            bonus_scalar: ONE_ETH,
            start_time: 0,
            end_time: 0,
            consensus_start_block: 0,
            consensus_end_block: 0,
            execution_start_block: 0,
            execution_end_block: 0,
            interval_seconds: 0,
        }
    }

    /// Replace the bonus eligibility gate.
    pub fn with_bonus_eligibility(mut self, gate: &'a dyn BonusEligibility) -> Self {
        self.bonus_eligibility = gate;
        self
    }

    /// Run the full apportionment and commit the result.
    ///
    /// # Errors
    ///
    /// Any [`RewardsError`] abandons the run; no partial artifact is
    /// returned.
    pub fn generate(mut self) -> Result<GenerateResult> {
        tracing::info!(
            ruleset = self.context.ruleset_version,
            index = self.context.index,
            nodes = self.snapshot.node_count(),
            minipools = self.snapshot.minipool_count(),
            "generating rewards tree"
        );
        let cheaters = detect_cheaters(self.snapshot);
        self.apportion_rpl(&cheaters)?;
        self.apportion_smoothing_pool(&cheaters)?;
        Ok(self.finalize())
    }

    /// Approximate the pool stakers' share of the smoothing pool without
    /// producing an artifact.
    ///
    /// Runs only the smoothing pool side; used by the embedding service for
    /// exchange-rate estimation between submissions.
    pub fn approximate_pool_staker_share(mut self) -> Result<U256> {
        tracing::info!(
            ruleset = self.context.ruleset_version,
            index = self.context.index,
            "approximating pool staker share"
        );
        let cheaters = detect_cheaters(self.snapshot);
        self.apportion_smoothing_pool(&cheaters)?;
        Ok(self.totals.pool_staker_smoothing_pool_eth)
    }

    /// Resolve the destination network a node's rewards should land on.
    ///
    /// An existing accumulator entry fixes the answer for the rest of the
    /// run. Otherwise the declared network is validated on-chain (memoized);
    /// an invalid declaration redirects to network 0 and records the node
    /// for the remediation report.
    pub(crate) fn resolve_network(&mut self, address: Address) -> Result<NetworkId> {
        if let Some(network) = self.accumulator.node_network(address) {
            return Ok(network);
        }
        let declared = self
            .snapshot
            .node(address)
            .ok_or(RewardsError::UnknownNode(address))?
            .reward_network;
        let valid = self
            .validity
            .validate(declared, self.execution, self.snapshot.execution_block)?;
        if valid {
            Ok(declared)
        } else {
            tracing::warn!(
                node = %address,
                network = declared,
                "invalid reward destination network; redirecting to network 0"
            );
            self.invalid_network_nodes.insert(address, declared);
            Ok(0)
        }
    }

    /// Abort unless a split's summed total is within epsilon of its budget.
    pub(crate) fn check_epsilon(
        &self,
        split: &'static str,
        expected: U256,
        actual: U256,
    ) -> Result<()> {
        let drift = if expected >= actual {
            expected - actual
        } else {
            actual - expected
        };
        if drift > self.epsilon {
            return Err(RewardsError::EpsilonExceeded {
                split,
                expected,
                actual,
                epsilon: self.epsilon,
            });
        }
        tracing::info!(split, total = %actual, drift = %drift, "split total within tolerance");
        Ok(())
    }

    fn finalize(mut self) -> GenerateResult {
        // Sort missed-slot lists so the report is byte-stable.
        for entry in self.performance.values_mut() {
            entry.missed_attestation_slots.sort_unstable();
        }

        let (node_rewards, network_rewards) = self.accumulator.into_ordered();
        let leaves: Vec<B256> = node_rewards.iter().map(leaf_hash).collect();
        let tree = RewardsTree::build(leaves);
        let merkle_root = tree.root();
        tracing::info!(
            root = %merkle_root,
            nodes = node_rewards.len(),
            networks = network_rewards.len(),
            "committed rewards tree"
        );

        let artifact = RewardsArtifact {
            rewards_file_version: REWARDS_FILE_VERSION,
            ruleset_version: self.context.ruleset_version,
            index: self.context.index,
            network: self.context.network_name.clone(),
            intervals_passed: self.context.intervals_passed,
            start_time: self.start_time,
            end_time: self.end_time,
            consensus_start_block: self.consensus_start_block,
            consensus_end_block: self.consensus_end_block,
            execution_start_block: self.execution_start_block,
            execution_end_block: self.execution_end_block,
            total_rewards: self.totals,
            network_rewards,
            node_rewards,
            merkle_root,
        };
        let performance = MinipoolPerformanceReport {
            rewards_file_version: REWARDS_FILE_VERSION,
            ruleset_version: self.context.ruleset_version,
            index: self.context.index,
            network: self.context.network_name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            consensus_start_block: self.consensus_start_block,
            consensus_end_block: self.consensus_end_block,
            execution_start_block: self.execution_start_block,
            execution_end_block: self.execution_end_block,
            bonus_scalar: self.bonus_scalar,
            minipool_performance: self.performance,
        };
        GenerateResult {
            artifact,
            performance,
            invalid_network_nodes: self.invalid_network_nodes,
        }
    }
}
