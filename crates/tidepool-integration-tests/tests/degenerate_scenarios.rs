//! Integration test: degenerate and failure scenarios.
//!
//! The engine must degrade gracefully where the design says so (empty
//! smoothing pool, universal cheating, bonus insufficiency) and abort hard
//! where it says that instead (zero pending rewards, missing start block,
//! failed client calls).

use alloy_primitives::U256;

use tidepool_integration_tests::{
    eth, minipool_address, node_address, percent, rebuild_snapshot, standard_network, START_SLOT,
};
use tidepool_rewards::RewardsError;
use tidepool_state::clients::{BlockHeader, ClientError, ExecutionClient};
use tidepool_state::stub::StaticConsensusClient;
use tidepool_types::wei::ONE_ETH;

#[test]
fn empty_smoothing_pool_with_one_eligible_node() {
    // One node, weight 1, 1000 wei pending at a 30/70/0 split, no smoothing
    // pool balance: the node earns the floored collateral share, the
    // treasury absorbs the residual, and no ETH moves at all.
    let mut network = standard_network(1);
    network.snapshot.pool.pending_rpl_rewards = U256::from(1_000u64);
    network.snapshot.pool.protocol_dao_percent = percent(30);
    network.snapshot.pool.node_operator_percent = percent(70);
    network.snapshot.pool.trusted_node_percent = U256::ZERO;
    network.snapshot.pool.smoothing_pool_balance = U256::ZERO;
    network.snapshot.oracle_members.clear();
    rebuild_snapshot(&mut network);

    let result = network.generator().generate().expect("generate");
    let totals = &result.artifact.total_rewards;

    assert_eq!(totals.total_collateral_rpl, U256::from(700u64));
    assert_eq!(totals.protocol_dao_rpl, U256::from(300u64));
    assert_eq!(totals.total_oracle_dao_rpl, U256::ZERO);

    assert_eq!(totals.total_smoothing_pool_eth, U256::ZERO);
    assert_eq!(totals.node_operator_smoothing_pool_eth, U256::ZERO);
    assert_eq!(totals.pool_staker_smoothing_pool_eth, U256::ZERO);
    assert!(result.performance.minipool_performance.is_empty());

    let node = &result.artifact.node_rewards[0];
    assert_eq!(node.address, node_address(0));
    assert_eq!(node.collateral_rpl, U256::from(700u64));
    assert_eq!(node.smoothing_pool_eth, U256::ZERO);
}

#[test]
fn all_cheaters_sends_smoothing_pool_to_stakers() {
    let mut network = standard_network(6);
    for minipool in &mut network.snapshot.minipools {
        minipool.penalty_count = 3;
    }
    rebuild_snapshot(&mut network);

    let result = network.generator().generate().expect("generate");
    let totals = &result.artifact.total_rewards;

    assert_eq!(totals.pool_staker_smoothing_pool_eth, eth(25));
    assert_eq!(totals.node_operator_smoothing_pool_eth, U256::ZERO);
    // Cheater weights are excluded too, so the collateral budget flows to
    // the treasury and only trusted rewards reach nodes.
    assert_eq!(totals.total_collateral_rpl, U256::ZERO);
    assert!(totals.protocol_dao_rpl >= eth(800));
    for node in &result.artifact.node_rewards {
        assert_eq!(node.smoothing_pool_eth, U256::ZERO);
        assert_eq!(node.collateral_rpl, U256::ZERO);
    }
}

#[test]
fn bonus_insufficiency_scales_by_direct_ratio() {
    let mut network = standard_network(6);
    // A sliver of a smoothing pool: the 10% left after base shares cannot
    // cover the bonuses.
    network.snapshot.pool.smoothing_pool_balance = ONE_ETH / U256::from(5u64);
    rebuild_snapshot(&mut network);

    let result = network.generator().generate().expect("generate");
    let totals = &result.artifact.total_rewards;

    assert!(
        result.performance.bonus_scalar < ONE_ETH,
        "the recorded scalar must reflect the scale-down"
    );

    let base_total: U256 = result
        .performance
        .minipool_performance
        .values()
        .fold(U256::ZERO, |acc, p| acc + p.eth_earned);
    let bonus_total: U256 = result
        .performance
        .minipool_performance
        .values()
        .fold(U256::ZERO, |acc, p| acc + p.bonus_eth_earned.unwrap_or(U256::ZERO));
    let remaining = totals.total_smoothing_pool_eth - base_total;

    assert!(bonus_total <= remaining, "scaled bonuses must fit the remainder");
    assert!(!bonus_total.is_zero(), "scaling shrinks bonuses, not erases them");
    assert_eq!(
        totals.pool_staker_smoothing_pool_eth + totals.node_operator_smoothing_pool_eth,
        totals.total_smoothing_pool_eth
    );
}

#[test]
fn ample_pool_leaves_bonuses_unscaled() {
    let network = standard_network(6);
    let result = network.generator().generate().expect("generate");
    assert_eq!(result.performance.bonus_scalar, ONE_ETH);
}

#[test]
fn first_interval_skips_smoothing_pool() {
    let mut network = standard_network(4);
    network.context.index = 0;
    let result = network.generator().generate().expect("generate");
    assert_eq!(
        result.artifact.total_rewards.total_smoothing_pool_eth,
        U256::ZERO
    );
    // The RPL side still distributed everything.
    assert_eq!(
        result.artifact.total_rewards.protocol_dao_rpl
            + result.artifact.total_rewards.total_collateral_rpl
            + result.artifact.total_rewards.total_oracle_dao_rpl,
        eth(1_000)
    );
}

#[test]
fn zero_pending_rewards_aborts() {
    let mut network = standard_network(4);
    network.snapshot.pool.pending_rpl_rewards = U256::ZERO;
    rebuild_snapshot(&mut network);
    let result = network.generator().generate();
    assert!(matches!(result, Err(RewardsError::NoPendingRewards { .. })));
}

#[test]
fn missing_start_block_aborts_with_backfill_hint() {
    let mut network = standard_network(4);
    network.consensus = StaticConsensusClient::new();
    let error = network.generator().generate().expect_err("must abort");
    assert!(matches!(
        error,
        RewardsError::MissingStartBlock { slot } if slot == START_SLOT
    ));
    let message = error.to_string();
    assert!(
        message.contains("checkpoint"),
        "the error should point the operator at checkpoint sync: {message}"
    );
}

/// An execution client whose network validation endpoint is down.
struct BrokenValidationClient;

impl ExecutionClient for BrokenValidationClient {
    fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError> {
        Ok(BlockHeader {
            number,
            timestamp: 0,
        })
    }

    fn is_network_enabled(&self, _network: u64, _at_block: u64) -> Result<bool, ClientError> {
        Err(ClientError::Execution("connection refused".to_string()))
    }
}

#[test]
fn failed_network_validation_aborts_the_run() {
    let mut network = standard_network(4);
    // A non-default network forces a validation query; the cache cannot help
    // because the id is unknown, and the client is down.
    network.snapshot.nodes[1].reward_network = 7;
    rebuild_snapshot(&mut network);

    let context = network.context.clone();
    let generator = tidepool_rewards::TreeGenerator::new(
        &context,
        &network.snapshot,
        &network.record,
        &BrokenValidationClient,
        &network.consensus,
    );
    let result = generator.generate();
    assert!(matches!(result, Err(RewardsError::Client(_))));
}

#[test]
fn no_report_entry_for_silent_minipools() {
    let mut network = standard_network(4);
    // Minipool 2 scored nothing and never attested.
    network.record.minipools[2].successful_attestations = 0;
    network.record.minipools[2].attestation_score = U256::ZERO;
    network.record.minipools[2].missed_slots.clear();

    let result = network.generator().generate().expect("generate");
    assert!(!result
        .performance
        .minipool_performance
        .contains_key(&minipool_address(2)));
}
