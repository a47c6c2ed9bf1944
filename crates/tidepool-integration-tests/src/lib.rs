//! Integration test crate for the tidepool rewards engine.
//!
//! This crate contains no production code — only end-to-end tests that
//! exercise the full apportionment pipeline across the workspace crates, plus
//! the shared fixture builder below.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p tidepool-integration-tests
//! ```

use alloy_primitives::{Address, I256, U256};

use tidepool_rewards::{IntervalContext, SnapshotEnd, TreeGenerator};
use tidepool_state::clients::{BeaconBlockInfo, BlockHeader};
use tidepool_state::record::{MinipoolAttestations, RollingRecord};
use tidepool_state::snapshot::{
    BeaconConfig, MinipoolDetails, NetworkSnapshot, NodeDetails, OracleMemberDetails, PoolDetails,
};
use tidepool_state::stub::{StaticConsensusClient, StaticExecutionClient};
use tidepool_types::wei::ONE_ETH;
use tidepool_types::ValidatorPubkey;

/// Route engine tracing to the test writer for debugging failures.
///
/// Call at the top of a test and run with `RUST_LOG=debug` to see the
/// engine's run narration. Safe to call from multiple tests.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Interval duration used by every fixture: 28 days.
pub const INTERVAL_SECS: u64 = 28 * 24 * 3600;

/// Snapshot block timestamp.
pub const SNAPSHOT_TIME: u64 = 1_702_000_000;

/// Interval start slot (epoch-aligned).
pub const START_SLOT: u64 = 6_400;

/// Execution block matching the start slot.
pub const START_EXECUTION_BLOCK: u64 = 500;

pub fn eth(n: u64) -> U256 {
    U256::from(n) * ONE_ETH
}

pub fn percent(n: u64) -> U256 {
    U256::from(n) * ONE_ETH / U256::from(100u64)
}

/// Address of the i-th regular node.
pub fn node_address(i: usize) -> Address {
    Address::repeat_byte(0x10 + i as u8)
}

/// Address of the i-th node's minipool.
pub fn minipool_address(i: usize) -> Address {
    Address::repeat_byte(0x80 + i as u8)
}

/// A complete, mutually consistent set of run inputs.
pub struct TestNetwork {
    pub snapshot: NetworkSnapshot,
    pub record: RollingRecord,
    pub context: IntervalContext,
    pub execution: StaticExecutionClient,
    pub consensus: StaticConsensusClient,
}

impl TestNetwork {
    pub fn generator(&self) -> TreeGenerator<'_> {
        TreeGenerator::new(
            &self.context,
            &self.snapshot,
            &self.record,
            &self.execution,
            &self.consensus,
        )
    }
}

/// Build a network of `node_count` operators, one minipool each, with
/// deterministically varied weights, stakes, fees, bonds, and scores, plus
/// two trusted members. Knobs that tests commonly change (pool balances,
/// penalties, networks) are left at benign defaults and mutated in place.
pub fn standard_network(node_count: usize) -> TestNetwork {
    let beacon = BeaconConfig {
        genesis_time: 1_606_824_023,
        seconds_per_slot: 12,
        slots_per_epoch: 32,
    };
    let pool = PoolDetails {
        pending_rpl_rewards: eth(1_000),
        protocol_dao_percent: percent(10),
        node_operator_percent: percent(70),
        trusted_node_percent: percent(20),
        smoothing_pool_balance: eth(25),
        interval_duration_secs: INTERVAL_SECS,
        rpl_price: ONE_ETH / U256::from(100u64),
    };

    let mut nodes = Vec::with_capacity(node_count + 2);
    let mut minipools = Vec::with_capacity(node_count);
    let mut record_entries = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let address = node_address(i);
        nodes.push(NodeDetails {
            address,
            reward_network: 0,
            rpl_stake: eth(200 * (i as u64 % 7 + 1)),
            weight: eth(i as u64 % 5 + 1),
        });
        let bond = if i % 3 == 0 { 16 } else { 8 };
        let fee = if i % 4 == 0 { 14 } else { 10 };
        minipools.push(MinipoolDetails {
            address: minipool_address(i),
            pubkey: ValidatorPubkey::repeat_byte(0x80 + i as u8),
            node: address,
            node_fee: percent(fee),
            node_deposit_balance: eth(bond),
            penalty_count: 0,
        });
        record_entries.push(MinipoolAttestations {
            minipool: minipool_address(i),
            node: address,
            pubkey: ValidatorPubkey::repeat_byte(0x80 + i as u8),
            successful_attestations: 100 + i as u64 * 10,
            attestation_score: eth(90 + i as u64 * 9),
            missed_slots: vec![START_SLOT + 100 + i as u64, START_SLOT + 50 + i as u64],
            consensus_income: I256::try_from(eth(1) / U256::from(i as u64 + 1))
                .expect("income fits"),
        });
    }

    // Trusted members: one from before the interval, one who joined midway.
    let odao_1 = Address::repeat_byte(0x0a);
    let odao_2 = Address::repeat_byte(0x0b);
    for address in [odao_1, odao_2] {
        nodes.push(NodeDetails {
            address,
            reward_network: 0,
            rpl_stake: U256::ZERO,
            weight: U256::ZERO,
        });
    }
    let oracle_members = vec![
        OracleMemberDetails {
            address: odao_1,
            joined_time: SNAPSHOT_TIME - 10 * INTERVAL_SECS,
        },
        OracleMemberDetails {
            address: odao_2,
            joined_time: SNAPSHOT_TIME - INTERVAL_SECS / 2,
        },
    ];

    let snapshot = NetworkSnapshot::new(
        900,
        SNAPSHOT_TIME,
        beacon,
        pool,
        nodes,
        minipools,
        oracle_members,
    );
    let record = RollingRecord {
        start_slot: START_SLOT,
        minipools: record_entries,
    };
    let context = IntervalContext {
        index: 9,
        ruleset_version: 10,
        network_name: "mainnet".to_string(),
        intervals_passed: 1,
        snapshot_end: SnapshotEnd {
            slot: 12_800,
            consensus_block: 12_800,
            execution_block: 900,
        },
        prior_roots: Vec::new(),
    };
    let execution = StaticExecutionClient::new()
        .with_header(BlockHeader {
            number: START_EXECUTION_BLOCK,
            timestamp: SNAPSHOT_TIME - INTERVAL_SECS,
        })
        .with_enabled_network(0)
        .with_enabled_network(1);
    let consensus = StaticConsensusClient::new().with_block(BeaconBlockInfo {
        slot: START_SLOT,
        execution_block_number: START_EXECUTION_BLOCK,
    });

    TestNetwork {
        snapshot,
        record,
        context,
        execution,
        consensus,
    }
}

/// Rebuild the snapshot's lookup indices after structural edits to the node
/// or minipool registries.
pub fn rebuild_snapshot(network: &mut TestNetwork) {
    network.snapshot = NetworkSnapshot::new(
        network.snapshot.execution_block,
        network.snapshot.execution_block_time,
        network.snapshot.beacon,
        network.snapshot.pool.clone(),
        network.snapshot.nodes.clone(),
        network.snapshot.minipools.clone(),
        network.snapshot.oracle_members.clone(),
    );
}
