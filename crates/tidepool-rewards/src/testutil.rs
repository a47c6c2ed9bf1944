//! Shared fixtures for the engine's unit tests.
//!
//! One mid-sized network: three reward-earning nodes, two trusted members,
//! four minipools, and a rolling record with clean round numbers so expected
//! values stay auditable by hand.

use alloy_primitives::{Address, I256, U256};

use tidepool_state::clients::{BeaconBlockInfo, BlockHeader};
use tidepool_state::record::{MinipoolAttestations, RollingRecord};
use tidepool_state::snapshot::{
    BeaconConfig, MinipoolDetails, NetworkSnapshot, NodeDetails, OracleMemberDetails, PoolDetails,
};
use tidepool_state::stub::{StaticConsensusClient, StaticExecutionClient};
use tidepool_types::wei::ONE_ETH;
use tidepool_types::ValidatorPubkey;

use crate::context::{IntervalContext, SnapshotEnd, RULESET_V10};
use crate::generator::TreeGenerator;

pub const NODE_1: Address = Address::repeat_byte(0x01);
pub const NODE_2: Address = Address::repeat_byte(0x02);
pub const NODE_3: Address = Address::repeat_byte(0x03);
pub const ODAO_1: Address = Address::repeat_byte(0x0a);
pub const ODAO_2: Address = Address::repeat_byte(0x0b);
pub const MINIPOOL_A1: Address = Address::repeat_byte(0xa1);
pub const MINIPOOL_A2: Address = Address::repeat_byte(0xa2);
pub const MINIPOOL_B1: Address = Address::repeat_byte(0xb1);
pub const MINIPOOL_C1: Address = Address::repeat_byte(0xc1);

/// Interval duration: 28 days.
pub const INTERVAL_SECS: u64 = 28 * 24 * 3600;

/// Snapshot block timestamp.
pub const SNAPSHOT_TIME: u64 = 1_702_000_000;

/// Start slot of the interval (epoch 200 exactly).
pub const START_SLOT: u64 = 6_400;

pub fn eth(n: u64) -> U256 {
    U256::from(n) * ONE_ETH
}

/// 1e18-scale fraction from a percent value.
pub fn percent(n: u64) -> U256 {
    U256::from(n) * ONE_ETH / U256::from(100u64)
}

pub struct Fixture {
    pub snapshot: NetworkSnapshot,
    pub record: RollingRecord,
    pub context: IntervalContext,
    pub execution: StaticExecutionClient,
    pub consensus: StaticConsensusClient,
}

impl Fixture {
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

fn node(address: Address, weight_eth: u64, rpl_stake_eth: u64) -> NodeDetails {
    NodeDetails {
        address,
        reward_network: 0,
        rpl_stake: eth(rpl_stake_eth),
        weight: eth(weight_eth),
    }
}

fn minipool(address: Address, owner: Address, fee_pct: u64, bond_eth: u64) -> MinipoolDetails {
    MinipoolDetails {
        address,
        pubkey: ValidatorPubkey::repeat_byte(address[0]),
        node: owner,
        node_fee: percent(fee_pct),
        node_deposit_balance: eth(bond_eth),
        penalty_count: 0,
    }
}

fn attestations(
    minipool: Address,
    owner: Address,
    score_eth: u64,
    successful: u64,
    missed: Vec<u64>,
    income_milli: i64,
) -> MinipoolAttestations {
    MinipoolAttestations {
        minipool,
        node: owner,
        pubkey: ValidatorPubkey::repeat_byte(minipool[0]),
        successful_attestations: successful,
        attestation_score: eth(score_eth),
        missed_slots: missed,
        consensus_income: I256::try_from(income_milli).expect("fits")
            * I256::try_from(ONE_ETH / U256::from(1_000u64)).expect("fits"),
    }
}

/// The default fixture:
///
/// - 1000 RPL pending, split 10% treasury / 70% collateral / 20% trusted.
/// - Collateral weights 1:1:2 across nodes 1-3.
/// - Trusted member 1 participated the full interval, member 2 half of it.
/// - 10 ETH smoothing pool; scores 100/50/50, attestation counts 100/50/75.
/// - Ruleset v10; minipool fees below the bonus floor except B1 at 14%.
pub fn fixture() -> Fixture {
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
        smoothing_pool_balance: eth(10),
        interval_duration_secs: INTERVAL_SECS,
        // 0.01 ETH per RPL.
        rpl_price: ONE_ETH / U256::from(100u64),
    };
    let nodes = vec![
        node(NODE_1, 1, 1_000),
        node(NODE_2, 1, 500),
        node(NODE_3, 2, 0),
        node(ODAO_1, 0, 0),
        node(ODAO_2, 0, 0),
    ];
    let minipools = vec![
        minipool(MINIPOOL_A1, NODE_1, 10, 8),
        minipool(MINIPOOL_A2, NODE_1, 10, 16),
        minipool(MINIPOOL_B1, NODE_2, 14, 8),
        minipool(MINIPOOL_C1, NODE_3, 10, 8),
    ];
    let oracle_members = vec![
        OracleMemberDetails {
            address: ODAO_1,
            joined_time: SNAPSHOT_TIME - 10 * INTERVAL_SECS,
        },
        OracleMemberDetails {
            address: ODAO_2,
            joined_time: SNAPSHOT_TIME - INTERVAL_SECS / 2,
        },
    ];
    let snapshot = NetworkSnapshot::new(900, SNAPSHOT_TIME, beacon, pool, nodes, minipools, oracle_members);

    let record = RollingRecord {
        start_slot: START_SLOT,
        minipools: vec![
            attestations(MINIPOOL_A1, NODE_1, 100, 100, vec![6_500, 6_450], 1_000),
            attestations(MINIPOOL_A2, NODE_1, 50, 50, vec![], 500),
            attestations(MINIPOOL_B1, NODE_2, 50, 75, vec![7_000], 2_000),
        ],
    };

    let context = IntervalContext {
        index: 5,
        ruleset_version: RULESET_V10,
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
            number: 500,
            timestamp: SNAPSHOT_TIME - INTERVAL_SECS,
        })
        .with_enabled_network(0)
        .with_enabled_network(1);
    let consensus = StaticConsensusClient::new().with_block(BeaconBlockInfo {
        slot: START_SLOT,
        execution_block_number: 500,
    });

    Fixture {
        snapshot,
        record,
        context,
        execution,
        consensus,
    }
}
