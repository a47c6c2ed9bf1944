//! # tidepool-state
//!
//! Read-only views of the network consumed by the rewards engine: the
//! on-chain snapshot at the interval's end block, the rolling attestation
//! record, and the execution/consensus client contracts.
//!
//! Everything here is an input. The engine never mutates a snapshot, and a
//! snapshot never outlives the run it was taken for.
//!
//! ## Modules
//!
//! - [`snapshot`] — on-chain pool state at the snapshot block
//! - [`record`] — rolling attestation record and its scoring query
//! - [`clients`] — execution/consensus client traits
//! - [`stub`] — deterministic in-memory clients for tests and development

pub mod clients;
pub mod record;
pub mod snapshot;
pub mod stub;

use std::collections::BTreeSet;

use alloy_primitives::Address;

/// Node operators excluded from new reward eligibility for one interval.
/// Derived per run from penalty counters; never persisted.
pub type CheaterSet = BTreeSet<Address>;
