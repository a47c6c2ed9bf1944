//! Reward destination network validation.

use std::collections::BTreeMap;

use tidepool_state::clients::{ClientError, ExecutionClient};
use tidepool_types::NetworkId;

/// Per-run memoization of destination network validity.
///
/// Seeded with network 0 as valid (the home network always is). A cache miss
/// performs exactly one on-chain query and records the outcome, good or bad,
/// for the rest of the run. Scoped strictly to one run; nothing here survives
/// into the next interval.
#[derive(Debug)]
pub struct NetworkValidityCache {
    cache: BTreeMap<NetworkId, bool>,
}

impl NetworkValidityCache {
    /// A fresh cache with network 0 pre-validated.
    pub fn new() -> Self {
        let mut cache = BTreeMap::new();
        cache.insert(0, true);
        Self { cache }
    }

    /// Whether the given network is enabled, consulting the chain at most
    /// once per id. A failed query aborts the run: guessing validity would
    /// corrupt the commitment.
    pub fn validate(
        &mut self,
        network: NetworkId,
        client: &dyn ExecutionClient,
        at_block: u64,
    ) -> Result<bool, ClientError> {
        if let Some(&valid) = self.cache.get(&network) {
            return Ok(valid);
        }
        let valid = client.is_network_enabled(network, at_block)?;
        self.cache.insert(network, valid);
        Ok(valid)
    }
}

impl Default for NetworkValidityCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tidepool_state::clients::BlockHeader;

    /// Counts queries so the memoization contract is testable.
    struct CountingClient {
        enabled: NetworkId,
        queries: Cell<u32>,
        fail: bool,
    }

    impl ExecutionClient for CountingClient {
        fn header_by_number(&self, number: u64) -> Result<BlockHeader, ClientError> {
            Ok(BlockHeader {
                number,
                timestamp: 0,
            })
        }

        fn is_network_enabled(
            &self,
            network: NetworkId,
            _at_block: u64,
        ) -> Result<bool, ClientError> {
            if self.fail {
                return Err(ClientError::Execution("rpc unreachable".to_string()));
            }
            self.queries.set(self.queries.get() + 1);
            Ok(network == self.enabled)
        }
    }

    #[test]
    fn test_network_zero_needs_no_query() {
        let client = CountingClient {
            enabled: 0,
            queries: Cell::new(0),
            fail: false,
        };
        let mut cache = NetworkValidityCache::new();
        assert!(cache.validate(0, &client, 1).expect("validate"));
        assert_eq!(client.queries.get(), 0);
    }

    #[test]
    fn test_one_query_per_network() {
        let client = CountingClient {
            enabled: 5,
            queries: Cell::new(0),
            fail: false,
        };
        let mut cache = NetworkValidityCache::new();
        for _ in 0..4 {
            assert!(cache.validate(5, &client, 1).expect("validate"));
            assert!(!cache.validate(9, &client, 1).expect("validate"));
        }
        // One query each for networks 5 and 9; the negative result is
        // memoized too.
        assert_eq!(client.queries.get(), 2);
    }

    #[test]
    fn test_query_failure_propagates() {
        let client = CountingClient {
            enabled: 5,
            queries: Cell::new(0),
            fail: true,
        };
        let mut cache = NetworkValidityCache::new();
        assert!(cache.validate(5, &client, 1).is_err());
    }
}
