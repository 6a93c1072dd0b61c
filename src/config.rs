//! Engine configuration.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Network;

/// Default minimum batch size that is fanned out across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: u32 = 256;

/// Configuration for [`crate::Addrgen`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddrgenConfig {
    /// Networks whose viewing keys are accepted.
    pub networks: Vec<Network>,
    /// Batches with at least this many indices are derived in parallel
    /// (when the `parallel` feature is enabled).
    pub parallel_threshold: u32,
}

impl Default for AddrgenConfig {
    fn default() -> Self {
        AddrgenConfig {
            networks: Network::ALL.to_vec(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl AddrgenConfig {
    /// Configuration accepting a single network.
    pub fn for_network(network: Network) -> Self {
        AddrgenConfig {
            networks: alloc::vec![network],
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.networks.is_empty() {
            return Err(ConfigError::NoNetworks);
        }
        for (i, network) in self.networks.iter().enumerate() {
            if self.networks[..i].contains(network) {
                return Err(ConfigError::DuplicateNetwork(*network));
            }
        }
        if self.parallel_threshold == 0 {
            return Err(ConfigError::ZeroParallelThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AddrgenConfig::default();
        assert_eq!(config.check(), Ok(()));
        assert_eq!(config.networks, Network::ALL.to_vec());
    }

    #[test]
    fn test_check_rejects_bad_configs() {
        let mut config = AddrgenConfig::for_network(Network::Testnet);
        assert_eq!(config.check(), Ok(()));

        config.networks.push(Network::Testnet);
        assert_eq!(
            config.check(),
            Err(ConfigError::DuplicateNetwork(Network::Testnet))
        );

        config.networks.clear();
        assert_eq!(config.check(), Err(ConfigError::NoNetworks));

        let config = AddrgenConfig {
            parallel_threshold: 0,
            ..Default::default()
        };
        assert_eq!(config.check(), Err(ConfigError::ZeroParallelThreshold));
    }
}
