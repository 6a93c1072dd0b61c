//! juno-addrgen - Offline Orchard address derivation for Juno Cash
//!
//! This crate derives shielded payment addresses from a Unified Full Viewing Key:
//! - Bech32m and ZIP-316 unified container codecs
//! - UFVK decoding with structural Orchard key validation
//! - Orchard diversified address derivation (ZIP-32 diversifiers)
//! - Single-index and batch derivation, encoded as unified addresses
//!
//! The engine never sees spending keys and performs no I/O.
//!
//! ```no_run
//! # fn main() -> Result<(), juno_addrgen::Error> {
//! # let ufvk = "jview1...";
//! let first = juno_addrgen::derive(ufvk, 0)?;
//! let next_ten = juno_addrgen::batch(ufvk, 1, 10)?;
//! # Ok(())
//! # }
//! ```

extern crate alloc;

pub mod address;
pub mod batch;
pub mod bech32m;
pub mod config;
pub mod diversifier;
pub mod error;
pub mod f4jumble;
pub mod keys;
pub mod network;
pub mod ufvk;
pub mod zip316;

pub use address::{AddressDeriver, OrchardAddress, Receiver, UnifiedAddress};
pub use batch::MAX_BATCH_COUNT;
pub use config::AddrgenConfig;
pub use diversifier::DiversifierIndex;
pub use error::{ConfigError, Error};
pub use network::Network;
pub use ufvk::{Typecode, UnifiedFullViewingKey, ViewingKey};

use alloc::string::String;
use alloc::vec::Vec;
use tracing::debug;

// -----------------------------------------------------------------------------
// Engine
// -----------------------------------------------------------------------------

/// A configured address derivation engine.
#[derive(Clone, Debug, Default)]
pub struct Addrgen {
    config: AddrgenConfig,
}

impl Addrgen {
    /// Create an engine, rejecting invalid configuration.
    pub fn new(config: AddrgenConfig) -> Result<Self, ConfigError> {
        config.check()?;
        debug!(
            networks = config.networks.len(),
            parallel_threshold = config.parallel_threshold,
            "configured address engine"
        );
        Ok(Addrgen { config })
    }

    pub fn config(&self) -> &AddrgenConfig {
        &self.config
    }

    /// Decode a UFVK for one of the configured networks.
    pub fn decode(&self, ufvk: &str) -> Result<UnifiedFullViewingKey, Error> {
        UnifiedFullViewingKey::decode(ufvk, &self.config.networks)
    }

    /// Encoded unified address at `index`.
    pub fn derive(&self, ufvk: &str, index: u32) -> Result<String, Error> {
        self.decode(ufvk)?
            .to_deriver()?
            .encode_address_at(DiversifierIndex::new(index))
    }

    /// Encoded unified addresses for `start..start + count`, in index order.
    ///
    /// The range is validated before the UFVK is decoded.
    pub fn batch(&self, ufvk: &str, start: u32, count: u32) -> Result<Vec<String>, Error> {
        batch::check_range(start, count)?;
        let deriver = self.decode(ufvk)?.to_deriver()?;
        batch::derive_range(&deriver, start, count, self.config.parallel_threshold)
    }
}

// -----------------------------------------------------------------------------
// Convenience Functions
// -----------------------------------------------------------------------------

/// Derive the address at `index` with the default configuration.
pub fn derive(ufvk: &str, index: u32) -> Result<String, Error> {
    Addrgen::default().derive(ufvk, index)
}

/// Derive `count` addresses starting at `start` with the default configuration.
pub fn batch(ufvk: &str, start: u32, count: u32) -> Result<Vec<String>, Error> {
    Addrgen::default().batch(ufvk, start, count)
}
