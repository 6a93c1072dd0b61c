//! Orchard payment addresses and their unified encoding
//!
//! An Orchard address at index `j` is derived from the incoming viewing key:
//! 1. dk + j → diversifier (FF1-AES256)
//! 2. diversifier → g_d (DiversifyHash)
//! 3. ivk * g_d → pk_d
//! 4. (diversifier, pk_d) → address
//!
//! Addresses are published as ZIP-316 unified addresses under the network's
//! address HRP.

use alloc::string::String;
use alloc::vec::Vec;
use group::GroupEncoding;
use tracing::{trace, warn};

use crate::diversifier::{diversify_hash, DiversifierIndex, DIVERSIFIER_LEN};
use crate::error::Error;
use crate::keys::IncomingViewingKey;
use crate::ufvk::{Typecode, UnifiedFullViewingKey};
use crate::zip316;
use crate::Network;

/// Length of a raw Orchard receiver: diversifier (11) || pk_d (32)
pub const ORCHARD_RECEIVER_LEN: usize = 43;

// -----------------------------------------------------------------------------
// Orchard Address
// -----------------------------------------------------------------------------

/// A raw Orchard payment address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrchardAddress {
    diversifier: [u8; DIVERSIFIER_LEN],
    pk_d: [u8; 32],
}

impl OrchardAddress {
    pub fn diversifier(&self) -> &[u8; DIVERSIFIER_LEN] {
        &self.diversifier
    }

    /// repr_P(pk_d)
    pub fn pk_d(&self) -> &[u8; 32] {
        &self.pk_d
    }

    /// Serialize as `d || pk_d`
    pub fn to_raw_address_bytes(&self) -> [u8; ORCHARD_RECEIVER_LEN] {
        let mut out = [0u8; ORCHARD_RECEIVER_LEN];
        out[..DIVERSIFIER_LEN].copy_from_slice(&self.diversifier);
        out[DIVERSIFIER_LEN..].copy_from_slice(&self.pk_d);
        out
    }
}

impl IncomingViewingKey {
    /// Derive the external-scope address at `index`.
    pub fn address_at(&self, index: DiversifierIndex) -> OrchardAddress {
        let diversifier = self.dk.diversifier(index);
        let g_d = diversify_hash(&diversifier);
        let pk_d = g_d * self.ivk;
        OrchardAddress {
            diversifier,
            pk_d: pk_d.to_bytes(),
        }
    }
}

// -----------------------------------------------------------------------------
// Unified Address
// -----------------------------------------------------------------------------

/// A receiver inside a unified address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Receiver {
    Orchard(OrchardAddress),
}

impl Receiver {
    pub fn typecode(&self) -> Typecode {
        match self {
            Receiver::Orchard(_) => Typecode::Orchard,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Receiver::Orchard(addr) => addr.to_raw_address_bytes().to_vec(),
        }
    }
}

/// A unified payment address for one network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedAddress {
    network: Network,
    receivers: Vec<Receiver>,
}

impl UnifiedAddress {
    /// Build from receivers; they are written in ascending typecode order.
    pub fn new(network: Network, mut receivers: Vec<Receiver>) -> Self {
        receivers.sort_by_key(|r| r.typecode().value());
        UnifiedAddress { network, receivers }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn orchard(&self) -> Option<&OrchardAddress> {
        self.receivers.iter().find_map(|r| match r {
            Receiver::Orchard(addr) => Some(addr),
        })
    }

    /// Encode as Bech32m text under the network's address HRP.
    pub fn encode(&self) -> Result<String, Error> {
        let values: Vec<(u64, Vec<u8>)> = self
            .receivers
            .iter()
            .map(|r| (r.typecode().value(), r.to_bytes()))
            .collect();
        let items: Vec<(u64, &[u8])> = values.iter().map(|(t, v)| (*t, v.as_slice())).collect();

        zip316::encode_unified_container(self.network.address_hrp(), &items).map_err(|e| {
            warn!(error = %e, "failed to encode unified address");
            Error::Internal
        })
    }
}

// -----------------------------------------------------------------------------
// Address Deriver
// -----------------------------------------------------------------------------

/// Per-key derivation state.
///
/// Holds the incoming viewing key and diversifier cipher so that deriving many
/// addresses from one UFVK pays the key preparation cost once.
#[derive(Clone, Debug)]
pub struct AddressDeriver {
    network: Network,
    orchard: IncomingViewingKey,
}

impl AddressDeriver {
    pub fn new(ufvk: &UnifiedFullViewingKey) -> Result<Self, Error> {
        let fvk = ufvk.orchard().ok_or(Error::Internal)?;
        let orchard = fvk.to_ivk().ok_or(Error::Internal)?;
        Ok(AddressDeriver {
            network: ufvk.network(),
            orchard,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Unified address at `index`.
    pub fn address_at(&self, index: DiversifierIndex) -> UnifiedAddress {
        let orchard = self.orchard.address_at(index);
        UnifiedAddress::new(self.network, alloc::vec![Receiver::Orchard(orchard)])
    }

    /// Encoded unified address at `index`.
    pub fn encode_address_at(&self, index: DiversifierIndex) -> Result<String, Error> {
        trace!(%index, network = %self.network, "deriving address");
        self.address_at(index).encode()
    }
}
