//! Unified full viewing keys
//!
//! Decodes a Juno Cash UFVK into its typed viewing key items. Only the Orchard
//! pool is supported; every other typecode is rejected.

use alloc::string::String;
use alloc::vec::Vec;
use tracing::debug;
use zeroize::Zeroizing;

use crate::address::{AddressDeriver, UnifiedAddress};
use crate::diversifier::DiversifierIndex;
use crate::error::Error;
use crate::keys::{self, FullViewingKey};
use crate::zip316;
use crate::Network;

// -----------------------------------------------------------------------------
// Typecodes
// -----------------------------------------------------------------------------

/// ZIP-316 item typecode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Typecode {
    /// Orchard (0x03)
    Orchard,
    /// Any typecode this engine does not derive from
    Unsupported(u64),
}

impl Typecode {
    pub fn value(self) -> u64 {
        match self {
            Typecode::Orchard => 0x03,
            Typecode::Unsupported(code) => code,
        }
    }

    /// Required length of a viewing key item with this typecode
    fn fvk_len(self) -> Result<usize, Error> {
        match self {
            Typecode::Orchard => Ok(keys::FVK_LEN),
            Typecode::Unsupported(_) => Err(Error::UfvkTypecodeUnsupported),
        }
    }
}

impl From<u64> for Typecode {
    fn from(code: u64) -> Self {
        match code {
            0x03 => Typecode::Orchard,
            other => Typecode::Unsupported(other),
        }
    }
}

// -----------------------------------------------------------------------------
// Viewing Keys
// -----------------------------------------------------------------------------

/// A single viewing key item of a UFVK
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewingKey {
    Orchard(FullViewingKey),
}

impl ViewingKey {
    pub fn typecode(&self) -> Typecode {
        match self {
            ViewingKey::Orchard(_) => Typecode::Orchard,
        }
    }

    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            ViewingKey::Orchard(fvk) => Zeroizing::new(fvk.to_bytes().to_vec()),
        }
    }

    fn from_item(typecode: Typecode, value: &[u8]) -> Result<Self, Error> {
        match typecode {
            Typecode::Orchard => {
                let bytes: Zeroizing<[u8; keys::FVK_LEN]> =
                    Zeroizing::new(value.try_into().map_err(|_| Error::UfvkValueLenInvalid)?);
                FullViewingKey::from_bytes(&bytes)
                    .map(ViewingKey::Orchard)
                    .ok_or(Error::UfvkFvkBytesInvalid)
            }
            Typecode::Unsupported(_) => Err(Error::UfvkTypecodeUnsupported),
        }
    }
}

// -----------------------------------------------------------------------------
// Unified Full Viewing Key
// -----------------------------------------------------------------------------

/// A decoded unified full viewing key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedFullViewingKey {
    network: Network,
    items: Vec<ViewingKey>,
}

impl UnifiedFullViewingKey {
    /// Build from viewing keys, which must be non-empty with distinct typecodes.
    pub fn new(network: Network, mut items: Vec<ViewingKey>) -> Result<Self, Error> {
        items.sort_by_key(|item| item.typecode().value());
        let distinct = items
            .windows(2)
            .all(|w| w[0].typecode() != w[1].typecode());
        if items.is_empty() || !distinct {
            return Err(Error::UfvkTlvInvalid);
        }
        Ok(UnifiedFullViewingKey { network, items })
    }

    /// Decode a UFVK for one of `networks`.
    ///
    /// Surrounding whitespace is ignored. Checks run in a fixed order, so that a
    /// given input always yields the same error:
    /// empty, Bech32m, HRP, TLV framing, typecodes and lengths, key bytes.
    pub fn decode(text: &str, networks: &[Network]) -> Result<Self, Error> {
        let result = Self::decode_inner(text, networks);
        match &result {
            Ok(ufvk) => debug!(
                network = %ufvk.network,
                items = ufvk.items.len(),
                "decoded ufvk"
            ),
            Err(e) => debug!(code = e.code(), "rejected ufvk"),
        }
        result
    }

    fn decode_inner(text: &str, networks: &[Network]) -> Result<Self, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::UfvkEmpty);
        }

        let (hrp, items) = zip316::decode_unified_container(text, |hrp| {
            networks.iter().any(|n| n.ufvk_hrp() == hrp)
        })?;
        let network = Network::from_ufvk_hrp(&hrp).ok_or(Error::Internal)?;

        // Structure of every item first, then key material
        let mut typed = Vec::with_capacity(items.len());
        for item in &items {
            let typecode = Typecode::from(item.typecode);
            if typecode.fvk_len()? != item.value.len() {
                return Err(Error::UfvkValueLenInvalid);
            }
            typed.push((typecode, item.value.as_slice()));
        }

        let items = typed
            .into_iter()
            .map(|(typecode, value)| ViewingKey::from_item(typecode, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UnifiedFullViewingKey { network, items })
    }

    /// Encode under the network's UFVK HRP.
    pub fn encode(&self) -> Result<String, Error> {
        let values: Vec<(u64, Zeroizing<Vec<u8>>)> = self
            .items
            .iter()
            .map(|item| (item.typecode().value(), item.to_bytes()))
            .collect();
        let items: Vec<(u64, &[u8])> = values.iter().map(|(t, v)| (*t, v.as_slice())).collect();

        zip316::encode_unified_container(self.network.ufvk_hrp(), &items)
            .map_err(|_| Error::Internal)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn items(&self) -> &[ViewingKey] {
        &self.items
    }

    /// The Orchard full viewing key, if present.
    pub fn orchard(&self) -> Option<&FullViewingKey> {
        self.items.iter().find_map(|item| match item {
            ViewingKey::Orchard(fvk) => Some(fvk),
        })
    }

    /// Prepare for deriving many addresses.
    pub fn to_deriver(&self) -> Result<AddressDeriver, Error> {
        AddressDeriver::new(self)
    }

    /// Unified address at `index`.
    pub fn address_at(&self, index: DiversifierIndex) -> Result<UnifiedAddress, Error> {
        Ok(self.to_deriver()?.address_at(index))
    }
}
