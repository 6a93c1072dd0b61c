//! Orchard viewing keys
//!
//! Parses and structurally validates the 96-byte Orchard full viewing key
//! encoding `ak || nk || rivk`, and derives the incoming viewing key `ivk` and the
//! diversifier key `dk` used for address generation.

use core::fmt;

use blake2b_simd::Params;
use ff::{Field, FromUniformBytes, PrimeField};
use group::GroupEncoding;
use pasta_curves::pallas;
use sinsemilla::CommitDomain;

use crate::diversifier::DiversifierKey;

// -----------------------------------------------------------------------------
// Constants
// -----------------------------------------------------------------------------

/// Length of an encoded Orchard full viewing key
pub const FVK_LEN: usize = 96;

/// PRF^expand personalization
const PRF_EXPAND_PERSONALIZATION: &[u8; 16] = b"Zcash_ExpandSeed";

/// Domain separator for dk/ovk derivation
const ORCHARD_DK_OVK: u8 = 0x82;

/// Domain separator for the internal-scope rivk
const ORCHARD_RIVK_INTERNAL: u8 = 0x83;

/// Sinsemilla domain for commit_ivk
const COMMIT_IVK_PERSONALIZATION: &str = "z.cash:Orchard-CommitIvk";

/// Number of bits in an Orchard base field element
const L_ORCHARD_BASE: usize = 255;

// -----------------------------------------------------------------------------
// Helper Functions
// -----------------------------------------------------------------------------

/// PRF^expand with additional data: BLAKE2b-512 with "Zcash_ExpandSeed" personalization
fn prf_expand_with_data(key: &[u8; 32], domain: u8, data: &[&[u8]]) -> [u8; 64] {
    let mut state = Params::new()
        .hash_length(64)
        .personal(PRF_EXPAND_PERSONALIZATION)
        .to_state();
    state.update(key).update(&[domain]);
    for d in data {
        state.update(d);
    }

    let mut out = [0u8; 64];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}

/// First `L_ORCHARD_BASE` bits of a little-endian field element encoding
fn le_bits(repr: [u8; 32]) -> impl Iterator<Item = bool> {
    (0..L_ORCHARD_BASE).map(move |i| (repr[i / 8] >> (i % 8)) & 1 == 1)
}

/// Validate `ak` and return its x-coordinate.
///
/// `ak` must be a non-identity point with a positive y-coordinate, so its
/// encoding with the sign bit clear is exactly the x-coordinate.
fn extract_ak_x(ak: &[u8; 32]) -> Option<pallas::Base> {
    if *ak == [0u8; 32] || ak[31] & 0x80 != 0 {
        return None;
    }
    if bool::from(pallas::Point::from_bytes(ak).is_none()) {
        return None;
    }
    pallas::Base::from_repr(*ak).into()
}

// -----------------------------------------------------------------------------
// Full Viewing Key
// -----------------------------------------------------------------------------

/// A structurally valid Orchard full viewing key.
#[derive(Clone)]
pub struct FullViewingKey {
    /// repr_P(ak)
    ak: [u8; 32],
    /// Extract_P(ak)
    ak_x: pallas::Base,
    nk: pallas::Base,
    rivk: pallas::Scalar,
}

impl fmt::Debug for FullViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullViewingKey").finish_non_exhaustive()
    }
}

impl PartialEq for FullViewingKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FullViewingKey {}

impl FullViewingKey {
    /// Parse `ak || nk || rivk`.
    ///
    /// Returns `None` unless `ak` is a valid non-identity point with positive y,
    /// `nk` and `rivk` are canonical, and the derived `ivk` is defined and non-zero
    /// for both the external and internal scopes.
    pub fn from_bytes(bytes: &[u8; FVK_LEN]) -> Option<Self> {
        let ak: [u8; 32] = bytes[..32].try_into().ok()?;
        let nk_bytes: [u8; 32] = bytes[32..64].try_into().ok()?;
        let rivk_bytes: [u8; 32] = bytes[64..].try_into().ok()?;

        let ak_x = extract_ak_x(&ak)?;
        let nk = Option::from(pallas::Base::from_repr(nk_bytes))?;
        let rivk = Option::from(pallas::Scalar::from_repr(rivk_bytes))?;

        let fvk = FullViewingKey { ak, ak_x, nk, rivk };
        fvk.commit_ivk(&fvk.rivk)?;
        fvk.commit_ivk(&fvk.rivk_internal())?;
        Some(fvk)
    }

    /// Encode as `ak || nk || rivk`.
    pub fn to_bytes(&self) -> [u8; FVK_LEN] {
        let mut out = [0u8; FVK_LEN];
        out[..32].copy_from_slice(&self.ak);
        out[32..64].copy_from_slice(&self.nk.to_repr());
        out[64..].copy_from_slice(&self.rivk.to_repr());
        out
    }

    /// ivk = Commit^ivk_rivk(Extract_P(ak), nk), as a non-zero Pallas scalar.
    ///
    /// Returns `None` if the commitment is ⊥ or zero.
    fn commit_ivk(&self, rivk: &pallas::Scalar) -> Option<pallas::Scalar> {
        let domain = CommitDomain::new(COMMIT_IVK_PERSONALIZATION);
        let msg = le_bits(self.ak_x.to_repr()).chain(le_bits(self.nk.to_repr()));

        let ivk: pallas::Base = Option::from(domain.short_commit(msg, rivk))?;
        if bool::from(ivk.is_zero()) {
            return None;
        }
        // q_P < r_P, so every base field element is a canonical scalar
        Option::from(pallas::Scalar::from_repr(ivk.to_repr()))
    }

    /// rivk_internal = ToScalar(PRF^expand_rivk([0x83] || repr_P(ak) || I2LEOSP_256(nk)))
    fn rivk_internal(&self) -> pallas::Scalar {
        let r = prf_expand_with_data(
            &self.rivk.to_repr(),
            ORCHARD_RIVK_INTERNAL,
            &[&self.ak, &self.nk.to_repr()],
        );
        pallas::Scalar::from_uniform_bytes(&r)
    }

    /// dk = truncate_32(PRF^expand_rivk([0x82] || repr_P(ak) || I2LEOSP_256(nk)))
    fn derive_dk(&self) -> [u8; 32] {
        let r = prf_expand_with_data(
            &self.rivk.to_repr(),
            ORCHARD_DK_OVK,
            &[&self.ak, &self.nk.to_repr()],
        );
        let mut dk = [0u8; 32];
        dk.copy_from_slice(&r[..32]);
        dk
    }

    /// Derive the external-scope incoming viewing key.
    ///
    /// Only `None` for keys that bypassed [`FullViewingKey::from_bytes`], which
    /// cannot be constructed.
    pub fn to_ivk(&self) -> Option<IncomingViewingKey> {
        let ivk = self.commit_ivk(&self.rivk)?;
        let dk = DiversifierKey::from_bytes(&self.derive_dk());
        Some(IncomingViewingKey { dk, ivk })
    }
}

// -----------------------------------------------------------------------------
// Incoming Viewing Key
// -----------------------------------------------------------------------------

/// Diversifier key and `ivk`, everything needed to derive addresses.
#[derive(Clone)]
pub struct IncomingViewingKey {
    pub(crate) dk: DiversifierKey,
    pub(crate) ivk: pallas::Scalar,
}

impl fmt::Debug for IncomingViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingViewingKey").finish_non_exhaustive()
    }
}
