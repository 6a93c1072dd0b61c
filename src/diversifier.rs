//! Diversifier derivation using FF1-AES256
//!
//! Implements Orchard diversifier derivation:
//! - FF1-AES256 encryption to convert index → diversifier
//! - Orchard DiversifyHash to map a diversifier onto the Pallas curve
//!
//! Every 11-byte diversifier is usable in Orchard, so unlike Sapling there is no
//! search for a valid index.
//!
//! Reference: https://zips.z.cash/zip-0032

use core::fmt;

use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use group::Group;
use pasta_curves::arithmetic::CurveExt;
use pasta_curves::pallas;

use crate::error::Error;

/// Length of a diversifier in bytes
pub const DIVERSIFIER_LEN: usize = 11;

/// GroupHash^P personalization for DiversifyHash
const KEY_DIVERSIFICATION_PERSONALIZATION: &str = "z.cash:Orchard-gd";

// -----------------------------------------------------------------------------
// FF1-AES256 Implementation
// -----------------------------------------------------------------------------

/// Number of Feistel rounds
const FF1_ROUNDS: u8 = 10;

/// Numerals per half: u = v = 88 / 2
const HALF_BITS: usize = 44;

const HALF_MASK: u64 = (1 << HALF_BITS) - 1;

/// P = [1] || [2] || [1] || [radix]^3 || [10] || [u mod 256] || [n]^4 || [t]^4
/// for radix = 2, n = 88, t = 0
const FF1_P: [u8; 16] = [1, 2, 1, 0, 0, 2, 10, 44, 0, 0, 0, 88, 0, 0, 0, 0];

/// FF1-AES256 over 88 binary numerals with an empty tweak
///
/// NIST SP 800-38G with radix = 2 and n = 88. The numeral string of an 11-byte
/// input is its bits in little-endian order within each byte; NUM and STR treat
/// the first numeral of each half as most significant.
///
/// Reference: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-38G.pdf
#[derive(Clone)]
pub struct Ff1Aes256 {
    cipher: Aes256,
}

impl Ff1Aes256 {
    /// Create a new FF1-AES256 instance with the given 32-byte key
    pub fn new(key: &[u8; 32]) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(key));
        Self { cipher }
    }

    /// Encrypt 88 bits
    pub fn encrypt(&self, input: &[u8; DIVERSIFIER_LEN]) -> [u8; DIVERSIFIER_LEN] {
        let mut a = num_bits(input, 0);
        let mut b = num_bits(input, HALF_BITS);

        // b = 6 and d = 12, so R is a single block and S = R
        let mut p = GenericArray::clone_from_slice(&FF1_P);
        self.cipher.encrypt_block(&mut p);

        for i in 0..FF1_ROUNDS {
            // Q = [0]^9 || [i] || [NUM(B)]^6
            let mut q = [0u8; 16];
            q[9] = i;
            q[10..].copy_from_slice(&b.to_be_bytes()[2..]);

            let mut r = GenericArray::clone_from_slice(&q);
            for (byte, mask) in r.iter_mut().zip(p.iter()) {
                *byte ^= mask;
            }
            self.cipher.encrypt_block(&mut r);

            // y = NUM(S[..12]); only the low 44 bits survive the reduction
            let mut y = [0u8; 8];
            y[2..].copy_from_slice(&r[6..12]);
            let y = u64::from_be_bytes(y) & HALF_MASK;

            let c = (a + y) & HALF_MASK;
            a = b;
            b = c;
        }

        let mut out = [0u8; DIVERSIFIER_LEN];
        write_bits(&mut out, 0, a);
        write_bits(&mut out, HALF_BITS, b);
        out
    }
}

/// NUM_2 of the 44 numerals starting at `offset`
fn num_bits(input: &[u8; DIVERSIFIER_LEN], offset: usize) -> u64 {
    (offset..offset + HALF_BITS).fold(0u64, |acc, i| {
        (acc << 1) | u64::from((input[i / 8] >> (i % 8)) & 1)
    })
}

/// STR_2 of `value` as 44 numerals, written starting at `offset`
fn write_bits(out: &mut [u8; DIVERSIFIER_LEN], offset: usize, value: u64) {
    for k in 0..HALF_BITS {
        let bit = ((value >> (HALF_BITS - 1 - k)) & 1) as u8;
        let i = offset + k;
        out[i / 8] |= bit << (i % 8);
    }
}

// -----------------------------------------------------------------------------
// Diversifier Derivation
// -----------------------------------------------------------------------------

/// Orchard diversifier key
#[derive(Clone)]
pub struct DiversifierKey {
    ff1: Ff1Aes256,
}

impl fmt::Debug for DiversifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiversifierKey").finish_non_exhaustive()
    }
}

impl DiversifierKey {
    pub fn from_bytes(dk: &[u8; 32]) -> Self {
        Self {
            ff1: Ff1Aes256::new(dk),
        }
    }

    /// d_j = FF1-AES256.Encrypt(dk, "", I2LEBSP_88(j))
    pub fn diversifier(&self, index: DiversifierIndex) -> [u8; DIVERSIFIER_LEN] {
        self.ff1.encrypt(&index.to_bytes())
    }
}

/// g_d = DiversifyHash(d)
///
/// GroupHash^P("z.cash:Orchard-gd", d), falling back to the hash of the empty
/// string if the result is the identity.
pub fn diversify_hash(d: &[u8; DIVERSIFIER_LEN]) -> pallas::Point {
    let hasher = pallas::Point::hash_to_curve(KEY_DIVERSIFICATION_PERSONALIZATION);
    let g_d = hasher(d);
    if bool::from(g_d.is_identity()) {
        hasher(&[])
    } else {
        g_d
    }
}

// -----------------------------------------------------------------------------
// Diversifier Index
// -----------------------------------------------------------------------------

/// Index of an address within a viewing key's address space.
///
/// Orchard defines 88-bit indices; this engine exposes the low 2^32 of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiversifierIndex(u32);

impl DiversifierIndex {
    pub const fn new(index: u32) -> Self {
        DiversifierIndex(index)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// I2LEOSP_88
    pub fn to_bytes(self) -> [u8; DIVERSIFIER_LEN] {
        let mut out = [0u8; DIVERSIFIER_LEN];
        out[..4].copy_from_slice(&self.0.to_le_bytes());
        out
    }
}

impl From<u32> for DiversifierIndex {
    fn from(index: u32) -> Self {
        DiversifierIndex(index)
    }
}

impl TryFrom<u64> for DiversifierIndex {
    type Error = Error;

    fn try_from(index: u64) -> Result<Self, Error> {
        u32::try_from(index)
            .map(DiversifierIndex)
            .map_err(|_| Error::IndexInvalid)
    }
}

impl fmt::Display for DiversifierIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
