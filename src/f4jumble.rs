//! F4Jumble (ZIP-316)
//!
//! A length-preserving 4-round unbalanced Feistel permutation over the encoded
//! container, so that no prefix or suffix of the text can be altered without
//! scrambling the whole payload.

use alloc::vec::Vec;
use blake2b_simd::Params;

/// Minimum message length in bytes
pub const MIN_LEN: usize = 48;

/// Maximum message length in bytes
pub const MAX_LEN: usize = 4_194_368;

/// BLAKE2b output length used for `G` and the upper bound of the left half
const HASH_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum F4JumbleError {
    #[error("message length {0} outside {min}..={max}", min = MIN_LEN, max = MAX_LEN)]
    InvalidLength(usize),
}

// "UA_F4Jumble_H" || round || 0 || 0
fn h_personal(round: u8) -> [u8; 16] {
    let mut p = [0u8; 16];
    p[..13].copy_from_slice(b"UA_F4Jumble_H");
    p[13] = round;
    p
}

// "UA_F4Jumble_G" || round || I2LEOSP_16(chunk)
fn g_personal(round: u8, chunk: u16) -> [u8; 16] {
    let mut p = [0u8; 16];
    p[..13].copy_from_slice(b"UA_F4Jumble_G");
    p[13] = round;
    p[14..].copy_from_slice(&chunk.to_le_bytes());
    p
}

/// left ^= H_round(right)
fn h_round(left: &mut [u8], right: &[u8], round: u8) {
    let hash = Params::new()
        .hash_length(left.len())
        .personal(&h_personal(round))
        .hash(right);
    for (l, h) in left.iter_mut().zip(hash.as_bytes()) {
        *l ^= h;
    }
}

/// right ^= G_round(left), produced in 64-byte chunks
fn g_round(left: &[u8], right: &mut [u8], round: u8) {
    for (j, chunk) in right.chunks_mut(HASH_LEN).enumerate() {
        // chunk count is bounded by MAX_LEN / 64 < 2^16
        let hash = Params::new()
            .hash_length(HASH_LEN)
            .personal(&g_personal(round, j as u16))
            .hash(left);
        for (r, h) in chunk.iter_mut().zip(hash.as_bytes()) {
            *r ^= h;
        }
    }
}

fn split(message: &mut [u8]) -> Result<(&mut [u8], &mut [u8]), F4JumbleError> {
    let len = message.len();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(F4JumbleError::InvalidLength(len));
    }
    let left_len = core::cmp::min(HASH_LEN, len / 2);
    Ok(message.split_at_mut(left_len))
}

/// Apply F4Jumble in place.
pub fn f4jumble_mut(message: &mut [u8]) -> Result<(), F4JumbleError> {
    let (left, right) = split(message)?;
    g_round(left, right, 0);
    h_round(left, right, 0);
    g_round(left, right, 1);
    h_round(left, right, 1);
    Ok(())
}

/// Apply the inverse of F4Jumble in place.
pub fn f4jumble_inv_mut(message: &mut [u8]) -> Result<(), F4JumbleError> {
    let (left, right) = split(message)?;
    h_round(left, right, 1);
    g_round(left, right, 1);
    h_round(left, right, 0);
    g_round(left, right, 0);
    Ok(())
}

pub fn f4jumble(message: &[u8]) -> Result<Vec<u8>, F4JumbleError> {
    let mut out = message.to_vec();
    f4jumble_mut(&mut out)?;
    Ok(out)
}

pub fn f4jumble_inv(message: &[u8]) -> Result<Vec<u8>, F4JumbleError> {
    let mut out = message.to_vec();
    f4jumble_inv_mut(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_restores_message() {
        for len in [MIN_LEN, 61, 114, 128, 129, 300] {
            let message: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let jumbled = f4jumble(&message).unwrap();
            assert_ne!(jumbled, message);
            assert_eq!(f4jumble_inv(&jumbled).unwrap(), message);
        }
    }

    #[test]
    fn test_single_bit_change_spreads() {
        let mut message = vec![0u8; 114];
        let a = f4jumble(&message).unwrap();
        message[113] ^= 1;
        let b = f4jumble(&message).unwrap();

        // both halves must change
        assert_ne!(a[..57], b[..57]);
        assert_ne!(a[57..], b[57..]);
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(
            f4jumble(&[0u8; MIN_LEN - 1]),
            Err(F4JumbleError::InvalidLength(MIN_LEN - 1))
        );
        assert_eq!(
            f4jumble_inv(&[0u8; 10]),
            Err(F4JumbleError::InvalidLength(10))
        );
    }

    #[test]
    fn test_length_error_message() {
        assert_eq!(
            F4JumbleError::InvalidLength(47).to_string(),
            "message length 47 outside 48..=4194368"
        );
    }
}
