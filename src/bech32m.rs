//! Bech32m text codec (BIP-350)
//!
//! Unified containers are far longer than the 90 characters BIP-173 allows, so
//! this codec only bounds the text by the largest payload F4Jumble accepts.

use alloc::string::String;
use alloc::vec::Vec;

use crate::f4jumble;

// -----------------------------------------------------------------------------
// Constants
// -----------------------------------------------------------------------------

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Checksum constant distinguishing Bech32m from Bech32 (which uses 1)
const BECH32M_CONST: u32 = 0x2bc8_30a3;

const GEN: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

const CHECKSUM_LEN: usize = 6;

/// Maximum length of the human-readable part
pub const MAX_HRP_LEN: usize = 83;

/// Maximum accepted text length
pub const MAX_TEXT_LEN: usize =
    MAX_HRP_LEN + 1 + (f4jumble::MAX_LEN * 8 + 4) / 5 + CHECKSUM_LEN;

/// Reverse lookup for `CHARSET`, indexed by lowercase ASCII
const CHARSET_REV: [i8; 128] = {
    let mut rev = [-1i8; 128];
    let mut i = 0;
    while i < CHARSET.len() {
        rev[CHARSET[i] as usize] = i as i8;
        i += 1;
    }
    rev
};

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

/// Bech32m decoding and encoding failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Bech32mError {
    /// Missing `1` separator, bad HRP or data length, overlong text, or mixed case.
    #[error("invalid separator or layout")]
    InvalidSeparator,
    /// A character outside the allowed alphabet.
    #[error("invalid character")]
    InvalidCharset,
    /// The checksum does not verify under the Bech32m constant.
    #[error("invalid checksum")]
    InvalidChecksum,
    /// The 5-bit data does not regroup into whole bytes.
    #[error("invalid padding")]
    InvalidPadding,
    /// The HRP given to the encoder is not lowercase printable ASCII of valid length.
    #[error("invalid human-readable part")]
    InvalidHrp,
}

// -----------------------------------------------------------------------------
// Checksum
// -----------------------------------------------------------------------------

fn polymod(values: impl Iterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(v);
        for (i, g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &[u8]) -> impl Iterator<Item = u8> + '_ {
    hrp.iter()
        .map(|c| c >> 5)
        .chain(core::iter::once(0))
        .chain(hrp.iter().map(|c| c & 0x1f))
}

fn create_checksum(hrp: &[u8], data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let values = hrp_expand(hrp)
        .chain(data.iter().copied())
        .chain([0u8; CHECKSUM_LEN]);
    let pm = polymod(values) ^ BECH32M_CONST;

    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((pm >> (5 * (5 - i))) & 0x1f) as u8;
    }
    checksum
}

fn verify_checksum(hrp: &[u8], data: &[u8]) -> bool {
    polymod(hrp_expand(hrp).chain(data.iter().copied())) == BECH32M_CONST
}

// -----------------------------------------------------------------------------
// Bit regrouping
// -----------------------------------------------------------------------------

/// Regroup `from`-bit values into `to`-bit values.
///
/// With `pad`, a trailing partial group is zero-filled. Without it, leftover bits
/// must be fewer than `from` and all zero.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let max_value: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return None;
        }
        acc = ((acc << from) | v) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }

    Some(out)
}

// -----------------------------------------------------------------------------
// Encode / Decode
// -----------------------------------------------------------------------------

fn check_hrp(hrp: &str) -> Result<(), Bech32mError> {
    if hrp.is_empty() || hrp.len() > MAX_HRP_LEN {
        return Err(Bech32mError::InvalidHrp);
    }
    if hrp
        .bytes()
        .any(|c| !(33..=126).contains(&c) || c.is_ascii_uppercase())
    {
        return Err(Bech32mError::InvalidHrp);
    }
    Ok(())
}

/// Encode `payload` under `hrp`. Output is always lowercase.
pub fn encode(hrp: &str, payload: &[u8]) -> Result<String, Bech32mError> {
    check_hrp(hrp)?;

    let data = convert_bits(payload, 8, 5, true).ok_or(Bech32mError::InvalidPadding)?;
    if hrp.len() + 1 + data.len() + CHECKSUM_LEN > MAX_TEXT_LEN {
        return Err(Bech32mError::InvalidSeparator);
    }
    let checksum = create_checksum(hrp.as_bytes(), &data);

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[d as usize] as char);
    }
    Ok(out)
}

/// Decode `text` into its lowercase HRP and payload bytes.
pub fn decode(text: &str) -> Result<(String, Vec<u8>), Bech32mError> {
    let (hrp, data) = decode_base32(text)?;
    let payload = convert_bits(&data, 5, 8, false).ok_or(Bech32mError::InvalidPadding)?;
    Ok((hrp, payload))
}

/// Decode `text` into its lowercase HRP and 5-bit data values, checksum removed.
pub fn decode_base32(text: &str) -> Result<(String, Vec<u8>), Bech32mError> {
    let bytes = text.as_bytes();
    if bytes.len() > MAX_TEXT_LEN {
        return Err(Bech32mError::InvalidSeparator);
    }
    if bytes.iter().any(|c| !(33..=126).contains(c)) {
        return Err(Bech32mError::InvalidCharset);
    }

    let has_lower = bytes.iter().any(u8::is_ascii_lowercase);
    let has_upper = bytes.iter().any(u8::is_ascii_uppercase);
    if has_lower && has_upper {
        return Err(Bech32mError::InvalidSeparator);
    }

    let sep = bytes
        .iter()
        .rposition(|&c| c == b'1')
        .ok_or(Bech32mError::InvalidSeparator)?;
    if sep == 0 || sep > MAX_HRP_LEN || bytes.len() - sep - 1 < CHECKSUM_LEN {
        return Err(Bech32mError::InvalidSeparator);
    }

    let hrp: Vec<u8> = bytes[..sep].iter().map(u8::to_ascii_lowercase).collect();

    let mut data = Vec::with_capacity(bytes.len() - sep - 1);
    for &c in &bytes[sep + 1..] {
        let v = CHARSET_REV[c.to_ascii_lowercase() as usize];
        if v < 0 {
            return Err(Bech32mError::InvalidCharset);
        }
        data.push(v as u8);
    }

    if !verify_checksum(&hrp, &data) {
        return Err(Bech32mError::InvalidChecksum);
    }
    data.truncate(data.len() - CHECKSUM_LEN);

    // hrp bytes are checked printable ASCII above
    let hrp = String::from_utf8(hrp).map_err(|_| Bech32mError::InvalidCharset)?;
    Ok((hrp, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bip350_valid_strings() {
        for s in [
            "A1LQFN3A",
            "a1lqfn3a",
            "abcdef1l7aum6echk45nj3s0wdvt2fg8x9yrzpqzd3ryx",
            "split1checkupstagehandshakeupstreamerranterredcaperredlc445v",
        ] {
            assert!(decode_base32(s).is_ok(), "{s} should decode");
        }
    }

    #[test]
    fn test_rejects_bech32_checksum() {
        // Valid under BIP-173 Bech32, not under Bech32m
        assert_eq!(decode_base32("a12uel5l"), Err(Bech32mError::InvalidChecksum));
        assert_eq!(decode_base32("A12UEL5L"), Err(Bech32mError::InvalidChecksum));
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(decode("qpzry9x8"), Err(Bech32mError::InvalidSeparator));
        assert_eq!(decode("1lqfn3a"), Err(Bech32mError::InvalidSeparator));
        assert_eq!(decode("a1lqfn"), Err(Bech32mError::InvalidSeparator));
        assert_eq!(decode("A1lqfn3a"), Err(Bech32mError::InvalidSeparator));
        assert_eq!(decode("a1lqfb3a"), Err(Bech32mError::InvalidCharset));
        assert_eq!(decode("a 1lqfn3a"), Err(Bech32mError::InvalidCharset));
        assert_eq!(decode("é1lqfn3a"), Err(Bech32mError::InvalidCharset));
    }

    #[test]
    fn test_encode_decode_long_payload() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(700).collect();
        let text = encode("jview", &payload).unwrap();
        assert!(text.len() > 90);
        assert!(text.starts_with("jview1"));
        assert_eq!(text, text.to_lowercase());

        let (hrp, decoded) = decode(&text).unwrap();
        assert_eq!(hrp, "jview");
        assert_eq!(decoded, payload);

        let (hrp, decoded) = decode(&text.to_uppercase()).unwrap();
        assert_eq!(hrp, "jview");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_single_character_substitution_is_detected() {
        let text = encode("jtest", b"orchard receiver bytes for mutation").unwrap();
        let sep = text.rfind('1').unwrap();
        let bytes = text.as_bytes();
        for pos in sep + 1..bytes.len() {
            for &replacement in CHARSET.iter() {
                if replacement == bytes[pos] {
                    continue;
                }
                let mut mutated = bytes.to_vec();
                mutated[pos] = replacement;
                let mutated = String::from_utf8(mutated).unwrap();
                assert_eq!(
                    decode(&mutated),
                    Err(Bech32mError::InvalidChecksum),
                    "mutation at {pos} decoded"
                );
            }
        }
    }

    #[test]
    fn test_encode_rejects_bad_hrp() {
        assert_eq!(encode("", b"x"), Err(Bech32mError::InvalidHrp));
        assert_eq!(encode("Jview", b"x"), Err(Bech32mError::InvalidHrp));
        assert_eq!(encode(&"a".repeat(84), b"x"), Err(Bech32mError::InvalidHrp));
    }

    #[test]
    fn test_convert_bits_rejects_nonzero_padding() {
        // 8 bits of data in two 5-bit groups leaves 2 padding bits which must be zero
        assert_eq!(convert_bits(&[0b11111, 0b11100], 5, 8, false), Some(vec![0xff]));
        assert_eq!(convert_bits(&[0b11111, 0b11101], 5, 8, false), None);
    }
}
