//! Unified container encoding (ZIP-316)
//!
//! A container is `Bech32m(hrp, F4Jumble(items || padding))`, where each item is
//! `CompactSize(typecode) || CompactSize(len) || value` and `padding` is the HRP
//! right-padded with zero bytes to 16 bytes.

use alloc::string::String;
use alloc::vec::Vec;
use zeroize::Zeroizing;

use crate::bech32m::{self, Bech32mError};
use crate::f4jumble;

/// Length of the HRP padding suffix
pub const PADDING_LEN: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Zip316Error {
    #[error("bech32m: {0}")]
    Bech32m(#[from] Bech32mError),
    #[error("unexpected human-readable part")]
    HrpMismatch,
    #[error("human-readable part longer than {len} bytes", len = PADDING_LEN)]
    HrpTooLong,
    #[error("payload shorter than {min}", min = f4jumble::MIN_LEN)]
    PayloadTooShort,
    #[error("payload longer than {max}", max = f4jumble::MAX_LEN)]
    PayloadTooLong,
    #[error("padding does not match the human-readable part")]
    PaddingInvalid,
    #[error("truncated item")]
    TlvInvalid,
    #[error("item length exceeds remaining payload")]
    TlvTrailingBytes,
    #[error("non-canonical compact size")]
    TlvNonCanonical,
    #[error("typecodes not in ascending order")]
    TlvOutOfOrder,
    #[error("container has no items")]
    TlvEmpty,
    #[error("encoding failed")]
    Encode,
}

/// One decoded TLV item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub typecode: u64,
    pub value: Zeroizing<Vec<u8>>,
}

// -----------------------------------------------------------------------------
// CompactSize
// -----------------------------------------------------------------------------

/// Read a canonically encoded CompactSize, advancing `input`.
pub fn read_compact_size(input: &mut &[u8]) -> Result<u64, Zip316Error> {
    let (&first, rest) = input.split_first().ok_or(Zip316Error::TlvInvalid)?;

    let (value, width, min) = match first {
        n @ 0..=252 => {
            *input = rest;
            return Ok(u64::from(n));
        }
        253 => (read_le(rest, 2)?, 2, 253),
        254 => (read_le(rest, 4)?, 4, 0x1_0000),
        255 => (read_le(rest, 8)?, 8, 0x1_0000_0000),
    };
    if value < min {
        return Err(Zip316Error::TlvNonCanonical);
    }
    *input = &rest[width..];
    Ok(value)
}

fn read_le(bytes: &[u8], width: usize) -> Result<u64, Zip316Error> {
    let raw = bytes.get(..width).ok_or(Zip316Error::TlvInvalid)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(raw);
    Ok(u64::from_le_bytes(buf))
}

/// Append the canonical CompactSize encoding of `value`.
pub fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=252 => out.push(value as u8),
        253..=0xffff => {
            out.push(253);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(254);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(255);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

// -----------------------------------------------------------------------------
// Items
// -----------------------------------------------------------------------------

/// Parse the raw TLV byte sequence into items.
///
/// Items must be present, well framed, and in strictly ascending typecode order.
pub fn parse_items(mut bytes: &[u8]) -> Result<Vec<Item>, Zip316Error> {
    let mut items: Vec<Item> = Vec::new();
    while !bytes.is_empty() {
        let typecode = read_compact_size(&mut bytes)?;
        let len = read_compact_size(&mut bytes)?;
        let len = usize::try_from(len).map_err(|_| Zip316Error::TlvTrailingBytes)?;
        if bytes.len() < len {
            return Err(Zip316Error::TlvTrailingBytes);
        }
        let (value, rest) = bytes.split_at(len);

        if let Some(prev) = items.last() {
            if typecode <= prev.typecode {
                return Err(Zip316Error::TlvOutOfOrder);
            }
        }
        items.push(Item {
            typecode,
            value: Zeroizing::new(value.to_vec()),
        });
        bytes = rest;
    }

    if items.is_empty() {
        return Err(Zip316Error::TlvEmpty);
    }
    Ok(items)
}

fn padding(hrp: &str) -> Result<[u8; PADDING_LEN], Zip316Error> {
    let hrp = hrp.as_bytes();
    if hrp.len() > PADDING_LEN {
        return Err(Zip316Error::HrpTooLong);
    }
    let mut p = [0u8; PADDING_LEN];
    p[..hrp.len()].copy_from_slice(hrp);
    Ok(p)
}

// -----------------------------------------------------------------------------
// Container
// -----------------------------------------------------------------------------

/// Encode `(typecode, value)` items as a unified container under `hrp`.
///
/// Items are written in the order given; callers supply them sorted by typecode.
pub fn encode_unified_container(hrp: &str, items: &[(u64, &[u8])]) -> Result<String, Zip316Error> {
    let padding = padding(hrp)?;

    let mut raw = Zeroizing::new(Vec::new());
    for (typecode, value) in items {
        write_compact_size(&mut raw, *typecode);
        write_compact_size(&mut raw, value.len() as u64);
        raw.extend_from_slice(value);
    }
    raw.extend_from_slice(&padding);

    if raw.len() > f4jumble::MAX_LEN {
        return Err(Zip316Error::PayloadTooLong);
    }
    f4jumble::f4jumble_mut(&mut raw).map_err(|_| Zip316Error::PayloadTooShort)?;

    bech32m::encode(hrp, &raw).map_err(|_| Zip316Error::Encode)
}

/// Decode a unified container.
///
/// `accept_hrp` decides whether the decoded HRP is one the caller expects; it is
/// consulted before any payload processing. Returns the HRP and the items.
pub fn decode_unified_container(
    text: &str,
    accept_hrp: impl Fn(&str) -> bool,
) -> Result<(String, Vec<Item>), Zip316Error> {
    let (hrp, payload) = bech32m::decode(text)?;
    let mut payload = Zeroizing::new(payload);

    if !accept_hrp(&hrp) {
        return Err(Zip316Error::HrpMismatch);
    }
    let expected_padding = padding(&hrp).map_err(|_| Zip316Error::HrpMismatch)?;

    if payload.len() < f4jumble::MIN_LEN {
        return Err(Zip316Error::PayloadTooShort);
    }
    if payload.len() > f4jumble::MAX_LEN {
        return Err(Zip316Error::PayloadTooLong);
    }
    f4jumble::f4jumble_inv_mut(&mut payload).map_err(|_| Zip316Error::PayloadTooShort)?;

    let (body, tail) = payload.split_at(payload.len() - PADDING_LEN);
    if tail != &expected_padding[..] {
        return Err(Zip316Error::PaddingInvalid);
    }

    let items = parse_items(body)?;
    Ok((hrp, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tlv(typecode: u8, value: &[u8]) -> Vec<u8> {
        let mut out = vec![typecode, value.len() as u8];
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn test_compact_size_canonical() {
        for value in [0u64, 252, 253, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let mut buf = Vec::new();
            write_compact_size(&mut buf, value);
            let mut slice = buf.as_slice();
            assert_eq!(read_compact_size(&mut slice), Ok(value));
            assert!(slice.is_empty());
        }

        let mut non_canonical: &[u8] = &[253, 0x10, 0x00];
        assert_eq!(
            read_compact_size(&mut non_canonical),
            Err(Zip316Error::TlvNonCanonical)
        );

        let mut truncated: &[u8] = &[254, 0x01, 0x02];
        assert_eq!(read_compact_size(&mut truncated), Err(Zip316Error::TlvInvalid));
    }

    #[test]
    fn test_parse_items() {
        let mut bytes = tlv(0x02, &[1; 4]);
        bytes.extend(tlv(0x03, &[2; 5]));
        let items = parse_items(&bytes).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].typecode, 2);
        assert_eq!(items[1].value.as_slice(), &[2; 5]);
    }

    #[test]
    fn test_parse_items_rejects_bad_framing() {
        assert_eq!(parse_items(&[]), Err(Zip316Error::TlvEmpty));
        assert_eq!(parse_items(&[0x03]), Err(Zip316Error::TlvInvalid));
        assert_eq!(parse_items(&[0x03, 10, 1, 2]), Err(Zip316Error::TlvTrailingBytes));

        let mut dup = tlv(0x03, &[0; 2]);
        dup.extend(tlv(0x03, &[0; 2]));
        assert_eq!(parse_items(&dup), Err(Zip316Error::TlvOutOfOrder));

        let mut descending = tlv(0x03, &[0; 2]);
        descending.extend(tlv(0x02, &[0; 2]));
        assert_eq!(parse_items(&descending), Err(Zip316Error::TlvOutOfOrder));
    }

    #[test]
    fn test_container_round_trip() {
        let value = [0x5au8; 43];
        let text = encode_unified_container("jtest", &[(3, &value)]).unwrap();
        assert!(text.starts_with("jtest1"));

        let (hrp, items) = decode_unified_container(&text, |h| h == "jtest").unwrap();
        assert_eq!(hrp, "jtest");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].typecode, 3);
        assert_eq!(items[0].value.as_slice(), &value);
    }

    #[test]
    fn test_container_hrp_checks() {
        let text = encode_unified_container("j", &[(3, &[0u8; 43])]).unwrap();
        assert_eq!(
            decode_unified_container(&text, |h| h == "jview"),
            Err(Zip316Error::HrpMismatch)
        );
        assert_eq!(
            encode_unified_container("seventeen-chars-x", &[(3, &[0u8; 43])]),
            Err(Zip316Error::HrpTooLong)
        );
    }

    #[test]
    fn test_container_padding_is_bound_to_hrp() {
        // Jumble under one HRP, wrap under another
        let mut raw = tlv(0x03, &[7u8; 43]);
        raw.extend_from_slice(&padding("jtest").unwrap());
        f4jumble::f4jumble_mut(&mut raw).unwrap();
        let text = bech32m::encode("j", &raw).unwrap();

        assert_eq!(
            decode_unified_container(&text, |_| true),
            Err(Zip316Error::PaddingInvalid)
        );
    }

    #[test]
    fn test_container_short_payload() {
        let text = bech32m::encode("j", &[0u8; 20]).unwrap();
        assert_eq!(
            decode_unified_container(&text, |_| true),
            Err(Zip316Error::PayloadTooShort)
        );
    }

    #[test]
    fn test_error_messages_name_limits() {
        assert_eq!(Zip316Error::PayloadTooShort.to_string(), "payload shorter than 48");
        assert_eq!(
            Zip316Error::HrpTooLong.to_string(),
            "human-readable part longer than 16 bytes"
        );
    }
}
