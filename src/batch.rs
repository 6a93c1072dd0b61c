//! Batch address derivation over a contiguous index range.

use alloc::string::String;
use alloc::vec::Vec;
use tracing::debug;

use crate::address::AddressDeriver;
use crate::diversifier::DiversifierIndex;
use crate::error::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maximum number of addresses derived by one batch call
pub const MAX_BATCH_COUNT: u32 = 100_000;

/// Validate a batch request, returning the last index of the range.
///
/// Checked in order: zero count, count above [`MAX_BATCH_COUNT`], then whether
/// `start + count - 1` fits in 32 bits.
pub fn check_range(start: u32, count: u32) -> Result<u32, Error> {
    if count == 0 {
        return Err(Error::CountZero);
    }
    if count > MAX_BATCH_COUNT {
        return Err(Error::CountTooLarge);
    }
    start.checked_add(count - 1).ok_or(Error::RangeOverflow)
}

/// Derive the encoded addresses for `start..start + count`, in index order.
///
/// Ranges of at least `parallel_threshold` indices are spread across the rayon
/// pool when the `parallel` feature is enabled. Any failure fails the batch.
pub fn derive_range(
    deriver: &AddressDeriver,
    start: u32,
    count: u32,
    parallel_threshold: u32,
) -> Result<Vec<String>, Error> {
    let last = check_range(start, count)?;
    let parallel = cfg!(feature = "parallel") && count >= parallel_threshold;
    debug!(start, last, count, parallel, "deriving address batch");

    if parallel {
        derive_parallel(deriver, start, count)
    } else {
        derive_sequential(deriver, start, count)
    }
}

// offsets are below `count`, and `start + count - 1` was checked not to overflow
fn index(start: u32, offset: u32) -> DiversifierIndex {
    DiversifierIndex::new(start + offset)
}

fn derive_sequential(deriver: &AddressDeriver, start: u32, count: u32) -> Result<Vec<String>, Error> {
    (0..count)
        .map(|offset| deriver.encode_address_at(index(start, offset)))
        .collect()
}

#[cfg(feature = "parallel")]
fn derive_parallel(deriver: &AddressDeriver, start: u32, count: u32) -> Result<Vec<String>, Error> {
    (0..count)
        .into_par_iter()
        .map(|offset| deriver.encode_address_at(index(start, offset)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn derive_parallel(deriver: &AddressDeriver, start: u32, count: u32) -> Result<Vec<String>, Error> {
    derive_sequential(deriver, start, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::tests::sample_fvk_bytes;
    use crate::ufvk::UnifiedFullViewingKey;
    use crate::{zip316, Network};

    fn sample_deriver() -> AddressDeriver {
        let text = zip316::encode_unified_container("jviewtest", &[(3, &sample_fvk_bytes(31))])
            .unwrap();
        UnifiedFullViewingKey::decode(&text, &Network::ALL)
            .unwrap()
            .to_deriver()
            .unwrap()
    }

    #[test]
    fn test_check_range_bounds() {
        assert_eq!(check_range(0, 0), Err(Error::CountZero));
        assert_eq!(check_range(0, 1), Ok(0));
        assert_eq!(check_range(0, MAX_BATCH_COUNT), Ok(MAX_BATCH_COUNT - 1));
        assert_eq!(check_range(0, MAX_BATCH_COUNT + 1), Err(Error::CountTooLarge));
        assert_eq!(check_range(u32::MAX, 1), Ok(u32::MAX));
        assert_eq!(check_range(u32::MAX, 2), Err(Error::RangeOverflow));
        assert_eq!(check_range(u32::MAX - 9, 10), Ok(u32::MAX));

        // count checks come before the overflow check
        assert_eq!(check_range(u32::MAX, 0), Err(Error::CountZero));
        assert_eq!(check_range(u32::MAX, u32::MAX), Err(Error::CountTooLarge));
    }

    #[test]
    fn test_batch_matches_single_derivation() {
        let deriver = sample_deriver();
        let batch = derive_range(&deriver, 40, 8, u32::MAX).unwrap();
        assert_eq!(batch.len(), 8);
        for (offset, addr) in batch.iter().enumerate() {
            let single = deriver
                .encode_address_at(DiversifierIndex::new(40 + offset as u32))
                .unwrap();
            assert_eq!(addr, &single);
            assert!(addr.starts_with("jtest1"));
        }
    }

    #[test]
    fn test_parallel_preserves_order() {
        let deriver = sample_deriver();
        let sequential = derive_range(&deriver, 0, 64, u32::MAX).unwrap();
        let parallel = derive_range(&deriver, 0, 64, 1).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_batch_at_end_of_index_space() {
        let deriver = sample_deriver();
        let batch = derive_range(&deriver, u32::MAX - 1, 2, u32::MAX).unwrap();
        assert_eq!(
            batch[1],
            deriver.encode_address_at(DiversifierIndex::new(u32::MAX)).unwrap()
        );
    }
}
