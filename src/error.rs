//! Error taxonomy
//!
//! Every failure the engine can report is one of a closed set of codes. The
//! `Display` form of each variant is its machine-readable code, so callers can
//! surface `err.to_string()` verbatim.

use crate::bech32m::Bech32mError;
use crate::zip316::Zip316Error;

/// Errors returned by UFVK decoding and address derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The UFVK text is empty or whitespace only.
    #[error("ufvk_empty")]
    UfvkEmpty,
    /// The UFVK is not a well-formed Bech32m unified container.
    #[error("ufvk_invalid_bech32m")]
    UfvkInvalidBech32m,
    /// The UFVK prefix does not belong to an accepted network.
    #[error("ufvk_hrp_mismatch")]
    UfvkHrpMismatch,
    /// The decoded payload is not a valid sequence of TLV records.
    #[error("ufvk_tlv_invalid")]
    UfvkTlvInvalid,
    /// A record carries a typecode outside the supported set.
    #[error("ufvk_typecode_unsupported")]
    UfvkTypecodeUnsupported,
    /// A record value has the wrong length for its typecode.
    #[error("ufvk_value_len_invalid")]
    UfvkValueLenInvalid,
    /// The viewing key bytes are not a valid key encoding.
    #[error("ufvk_fvk_bytes_invalid")]
    UfvkFvkBytesInvalid,
    /// A batch was requested with a count of zero.
    #[error("count_zero")]
    CountZero,
    /// A batch was requested with a count above [`crate::MAX_BATCH_COUNT`].
    #[error("count_too_large")]
    CountTooLarge,
    /// The last index of a batch does not fit in 32 bits.
    #[error("range_overflow")]
    RangeOverflow,
    /// A caller-supplied index does not fit in 32 bits.
    #[error("index_invalid")]
    IndexInvalid,
    /// An invariant was violated inside the engine.
    #[error("internal")]
    Internal,
}

impl Error {
    /// Machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UfvkEmpty => "ufvk_empty",
            Error::UfvkInvalidBech32m => "ufvk_invalid_bech32m",
            Error::UfvkHrpMismatch => "ufvk_hrp_mismatch",
            Error::UfvkTlvInvalid => "ufvk_tlv_invalid",
            Error::UfvkTypecodeUnsupported => "ufvk_typecode_unsupported",
            Error::UfvkValueLenInvalid => "ufvk_value_len_invalid",
            Error::UfvkFvkBytesInvalid => "ufvk_fvk_bytes_invalid",
            Error::CountZero => "count_zero",
            Error::CountTooLarge => "count_too_large",
            Error::RangeOverflow => "range_overflow",
            Error::IndexInvalid => "index_invalid",
            Error::Internal => "internal",
        }
    }

    /// True for errors caused by the caller's input rather than an engine defect.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::Internal)
    }
}

impl From<Bech32mError> for Error {
    fn from(_: Bech32mError) -> Self {
        Error::UfvkInvalidBech32m
    }
}

impl From<Zip316Error> for Error {
    fn from(e: Zip316Error) -> Self {
        match e {
            Zip316Error::Bech32m(_)
            | Zip316Error::PayloadTooShort
            | Zip316Error::PayloadTooLong
            | Zip316Error::PaddingInvalid => Error::UfvkInvalidBech32m,
            Zip316Error::HrpMismatch => Error::UfvkHrpMismatch,
            Zip316Error::TlvInvalid
            | Zip316Error::TlvTrailingBytes
            | Zip316Error::TlvNonCanonical
            | Zip316Error::TlvOutOfOrder
            | Zip316Error::TlvEmpty => Error::UfvkTlvInvalid,
            Zip316Error::HrpTooLong | Zip316Error::Encode => Error::Internal,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No network is accepted.
    #[error("at least one network must be accepted")]
    NoNetworks,
    /// The same network appears more than once.
    #[error("network {0} listed more than once")]
    DuplicateNetwork(crate::Network),
    /// Parallel threshold is zero.
    #[error("parallel_threshold must be at least 1")]
    ZeroParallelThreshold,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_code() {
        let all = [
            Error::UfvkEmpty,
            Error::UfvkInvalidBech32m,
            Error::UfvkHrpMismatch,
            Error::UfvkTlvInvalid,
            Error::UfvkTypecodeUnsupported,
            Error::UfvkValueLenInvalid,
            Error::UfvkFvkBytesInvalid,
            Error::CountZero,
            Error::CountTooLarge,
            Error::RangeOverflow,
            Error::IndexInvalid,
            Error::Internal,
        ];
        for e in all {
            assert_eq!(e.to_string(), e.code());
        }
    }

    #[test]
    fn test_zip316_mapping() {
        assert_eq!(Error::from(Zip316Error::HrpMismatch), Error::UfvkHrpMismatch);
        assert_eq!(Error::from(Zip316Error::PaddingInvalid), Error::UfvkInvalidBech32m);
        assert_eq!(Error::from(Zip316Error::TlvOutOfOrder), Error::UfvkTlvInvalid);
        assert_eq!(Error::from(Zip316Error::HrpTooLong), Error::Internal);
        assert_eq!(
            Error::from(Zip316Error::Bech32m(Bech32mError::InvalidChecksum)),
            Error::UfvkInvalidBech32m
        );
    }
}
